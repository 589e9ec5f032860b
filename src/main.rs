use clap::Parser;
use outcome_predictor::cli::{Cli, Commands};
use outcome_predictor::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {:#}", cli.config, e);
            eprintln!("Using default configuration");
            toml::from_str(include_str!("../config.toml.example"))?
        }
    };

    // Initialize telemetry
    outcome_predictor::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Train(args) => {
            tracing::info!("Starting training");
            args.execute(&config).await?;
        }
        Commands::Predict(args) => {
            args.execute(&config).await?;
        }
        Commands::Ratings(args) => {
            args.execute(&config).await?;
        }
        Commands::Backtest(args) => {
            tracing::info!("Starting backtest");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("# Effective configuration ({})", cli.config);
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
