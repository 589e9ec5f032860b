//! Backtest command implementation

use super::OutputFormat;
use crate::backtest::BacktestSimulator;
use crate::config::Config;
use crate::data::load_matches;
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct BacktestArgs {
    /// Match history CSV (defaults to data.matches_path)
    #[arg(long)]
    pub matches: Option<PathBuf>,

    /// Share of the most recent matches to hold out (0..1)
    #[arg(long)]
    pub holdout: Option<f64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl BacktestArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let path = self
            .matches
            .clone()
            .unwrap_or_else(|| config.data.matches_path.clone());

        let mut settings = config.clone();
        if let Some(holdout) = self.holdout {
            anyhow::ensure!(
                (0.0..1.0).contains(&holdout),
                "holdout must be in [0, 1), got {holdout}"
            );
            settings.backtest.holdout_fraction = holdout;
        }

        let matches = load_matches(&path)
            .with_context(|| format!("loading matches from {}", path.display()))?;
        tracing::info!(matches = matches.len(), path = %path.display(), "Running backtest");

        let simulator = BacktestSimulator::from_config(&settings);
        let result = tokio::task::spawn_blocking(move || simulator.run(&matches))
            .await
            .context("backtest task panicked")??;

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
            OutputFormat::Table => println!("{}", result.format_table()),
        }
        Ok(())
    }
}
