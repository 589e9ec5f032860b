//! CLI interface for outcome-predictor
//!
//! Provides subcommands for:
//! - `train`: Replay ratings, fit and save the calibrated model
//! - `predict`: Score a single match with a saved model
//! - `ratings`: Show the Elo table after replaying history
//! - `backtest`: Hold-out evaluation against the market
//! - `config`: Show the effective configuration

mod backtest;
mod predict;
mod ratings;
mod train;

pub use backtest::BacktestArgs;
pub use predict::PredictArgs;
pub use ratings::RatingsArgs;
pub use train::TrainArgs;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "outcome-predictor")]
#[command(about = "Elo and market-odds home-win probability model")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay ratings, fit and save the calibrated model
    Train(TrainArgs),
    /// Score a single match
    Predict(PredictArgs),
    /// Show team ratings after replaying history
    Ratings(RatingsArgs),
    /// Evaluate on a chronological hold-out window
    Backtest(BacktestArgs),
    /// Show the effective configuration
    Config,
}

/// Report output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    #[default]
    Table,
}
