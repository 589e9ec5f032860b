//! Backtesting module
//!
//! Fits on the early part of the match history and compares calibrated
//! probabilities with the market on the later part

mod analytics;
mod simulator;

pub use analytics::{
    calibration_bins, evaluate_binary, BacktestResult, BacktestSummary, CalibrationBin,
    ScoreMetrics,
};
pub use simulator::BacktestSimulator;
