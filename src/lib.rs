//! outcome-predictor: home-win probability model for football matches
//!
//! This library provides the core components for:
//! - Match history ingestion from CSV and Parquet export
//! - Sequential Elo rating replay
//! - Feature engineering from ratings and bookmaker odds
//! - Gradient-boosted classifier with time-ordered isotonic calibration
//! - Single-match prediction service
//! - Chronological hold-out backtesting
//! - Structured logging and Prometheus metrics

pub mod backtest;
pub mod cli;
pub mod config;
pub mod data;
pub mod features;
pub mod model;
pub mod rating;
pub mod service;
pub mod telemetry;
