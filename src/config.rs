//! Configuration types for outcome-predictor

use crate::model::BoostingParams;
use crate::rating::EloParams;
use crate::telemetry::LogFormat;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub rating: EloParams,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub backtest: BacktestConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Outcome model configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelConfig {
    /// Time-ordered calibration folds
    #[serde(default = "default_calibration_folds")]
    pub calibration_folds: usize,

    /// Boosting stages
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,

    /// Shrinkage applied to each stage
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// Maximum depth of each regression tree
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Minimum samples required to split a node
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,

    /// Minimum samples on each side of a split
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
}

fn default_calibration_folds() -> usize {
    5
}
fn default_n_estimators() -> usize {
    100
}
fn default_learning_rate() -> f64 {
    0.1
}
fn default_max_depth() -> usize {
    3
}
fn default_min_samples_split() -> usize {
    2
}
fn default_min_samples_leaf() -> usize {
    1
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            calibration_folds: default_calibration_folds(),
            n_estimators: default_n_estimators(),
            learning_rate: default_learning_rate(),
            max_depth: default_max_depth(),
            min_samples_split: default_min_samples_split(),
            min_samples_leaf: default_min_samples_leaf(),
        }
    }
}

impl ModelConfig {
    /// Hyperparameters for each fold's base classifier
    pub fn boosting(&self) -> BoostingParams {
        BoostingParams {
            n_estimators: self.n_estimators,
            learning_rate: self.learning_rate,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
        }
    }
}

/// File locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    /// Match history CSV
    #[serde(default = "default_matches_path")]
    pub matches_path: PathBuf,

    /// Trained model artifact
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Rating history export directory for `train --export-history`
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_matches_path() -> PathBuf {
    PathBuf::from("data/sample_matches.csv")
}
fn default_model_path() -> PathBuf {
    PathBuf::from("models/ensemble_latest.json")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./output")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            matches_path: default_matches_path(),
            model_path: default_model_path(),
            output_dir: default_output_dir(),
        }
    }
}

/// Hold-out evaluation configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BacktestConfig {
    /// Share of the most recent matches held out for scoring
    #[serde(default = "default_holdout_fraction")]
    pub holdout_fraction: f64,

    /// Equal-width probability bins in the reliability table
    #[serde(default = "default_calibration_bins")]
    pub calibration_bins: usize,
}

fn default_holdout_fraction() -> f64 {
    0.2
}
fn default_calibration_bins() -> usize {
    10
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            holdout_fraction: default_holdout_fraction(),
            calibration_bins: default_calibration_bins(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Prometheus exporter port; no exporter when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("serializing configuration")
    }
}
