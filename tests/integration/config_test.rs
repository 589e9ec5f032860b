//! Configuration file tests

use outcome_predictor::config::Config;
use outcome_predictor::telemetry::LogFormat;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_config_example_parses() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();

    assert_eq!(config.rating.base, 1500.0);
    assert_eq!(config.rating.k, 20.0);
    assert_eq!(config.model.calibration_folds, 5);
    assert_eq!(config.model.n_estimators, 100);
    assert_eq!(
        config.data.model_path,
        PathBuf::from("models/ensemble_latest.json")
    );
    assert_eq!(config.backtest.holdout_fraction, 0.2);
    assert_eq!(config.telemetry.log_format, LogFormat::Pretty);
    assert_eq!(config.telemetry.metrics_port, None);
}

#[test]
fn test_config_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[model]\ncalibration_folds = 3\n").unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.model.calibration_folds, 3);
    assert_eq!(config.model.learning_rate, 0.1);
}

#[test]
fn test_invalid_config_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[model]\ncalibration_folds = \"five\"\n").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("config.toml"));
}
