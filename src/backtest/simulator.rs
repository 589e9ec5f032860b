//! Chronological hold-out evaluation

use super::analytics::{calibration_bins, evaluate_binary};
use super::{BacktestResult, BacktestSummary};
use crate::config::{BacktestConfig, Config, ModelConfig};
use crate::data::MatchRecord;
use crate::features::{engineer_features, LabeledFeatures};
use crate::model::{fit, ModelError};
use crate::rating::{compute_ratings, EloParams};

/// Trains on the early part of the history and scores the rest
pub struct BacktestSimulator {
    rating: EloParams,
    model: ModelConfig,
    config: BacktestConfig,
}

impl BacktestSimulator {
    /// Create a new simulator
    pub fn new(rating: EloParams, model: ModelConfig, config: BacktestConfig) -> Self {
        Self {
            rating,
            model,
            config,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.rating, config.model.clone(), config.backtest.clone())
    }

    /// Size of the hold-out window for `n` matches
    pub fn holdout_len(&self, n: usize) -> usize {
        let fraction = self.config.holdout_fraction.clamp(0.0, 1.0);
        ((n as f64 * fraction).round() as usize).min(n)
    }

    /// Run the backtest.
    ///
    /// Ratings replay over the full history so hold-out matches carry the
    /// same pre-match state a live prediction would see.
    pub fn run(&self, matches: &[MatchRecord]) -> Result<BacktestResult, ModelError> {
        let enriched = compute_ratings(matches, self.rating);
        let samples = engineer_features(&enriched);

        let n_holdout = self.holdout_len(samples.len());
        let (train, holdout) = samples.split_at(samples.len() - n_holdout);

        let features: Vec<_> = train.iter().map(|s| s.features).collect();
        let labels: Vec<bool> = train.iter().map(|s| s.target_home_win).collect();
        let model = fit(&features, &labels, &self.model)?;

        if holdout.is_empty() {
            tracing::warn!(
                matches = samples.len(),
                holdout_fraction = self.config.holdout_fraction,
                "Hold-out window is empty"
            );
        }

        let holdout_labels: Vec<bool> = holdout.iter().map(|s| s.target_home_win).collect();
        let model_probs: Vec<f64> = holdout
            .iter()
            .map(|s| model.predict_probability(&s.features))
            .collect();
        let market_probs: Vec<f64> = holdout.iter().map(|s| s.features.home_implied).collect();

        let summary = BacktestSummary {
            train_matches: train.len(),
            holdout_matches: holdout.len(),
            holdout_home_win_rate: home_win_rate(holdout),
            model: evaluate_binary(&model_probs, &holdout_labels),
            market: evaluate_binary(&market_probs, &holdout_labels),
        };
        tracing::info!(
            train = summary.train_matches,
            holdout = summary.holdout_matches,
            model_brier = summary.model.brier,
            market_brier = summary.market.brier,
            "Backtest complete"
        );

        Ok(BacktestResult {
            calibration: calibration_bins(
                &model_probs,
                &holdout_labels,
                self.config.calibration_bins,
            ),
            summary,
        })
    }
}

fn home_win_rate(samples: &[LabeledFeatures]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let wins = samples.iter().filter(|s| s.target_home_win).count();
    wins as f64 / samples.len() as f64
}
