//! Prediction request/response types

use crate::data::MarketOdds;
use crate::model::ModelError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced to prediction callers
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid {field}: {value} (odds must be finite and positive)")]
    InvalidOdds { field: &'static str, value: f64 },

    #[error("invalid {field}: {value} (ratings must be finite)")]
    InvalidRating { field: &'static str, value: f64 },

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Single-match prediction query. Every field is required.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub home_elo: f64,
    pub away_elo: f64,
    pub home_odds: f64,
    pub draw_odds: f64,
    pub away_odds: f64,
}

impl PredictionRequest {
    /// Reject non-finite ratings and non-finite or non-positive odds
    pub fn validate(&self) -> Result<(), ServiceError> {
        for (field, value) in [("home_elo", self.home_elo), ("away_elo", self.away_elo)] {
            if !value.is_finite() {
                return Err(ServiceError::InvalidRating { field, value });
            }
        }
        for (field, value) in [
            ("home_odds", self.home_odds),
            ("draw_odds", self.draw_odds),
            ("away_odds", self.away_odds),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ServiceError::InvalidOdds { field, value });
            }
        }
        Ok(())
    }

    pub fn odds(&self) -> MarketOdds {
        MarketOdds::new(self.home_odds, self.draw_odds, self.away_odds)
    }
}

/// Engineered inputs returned next to the probability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub elo_diff: f64,
    pub home_implied: f64,
    pub draw_implied: f64,
    pub away_implied: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted_home_win_probability: f64,
    pub explanation: Explanation,
}

impl PredictionResponse {
    /// Model probability minus the market's overround-free home probability
    pub fn edge_vs_market(&self) -> f64 {
        self.predicted_home_win_probability - self.explanation.home_implied
    }

    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        format!(
            r#"
══════════════════════════════════════════════════════
               MATCH PREDICTION
══════════════════════════════════════════════════════
Home Win Probability:  {:.1}%
Edge vs Market:        {:+.1}%

INPUTS
───────────────────────────────────────────────────────
Elo Difference:        {:+.1}
Market Home:           {:.1}%
Market Draw:           {:.1}%
Market Away:           {:.1}%
══════════════════════════════════════════════════════
"#,
            self.predicted_home_win_probability * 100.0,
            self.edge_vs_market() * 100.0,
            self.explanation.elo_diff,
            self.explanation.home_implied * 100.0,
            self.explanation.draw_implied * 100.0,
            self.explanation.away_implied * 100.0,
        )
    }
}
