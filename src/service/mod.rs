//! Prediction service module
//!
//! Builds the query vector, scores it and packages the probability with
//! the inputs that produced it. Holds no mutable state.

mod types;

pub use types::{Explanation, PredictionRequest, PredictionResponse, ServiceError};

use crate::data::MarketOdds;
use crate::features::{build_query_vector, FeatureVector};
use crate::model::{CalibratedModel, ModelError, WinProbabilityModel};
use crate::telemetry::{record_latency, record_prediction, LatencyMetric};
use std::sync::Arc;
use std::time::Instant;

/// Probability plus the engineered inputs behind it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub features: FeatureVector,
    pub probability: f64,
}

impl From<Prediction> for PredictionResponse {
    fn from(p: Prediction) -> Self {
        Self {
            predicted_home_win_probability: p.probability,
            explanation: Explanation {
                elo_diff: p.features.elo_diff,
                home_implied: p.features.home_implied,
                draw_implied: p.features.draw_implied,
                away_implied: p.features.away_implied,
            },
        }
    }
}

/// Score one match. Inputs are not validated; a NaN rating or odd yields
/// a NaN probability.
pub fn predict<M>(
    model: &M,
    home_elo: f64,
    away_elo: f64,
    odds: MarketOdds,
) -> Result<Prediction, ModelError>
where
    M: WinProbabilityModel + ?Sized,
{
    let features = build_query_vector(home_elo, away_elo, odds);
    let probability = model.predict_probability(&features)?;
    Ok(Prediction {
        features,
        probability,
    })
}

/// Validating front end over a shared fitted model
#[derive(Debug, Clone)]
pub struct PredictionService {
    model: Arc<CalibratedModel>,
}

impl PredictionService {
    pub fn new(model: Arc<CalibratedModel>) -> Self {
        Self { model }
    }

    /// Validate, then score
    pub fn handle(&self, request: &PredictionRequest) -> Result<PredictionResponse, ServiceError> {
        let started = Instant::now();
        request.validate()?;

        let prediction = predict(
            self.model.as_ref(),
            request.home_elo,
            request.away_elo,
            request.odds(),
        )?;

        record_latency(LatencyMetric::Prediction, started.elapsed());
        record_prediction();
        tracing::debug!(
            elo_diff = prediction.features.elo_diff,
            probability = prediction.probability,
            "Served prediction"
        );

        Ok(prediction.into())
    }

    pub fn model(&self) -> &CalibratedModel {
        &self.model
    }
}
