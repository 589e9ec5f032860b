//! Outcome model module
//!
//! Calibrated home-win classifier over the fixed feature schema

mod boosting;
mod calibrated;
mod isotonic;
mod split;
mod types;

pub use boosting::{BoostingParams, GradientBoostingClassifier, Row};
pub use calibrated::{ArtifactMetadata, CalibratedModel};
pub use isotonic::IsotonicCalibrator;
pub use split::{Fold, TimeSeriesSplit, MIN_FOLDS};
pub use types::ModelError;

use crate::config::ModelConfig;
use crate::features::{FeatureVector, LabeledFeatures};
use std::sync::Arc;

/// Anything that can score a feature vector as a home-win probability
pub trait WinProbabilityModel: Send + Sync {
    /// Probability of a home win, in [0, 1] for finite inputs
    fn predict_probability(&self, features: &FeatureVector) -> Result<f64, ModelError>;
}

impl WinProbabilityModel for CalibratedModel {
    fn predict_probability(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        if self.n_members() == 0 {
            return Err(ModelError::NotFitted);
        }
        Ok(CalibratedModel::predict_probability(self, features))
    }
}

/// Fit a calibrated model on feature vectors in chronological order
pub fn fit(
    features: &[FeatureVector],
    labels: &[bool],
    config: &ModelConfig,
) -> Result<CalibratedModel, ModelError> {
    let rows: Vec<Row> = features.iter().map(FeatureVector::to_array).collect();
    CalibratedModel::fit(&rows, labels, config.boosting(), config.calibration_folds)
}

/// Stateful wrapper: configured up front, fitted once, then shared
#[derive(Debug, Clone)]
pub struct OutcomeModel {
    config: ModelConfig,
    fitted: Option<Arc<CalibratedModel>>,
}

impl OutcomeModel {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            fitted: None,
        }
    }

    /// Wrap an already fitted (e.g. loaded) artifact
    pub fn from_fitted(config: ModelConfig, model: CalibratedModel) -> Self {
        Self {
            config,
            fitted: Some(Arc::new(model)),
        }
    }

    /// Fit on labelled rows, replacing any previous fit
    pub fn fit(&mut self, samples: &[LabeledFeatures]) -> Result<&CalibratedModel, ModelError> {
        let features: Vec<FeatureVector> = samples.iter().map(|s| s.features).collect();
        let labels: Vec<bool> = samples.iter().map(|s| s.target_home_win).collect();

        let model = fit(&features, &labels, &self.config)?;
        tracing::info!(
            samples = samples.len(),
            folds = self.config.calibration_folds,
            id = %model.metadata().id,
            "Fitted calibrated model"
        );

        Ok(&**self.fitted.insert(Arc::new(model)))
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Shared handle to the fitted artifact
    pub fn fitted(&self) -> Result<Arc<CalibratedModel>, ModelError> {
        self.fitted.clone().ok_or(ModelError::NotFitted)
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
}

impl WinProbabilityModel for OutcomeModel {
    fn predict_probability(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        match &self.fitted {
            Some(model) => WinProbabilityModel::predict_probability(model.as_ref(), features),
            None => Err(ModelError::NotFitted),
        }
    }
}
