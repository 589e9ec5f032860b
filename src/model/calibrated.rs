//! Calibrated ensemble and artifact persistence
//!
//! One boosted classifier per time-ordered fold, each paired with an
//! isotonic map fitted on that fold's (later) validation window. The
//! ensemble prediction is the mean of the members' calibrated outputs.

use super::boosting::{BoostingParams, GradientBoostingClassifier, Row};
use super::isotonic::IsotonicCalibrator;
use super::split::TimeSeriesSplit;
use super::ModelError;
use crate::features::{FeatureVector, FEATURE_NAMES, FEATURE_SCHEMA_VERSION};
use crate::telemetry::{record_latency, set_gauge, GaugeMetric, LatencyMetric};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Instant;
use uuid::Uuid;

/// Provenance stored alongside the fitted ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub schema_version: u32,
    /// Feature names in the order the model expects them
    pub feature_names: Vec<String>,
    pub n_samples: usize,
    pub n_folds: usize,
}

impl ArtifactMetadata {
    fn current_schema(n_samples: usize, n_folds: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            trained_at: Utc::now(),
            schema_version: FEATURE_SCHEMA_VERSION,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            n_samples,
            n_folds,
        }
    }

    fn check_schema(&self) -> Result<(), ModelError> {
        let compiled: Vec<String> = FEATURE_NAMES.iter().map(|s| s.to_string()).collect();
        if self.schema_version != FEATURE_SCHEMA_VERSION || self.feature_names != compiled {
            return Err(ModelError::SchemaMismatch {
                expected: format!("v{} {:?}", FEATURE_SCHEMA_VERSION, compiled),
                found: format!("v{} {:?}", self.schema_version, self.feature_names),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CalibratedMember {
    base: GradientBoostingClassifier,
    calibrator: IsotonicCalibrator,
}

impl CalibratedMember {
    fn predict(&self, row: &Row) -> f64 {
        self.calibrator.predict(self.base.decision_function(row))
    }
}

/// Fitted, immutable home-win model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibratedModel {
    metadata: ArtifactMetadata,
    members: Vec<CalibratedMember>,
}

impl CalibratedModel {
    /// Fit on chronologically ordered rows.
    ///
    /// Fails with `InsufficientData` when the rows cannot fill `n_folds`
    /// folds and with `SingleClass` when a fold's training window holds
    /// one label only.
    pub fn fit(
        x: &[Row],
        labels: &[bool],
        params: BoostingParams,
        n_folds: usize,
    ) -> Result<Self, ModelError> {
        let started = Instant::now();
        if x.len() != labels.len() {
            return Err(ModelError::LengthMismatch {
                features: x.len(),
                labels: labels.len(),
            });
        }

        let folds = TimeSeriesSplit::new(n_folds).split(x.len())?;
        let mut members = Vec::with_capacity(folds.len());

        for fold in folds {
            let train_labels = &labels[fold.train.clone()];
            let positives = train_labels.iter().filter(|&&l| l).count();
            if positives == 0 || positives == train_labels.len() {
                return Err(ModelError::SingleClass { fold: fold.index });
            }

            let base =
                GradientBoostingClassifier::fit(&x[fold.train.clone()], train_labels, params)?;

            let scores: Vec<f64> = x[fold.validation.clone()]
                .iter()
                .map(|row| base.decision_function(row))
                .collect();
            let outcomes: Vec<f64> = labels[fold.validation.clone()]
                .iter()
                .map(|&l| if l { 1.0 } else { 0.0 })
                .collect();
            let calibrator = IsotonicCalibrator::fit(&scores, &outcomes)?;

            tracing::debug!(
                fold = fold.index,
                train = fold.train.len(),
                validation = fold.validation.len(),
                knots = calibrator.n_knots(),
                "Fitted calibration fold"
            );
            members.push(CalibratedMember { base, calibrator });
        }

        record_latency(LatencyMetric::ModelFit, started.elapsed());
        set_gauge(GaugeMetric::TrainingSamples, x.len() as f64);

        Ok(Self {
            metadata: ArtifactMetadata::current_schema(x.len(), n_folds),
            members,
        })
    }

    /// Calibrated home-win probability for a row in schema order.
    ///
    /// Any NaN feature yields NaN; tree routing would otherwise send it
    /// down the right branch and hide it behind a finite score.
    pub fn predict_row(&self, row: &Row) -> f64 {
        if self.members.is_empty() || row.iter().any(|v| v.is_nan()) {
            return f64::NAN;
        }
        let sum: f64 = self.members.iter().map(|m| m.predict(row)).sum();
        (sum / self.members.len() as f64).clamp(0.0, 1.0)
    }

    /// Calibrated home-win probability
    pub fn predict_probability(&self, features: &FeatureVector) -> f64 {
        self.predict_row(&features.to_array())
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }

    pub fn n_members(&self) -> usize {
        self.members.len()
    }

    /// Write the artifact as JSON, creating parent directories.
    ///
    /// Goes through a sibling temp file and a rename so readers never see
    /// a partial artifact.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec(self)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;

        tracing::info!(
            path = %path.display(),
            id = %self.metadata.id,
            "Saved model artifact"
        );
        Ok(())
    }

    /// Read an artifact and check it matches the compiled feature schema
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let model: Self = serde_json::from_slice(&bytes)?;
        model.metadata.check_schema()?;
        if model.members.is_empty() {
            return Err(ModelError::NotFitted);
        }
        for (i, member) in model.members.iter().enumerate() {
            member
                .base
                .check_structure()
                .and_then(|()| member.calibrator.check_structure())
                .map_err(|reason| ModelError::CorruptArtifact {
                    reason: format!("member {i}: {reason}"),
                })?;
        }

        tracing::info!(
            path = %path.display(),
            id = %model.metadata.id,
            trained_at = %model.metadata.trained_at,
            "Loaded model artifact"
        );
        Ok(model)
    }
}
