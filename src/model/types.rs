//! Model error types

use thiserror::Error;

/// Errors raised while fitting, scoring or persisting the outcome model
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("insufficient data: need at least {required}, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("training window of fold {fold} contains a single class")]
    SingleClass { fold: usize },

    #[error("feature/label length mismatch: {features} feature rows, {labels} labels")]
    LengthMismatch { features: usize, labels: usize },

    #[error("calibration set is empty")]
    EmptyCalibrationSet,

    #[error("model has not been fitted")]
    NotFitted,

    #[error("feature schema mismatch: expected {expected}, found {found}")]
    SchemaMismatch { expected: String, found: String },

    #[error("corrupt model artifact: {reason}")]
    CorruptArtifact { reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
