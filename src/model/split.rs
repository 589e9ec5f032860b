//! Time-ordered fold generation
//!
//! Samples must already be in chronological order. Every validation window
//! lies strictly after its training window, so no fold sees the future.

use super::ModelError;
use std::ops::Range;

/// Smallest fold count accepted
pub const MIN_FOLDS: usize = 2;

/// One train/validation split, as index ranges into the sample order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    /// Zero-based fold number
    pub index: usize,
    pub train: Range<usize>,
    pub validation: Range<usize>,
}

/// Expanding-window splitter over `n_splits` equal validation windows
#[derive(Debug, Clone, Copy)]
pub struct TimeSeriesSplit {
    n_splits: usize,
}

impl TimeSeriesSplit {
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits }
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Minimum sample count for `n_splits` folds
    pub fn min_samples(&self) -> usize {
        self.n_splits + 1
    }

    /// Generate the folds for `n_samples` samples.
    ///
    /// The history is cut into `n_splits + 1` windows of
    /// `n_samples / (n_splits + 1)` samples; any remainder goes to the
    /// first training window. Fails rather than using fewer folds.
    pub fn split(&self, n_samples: usize) -> Result<Vec<Fold>, ModelError> {
        if self.n_splits < MIN_FOLDS {
            return Err(ModelError::InsufficientData {
                required: MIN_FOLDS,
                available: self.n_splits,
            });
        }
        if n_samples < self.min_samples() {
            return Err(ModelError::InsufficientData {
                required: self.min_samples(),
                available: n_samples,
            });
        }

        let test_size = n_samples / (self.n_splits + 1);
        let folds = (0..self.n_splits)
            .map(|index| {
                let start = n_samples - (self.n_splits - index) * test_size;
                Fold {
                    index,
                    train: 0..start,
                    validation: start..start + test_size,
                }
            })
            .collect();

        Ok(folds)
    }
}
