//! Isotonic probability calibration
//!
//! Fits a non-decreasing map from raw classifier score to observed outcome
//! frequency with the pool-adjacent-violators algorithm.

use super::ModelError;
use serde::{Deserialize, Serialize};

/// Piecewise-linear monotone calibration map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsotonicCalibrator {
    /// Knot positions (distinct raw scores, ascending)
    x: Vec<f64>,
    /// Fitted frequency at each knot
    y: Vec<f64>,
}

/// A run of pooled knots sharing one fitted value
struct Block {
    mean: f64,
    weight: f64,
    len: usize,
}

impl IsotonicCalibrator {
    /// Fit on raw scores and their 0/1 outcomes.
    ///
    /// Equal scores are merged into one knot carrying their mean outcome
    /// before pooling.
    pub fn fit(scores: &[f64], outcomes: &[f64]) -> Result<Self, ModelError> {
        if scores.len() != outcomes.len() {
            return Err(ModelError::LengthMismatch {
                features: scores.len(),
                labels: outcomes.len(),
            });
        }
        if scores.is_empty() {
            return Err(ModelError::EmptyCalibrationSet);
        }

        let mut pairs: Vec<(f64, f64)> = scores
            .iter()
            .copied()
            .zip(outcomes.iter().copied())
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut x: Vec<f64> = Vec::new();
        let mut sums: Vec<f64> = Vec::new();
        let mut weights: Vec<f64> = Vec::new();
        for (score, outcome) in pairs {
            match x.last() {
                Some(&last) if last == score => {
                    if let (Some(s), Some(w)) = (sums.last_mut(), weights.last_mut()) {
                        *s += outcome;
                        *w += 1.0;
                    }
                }
                _ => {
                    x.push(score);
                    sums.push(outcome);
                    weights.push(1.0);
                }
            }
        }

        let mut blocks: Vec<Block> = Vec::with_capacity(x.len());
        for (sum, weight) in sums.into_iter().zip(weights) {
            let mut block = Block {
                mean: sum / weight,
                weight,
                len: 1,
            };
            while let Some(prev) = blocks.last() {
                if prev.mean < block.mean {
                    break;
                }
                let weight = prev.weight + block.weight;
                block = Block {
                    mean: (prev.mean * prev.weight + block.mean * block.weight) / weight,
                    weight,
                    len: prev.len + block.len,
                };
                blocks.pop();
            }
            blocks.push(block);
        }

        let y = blocks
            .iter()
            .flat_map(|b| std::iter::repeat(b.mean).take(b.len))
            .collect();

        Ok(Self { x, y })
    }

    /// Calibrated value for a raw score.
    ///
    /// Linear between knots, clipped to the end values outside the fitted
    /// range. NaN scores map to NaN.
    pub fn predict(&self, score: f64) -> f64 {
        if score.is_nan() {
            return f64::NAN;
        }
        let (Some(&first_x), Some(&last_x)) = (self.x.first(), self.x.last()) else {
            return f64::NAN;
        };
        if score <= first_x {
            return self.y[0];
        }
        if score >= last_x {
            return self.y[self.y.len() - 1];
        }

        // First knot strictly above the score; always in 1..len here
        let hi = self.x.partition_point(|&k| k <= score);
        let lo = hi - 1;
        let t = (score - self.x[lo]) / (self.x[hi] - self.x[lo]);
        self.y[lo] + t * (self.y[hi] - self.y[lo])
    }

    /// Knots present, paired with values, strictly ascending; values are
    /// probabilities
    pub(crate) fn check_structure(&self) -> Result<(), String> {
        if self.x.is_empty() || self.x.len() != self.y.len() {
            return Err(format!(
                "calibrator has {} knots and {} values",
                self.x.len(),
                self.y.len()
            ));
        }
        if !self.x.windows(2).all(|w| w[0] < w[1]) || self.x.iter().any(|v| v.is_nan()) {
            return Err("calibrator knots are not strictly ascending".to_string());
        }
        if !self.y.iter().all(|v| (0.0..=1.0).contains(v)) {
            return Err("calibrator values outside [0, 1]".to_string());
        }
        Ok(())
    }

    /// Number of knots
    pub fn n_knots(&self) -> usize {
        self.x.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotone_input_kept() {
        let cal = IsotonicCalibrator::fit(&[1.0, 2.0, 3.0], &[0.0, 0.0, 1.0]).unwrap();
        assert_eq!(cal.predict(1.0), 0.0);
        assert_eq!(cal.predict(3.0), 1.0);
        assert!((cal.predict(2.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_violators_pooled() {
        let cal = IsotonicCalibrator::fit(&[1.0, 2.0, 3.0, 4.0], &[0.0, 1.0, 0.0, 1.0]).unwrap();

        assert_eq!(cal.predict(1.0), 0.0);
        assert_eq!(cal.predict(2.0), 0.5);
        assert_eq!(cal.predict(3.0), 0.5);
        assert_eq!(cal.predict(4.0), 1.0);
    }

    #[test]
    fn test_backward_pooling() {
        // Last point drags the whole run down to the overall mean
        let cal = IsotonicCalibrator::fit(&[1.0, 2.0, 3.0], &[1.0, 1.0, 0.0]).unwrap();
        for s in [1.0, 2.0, 3.0] {
            assert!((cal.predict(s) - 2.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_ties_averaged() {
        let cal = IsotonicCalibrator::fit(&[0.5, 0.5, 0.5, 0.5], &[1.0, 0.0, 1.0, 1.0]).unwrap();
        assert_eq!(cal.n_knots(), 1);
        assert_eq!(cal.predict(0.5), 0.75);
        assert_eq!(cal.predict(-10.0), 0.75);
    }

    #[test]
    fn test_clipped_outside_range() {
        let cal = IsotonicCalibrator::fit(&[-1.0, 1.0], &[0.0, 1.0]).unwrap();
        assert_eq!(cal.predict(-100.0), 0.0);
        assert_eq!(cal.predict(100.0), 1.0);
        assert_eq!(cal.predict(0.0), 0.5);
    }

    #[test]
    fn test_output_is_monotone() {
        let scores: Vec<f64> = (0..50).map(|i| ((i * 37) % 50) as f64 / 10.0).collect();
        let outcomes: Vec<f64> = (0..50).map(|i| ((i * 7) % 3 == 0) as u8 as f64).collect();
        let cal = IsotonicCalibrator::fit(&scores, &outcomes).unwrap();

        let mut prev = f64::NEG_INFINITY;
        for i in -10..60 {
            let p = cal.predict(i as f64 / 10.0);
            assert!(p >= prev);
            assert!((0.0..=1.0).contains(&p));
            prev = p;
        }
    }

    #[test]
    fn test_structure_check() {
        let cal = IsotonicCalibrator::fit(&[0.0, 1.0, 2.0], &[0.0, 1.0, 1.0]).unwrap();
        assert!(cal.check_structure().is_ok());

        let short = IsotonicCalibrator {
            x: cal.x.clone(),
            y: vec![0.5],
        };
        assert!(short.check_structure().is_err());

        let unsorted = IsotonicCalibrator {
            x: vec![2.0, 1.0],
            y: vec![0.0, 1.0],
        };
        assert!(unsorted.check_structure().is_err());

        let out_of_range = IsotonicCalibrator {
            x: vec![1.0, 2.0],
            y: vec![0.0, 1.5],
        };
        assert!(out_of_range.check_structure().is_err());
    }

    #[test]
    fn test_empty_set_rejected() {
        assert!(matches!(
            IsotonicCalibrator::fit(&[], &[]),
            Err(ModelError::EmptyCalibrationSet)
        ));
    }

    #[test]
    fn test_nan_score_propagates() {
        let cal = IsotonicCalibrator::fit(&[0.0, 1.0], &[0.0, 1.0]).unwrap();
        assert!(cal.predict(f64::NAN).is_nan());
    }
}
