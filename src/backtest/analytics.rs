//! Backtest analytics and reporting

use serde::Serialize;

/// Probabilistic scores over a set of binary predictions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreMetrics {
    pub samples: usize,
    /// Mean squared error of the probability
    pub brier: f64,
    /// Mean negative log-likelihood, probabilities clamped away from 0 and 1
    pub log_loss: f64,
    /// Share of matches where `p >= 0.5` agrees with the result
    pub accuracy: f64,
}

/// One row of the reliability table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationBin {
    pub bucket_start: f64,
    pub bucket_end: f64,
    pub count: usize,
    pub avg_pred: f64,
    pub actual_rate: f64,
}

const LOG_LOSS_EPS: f64 = 1e-15;

/// Score probabilities of the positive class against labels
pub fn evaluate_binary(probs: &[f64], labels: &[bool]) -> ScoreMetrics {
    if probs.is_empty() || probs.len() != labels.len() {
        return ScoreMetrics::default();
    }

    let mut brier_sum = 0.0_f64;
    let mut log_loss_sum = 0.0_f64;
    let mut correct = 0usize;

    for (&p, &label) in probs.iter().zip(labels) {
        let y = if label { 1.0 } else { 0.0 };
        brier_sum += (p - y).powi(2);

        let clamped = p.clamp(LOG_LOSS_EPS, 1.0 - LOG_LOSS_EPS);
        log_loss_sum -= if label {
            clamped.ln()
        } else {
            (1.0 - clamped).ln()
        };

        if (p >= 0.5) == label {
            correct += 1;
        }
    }

    let n = probs.len() as f64;
    ScoreMetrics {
        samples: probs.len(),
        brier: brier_sum / n,
        log_loss: log_loss_sum / n,
        accuracy: correct as f64 / n,
    }
}

/// Equal-width reliability bins over `[0, 1]`
pub fn calibration_bins(probs: &[f64], labels: &[bool], bins: usize) -> Vec<CalibrationBin> {
    let bins = bins.max(2);
    let mut counts = vec![0usize; bins];
    let mut pred_sum = vec![0.0_f64; bins];
    let mut actual_sum = vec![0.0_f64; bins];

    for (&p, &label) in probs.iter().zip(labels) {
        if p.is_nan() {
            continue;
        }
        let p = p.clamp(0.0, 1.0);
        let idx = ((p * bins as f64).floor() as usize).min(bins - 1);
        counts[idx] += 1;
        pred_sum[idx] += p;
        if label {
            actual_sum[idx] += 1.0;
        }
    }

    (0..bins)
        .map(|i| {
            let count = counts[i];
            let (avg_pred, actual_rate) = if count > 0 {
                (pred_sum[i] / count as f64, actual_sum[i] / count as f64)
            } else {
                (0.0, 0.0)
            };
            CalibrationBin {
                bucket_start: i as f64 / bins as f64,
                bucket_end: (i + 1) as f64 / bins as f64,
                count,
                avg_pred,
                actual_rate,
            }
        })
        .collect()
}

/// Summary statistics from backtest
#[derive(Debug, Clone, Default, Serialize)]
pub struct BacktestSummary {
    /// Matches the model was fitted on
    pub train_matches: usize,
    /// Most recent matches held out for scoring
    pub holdout_matches: usize,
    /// Home-win rate in the hold-out window
    pub holdout_home_win_rate: f64,
    /// Calibrated model
    pub model: ScoreMetrics,
    /// Overround-free market home probability
    pub market: ScoreMetrics,
}

/// Complete backtest results
#[derive(Debug, Clone, Default, Serialize)]
pub struct BacktestResult {
    pub summary: BacktestSummary,
    /// Reliability of the model's hold-out probabilities
    pub calibration: Vec<CalibrationBin>,
}

impl BacktestSummary {
    /// Brier score improvement over the market; positive favours the model
    pub fn brier_skill(&self) -> f64 {
        self.market.brier - self.model.brier
    }

    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        format!(
            r#"
══════════════════════════════════════════════════════
               BACKTEST RESULTS
══════════════════════════════════════════════════════

SAMPLE
───────────────────────────────────────────────────────
Train Matches:    {}
Hold-out Matches: {}
Home Win Rate:    {:.1}%

SCORES               MODEL      MARKET
───────────────────────────────────────────────────────
Brier Score:      {:>8.4}    {:>8.4}
Log Loss:         {:>8.4}    {:>8.4}
Accuracy:         {:>7.1}%    {:>7.1}%

Brier Skill:      {:+.4}
══════════════════════════════════════════════════════
"#,
            self.train_matches,
            self.holdout_matches,
            self.holdout_home_win_rate * 100.0,
            self.model.brier,
            self.market.brier,
            self.model.log_loss,
            self.market.log_loss,
            self.model.accuracy * 100.0,
            self.market.accuracy * 100.0,
            self.brier_skill(),
        )
    }
}

impl BacktestResult {
    /// Summary table followed by the non-empty reliability bins
    pub fn format_table(&self) -> String {
        let mut out = self.summary.format_table();
        out.push_str("\nRELIABILITY          PREDICTED  ACTUAL   COUNT\n");
        out.push_str("───────────────────────────────────────────────────────\n");
        for bin in self.calibration.iter().filter(|b| b.count > 0) {
            out.push_str(&format!(
                "{:>4.0}% - {:>3.0}%         {:>6.1}%  {:>6.1}%  {:>5}\n",
                bin.bucket_start * 100.0,
                bin.bucket_end * 100.0,
                bin.avg_pred * 100.0,
                bin.actual_rate * 100.0,
                bin.count,
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions() {
        let m = evaluate_binary(&[1.0, 0.0, 1.0], &[true, false, true]);
        assert_eq!(m.samples, 3);
        assert_eq!(m.brier, 0.0);
        assert!(m.log_loss < 1e-12);
        assert_eq!(m.accuracy, 1.0);
    }

    #[test]
    fn test_coin_flip_scores() {
        let m = evaluate_binary(&[0.5, 0.5], &[true, false]);
        assert!((m.brier - 0.25).abs() < 1e-12);
        assert!((m.log_loss - std::f64::consts::LN_2).abs() < 1e-12);
    }

    #[test]
    fn test_confident_miss_is_finite() {
        let m = evaluate_binary(&[0.0], &[true]);
        assert!(m.log_loss.is_finite());
        assert_eq!(m.accuracy, 0.0);
    }

    #[test]
    fn test_empty_or_mismatched_input() {
        assert_eq!(evaluate_binary(&[], &[]), ScoreMetrics::default());
        assert_eq!(evaluate_binary(&[0.3], &[]), ScoreMetrics::default());
    }

    #[test]
    fn test_calibration_bins() {
        let bins = calibration_bins(&[0.05, 0.15, 0.12, 1.0], &[false, true, false, true], 10);

        assert_eq!(bins.len(), 10);
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[1].count, 2);
        assert!((bins[1].actual_rate - 0.5).abs() < 1e-12);
        // p = 1.0 falls into the last bucket
        assert_eq!(bins[9].count, 1);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 4);
    }

    #[test]
    fn test_format_table() {
        let result = BacktestResult {
            summary: BacktestSummary {
                train_matches: 80,
                holdout_matches: 20,
                holdout_home_win_rate: 0.45,
                model: ScoreMetrics {
                    samples: 20,
                    brier: 0.21,
                    log_loss: 0.61,
                    accuracy: 0.65,
                },
                market: ScoreMetrics {
                    samples: 20,
                    brier: 0.23,
                    log_loss: 0.66,
                    accuracy: 0.6,
                },
            },
            calibration: calibration_bins(&[0.42, 0.61], &[false, true], 10),
        };

        let table = result.format_table();
        assert!(table.contains("BACKTEST RESULTS"));
        assert!(table.contains("Hold-out Matches: 20"));
        assert!(table.contains("+0.0200"));
        assert!(table.contains("RELIABILITY"));
    }
}
