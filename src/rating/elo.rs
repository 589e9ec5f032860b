//! Elo expected-score and update rules

/// Expected score for a side rated `rating` against `opponent`:
/// `1 / (1 + 10^((opponent - rating) / 400))`
pub fn expected_score(rating: f64, opponent: f64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((opponent - rating) / 400.0))
}

/// Rating after a match: `old + k * (actual - expected)`
pub fn update_rating(old: f64, expected: f64, actual: f64, k: f64) -> f64 {
    old + k * (actual - expected)
}
