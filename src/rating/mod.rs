//! Elo rating module
//!
//! Replays chronological match history into pre-match ratings and
//! expected scores

mod elo;
mod engine;

pub use elo::{expected_score, update_rating};
pub use engine::{compute_ratings, replay, RatingEngine, TeamRatings};

use serde::{Deserialize, Serialize};

/// Elo system parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EloParams {
    /// Rating assigned to a team on first appearance
    pub base: f64,
    /// Update step size
    pub k: f64,
}

impl Default for EloParams {
    fn default() -> Self {
        Self {
            base: 1500.0,
            k: 20.0,
        }
    }
}
