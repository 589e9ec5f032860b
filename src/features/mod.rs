//! Feature engineering module
//!
//! Turns enriched match history or a live query into the fixed
//! four-feature schema. Training and serving share the same
//! normalisation code path.

mod builder;

pub use builder::{
    build_query_vector, engineer_features, implied_probabilities, ImpliedProbabilities,
    LabeledFeatures,
};

use serde::{Deserialize, Serialize};

/// Number of model features
pub const FEATURE_COUNT: usize = 4;

/// Feature names in model input order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["elo_diff", "home_implied", "draw_implied", "away_implied"];

/// Bumped whenever the feature set or its order changes
pub const FEATURE_SCHEMA_VERSION: u32 = 1;

/// Model input for one match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Home rating minus away rating
    pub elo_diff: f64,
    /// Overround-free market probability of a home win
    pub home_implied: f64,
    /// Overround-free market probability of a draw
    pub draw_implied: f64,
    /// Overround-free market probability of an away win
    pub away_implied: f64,
}

impl FeatureVector {
    /// Values in [`FEATURE_NAMES`] order
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.elo_diff,
            self.home_implied,
            self.draw_implied,
            self.away_implied,
        ]
    }
}
