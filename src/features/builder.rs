//! Feature builder
//!
//! No validation happens here: non-positive odds must be rejected before
//! they reach these functions, and NaN inputs flow through to the output.

use super::FeatureVector;
use crate::data::{EnrichedMatchRecord, MarketOdds};
use serde::{Deserialize, Serialize};

/// Market probabilities with the bookmaker margin removed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpliedProbabilities {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
    /// Sum of the raw inverted odds; above 1.0 by the bookmaker's margin
    pub overround: f64,
}

/// Feature vector paired with its training target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledFeatures {
    pub features: FeatureVector,
    /// True when the home side won
    pub target_home_win: bool,
}

/// Invert each price, then scale the triple to sum to one
pub fn implied_probabilities(odds: MarketOdds) -> ImpliedProbabilities {
    let home = 1.0 / odds.home;
    let draw = 1.0 / odds.draw;
    let away = 1.0 / odds.away;
    let overround = home + draw + away;

    ImpliedProbabilities {
        home: home / overround,
        draw: draw / overround,
        away: away / overround,
        overround,
    }
}

/// Feature vector for a live prediction query
pub fn build_query_vector(home_elo: f64, away_elo: f64, odds: MarketOdds) -> FeatureVector {
    let implied = implied_probabilities(odds);
    FeatureVector {
        elo_diff: home_elo - away_elo,
        home_implied: implied.home,
        draw_implied: implied.draw,
        away_implied: implied.away,
    }
}

/// Training rows in the same (chronological) order as the input
pub fn engineer_features(enriched: &[EnrichedMatchRecord]) -> Vec<LabeledFeatures> {
    enriched
        .iter()
        .map(|m| LabeledFeatures {
            features: build_query_vector(m.home_elo, m.away_elo, m.record.odds),
            target_home_win: m.result_home_win(),
        })
        .collect()
}
