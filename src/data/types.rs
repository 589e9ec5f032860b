//! Match data types

use arrow::error::ArrowError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decimal bookmaker odds for the three match outcomes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketOdds {
    /// Odds on a home win
    pub home: f64,
    /// Odds on a draw
    pub draw: f64,
    /// Odds on an away win
    pub away: f64,
}

impl MarketOdds {
    /// Create a new odds triple
    pub fn new(home: f64, draw: f64, away: f64) -> Self {
        Self { home, draw, away }
    }
}

/// Final result of a match from the home side's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    HomeWin,
    Draw,
    AwayWin,
}

impl Outcome {
    /// Classify a final score. Equal scores are a draw.
    pub fn from_score(home_score: u32, away_score: u32) -> Self {
        if home_score > away_score {
            Outcome::HomeWin
        } else if home_score < away_score {
            Outcome::AwayWin
        } else {
            Outcome::Draw
        }
    }

    /// Actual Elo score for the home side (1 / 0.5 / 0)
    pub fn home_score(&self) -> f64 {
        match self {
            Outcome::HomeWin => 1.0,
            Outcome::Draw => 0.5,
            Outcome::AwayWin => 0.0,
        }
    }

    /// Actual Elo score for the away side
    pub fn away_score(&self) -> f64 {
        1.0 - self.home_score()
    }
}

/// A finished match as supplied by ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Kick-off time; the chronological ordering key
    pub date: DateTime<Utc>,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    /// Pre-match bookmaker odds
    pub odds: MarketOdds,
}

impl MatchRecord {
    /// Outcome of this match
    pub fn outcome(&self) -> Outcome {
        Outcome::from_score(self.home_score, self.away_score)
    }
}

/// A match annotated with the rating state that preceded it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedMatchRecord {
    pub record: MatchRecord,
    /// Home rating before this match
    pub home_elo: f64,
    /// Away rating before this match
    pub away_elo: f64,
    /// Pre-match expected score for the home side
    pub expected_home: f64,
    /// Pre-match expected score for the away side (`1 - expected_home`)
    pub expected_away: f64,
    pub outcome: Outcome,
}

impl EnrichedMatchRecord {
    pub fn result_home_win(&self) -> bool {
        self.outcome == Outcome::HomeWin
    }

    pub fn result_draw(&self) -> bool {
        self.outcome == Outcome::Draw
    }

    pub fn result_away_win(&self) -> bool {
        self.outcome == Outcome::AwayWin
    }
}

/// Errors raised while loading match history
#[derive(Debug, Error)]
pub enum IngestError {
    /// One or more required columns are absent from the header
    #[error("Missing columns in data: {0:?}")]
    MissingColumns(Vec<String>),
    /// A cell could not be turned into a field value
    #[error("Invalid value in row {row}, column {column}: {reason}")]
    InvalidValue {
        row: usize,
        column: String,
        reason: String,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV decode error: {0}")]
    Arrow(#[from] ArrowError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_score() {
        assert_eq!(Outcome::from_score(2, 1), Outcome::HomeWin);
        assert_eq!(Outcome::from_score(0, 3), Outcome::AwayWin);
        assert_eq!(Outcome::from_score(1, 1), Outcome::Draw);
    }

    #[test]
    fn test_outcome_scores_sum_to_one() {
        for outcome in [Outcome::HomeWin, Outcome::Draw, Outcome::AwayWin] {
            assert_eq!(outcome.home_score() + outcome.away_score(), 1.0);
        }
        assert_eq!(Outcome::Draw.home_score(), 0.5);
    }

    #[test]
    fn test_missing_columns_message() {
        let err = IngestError::MissingColumns(vec!["draw_odds".to_string()]);
        assert!(err.to_string().contains("draw_odds"));
    }
}
