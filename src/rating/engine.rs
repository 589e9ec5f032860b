//! Sequential rating engine
//!
//! Ratings are path-dependent, so matches are replayed strictly in date
//! order and each record captures the state *before* the match.

use super::elo::{expected_score, update_rating};
use super::EloParams;
use crate::data::{EnrichedMatchRecord, MatchRecord};
use crate::telemetry::{record_latency, set_gauge, GaugeMetric, LatencyMetric};
use std::collections::HashMap;
use std::time::Instant;

/// Current rating per team. Unseen teams read as the base rating.
#[derive(Debug, Clone)]
pub struct TeamRatings {
    base: f64,
    ratings: HashMap<String, f64>,
}

impl TeamRatings {
    /// Create an empty table where every team starts at `base`
    pub fn new(base: f64) -> Self {
        Self {
            base,
            ratings: HashMap::new(),
        }
    }

    /// Rating for a team, or the base rating if it has not played
    pub fn get(&self, team: &str) -> f64 {
        self.ratings.get(team).copied().unwrap_or(self.base)
    }

    /// Whether the team has appeared in a processed match
    pub fn contains(&self, team: &str) -> bool {
        self.ratings.contains_key(team)
    }

    /// Number of teams seen
    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    /// Teams sorted by rating, highest first; ties by name
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut table: Vec<(&str, f64)> = self
            .ratings
            .iter()
            .map(|(team, rating)| (team.as_str(), *rating))
            .collect();
        table.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        table
    }

    fn set(&mut self, team: &str, rating: f64) {
        self.ratings.insert(team.to_string(), rating);
    }
}

/// Replays match history and maintains per-team ratings
#[derive(Debug, Clone)]
pub struct RatingEngine {
    params: EloParams,
    ratings: TeamRatings,
}

impl RatingEngine {
    /// Create a new engine with every team at the base rating
    pub fn new(params: EloParams) -> Self {
        Self {
            params,
            ratings: TeamRatings::new(params.base),
        }
    }

    /// Record the pre-match state for one match, then apply its result.
    ///
    /// Callers must feed matches in chronological order.
    pub fn process(&mut self, record: &MatchRecord) -> EnrichedMatchRecord {
        let home_elo = self.ratings.get(&record.home_team);
        let away_elo = self.ratings.get(&record.away_team);

        let expected_home = expected_score(home_elo, away_elo);
        let expected_away = 1.0 - expected_home;
        let outcome = record.outcome();

        let k = self.params.k;
        self.ratings.set(
            &record.home_team,
            update_rating(home_elo, expected_home, outcome.home_score(), k),
        );
        self.ratings.set(
            &record.away_team,
            update_rating(away_elo, expected_away, outcome.away_score(), k),
        );

        EnrichedMatchRecord {
            record: record.clone(),
            home_elo,
            away_elo,
            expected_home,
            expected_away,
            outcome,
        }
    }

    /// Current ratings
    pub fn ratings(&self) -> &TeamRatings {
        &self.ratings
    }

    /// Consume the engine, keeping the final ratings
    pub fn into_ratings(self) -> TeamRatings {
        self.ratings
    }

    pub fn params(&self) -> EloParams {
        self.params
    }
}

/// Sort matches by date (stable, so same-day matches keep input order)
/// and replay them through a fresh engine.
pub fn compute_ratings(matches: &[MatchRecord], params: EloParams) -> Vec<EnrichedMatchRecord> {
    replay(matches, params).0
}

/// Like [`compute_ratings`], also returning the ratings after the last match
pub fn replay(
    matches: &[MatchRecord],
    params: EloParams,
) -> (Vec<EnrichedMatchRecord>, TeamRatings) {
    let started = Instant::now();

    let mut ordered: Vec<&MatchRecord> = matches.iter().collect();
    ordered.sort_by_key(|m| m.date);

    let mut engine = RatingEngine::new(params);
    let enriched: Vec<EnrichedMatchRecord> =
        ordered.into_iter().map(|m| engine.process(m)).collect();
    let ratings = engine.into_ratings();

    record_latency(LatencyMetric::RatingReplay, started.elapsed());
    set_gauge(GaugeMetric::TeamsRated, ratings.len() as f64);
    tracing::debug!(
        matches = enriched.len(),
        teams = ratings.len(),
        k = params.k,
        base = params.base,
        "Replayed rating history"
    );

    (enriched, ratings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MarketOdds, Outcome};
    use chrono::{DateTime, Utc};

    fn make_match(date: &str, home: &str, away: &str, score: (u32, u32)) -> MatchRecord {
        MatchRecord {
            date: DateTime::parse_from_rfc3339(&format!("{date}T00:00:00Z"))
                .unwrap()
                .with_timezone(&Utc),
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_score: score.0,
            away_score: score.1,
            odds: MarketOdds::new(1.8, 3.2, 4.5),
        }
    }

    #[test]
    fn test_single_match_scenario() {
        let matches = vec![make_match("2020-01-01", "A", "B", (2, 1))];
        let (enriched, ratings) = replay(&matches, EloParams::default());

        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].expected_home, 0.5);
        assert_eq!(enriched[0].expected_away, 0.5);
        assert_eq!(enriched[0].home_elo, 1500.0);
        assert_eq!(enriched[0].away_elo, 1500.0);
        assert_eq!(enriched[0].outcome, Outcome::HomeWin);

        let a = ratings.get("A");
        let b = ratings.get("B");
        assert!(a > 1500.0);
        assert!(b < 1500.0);
        assert_eq!(a - 1500.0, -(b - 1500.0));
        assert_eq!(a, 1510.0);
    }

    #[test]
    fn test_output_holds_pre_match_ratings() {
        let matches = vec![
            make_match("2020-01-01", "A", "B", (2, 1)),
            make_match("2020-01-08", "A", "C", (0, 1)),
        ];
        let enriched = compute_ratings(&matches, EloParams::default());

        // A won its first match, so enters the second at 1510
        assert_eq!(enriched[1].home_elo, 1510.0);
        assert_eq!(enriched[1].away_elo, 1500.0);
        assert!(enriched[1].expected_home > 0.5);
    }

    #[test]
    fn test_matches_sorted_by_date() {
        let matches = vec![
            make_match("2020-02-01", "A", "C", (1, 0)),
            make_match("2020-01-01", "A", "B", (3, 0)),
        ];
        let enriched = compute_ratings(&matches, EloParams::default());

        assert_eq!(enriched[0].record.away_team, "B");
        assert_eq!(enriched[0].home_elo, 1500.0);
        assert_eq!(enriched[1].record.away_team, "C");
        assert_eq!(enriched[1].home_elo, 1510.0);
    }

    #[test]
    fn test_same_day_keeps_input_order() {
        let matches = vec![
            make_match("2020-01-01", "A", "B", (1, 0)),
            make_match("2020-01-01", "B", "A", (1, 0)),
        ];
        let enriched = compute_ratings(&matches, EloParams::default());

        assert_eq!(enriched[0].record.home_team, "A");
        assert_eq!(enriched[1].record.home_team, "B");
        assert_eq!(enriched[1].home_elo, 1490.0);
    }

    #[test]
    fn test_draw_between_equals_leaves_ratings() {
        let matches = vec![make_match("2020-01-01", "A", "B", (1, 1))];
        let (enriched, ratings) = replay(&matches, EloParams::default());

        assert_eq!(enriched[0].outcome, Outcome::Draw);
        assert_eq!(ratings.get("A"), 1500.0);
        assert_eq!(ratings.get("B"), 1500.0);
    }

    #[test]
    fn test_updates_are_zero_sum() {
        let matches = vec![
            make_match("2020-01-01", "A", "B", (2, 0)),
            make_match("2020-01-02", "C", "A", (1, 1)),
            make_match("2020-01-03", "B", "C", (0, 4)),
            make_match("2020-01-04", "A", "B", (0, 1)),
        ];
        let params = EloParams { base: 1500.0, k: 32.0 };
        let mut engine = RatingEngine::new(params);

        for m in &matches {
            let record = engine.process(m);
            let home_delta = engine.ratings().get(&m.home_team) - record.home_elo;
            let away_delta = engine.ratings().get(&m.away_team) - record.away_elo;
            assert!((home_delta + away_delta).abs() < 1e-9);
        }

        let total: f64 = ["A", "B", "C"].iter().map(|t| engine.ratings().get(t)).sum();
        assert!((total - 4500.0).abs() < 1e-9);
    }

    #[test]
    fn test_replay_is_deterministic() {
        let matches = vec![
            make_match("2020-01-03", "B", "C", (0, 4)),
            make_match("2020-01-01", "A", "B", (2, 0)),
            make_match("2020-01-02", "C", "A", (1, 1)),
        ];
        let first = compute_ratings(&matches, EloParams::default());
        let second = compute_ratings(&matches, EloParams::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_base_rating() {
        let params = EloParams { base: 1000.0, k: 20.0 };
        let (enriched, ratings) = replay(&[make_match("2020-01-01", "A", "B", (0, 2))], params);

        assert_eq!(enriched[0].home_elo, 1000.0);
        assert_eq!(ratings.get("B"), 1010.0);
        assert_eq!(ratings.get("never-played"), 1000.0);
        assert!(!ratings.contains("never-played"));
    }

    #[test]
    fn test_ranked_table() {
        let matches = vec![
            make_match("2020-01-01", "A", "B", (2, 0)),
            make_match("2020-01-02", "C", "B", (2, 0)),
        ];
        let (_, ratings) = replay(&matches, EloParams::default());
        let table = ratings.ranked();

        assert_eq!(table.len(), 3);
        assert_eq!(table.last().unwrap().0, "B");
        assert!(table[0].1 >= table[1].1);
    }
}
