//! End-to-end pipeline tests: ratings, features, fit, persist, serve

use chrono::{Duration, TimeZone, Utc};
use outcome_predictor::config::ModelConfig;
use outcome_predictor::data::{load_matches, MarketOdds, MatchRecord};
use outcome_predictor::features::{build_query_vector, engineer_features, FEATURE_NAMES};
use outcome_predictor::model::{CalibratedModel, ModelError, OutcomeModel, WinProbabilityModel};
use outcome_predictor::rating::{replay, EloParams};
use outcome_predictor::service::{predict, PredictionRequest, PredictionService};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

fn sample_csv() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/sample_matches.csv")
}

fn fast_config() -> ModelConfig {
    ModelConfig {
        n_estimators: 30,
        ..ModelConfig::default()
    }
}

fn trained_model() -> (OutcomeModel, outcome_predictor::rating::TeamRatings) {
    let matches = load_matches(sample_csv()).unwrap();
    let (enriched, ratings) = replay(&matches, EloParams::default());
    let samples = engineer_features(&enriched);

    let mut model = OutcomeModel::new(fast_config());
    model.fit(&samples).unwrap();
    (model, ratings)
}

#[test]
fn test_train_and_predict_sample_history() {
    let (model, ratings) = trained_model();

    let home = ratings.get("Man City");
    let away = ratings.get("Everton");
    let prediction = predict(&model, home, away, MarketOdds::new(1.45, 4.6, 7.5)).unwrap();

    assert!((0.0..=1.0).contains(&prediction.probability));
    assert_eq!(prediction.features.elo_diff, home - away);
    assert_eq!(ratings.len(), 16);
}

#[test]
fn test_predictions_bounded_over_feature_grid() {
    let (model, _) = trained_model();

    for diff in [-600.0, -250.0, -40.0, 0.0, 40.0, 250.0, 600.0] {
        for odds in [(1.2, 6.0, 12.0), (2.6, 3.2, 2.8), (9.0, 5.5, 1.3)] {
            let features =
                build_query_vector(1500.0 + diff, 1500.0, MarketOdds::new(odds.0, odds.1, odds.2));
            let p = model.predict_probability(&features).unwrap();
            assert!((0.0..=1.0).contains(&p), "{p} for {diff} {odds:?}");
        }
    }
}

#[test]
fn test_saved_model_serves_same_probabilities() {
    let (model, _) = trained_model();
    let fitted = model.fitted().unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("models/ensemble_latest.json");
    fitted.save(&path).unwrap();
    let loaded = CalibratedModel::load(&path).unwrap();

    assert_eq!(loaded.metadata().feature_names, FEATURE_NAMES.to_vec());
    assert_eq!(loaded.n_members(), 5);

    let request = PredictionRequest {
        home_elo: 1580.0,
        away_elo: 1510.0,
        home_odds: 2.05,
        draw_odds: 3.4,
        away_odds: 3.9,
    };
    let before = PredictionService::new(fitted).handle(&request).unwrap();
    let after = PredictionService::new(Arc::new(loaded))
        .handle(&request)
        .unwrap();

    assert!(
        (before.predicted_home_win_probability - after.predicted_home_win_probability).abs()
            < 1e-9
    );
    assert_eq!(before.explanation, after.explanation);
}

#[test]
fn test_service_shared_across_threads() {
    let (model, _) = trained_model();
    let service = PredictionService::new(model.fitted().unwrap());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let service = service.clone();
            std::thread::spawn(move || {
                service
                    .handle(&PredictionRequest {
                        home_elo: 1500.0 + i as f64 * 25.0,
                        away_elo: 1500.0,
                        home_odds: 2.2,
                        draw_odds: 3.3,
                        away_odds: 3.4,
                    })
                    .map(|r| r.predicted_home_win_probability)
            })
        })
        .collect();

    for handle in handles {
        let p = handle.join().unwrap().unwrap();
        assert!((0.0..=1.0).contains(&p));
    }
}

#[test]
fn test_four_matches_cannot_fill_five_folds() {
    let start = Utc.with_ymd_and_hms(2023, 1, 1, 15, 0, 0).unwrap();
    let matches: Vec<MatchRecord> = (0..4)
        .map(|i| MatchRecord {
            date: start + Duration::days(i),
            home_team: format!("Home {i}"),
            away_team: format!("Away {i}"),
            home_score: (i % 2) as u32 + 1,
            away_score: 1,
            odds: MarketOdds::new(2.0, 3.4, 3.8),
        })
        .collect();

    let (enriched, _) = replay(&matches, EloParams::default());
    let samples = engineer_features(&enriched);
    let mut model = OutcomeModel::new(ModelConfig::default());

    let err = model.fit(&samples).unwrap_err();
    assert!(matches!(
        err,
        ModelError::InsufficientData {
            required: 6,
            available: 4
        }
    ));
}
