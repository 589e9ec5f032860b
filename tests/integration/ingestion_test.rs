//! Ingestion boundary and rating history export tests

use outcome_predictor::data::{load_matches, IngestError, ParquetReader, ParquetWriter};
use outcome_predictor::rating::{compute_ratings, EloParams};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const HEADER: &str = "date,home_team,away_team,home_score,away_score,home_odds,draw_odds,away_odds";

fn write_csv(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("matches.csv");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_sample_history_loads() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/sample_matches.csv");
    let matches = load_matches(path).unwrap();

    assert_eq!(matches.len(), 240);
    assert!(matches.iter().all(|m| m.odds.home > 1.0));
}

#[test]
fn test_missing_columns_listed() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "date,home_team,away_team,home_score,away_score\n2020-01-01,A,B,1,0\n");

    match load_matches(&path) {
        Err(IngestError::MissingColumns(cols)) => {
            assert_eq!(cols, vec!["away_odds", "draw_odds", "home_odds"]);
        }
        other => panic!("expected MissingColumns, got {other:?}"),
    }
}

#[test]
fn test_bad_date_reports_row() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        &format!("{HEADER}\n2020-01-01,A,B,1,0,1.8,3.2,4.5\nlast tuesday,B,A,0,0,2.0,3.0,3.5\n"),
    );

    match load_matches(&path) {
        Err(IngestError::InvalidValue { row, column, .. }) => {
            assert_eq!(row, 2);
            assert_eq!(column, "date");
        }
        other => panic!("expected InvalidValue, got {other:?}"),
    }
}

#[test]
fn test_negative_score_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, &format!("{HEADER}\n2020-01-01,A,B,-1,0,1.8,3.2,4.5\n"));

    assert!(matches!(
        load_matches(&path),
        Err(IngestError::InvalidValue { .. })
    ));
}

#[test]
fn test_missing_file() {
    assert!(matches!(
        load_matches("/nonexistent/matches.csv"),
        Err(IngestError::Io(_))
    ));
}

#[test]
fn test_rating_history_export() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        &format!(
            "{HEADER}\n2020-01-08,A,C,0,1,2.1,3.3,3.4\n2020-01-01,A,B,2,1,1.8,3.2,4.5\n"
        ),
    );
    let enriched = compute_ratings(&load_matches(&path).unwrap(), EloParams::default());

    let writer = ParquetWriter::new(dir.path().join("history"));
    let out = writer.file_path("ratings", chrono::Utc::now());
    writer.write_enriched_matches(&out, &enriched).unwrap();

    let restored = ParquetReader::new(out).read_enriched_matches().unwrap();
    assert_eq!(restored, enriched);
    // Replay reorders by date, so the Jan 1 match comes first
    assert_eq!(restored[0].record.away_team, "B");
    assert_eq!(restored[1].home_elo, 1510.0);
}
