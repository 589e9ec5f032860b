//! CSV match history loader
//!
//! Thin ingestion boundary: checks the header for required columns and
//! decodes rows into [`MatchRecord`]s. Rows are returned in file order;
//! chronological ordering is the rating engine's job.

use super::types::{IngestError, MarketOdds, MatchRecord};
use arrow::array::{Array, Float64Array, StringArray};
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fs::File;
use std::io::Seek;
use std::path::Path;
use std::sync::Arc;

/// Columns every match history file must carry
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "date",
    "home_team",
    "away_team",
    "home_score",
    "away_score",
    "home_odds",
    "draw_odds",
    "away_odds",
];

const NUMERIC_COLUMNS: [&str; 5] = [
    "home_score",
    "away_score",
    "home_odds",
    "draw_odds",
    "away_odds",
];

const BATCH_SIZE: usize = 4096;

/// Load match history from a CSV file with a header row
pub fn load_matches(path: impl AsRef<Path>) -> Result<Vec<MatchRecord>, IngestError> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    let (inferred, _) = Format::default()
        .with_header(true)
        .infer_schema(&mut file, Some(1))?;
    let header: Vec<String> = inferred.fields().iter().map(|f| f.name().clone()).collect();
    validate_columns(&header)?;

    file.rewind()?;
    let reader = ReaderBuilder::new(Arc::new(ingest_schema(&header)))
        .with_header(true)
        .with_batch_size(BATCH_SIZE)
        .build(file)?;

    let mut matches = Vec::new();
    for batch in reader {
        let batch = batch?;
        decode_batch(&batch, &mut matches)?;
    }

    tracing::info!(path = %path.display(), matches = matches.len(), "Loaded match history");
    Ok(matches)
}

/// Fail with every missing required column, sorted by name
pub fn validate_columns(header: &[String]) -> Result<(), IngestError> {
    let mut missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !header.iter().any(|h| h == *required))
        .map(|c| c.to_string())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }
    missing.sort();
    Err(IngestError::MissingColumns(missing))
}

/// Parse a match date. Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DDTHH:MM:SS` and plain `YYYY-MM-DD` (midnight UTC).
pub fn parse_match_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Numeric columns decode as Float64, everything else as text
fn ingest_schema(header: &[String]) -> Schema {
    let fields: Vec<Field> = header
        .iter()
        .map(|name| {
            let data_type = if NUMERIC_COLUMNS.contains(&name.as_str()) {
                DataType::Float64
            } else {
                DataType::Utf8
            };
            Field::new(name.as_str(), data_type, true)
        })
        .collect();
    Schema::new(fields)
}

fn decode_batch(batch: &RecordBatch, out: &mut Vec<MatchRecord>) -> Result<(), IngestError> {
    let dates = text_column(batch, "date")?;
    let home_teams = text_column(batch, "home_team")?;
    let away_teams = text_column(batch, "away_team")?;
    let home_scores = number_column(batch, "home_score")?;
    let away_scores = number_column(batch, "away_score")?;
    let home_odds = number_column(batch, "home_odds")?;
    let draw_odds = number_column(batch, "draw_odds")?;
    let away_odds = number_column(batch, "away_odds")?;

    for i in 0..batch.num_rows() {
        // 1-based data row, header excluded
        let row = out.len() + 1;

        let raw_date = text_cell(dates, i, row, "date")?;
        let date = parse_match_date(raw_date).ok_or_else(|| IngestError::InvalidValue {
            row,
            column: "date".to_string(),
            reason: format!("unrecognised date {raw_date:?}"),
        })?;

        out.push(MatchRecord {
            date,
            home_team: text_cell(home_teams, i, row, "home_team")?.to_string(),
            away_team: text_cell(away_teams, i, row, "away_team")?.to_string(),
            home_score: score_cell(home_scores, i, row, "home_score")?,
            away_score: score_cell(away_scores, i, row, "away_score")?,
            odds: MarketOdds {
                home: number_cell(home_odds, i, row, "home_odds")?,
                draw: number_cell(draw_odds, i, row, "draw_odds")?,
                away: number_cell(away_odds, i, row, "away_odds")?,
            },
        });
    }
    Ok(())
}

fn text_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, IngestError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| IngestError::MissingColumns(vec![name.to_string()]))
}

fn number_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Float64Array, IngestError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<Float64Array>())
        .ok_or_else(|| IngestError::MissingColumns(vec![name.to_string()]))
}

fn text_cell<'a>(
    array: &'a StringArray,
    i: usize,
    row: usize,
    column: &str,
) -> Result<&'a str, IngestError> {
    let value = if array.is_null(i) {
        ""
    } else {
        array.value(i).trim()
    };
    if value.is_empty() {
        return Err(empty_cell(row, column));
    }
    Ok(value)
}

fn number_cell(array: &Float64Array, i: usize, row: usize, column: &str) -> Result<f64, IngestError> {
    if array.is_null(i) {
        return Err(empty_cell(row, column));
    }
    Ok(array.value(i))
}

fn score_cell(array: &Float64Array, i: usize, row: usize, column: &str) -> Result<u32, IngestError> {
    let value = number_cell(array, i, row, column)?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(IngestError::InvalidValue {
            row,
            column: column.to_string(),
            reason: format!("score must be a non-negative whole number, got {value}"),
        });
    }
    Ok(value as u32)
}

fn empty_cell(row: usize, column: &str) -> IngestError {
    IngestError::InvalidValue {
        row,
        column: column.to_string(),
        reason: "empty cell".to_string(),
    }
}
