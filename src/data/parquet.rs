//! Parquet export of enriched rating history

use super::types::{EnrichedMatchRecord, MarketOdds, MatchRecord, Outcome};
use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, StringArray, TimestampMicrosecondArray, UInt32Array,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Enriched match schema: the match record, pre-match ratings and
/// expectations, and the one-hot outcome
pub fn enriched_match_schema() -> Schema {
    Schema::new(vec![
        Field::new(
            "date",
            DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
            false,
        ),
        Field::new("home_team", DataType::Utf8, false),
        Field::new("away_team", DataType::Utf8, false),
        Field::new("home_score", DataType::UInt32, false),
        Field::new("away_score", DataType::UInt32, false),
        Field::new("home_odds", DataType::Float64, false),
        Field::new("draw_odds", DataType::Float64, false),
        Field::new("away_odds", DataType::Float64, false),
        Field::new("home_elo", DataType::Float64, false),
        Field::new("away_elo", DataType::Float64, false),
        Field::new("expected_home", DataType::Float64, false),
        Field::new("expected_away", DataType::Float64, false),
        Field::new("result_home_win", DataType::Boolean, false),
        Field::new("result_draw", DataType::Boolean, false),
        Field::new("result_away_win", DataType::Boolean, false),
    ])
}

/// Parquet file writer
pub struct ParquetWriter {
    output_dir: PathBuf,
}

impl ParquetWriter {
    /// Create a new Parquet writer
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Generate file path for a given timestamp and prefix
    pub fn file_path(&self, prefix: &str, timestamp: DateTime<Utc>) -> PathBuf {
        let filename = format!("{}_{}.parquet", prefix, timestamp.format("%Y%m%d_%H%M%S"));
        self.output_dir.join(filename)
    }

    /// Write enriched match records to a Parquet file, creating its parent
    /// directory. Returns the number of rows written; empty input writes no
    /// file.
    pub fn write_enriched_matches(
        &self,
        path: &Path,
        records: &[EnrichedMatchRecord],
    ) -> anyhow::Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let schema = Arc::new(enriched_match_schema());
        let file = File::create(path)?;

        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        let dates: Vec<i64> = records
            .iter()
            .map(|r| r.record.date.timestamp_micros())
            .collect();
        let home_teams: Vec<&str> = records.iter().map(|r| r.record.home_team.as_str()).collect();
        let away_teams: Vec<&str> = records.iter().map(|r| r.record.away_team.as_str()).collect();

        let column_f64 = |f: fn(&EnrichedMatchRecord) -> f64| -> ArrayRef {
            Arc::new(Float64Array::from(records.iter().map(f).collect::<Vec<_>>()))
        };
        let column_u32 = |f: fn(&EnrichedMatchRecord) -> u32| -> ArrayRef {
            Arc::new(UInt32Array::from(records.iter().map(f).collect::<Vec<_>>()))
        };
        let column_bool = |f: fn(&EnrichedMatchRecord) -> bool| -> ArrayRef {
            Arc::new(BooleanArray::from(records.iter().map(f).collect::<Vec<_>>()))
        };

        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(TimestampMicrosecondArray::from(dates).with_timezone("UTC")) as ArrayRef,
                Arc::new(StringArray::from(home_teams)) as ArrayRef,
                Arc::new(StringArray::from(away_teams)) as ArrayRef,
                column_u32(|r| r.record.home_score),
                column_u32(|r| r.record.away_score),
                column_f64(|r| r.record.odds.home),
                column_f64(|r| r.record.odds.draw),
                column_f64(|r| r.record.odds.away),
                column_f64(|r| r.home_elo),
                column_f64(|r| r.away_elo),
                column_f64(|r| r.expected_home),
                column_f64(|r| r.expected_away),
                column_bool(EnrichedMatchRecord::result_home_win),
                column_bool(EnrichedMatchRecord::result_draw),
                column_bool(EnrichedMatchRecord::result_away_win),
            ],
        )?;

        writer.write(&batch)?;
        writer.close()?;

        tracing::debug!(path = ?path, count = records.len(), "Wrote enriched matches to Parquet");

        Ok(records.len())
    }
}

/// Reader for Parquet files
pub struct ParquetReader {
    path: PathBuf,
}

impl ParquetReader {
    /// Create a new reader for a Parquet file
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read enriched match records from a Parquet file
    pub fn read_enriched_matches(&self) -> anyhow::Result<Vec<EnrichedMatchRecord>> {
        let file = File::open(&self.path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let reader = builder.build()?;

        let mut records = Vec::new();

        for batch_result in reader {
            let batch = batch_result?;

            let dates = column::<TimestampMicrosecondArray>(&batch, "date")?;
            let home_teams = column::<StringArray>(&batch, "home_team")?;
            let away_teams = column::<StringArray>(&batch, "away_team")?;
            let home_scores = column::<UInt32Array>(&batch, "home_score")?;
            let away_scores = column::<UInt32Array>(&batch, "away_score")?;
            let home_odds = column::<Float64Array>(&batch, "home_odds")?;
            let draw_odds = column::<Float64Array>(&batch, "draw_odds")?;
            let away_odds = column::<Float64Array>(&batch, "away_odds")?;
            let home_elo = column::<Float64Array>(&batch, "home_elo")?;
            let away_elo = column::<Float64Array>(&batch, "away_elo")?;
            let expected_home = column::<Float64Array>(&batch, "expected_home")?;
            let expected_away = column::<Float64Array>(&batch, "expected_away")?;
            let home_win = column::<BooleanArray>(&batch, "result_home_win")?;
            let draw = column::<BooleanArray>(&batch, "result_draw")?;

            for i in 0..batch.num_rows() {
                let date = DateTime::from_timestamp_micros(dates.value(i))
                    .ok_or_else(|| anyhow::anyhow!("Invalid date"))?;
                let outcome = if home_win.value(i) {
                    Outcome::HomeWin
                } else if draw.value(i) {
                    Outcome::Draw
                } else {
                    Outcome::AwayWin
                };

                records.push(EnrichedMatchRecord {
                    record: MatchRecord {
                        date,
                        home_team: home_teams.value(i).to_string(),
                        away_team: away_teams.value(i).to_string(),
                        home_score: home_scores.value(i),
                        away_score: away_scores.value(i),
                        odds: MarketOdds::new(
                            home_odds.value(i),
                            draw_odds.value(i),
                            away_odds.value(i),
                        ),
                    },
                    home_elo: home_elo.value(i),
                    away_elo: away_elo.value(i),
                    expected_home: expected_home.value(i),
                    expected_away: expected_away.value(i),
                    outcome,
                });
            }
        }

        Ok(records)
    }

    /// Get the file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> anyhow::Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| anyhow::anyhow!("Invalid {} column", name))
}
