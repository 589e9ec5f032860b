//! Match data module
//!
//! Match records, the CSV ingestion boundary, and Parquet export of
//! rating history

mod csv;
mod parquet;
mod types;

pub use self::csv::{load_matches, parse_match_date, validate_columns, REQUIRED_COLUMNS};
pub use self::parquet::{enriched_match_schema, ParquetReader, ParquetWriter};
pub use types::{EnrichedMatchRecord, IngestError, MarketOdds, MatchRecord, Outcome};
