//! Dataset Loading
//!
//! Bulk-loads the query log at startup. The dataset is a TSV file with one
//! record per line:
//!
//! ```text
//! timestamp<TAB>query
//! ```
//!
//! with timestamps in the form `YYYY-MM-DD hh:mm:ss`. Insertion order does
//! not affect query results, so no sorting happens here.
//!
//! A malformed record aborts the load with its line number. Skipping it
//! silently would corrupt every later count with no visible cause.

use crate::query::SearchEngine;
use chrono::NaiveDateTime;
use std::path::Path;
use thiserror::Error;

/// Timestamp layout of the dataset's first column
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors raised while loading the dataset
#[derive(Error, Debug)]
pub enum DatasetError {
    /// I/O or malformed TSV framing, reported by the csv reader
    #[error("failed to read dataset: {0}")]
    Read(#[from] csv::Error),

    /// A record with the wrong number of fields
    #[error("malformed record at line {line}: expected 2 fields, got {fields}")]
    BadRecord { line: usize, fields: usize },

    /// A timestamp that does not parse as `YYYY-MM-DD hh:mm:ss`
    #[error("unparsable timestamp {value:?} at line {line}")]
    BadTimestamp { line: usize, value: String },
}

/// Load a TSV dataset into a fresh [`SearchEngine`].
///
/// Returns the fully loaded engine; callers freeze it behind an `Arc`
/// before serving queries.
pub fn load_tsv(path: &Path) -> Result<SearchEngine, DatasetError> {
    // the contract is a raw tab split: quotes are ordinary characters in a
    // query, never field syntax, and one physical line is one record
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_path(path)?;

    let mut engine = SearchEngine::new();

    for (index, record) in reader.records().enumerate() {
        let line = index + 1;
        let record = record?;

        if record.len() != 2 {
            return Err(DatasetError::BadRecord {
                line,
                fields: record.len(),
            });
        }

        let timestamp = NaiveDateTime::parse_from_str(&record[0], TIMESTAMP_FORMAT).map_err(
            |_| DatasetError::BadTimestamp {
                line,
                value: record[0].to_string(),
            },
        )?;

        engine.insert(timestamp, record[1].to_string());
    }

    tracing::info!(records = engine.len(), path = %path.display(), "dataset loaded");
    Ok(engine)
}
