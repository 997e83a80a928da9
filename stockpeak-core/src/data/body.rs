//! Headerless CSV bodies → raw records.
//!
//! Stock objects are plain comma-separated rows with no header line.
//! Rows may differ in length (validation happens at record parsing),
//! and blank lines are skipped.

use thiserror::Error;

use crate::domain::RawRecord;

/// The object body was not readable CSV (e.g. invalid UTF-8, bad quoting).
#[derive(Debug, Error)]
#[error("malformed CSV body: {0}")]
pub struct DecodeError(#[from] csv::Error);

/// Decode a whole object body into raw records, in file order.
pub fn decode_records(body: &[u8]) -> Result<Vec<RawRecord>, DecodeError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body);

    let mut rows = Vec::new();
    for row in reader.records() {
        let row = row?;
        rows.push(row.iter().map(str::to_string).collect());
    }
    Ok(rows)
}
