//! Dataset fingerprinting: BLAKE3 over the records a run loaded.
//!
//! The hash covers every field of every record in load order, so two runs
//! that saw the same object contents report the same fingerprint.

use crate::domain::StockRecord;

/// Hex-encoded BLAKE3 digest of `records`.
pub fn dataset_hash(records: &[StockRecord]) -> String {
    let mut hasher = blake3::Hasher::new();

    for record in records {
        hasher.update(record.date().format("%Y-%m-%d").to_string().as_bytes());
        hasher.update(&record.open().serialize());
        hasher.update(&record.high().serialize());
        hasher.update(&record.low().serialize());
        hasher.update(&record.close().serialize());
        hasher.update(&record.volume().to_le_bytes());
    }

    hasher.finalize().to_hex().to_string()
}
