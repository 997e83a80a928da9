//! Loader: fetch one object and parse it into stock records.
//!
//! Parsing is all-or-nothing: the first bad row aborts the load, so the
//! aggregator never sees a partially parsed set.

use stockpeak_core::{ParseError, StockRecord};
use thiserror::Error;
use tracing::debug;

use crate::store::{ObjectStore, StoreError};

/// Errors from the loading step.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fetch '{key}' failed: {source}")]
    Store {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("'{key}' row {row}: {source}")]
    Parse {
        key: String,
        /// 1-based row number among the object's non-blank rows.
        row: usize,
        #[source]
        source: ParseError,
    },
}

/// Fetch `key` from `store` and convert every raw record.
pub fn load_records(store: &dyn ObjectStore, key: &str) -> Result<Vec<StockRecord>, LoadError> {
    debug!(store = store.name(), key, "loading records");

    let raw = store.fetch(key).map_err(|source| LoadError::Store {
        key: key.to_string(),
        source,
    })?;

    let records = raw
        .iter()
        .enumerate()
        .map(|(i, fields)| {
            StockRecord::from_fields(fields).map_err(|source| LoadError::Parse {
                key: key.to_string(),
                row: i + 1,
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(key, count = records.len(), "loaded records");
    Ok(records)
}
