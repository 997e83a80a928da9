//! Publisher: write the aggregate as one key/value pair.

use serde::{Deserialize, Serialize};
use stockpeak_core::Aggregate;
use tracing::info;

use crate::store::{KeyValueStore, StoreError};

/// The pair written to the key-value store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Published {
    pub key: String,
    pub value: String,
}

/// Log the pair, then write it with a single store call.
///
/// The key is `aggregate.key()` and the value `aggregate.value()`.
/// Store failures are returned unchanged.
pub fn publish(store: &dyn KeyValueStore, aggregate: &Aggregate) -> Result<Published, StoreError> {
    let key = aggregate.key();
    let value = aggregate.value();

    info!(
        date = %key,
        high = %value,
        store = store.name(),
        "putting stock {key} with high of {value} into key-value store"
    );
    store.write(&key, &value)?;

    Ok(Published { key, value })
}
