//! Store traits and structured error types.
//!
//! `ObjectStore` and `KeyValueStore` abstract over the two external services
//! a run touches, so the pipeline can be driven against S3 and Redis in
//! production and against in-memory or filesystem stores in tests.

pub mod fs;
pub mod memory;
pub mod redis_store;
pub mod s3;

use std::path::PathBuf;
use stockpeak_core::{decode_records, DecodeError, RawRecord};
use thiserror::Error;

pub use fs::FsObjectStore;
pub use memory::{MemoryKeyValueStore, MemoryObjectStore};
pub use redis_store::RedisStore;
pub use s3::S3ObjectStore;

/// Failures reported by a store. Never retried by the pipeline.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object '{key}' not found")]
    NotFound { key: String },

    #[error("invalid object key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("object store returned HTTP {status} for '{key}': {body}")]
    Status {
        key: String,
        status: u16,
        body: String,
    },

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Read side: fetch one named object.
pub trait ObjectStore: Send + Sync {
    /// Human-readable name of this store.
    fn name(&self) -> &str;

    /// Raw body of the object stored under `key`.
    fn get_object(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Raw records of the object stored under `key`.
    ///
    /// Objects are headerless CSV; each row becomes one raw record.
    fn fetch(&self, key: &str) -> Result<Vec<RawRecord>, StoreError> {
        let body = self.get_object(key)?;
        Ok(decode_records(&body)?)
    }
}

/// Write side: store one key/value pair.
pub trait KeyValueStore: Send + Sync {
    /// Human-readable name of this store.
    fn name(&self) -> &str;

    /// Store `value` under `key`, overwriting any previous value.
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
