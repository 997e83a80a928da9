//! stockpeak runner: configuration, stores, and the three-step pipeline.
//!
//! This crate builds on `stockpeak-core` to provide:
//! - TOML configuration with a docker-compose profile
//! - Object stores (S3 with SigV4, filesystem, in-memory)
//! - Key-value stores (Redis, in-memory)
//! - The Loader and Publisher steps
//! - `run_pipeline`, which composes Loader → Aggregator → Publisher

pub mod config;
pub mod loader;
pub mod pipeline;
pub mod publisher;
pub mod store;

pub use config::{ConfigError, PipelineConfig, RedisConfig, RunConfig, S3Config};
pub use loader::{load_records, LoadError};
pub use pipeline::{run_pipeline, PipelineError, RunReport, Step};
pub use publisher::{publish, Published};
pub use store::{
    FsObjectStore, KeyValueStore, MemoryKeyValueStore, MemoryObjectStore, ObjectStore,
    RedisStore, S3ObjectStore, StoreError,
};
