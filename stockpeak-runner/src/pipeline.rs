//! Pipeline runner: Loader → Aggregator → Publisher.
//!
//! The three steps are composed statically: each step's output is the next
//! step's only input, and the first failure ends the run. Nothing is
//! retried and nothing is partially committed; a run either writes exactly
//! one key/value pair or writes nothing.

use std::fmt;

use serde::Serialize;
use stockpeak_core::{aggregate, dataset_hash, Aggregate, EmptyInputError};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::loader::{load_records, LoadError};
use crate::publisher::{publish, Published};
use crate::store::{KeyValueStore, ObjectStore, StoreError};

/// The pipeline's steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Load,
    Aggregate,
    Publish,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Load => "load",
            Step::Aggregate => "aggregate",
            Step::Publish => "publish",
        };
        f.write_str(name)
    }
}

/// A run that stopped before writing.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("load step failed: {0}")]
    Load(#[from] LoadError),

    #[error("aggregate step failed: {0}")]
    Aggregate(#[from] EmptyInputError),

    #[error("publish step failed: {0}")]
    Publish(#[source] StoreError),
}

impl PipelineError {
    /// Which step failed.
    pub fn step(&self) -> Step {
        match self {
            PipelineError::Load(_) => Step::Load,
            PipelineError::Aggregate(_) => Step::Aggregate,
            PipelineError::Publish(_) => Step::Publish,
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub s3_key: String,
    pub record_count: usize,
    /// BLAKE3 fingerprint of the loaded records.
    pub dataset_hash: String,
    pub aggregate: Aggregate,
    pub published: Published,
}

/// Execute one run against the given stores.
pub fn run_pipeline(
    run: &RunConfig,
    objects: &dyn ObjectStore,
    kv: &dyn KeyValueStore,
) -> Result<RunReport, PipelineError> {
    let key = run.s3_key.as_str();
    info!(key, objects = objects.name(), kv = kv.name(), "starting run");

    let records = load_records(objects, key)?;
    let hash = dataset_hash(&records);

    let peak = aggregate(&records)?;
    debug!(date = %peak.date(), high = %peak.high(), "aggregated");

    let published = publish(kv, &peak).map_err(PipelineError::Publish)?;

    info!(key, records = records.len(), "run complete");
    Ok(RunReport {
        s3_key: key.to_string(),
        record_count: records.len(),
        dataset_hash: hash,
        aggregate: peak,
        published,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryKeyValueStore, MemoryObjectStore};

    fn run(key: &str) -> RunConfig {
        RunConfig { s3_key: key.into() }
    }

    #[test]
    fn step_names() {
        assert_eq!(Step::Load.to_string(), "load");
        assert_eq!(Step::Aggregate.to_string(), "aggregate");
        assert_eq!(Step::Publish.to_string(), "publish");
    }

    #[test]
    fn completed_run_reports_everything() {
        let objects = MemoryObjectStore::new()
            .with_object("s.csv", "2020/01/01,1,10,0.5,2,100\n2020/01/02,1,15,0.5,2,200\n");
        let kv = MemoryKeyValueStore::new();

        let report = run_pipeline(&run("s.csv"), &objects, &kv).unwrap();
        assert_eq!(report.record_count, 2);
        assert_eq!(report.published.key, "2020-01-02");
        assert_eq!(report.published.value, "15");
        assert_eq!(report.dataset_hash.len(), 64);
        assert_eq!(kv.writes().len(), 1);
    }

    #[test]
    fn each_failure_names_its_step() {
        let kv = MemoryKeyValueStore::new();

        let err = run_pipeline(&run("x"), &MemoryObjectStore::failing("down"), &kv).unwrap_err();
        assert_eq!(err.step(), Step::Load);

        let empty = MemoryObjectStore::new().with_object("e.csv", "");
        let err = run_pipeline(&run("e.csv"), &empty, &kv).unwrap_err();
        assert_eq!(err.step(), Step::Aggregate);

        let ok = MemoryObjectStore::new().with_object("s.csv", "2020/01/01,1,10,0.5,2,100\n");
        let err =
            run_pipeline(&run("s.csv"), &ok, &MemoryKeyValueStore::failing("down")).unwrap_err();
        assert_eq!(err.step(), Step::Publish);

        assert!(kv.writes().is_empty());
    }
}
