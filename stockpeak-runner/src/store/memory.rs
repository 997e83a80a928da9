//! In-process stores for dry runs and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{KeyValueStore, ObjectStore, StoreError};

/// Object store over a fixed map of key → body.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: HashMap<String, Vec<u8>>,
    unavailable: Option<String>,
    fetches: AtomicUsize,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, key: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.objects.insert(key.into(), body.into());
        self
    }

    /// Every read fails with `StoreError::Unavailable(reason)`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            unavailable: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Number of `get_object` calls so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl ObjectStore for MemoryObjectStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get_object(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.unavailable {
            return Err(StoreError::Unavailable(reason.clone()));
        }
        self.objects
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { key: key.into() })
    }
}

/// Key-value store that records every write in order.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    writes: Mutex<Vec<(String, String)>>,
    unavailable: Option<String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write fails with `StoreError::Unavailable(reason)` and is not recorded.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            unavailable: Some(reason.into()),
            ..Self::default()
        }
    }

    /// All successful writes, oldest first.
    pub fn writes(&self) -> Vec<(String, String)> {
        self.lock().clone()
    }

    /// Latest value written under `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock()
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(String, String)>> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(reason) = &self.unavailable {
            return Err(StoreError::Unavailable(reason.clone()));
        }
        self.lock().push((key.to_string(), value.to_string()));
        Ok(())
    }
}
