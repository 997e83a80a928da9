//! Filesystem object store for local runs.
//!
//! Object keys resolve to paths under a root directory, so
//! `week_4/stock.csv` reads `<root>/week_4/stock.csv`.

use std::path::{Component, Path, PathBuf};

use super::{ObjectStore, StoreError};

pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Keys must stay inside the root: no absolute paths, no `..`.
    fn resolve(&self, key: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if key.is_empty() || escapes {
            return Err(StoreError::InvalidKey {
                key: key.into(),
                reason: "must be a relative path inside the store root".into(),
            });
        }
        Ok(self.root.join(relative))
    }
}

impl ObjectStore for FsObjectStore {
    fn name(&self) -> &str {
        "fs"
    }

    fn get_object(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.resolve(key)?;
        std::fs::read(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound { key: key.into() }
            } else {
                StoreError::Io { path, source }
            }
        })
    }
}
