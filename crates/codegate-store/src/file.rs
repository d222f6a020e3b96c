//! File-per-record store
//!
//! Each record lives in `<root>/<key>.json`, pretty-printed. Writes go
//! through a temp file in the same directory followed by a rename, so a
//! crash mid-write never leaves a partially-written record behind.

use crate::{validate_key, RecordStore, StoreError};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory-backed record store, one JSON file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed
    ///
    /// # Errors
    /// Returns error if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Root directory of this store
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl RecordStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        validate_key(key)?;
        let path = self.record_path(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let document = serde_json::from_str(&raw)?;
        Ok(Some(document))
    }

    fn put(&self, key: &str, document: &Value) -> Result<(), StoreError> {
        validate_key(key)?;
        let path = self.record_path(key);
        let tmp = self.root.join(format!("{key}.json.tmp"));
        let raw = serde_json::to_string_pretty(document)?;
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &path)?;
        tracing::debug!("record written: {}", path.display());
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        Ok(keys)
    }
}
