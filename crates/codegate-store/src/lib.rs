//! CodeGate Record Store
//!
//! Durable key-value persistence of JSON documents, one document per
//! record key. The lifecycle layer talks to storage exclusively through
//! the [`RecordStore`] trait so the backend can be swapped without
//! touching lifecycle logic.
//!
//! # Core Concepts
//!
//! - [`RecordStore`]: the storage contract (`get`, `put`, `list_keys`)
//! - [`FileStore`]: one `<key>.json` file per record with atomic replace
//! - [`MemoryStore`]: in-process map, used by tests and embedders
//!
//! # Example
//!
//! ```rust,ignore
//! use codegate_store::{FileStore, RecordStore};
//!
//! let store = FileStore::open("data/instructions")?;
//! store.put("abc", &serde_json::json!({"status": "draft"}))?;
//! let doc = store.get("abc")?;
//! ```

mod error;
mod file;
mod memory;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;

use serde_json::Value;

/// Storage contract for whole-document JSON records
///
/// Every mutation is a whole-document overwrite; there is no partial
/// patch and no optimistic-concurrency token. Concurrent writers to the
/// same key race and the last write wins.
pub trait RecordStore: Send + Sync {
    /// Fetch the document stored under `key`
    ///
    /// Returns `Ok(None)` for an unknown key.
    ///
    /// # Errors
    /// Returns error on backend I/O failure or a corrupt document.
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Store `document` under `key`, replacing any previous document
    ///
    /// # Errors
    /// Returns error on backend I/O or serialization failure.
    fn put(&self, key: &str, document: &Value) -> Result<(), StoreError>;

    /// List every key currently stored
    ///
    /// Order is unspecified.
    ///
    /// # Errors
    /// Returns error on backend I/O failure.
    fn list_keys(&self) -> Result<Vec<String>, StoreError>;
}

/// Reject keys that could escape the backing namespace
///
/// Record keys are opaque identifiers (UUIDs in practice); path
/// separators and dot-relative segments are never valid.
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty()
        || key.contains('/')
        || key.contains('\\')
        || key == "."
        || key == ".."
    {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_validation_accepts_identifiers() {
        assert!(validate_key("0a1b2c3d").is_ok());
        assert!(validate_key("550e8400-e29b-41d4-a716-446655440000").is_ok());
    }

    #[test]
    fn key_validation_rejects_path_segments() {
        assert!(validate_key("").is_err());
        assert!(validate_key("..").is_err());
        assert!(validate_key("a/b").is_err());
        assert!(validate_key("a\\b").is_err());
    }
}
