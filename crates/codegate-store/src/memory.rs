//! In-memory store
//!
//! Keeps documents in a map behind a mutex. Intended for tests and for
//! embedders that want lifecycle semantics without a filesystem.

use crate::{validate_key, RecordStore, StoreError};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;

/// Map-backed record store
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether the store holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        validate_key(key)?;
        Ok(self.records.lock().get(key).cloned())
    }

    fn put(&self, key: &str, document: &Value) -> Result<(), StoreError> {
        validate_key(key)?;
        self.records
            .lock()
            .insert(key.to_string(), document.clone());
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.records.lock().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn put_get_list() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.put("a", &json!({"v": 1})).unwrap();
        store.put("b", &json!({"v": 2})).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a").unwrap(), Some(json!({"v": 1})));
        assert_eq!(store.get("zzz").unwrap(), None);

        let mut keys = store.list_keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn put_replaces_existing() {
        let store = MemoryStore::new();
        store.put("a", &json!({"v": 1})).unwrap();
        store.put("a", &json!({"v": 2})).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").unwrap(), Some(json!({"v": 2})));
    }
}
