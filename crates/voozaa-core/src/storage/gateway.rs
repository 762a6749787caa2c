//! Blob store abstraction
//!
//! The tracker persists one opaque text blob under a string key. Anything
//! that can load and save text by key can back a [`Store`](crate::Store).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::error::{StorageError, StorageResult};

/// Key-value text storage
pub trait BlobStore {
    /// Load the text stored under `key`, or `None` if nothing was saved yet
    fn load(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `text` under `key`, replacing any previous value
    fn save(&mut self, key: &str, text: &str) -> StorageResult<()>;
}

/// In-memory blob store
///
/// Clones share the same map, so a test can keep a handle and inspect what
/// the store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Rc<RefCell<HashMap<String, String>>>,
    fail_saves: Rc<RefCell<bool>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `text` stored under `key`
    pub fn with_blob(key: &str, text: impl Into<String>) -> Self {
        let store = Self::new();
        store.blobs.borrow_mut().insert(key.to_string(), text.into());
        store
    }

    /// Current text under `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.blobs.borrow().get(key).cloned()
    }

    /// Make every following save fail (simulates an unavailable backend)
    pub fn set_fail_saves(&self, fail: bool) {
        *self.fail_saves.borrow_mut() = fail;
    }
}

impl BlobStore for MemoryBlobStore {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.get(key))
    }

    fn save(&mut self, key: &str, text: &str) -> StorageResult<()> {
        if *self.fail_saves.borrow() {
            return Err(StorageError::Unavailable(format!(
                "saving '{}' is disabled",
                key
            )));
        }
        self.blobs
            .borrow_mut()
            .insert(key.to_string(), text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryBlobStore::new();
        assert!(store.load("k").unwrap().is_none());

        store.save("k", "value").unwrap();
        assert_eq!(store.load("k").unwrap().as_deref(), Some("value"));

        store.save("k", "newer").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("newer"));
    }

    #[test]
    fn test_clones_share_contents() {
        let handle = MemoryBlobStore::new();
        let mut store = handle.clone();
        store.save("k", "shared").unwrap();
        assert_eq!(handle.get("k").as_deref(), Some("shared"));
    }

    #[test]
    fn test_failing_saves() {
        let mut store = MemoryBlobStore::with_blob("k", "old");
        store.set_fail_saves(true);
        assert!(matches!(
            store.save("k", "new"),
            Err(StorageError::Unavailable(_))
        ));
        assert_eq!(store.get("k").as_deref(), Some("old"));
    }
}
