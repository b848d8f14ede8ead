//! In-memory key-value store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{KeyValueStore, StorageError, StorageResult};

/// Map-backed store with an optional byte quota.
///
/// The quota counts key and value bytes across all slots, which is how
/// browser storage accounts for usage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, Vec<u8>>>,
    quota: Option<usize>,
}

impl MemoryStore {
    /// Unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects writes once `quota` bytes would be exceeded.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            slots: Mutex::default(),
            quota: Some(quota),
        }
    }

    /// Bytes currently held (keys plus values).
    pub fn used_bytes(&self) -> usize {
        self.slots()
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots().is_empty()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.slots().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        let mut slots = self.slots();

        if let Some(quota) = self.quota {
            let others: usize = slots
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let requested = others + key.len() + value.len();
            if requested > quota {
                return Err(StorageError::QuotaExceeded { requested, quota });
            }
        }

        slots.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.slots().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);

        store.set("a", b"[1]").unwrap();
        assert_eq!(store.get("a").unwrap(), Some(b"[1]".to_vec()));

        store.set("a", b"[1,2]").unwrap();
        assert_eq!(store.get("a").unwrap(), Some(b"[1,2]".to_vec()));

        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_missing_key() {
        let store = MemoryStore::new();
        assert!(store.remove("nothing").is_ok());
    }

    #[test]
    fn test_quota_rejects_oversized_write() {
        let store = MemoryStore::with_quota(10);
        store.set("k", b"12345").unwrap();
        assert_eq!(store.used_bytes(), 6);

        let err = store.set("j", b"123456").unwrap_err();
        assert!(matches!(
            err,
            StorageError::QuotaExceeded {
                requested: 13,
                quota: 10
            }
        ));

        // Rejected write leaves the store untouched
        assert_eq!(store.get("j").unwrap(), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_quota_counts_replaced_slot_once() {
        let store = MemoryStore::with_quota(10);
        store.set("k", b"123456789").unwrap();
        // Overwriting the same slot only needs room for the new value
        store.set("k", b"987654321").unwrap();
        assert_eq!(store.get("k").unwrap(), Some(b"987654321".to_vec()));
    }
}
