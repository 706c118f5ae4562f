//! In-memory storage backend.
//!
//! Clones share the same map, the way every tab of one origin sees the
//! same `localStorage`. A quota, when set, bounds the total of key and
//! value lengths in bytes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{validate_key, Storage};
use crate::error::{StorageError, StorageResult};

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, String>,
    quota_bytes: Option<usize>,
}

impl Inner {
    fn used_bytes_excluding(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

/// Map-backed [`Storage`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStorage {
    /// Unbounded storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that refuses writes past `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        MemoryStorage {
            inner: Arc::new(Mutex::new(Inner {
                entries: HashMap::new(),
                quota_bytes: Some(quota_bytes),
            })),
        }
    }

    /// Changes the quota on the shared map; `None` removes it.
    pub fn set_quota(&self, quota_bytes: Option<usize>) {
        self.lock().quota_bytes = quota_bytes;
    }

    /// Total bytes currently held (keys + values).
    pub fn used_bytes(&self) -> usize {
        self.lock().used_bytes_excluding("")
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        validate_key(key)?;
        Ok(self.lock().entries.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        validate_key(key)?;
        let mut inner = self.lock();

        if let Some(limit) = inner.quota_bytes {
            let needed = inner.used_bytes_excluding(key) + key.len() + value.len();
            if needed > limit {
                return Err(StorageError::quota_exceeded(key, needed, limit));
            }
        }

        inner.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.lock().entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_remove() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get_item("k").unwrap(), None);

        storage.set_item("k", "v1").unwrap();
        storage.set_item("k", "v2").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v2"));

        storage.remove_item("k").unwrap();
        storage.remove_item("k").unwrap();
        assert_eq!(storage.get_item("k").unwrap(), None);
    }

    #[test]
    fn test_clones_share_entries() {
        let mut a = MemoryStorage::new();
        let b = a.clone();
        a.set_item("k", "shared").unwrap();
        assert_eq!(b.get_item("k").unwrap().as_deref(), Some("shared"));
    }

    #[test]
    fn test_quota_counts_replaced_value_once() {
        let mut storage = MemoryStorage::with_quota(10);
        storage.set_item("k", "123456789").unwrap(); // 1 + 9 = 10
        storage.set_item("k", "abcdefghi").unwrap(); // replaces, still 10
        assert_eq!(storage.used_bytes(), 10);

        let err = storage.set_item("k", "0123456789").unwrap_err();
        assert!(matches!(
            err,
            StorageError::QuotaExceeded {
                needed: 11,
                limit: 10,
                ..
            }
        ));
        assert_eq!(
            storage.get_item("k").unwrap().as_deref(),
            Some("abcdefghi")
        );
    }

    #[test]
    fn test_quota_can_be_lifted() {
        let mut storage = MemoryStorage::with_quota(2);
        assert!(storage.set_item("k", "long value").is_err());
        storage.set_quota(None);
        assert!(storage.set_item("k", "long value").is_ok());
    }
}
