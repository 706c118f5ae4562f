//! # Storage Module
//!
//! The "local storage" the cart mirrors itself into.
//!
//! ## Backend Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Storage Architecture                                 │
//! │                                                                         │
//! │  CartStore                                                              │
//! │      │                                                                  │
//! │      └── Box<dyn Storage>                                               │
//! │              │                                                          │
//! │              ├── MemoryStorage  (HashMap, optional byte quota)          │
//! │              └── FileStorage    (<dir>/<key>.json, atomic rename)       │
//! │                                                                         │
//! │  Values are opaque strings; the store owns the JSON encoding.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::{StorageError, StorageResult};

/// A string key/value store, shaped like the browser's `localStorage`.
pub trait Storage: Send {
    /// Reads a value. A missing key is `Ok(None)`, not an error.
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Writes a value, replacing any previous one.
    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Deletes a value. Deleting a missing key succeeds.
    fn remove_item(&mut self, key: &str) -> StorageResult<()>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<()> {
        (**self).remove_item(key)
    }
}

/// Checks that a key is non-empty and uses only `[A-Za-z0-9_-]`.
///
/// Keys double as file names in [`FileStorage`], so path separators and
/// dots are excluded.
pub fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
