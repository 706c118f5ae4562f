//! File-backed storage backend.
//!
//! ## Layout
//! ```text
//! <dir>/
//! ├── cart-items.json        ← value of key "cart-items"
//! └── .cart-items.json.tmp   ← transient, renamed over the value on write
//! ```
//! Writing to a sibling and renaming means a reader sees either the old
//! record or the new one, never a partial file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{validate_key, Storage};
use crate::error::StorageResult;

/// Directory-backed [`Storage`], one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Uses `dir` for values. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{}.json.tmp", key))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        validate_key(key)?;
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        validate_key(key)?;
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(key);
        let tmp = self.temp_path_for(key);
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;

        debug!(?path, bytes = value.len(), "Storage record written");
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;

    #[test]
    fn test_missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert_eq!(storage.get_item("cart-items").unwrap(), None);
    }

    #[test]
    fn test_write_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("nested"));

        storage.set_item("cart-items", "[]").unwrap();
        assert_eq!(
            storage.get_item("cart-items").unwrap().as_deref(),
            Some("[]")
        );
        assert!(storage.path_for("cart-items").exists());
        assert!(!storage.temp_path_for("cart-items").exists());

        storage.remove_item("cart-items").unwrap();
        storage.remove_item("cart-items").unwrap();
        assert_eq!(storage.get_item("cart-items").unwrap(), None);
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        let err = storage.set_item("../escape", "x").unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }
}
