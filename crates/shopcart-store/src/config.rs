//! # Store Configuration
//!
//! Where the cart record lives and under which key.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SHOPCART_STORAGE_BACKEND=memory                                    │
//! │     SHOPCART_STORAGE_KEY=cart-items                                    │
//! │     SHOPCART_STORAGE_DIR=/tmp/cart                                     │
//! │     SHOPCART_QUOTA_BYTES=5242880                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/shopcart/cart.toml (Linux)                               │
//! │     ~/Library/Application Support/com.shopcart.storefront/cart.toml    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     file backend, key "cart-items", platform data dir                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [storage]
//! backend = "file"       # file | memory
//! key = "cart-items"
//! dir = "/var/lib/shopcart"
//! quota_bytes = 5242880  # memory backend only
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::storage::{validate_key, FileStorage, MemoryStorage, Storage};

/// Storage key the storefront has always used for the cart record.
pub const DEFAULT_STORAGE_KEY: &str = "cart-items";

// =============================================================================
// Storage Backend
// =============================================================================

/// Which [`Storage`] implementation backs the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// One JSON file per key in a data directory.
    #[default]
    File,

    /// Process-local map; the cart does not outlive the process.
    Memory,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::File => write!(f, "file"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" | "disk" => Ok(StorageBackend::File),
            "memory" | "mem" => Ok(StorageBackend::Memory),
            other => Err(StoreError::InvalidConfig(format!(
                "Unknown storage backend: '{}'. Valid options: file, memory",
                other
            ))),
        }
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Key holding the cart record.
    #[serde(default = "default_key")]
    pub key: String,

    /// Data directory for the file backend.
    /// Defaults to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Byte quota for the memory backend. Unbounded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_bytes: Option<usize>,
}

fn default_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            backend: StorageBackend::default(),
            key: default_key(),
            dir: None,
            quota_bytes: None,
        }
    }
}

// =============================================================================
// Main Store Configuration
// =============================================================================

/// Complete cart store configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub storage: StorageSettings,
}

impl StoreConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> StoreResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cart config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> StoreResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| StoreError::InvalidConfig("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Cart config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> StoreResult<()> {
        if validate_key(&self.storage.key).is_err() {
            return Err(StoreError::InvalidConfig(format!(
                "storage key must be non-empty and use only letters, digits, '-' or '_', got: '{}'",
                self.storage.key
            )));
        }

        if self.storage.quota_bytes == Some(0) {
            return Err(StoreError::InvalidConfig(
                "quota_bytes must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `SHOPCART_*` overrides read through `lookup`.
    ///
    /// `load` passes the process environment; tests pass a map.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("SHOPCART_STORAGE_BACKEND") {
            match backend.parse() {
                Ok(parsed) => {
                    debug!(backend = %backend, "Overriding storage backend from environment");
                    self.storage.backend = parsed;
                }
                Err(_) => warn!(backend = %backend, "Unknown storage backend in environment"),
            }
        }

        if let Some(key) = lookup("SHOPCART_STORAGE_KEY") {
            self.storage.key = key;
        }

        if let Some(dir) = lookup("SHOPCART_STORAGE_DIR") {
            debug!(dir = %dir, "Overriding storage dir from environment");
            self.storage.dir = Some(PathBuf::from(dir));
        }

        if let Some(quota) = lookup("SHOPCART_QUOTA_BYTES") {
            match quota.parse::<usize>() {
                Ok(q) => self.storage.quota_bytes = Some(q),
                Err(_) => warn!(quota = %quota, "Ignoring non-numeric quota in environment"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "shopcart", "storefront")
            .map(|dirs| dirs.config_dir().join("cart.toml"))
    }

    /// Directory the file backend writes into.
    pub fn storage_dir(&self) -> Option<PathBuf> {
        self.storage.dir.clone().or_else(|| {
            directories::ProjectDirs::from("com", "shopcart", "storefront")
                .map(|dirs| dirs.data_dir().to_path_buf())
        })
    }

    /// Builds the configured backend.
    pub fn open_storage(&self) -> StoreResult<Box<dyn Storage>> {
        match self.storage.backend {
            StorageBackend::File => {
                let dir = self.storage_dir().ok_or_else(|| {
                    StoreError::InvalidConfig("Could not determine data directory".into())
                })?;
                info!(?dir, "Using file storage");
                Ok(Box::new(FileStorage::new(dir)))
            }
            StorageBackend::Memory => {
                info!(quota_bytes = ?self.storage.quota_bytes, "Using memory storage");
                Ok(Box::new(match self.storage.quota_bytes {
                    Some(limit) => MemoryStorage::with_quota(limit),
                    None => MemoryStorage::new(),
                }))
            }
        }
    }

    /// Returns the storage key.
    pub fn key(&self) -> &str {
        &self.storage.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_backend_parsing() {
        assert_eq!("file".parse::<StorageBackend>().unwrap(), StorageBackend::File);
        assert_eq!("MEMORY".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert!("redis".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.key(), "cart-items");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = StoreConfig::default();

        config.storage.key = String::new();
        assert!(config.validate().is_err());

        config.storage.key = "cart/items".to_string();
        assert!(config.validate().is_err());

        config.storage.key = "cart-items".to_string();
        config.storage.quota_bytes = Some(0);
        assert!(config.validate().is_err());

        config.storage.quota_bytes = Some(1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("SHOPCART_STORAGE_BACKEND", "memory"),
            ("SHOPCART_STORAGE_KEY", "guest-cart"),
            ("SHOPCART_QUOTA_BYTES", "2048"),
        ]
        .into_iter()
        .collect();

        let mut config = StoreConfig::default();
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.key(), "guest-cart");
        assert_eq!(config.storage.quota_bytes, Some(2048));
    }

    #[test]
    fn test_bad_overrides_are_ignored() {
        let mut config = StoreConfig::default();
        config.apply_overrides(|name| match name {
            "SHOPCART_STORAGE_BACKEND" => Some("redis".to_string()),
            "SHOPCART_QUOTA_BYTES" => Some("lots".to_string()),
            _ => None,
        });
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_toml_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.toml");

        let mut config = StoreConfig::default();
        config.storage.dir = Some(dir.path().join("data"));
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[storage]"));

        let parsed: StoreConfig = toml::from_str(&contents).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: StoreConfig = toml::from_str("[storage]\nbackend = \"memory\"\n").unwrap();
        assert_eq!(parsed.storage.backend, StorageBackend::Memory);
        assert_eq!(parsed.key(), DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn test_open_memory_storage_with_quota() {
        let mut config = StoreConfig::default();
        config.storage.backend = StorageBackend::Memory;
        config.storage.quota_bytes = Some(4);

        let mut storage = config.open_storage().unwrap();
        assert!(storage.set_item("cart-items", "[1,2,3]").is_err());
    }
}
