//! # Store Error Types
//!
//! Error types for storage backends and the cart store.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  io::Error / quota ───► StorageError (backend failures)                │
//! │                              │                                          │
//! │  serde_json / toml ─────┐    │                                          │
//! │  CoreError ─────────────┼────▼                                          │
//! │                         StoreError (this module)                        │
//! │                              │                                          │
//! │          ┌───────────────────┴───────────────────┐                      │
//! │          ▼                                       ▼                      │
//! │  Persistence path                         Caller path                   │
//! │  (logged, never returned)                 (add_to_cart validation,      │
//! │                                            config load)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Local storage backend errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The write would push the backend past its byte quota.
    ///
    /// ## When This Occurs
    /// - A large cart on a quota-limited backend
    /// - Other keys already fill most of the quota
    #[error("Storage quota exceeded writing '{key}': needs {needed} bytes, limit {limit}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    /// Key contains characters outside `[A-Za-z0-9_-]` or is empty.
    #[error("Invalid storage key: '{0}'")]
    InvalidKey(String),

    /// File system failure in a file-backed store.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn quota_exceeded(key: impl Into<String>, needed: usize, limit: usize) -> Self {
        StorageError::QuotaExceeded {
            key: key.into(),
            needed,
            limit,
        }
    }
}

/// Result type for storage backend operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Cart store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Cart record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A cart rule rejected the request.
    #[error(transparent)]
    Core(#[from] shopcart_core::CoreError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cart store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use shopcart_core::{CoreError, ProductId};

    #[test]
    fn test_error_messages() {
        let err = StorageError::quota_exceeded("cart-items", 120, 100);
        assert_eq!(
            err.to_string(),
            "Storage quota exceeded writing 'cart-items': needs 120 bytes, limit 100"
        );
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err: StoreError = CoreError::OutOfStock {
            product_id: ProductId::new(3),
        }
        .into();
        assert_eq!(err.to_string(), "Product 3 is out of stock");
    }
}
