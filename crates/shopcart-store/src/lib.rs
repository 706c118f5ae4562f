//! # shopcart-store: Persisted Cart Store
//!
//! Wraps the pure [`shopcart_core::Cart`] with a local storage mirror,
//! change subscriptions, and configuration.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │   ┌──────────┐   hydrate    ┌──────────┐   mutate    ┌──────────┐       │
//! │   │  Storage │ ───────────► │  Active  │ ──────────► │  Active  │ ─┐    │
//! │   │  record  │  (fallback:  │   cart   │  + persist  │   cart   │  │    │
//! │   └──────────┘   empty)     └──────────┘  + notify   └──────────┘  │    │
//! │        ▲                                                 │  ▲      │    │
//! │        └──────────── write full record ─────────────────┘  └──────┘    │
//! │                                                                         │
//! │   forget() removes the record; the lifecycle ends there.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use shopcart_core::{Money, ProductId, ProductRef};
//! use shopcart_store::{CartStore, MemoryStorage};
//!
//! let storage = MemoryStorage::new();
//! let mut store = CartStore::new(storage.clone(), "cart-items");
//!
//! let a = ProductRef::new(ProductId::new(1), "A", Money::from_cents(1000), 5);
//! store.add_to_cart(&a, 3).unwrap();
//! assert_eq!(store.total_amount(), Money::from_cents(3000));
//!
//! // A fresh store over the same storage sees the same cart
//! let reopened = CartStore::new(storage, "cart-items");
//! assert_eq!(reopened.total_count(), 3);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod storage;
pub mod store;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use config::{StorageBackend, StorageSettings, StoreConfig, DEFAULT_STORAGE_KEY};
pub use error::{StorageError, StorageResult, StoreError, StoreResult};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{
    CartEvent, CartStore, Hydration, HydrationFailure, SharedCartStore, SubscriptionId,
};

use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber filtered by `RUST_LOG`.
///
/// Falls back to `info,shopcart=debug` when `RUST_LOG` is unset or invalid.
/// Logs go to stderr so stdout stays machine-readable.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,shopcart=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
