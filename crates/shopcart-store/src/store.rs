//! # Cart Store
//!
//! Session-scoped cart state mirrored into [`Storage`].
//!
//! ## Mutation Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Store Operations                                │
//! │                                                                         │
//! │  UI Handler              CartStore               Side Effects           │
//! │  ──────────              ─────────               ────────────           │
//! │                                                                         │
//! │  new(storage, key) ─────► hydrate() ───────────► read record           │
//! │                                                   (fallback: empty)     │
//! │                                                                         │
//! │  Add to cart ───────────► add_to_cart() ──┐                             │
//! │  Remove ────────────────► remove_from_cart()  ├─► 1. mutate Cart        │
//! │  Clear ─────────────────► clear_cart() ───┘    2. persist full record   │
//! │                                                 3. notify subscribers   │
//! │                                                                         │
//! │  Badge / Summary ───────► total_count()          (computed on read)    │
//! │                           total_amount()                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Policy
//! Nothing on the storage path reaches the caller. A bad record hydrates
//! as an empty cart; a failed write is logged and remembered in
//! [`CartStore::last_persist_error`] while the in-memory cart stays
//! authoritative.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shopcart_core::{
    AddOutcome, Cart, CartLineItem, CartTotals, Money, Normalization, ProductId, ProductRef,
    DEFAULT_ADD_QUANTITY,
};
use tracing::{debug, error, info, warn};

use crate::config::StoreConfig;
use crate::error::StoreResult;
use crate::storage::Storage;

// =============================================================================
// Events & Subscriptions
// =============================================================================

/// A completed change to the cart, delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// State was (re)loaded from storage.
    Hydrated,
    Added {
        product_id: ProductId,
        outcome: AddOutcome,
    },
    Removed {
        product_id: ProductId,
    },
    Cleared,
    /// The persisted record was deleted and the cart emptied.
    Forgotten,
}

/// Handle returned by [`CartStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&CartEvent, &Cart) + Send>;

// =============================================================================
// Hydration
// =============================================================================

/// Why a persisted record was discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydrationFailure {
    /// The backend could not be read.
    ReadFailed(String),
    /// The record is not valid JSON.
    InvalidJson(String),
    /// The record is valid JSON but not an array.
    NotASequence,
    /// The array holds entries that are not line items.
    InvalidItems(String),
}

impl fmt::Display for HydrationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HydrationFailure::ReadFailed(e) => write!(f, "storage read failed: {}", e),
            HydrationFailure::InvalidJson(e) => write!(f, "record is not valid JSON: {}", e),
            HydrationFailure::NotASequence => write!(f, "record is not a sequence"),
            HydrationFailure::InvalidItems(e) => write!(f, "record items are malformed: {}", e),
        }
    }
}

/// Result of reading the persisted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hydration {
    /// No record was stored.
    Empty,
    /// Record loaded as-is.
    Loaded { items: usize },
    /// Record loaded after invariant repairs; the repaired cart was written back.
    Normalized {
        items: usize,
        report: Normalization,
    },
    /// Record ignored; the cart starts empty.
    Discarded { reason: HydrationFailure },
}

// =============================================================================
// Cart Store
// =============================================================================

/// The cart plus its storage mirror.
///
/// Constructed explicitly and passed to whoever handles UI events; there
/// is no global instance. One store owns its storage key.
pub struct CartStore {
    cart: Cart,
    storage: Box<dyn Storage>,
    key: String,
    hydration: Hydration,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    last_persist_error: Option<String>,
}

impl CartStore {
    /// Creates a store over `storage` and hydrates it from `key`.
    pub fn new(storage: impl Storage + 'static, key: impl Into<String>) -> Self {
        let mut store = CartStore {
            cart: Cart::new(),
            storage: Box::new(storage),
            key: key.into(),
            hydration: Hydration::Empty,
            listeners: Vec::new(),
            next_subscription: 0,
            last_persist_error: None,
        };
        store.hydration = store.hydrate();
        store
    }

    /// Creates a store from configuration (backend + key).
    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        let storage = config.open_storage()?;
        Ok(Self::new(storage, config.key()))
    }

    /// Reads the record into memory, falling back to an empty cart.
    fn hydrate(&mut self) -> Hydration {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "No persisted cart, starting empty");
                self.cart = Cart::new();
                return Hydration::Empty;
            }
            Err(e) => {
                return self.discard(HydrationFailure::ReadFailed(e.to_string()));
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => return self.discard(HydrationFailure::InvalidJson(e.to_string())),
        };

        if !value.is_array() {
            return self.discard(HydrationFailure::NotASequence);
        }

        let items: Vec<CartLineItem> = match serde_json::from_value(value) {
            Ok(items) => items,
            Err(e) => return self.discard(HydrationFailure::InvalidItems(e.to_string())),
        };

        let (cart, report) = Cart::from_line_items(items);
        self.cart = cart;
        let items = self.cart.item_count();

        if report.is_clean() {
            info!(key = %self.key, items, "Cart hydrated");
            self.last_persist_error = None;
            Hydration::Loaded { items }
        } else {
            warn!(
                key = %self.key,
                items,
                merged = report.merged_duplicates,
                clamped = report.clamped,
                dropped = report.dropped,
                "Persisted cart violated invariants, rewriting repaired record"
            );
            self.persist();
            Hydration::Normalized { items, report }
        }
    }

    fn discard(&mut self, reason: HydrationFailure) -> Hydration {
        warn!(key = %self.key, %reason, "Ignoring persisted cart, starting empty");
        self.cart = Cart::new();
        Hydration::Discarded { reason }
    }

    /// Re-reads the record, e.g. after another browsing context changed it.
    pub fn reload(&mut self) -> &Hydration {
        self.hydration = self.hydrate();
        self.notify(CartEvent::Hydrated);
        &self.hydration
    }

    /// What the most recent hydration found.
    pub fn hydration(&self) -> &Hydration {
        &self.hydration
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds `quantity` of `product`, clamping to its stock.
    ///
    /// ## Errors
    /// Only cart rule rejections (zero quantity, zero stock). Storage
    /// failures are never returned.
    pub fn add_to_cart(&mut self, product: &ProductRef, quantity: u32) -> StoreResult<AddOutcome> {
        let outcome = self.cart.add(product, quantity)?;
        debug!(
            product_id = %product.id,
            requested = quantity,
            quantity = outcome.quantity,
            clamped = outcome.clamped,
            "add_to_cart"
        );
        if outcome.clamped {
            info!(
                product_id = %product.id,
                stock = product.stock_quantity,
                "Requested quantity clamped to stock"
            );
        }

        self.persist();
        self.notify(CartEvent::Added {
            product_id: product.id,
            outcome,
        });
        Ok(outcome)
    }

    /// Adds a single unit of `product`.
    pub fn add_one(&mut self, product: &ProductRef) -> StoreResult<AddOutcome> {
        self.add_to_cart(product, DEFAULT_ADD_QUANTITY)
    }

    /// Removes the line for `product_id`. Missing ids are a no-op.
    ///
    /// Returns whether a line was removed.
    pub fn remove_from_cart(&mut self, product_id: ProductId) -> bool {
        let removed = self.cart.remove(product_id);
        debug!(product_id = %product_id, removed, "remove_from_cart");

        self.persist();
        if removed {
            self.notify(CartEvent::Removed { product_id });
        }
        removed
    }

    /// Empties the cart.
    pub fn clear_cart(&mut self) {
        debug!(items = self.cart.item_count(), "clear_cart");
        self.cart.clear();
        self.persist();
        self.notify(CartEvent::Cleared);
    }

    /// Deletes the persisted record and empties the cart.
    ///
    /// If the record cannot be deleted, an empty record is written over it
    /// so the forgotten cart does not come back on the next hydrate.
    pub fn forget(&mut self) {
        self.cart.clear();
        match self.storage.remove_item(&self.key) {
            Ok(()) => {
                info!(key = %self.key, "Persisted cart removed");
                self.last_persist_error = None;
            }
            Err(e) => {
                warn!(
                    key = %self.key,
                    error = %e,
                    "Failed to remove persisted cart, overwriting with an empty record"
                );
                self.persist();
            }
        }
        self.notify(CartEvent::Forgotten);
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn items(&self) -> &[CartLineItem] {
        self.cart.items()
    }

    /// Sum of quantities.
    pub fn total_count(&self) -> u64 {
        self.cart.total_count()
    }

    /// Sum of `price * quantity`.
    pub fn total_amount(&self) -> Money {
        self.cart.total_amount()
    }

    pub fn totals(&self) -> CartTotals {
        self.cart.totals()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Message of the last failed mirror write, cleared by the next success.
    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    /// True when the mirror is believed to match memory.
    pub fn is_persisted(&self) -> bool {
        self.last_persist_error.is_none()
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Registers `listener`, called after every completed mutation.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&CartEvent, &Cart) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Drops a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Writes the whole cart under the key. Failures are logged and kept.
    fn persist(&mut self) {
        let result = serde_json::to_string(&self.cart)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                self.storage
                    .set_item(&self.key, &json)
                    .map_err(|e| e.to_string())
            });

        match result {
            Ok(()) => {
                self.last_persist_error = None;
            }
            Err(e) => {
                error!(
                    key = %self.key,
                    error = %e,
                    "Failed to persist cart; keeping in-memory state"
                );
                self.last_persist_error = Some(e);
            }
        }
    }

    fn notify(&mut self, event: CartEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event, &self.cart);
        }
    }
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("cart", &self.cart)
            .field("hydration", &self.hydration)
            .field("listeners", &self.listeners.len())
            .field("last_persist_error", &self.last_persist_error)
            .finish()
    }
}

// =============================================================================
// Shared Handle
// =============================================================================

/// Thread-safe handle for hosts that share one store between handlers.
///
/// ## Thread Safety
/// Uses `Arc<Mutex<CartStore>>`; each closure runs to completion under
/// the lock, so no two operations interleave. A poisoned lock is
/// recovered, since every operation leaves the cart consistent before it
/// can panic in a subscriber.
#[derive(Debug, Clone)]
pub struct SharedCartStore {
    store: Arc<Mutex<CartStore>>,
}

impl SharedCartStore {
    pub fn new(store: CartStore) -> Self {
        SharedCartStore {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Executes a function with read access to the store.
    ///
    /// ## Usage
    /// ```rust
    /// use shopcart_store::{CartStore, MemoryStorage, SharedCartStore};
    ///
    /// let shared = SharedCartStore::new(CartStore::new(MemoryStorage::new(), "cart-items"));
    /// let totals = shared.with_store(|s| s.totals());
    /// assert_eq!(totals.total_count, 0);
    /// ```
    pub fn with_store<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CartStore) -> R,
    {
        f(&self.lock())
    }

    /// Executes a function with write access to the store.
    pub fn with_store_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut CartStore) -> R,
    {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, CartStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{StorageError, StorageResult};
    use crate::storage::MemoryStorage;

    const KEY: &str = "cart-items";

    fn product(id: u64, price_cents: i64, stock: u32) -> ProductRef {
        ProductRef::new(
            ProductId::new(id),
            format!("Product {}", id),
            Money::from_cents(price_cents),
            stock,
        )
    }

    /// Backend that can be told to fail individual operations.
    #[derive(Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        fail_reads: bool,
        fail_writes: bool,
        fail_removes: bool,
    }

    fn denied() -> StorageError {
        StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ))
    }

    impl Storage for FlakyStorage {
        fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
            if self.fail_reads {
                return Err(denied());
            }
            self.inner.get_item(key)
        }

        fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
            if self.fail_writes {
                return Err(denied());
            }
            self.inner.set_item(key, value)
        }

        fn remove_item(&mut self, key: &str) -> StorageResult<()> {
            if self.fail_removes {
                return Err(denied());
            }
            self.inner.remove_item(key)
        }
    }

    #[test]
    fn test_starts_empty_without_record() {
        let store = CartStore::new(MemoryStorage::new(), KEY);
        assert_eq!(store.hydration(), &Hydration::Empty);
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_read_failure_starts_empty() {
        let storage = FlakyStorage {
            fail_reads: true,
            ..Default::default()
        };
        let store = CartStore::new(storage, KEY);

        assert!(store.cart().is_empty());
        assert!(matches!(
            store.hydration(),
            Hydration::Discarded {
                reason: HydrationFailure::ReadFailed(_)
            }
        ));
    }

    #[test]
    fn test_forget_overwrites_record_when_remove_fails() {
        let inner = MemoryStorage::new();
        let storage = FlakyStorage {
            inner: inner.clone(),
            fail_removes: true,
            ..Default::default()
        };
        let mut store = CartStore::new(storage, KEY);
        store.add_to_cart(&product(1, 1000, 5), 2).unwrap();

        store.forget();
        assert!(store.cart().is_empty());
        assert!(store.is_persisted());
        assert_eq!(inner.get_item(KEY).unwrap().as_deref(), Some("[]"));

        let reopened = CartStore::new(inner, KEY);
        assert_eq!(reopened.hydration(), &Hydration::Loaded { items: 0 });
        assert!(reopened.cart().is_empty());
    }

    #[test]
    fn test_forget_reports_error_when_overwrite_also_fails() {
        let inner = MemoryStorage::new();
        let mut store = CartStore::new(
            FlakyStorage {
                inner: inner.clone(),
                ..Default::default()
            },
            KEY,
        );
        store.add_to_cart(&product(1, 1000, 5), 2).unwrap();

        store.storage = Box::new(FlakyStorage {
            inner: inner.clone(),
            fail_writes: true,
            fail_removes: true,
            ..Default::default()
        });
        store.forget();

        assert!(store.cart().is_empty());
        assert!(!store.is_persisted());
        assert!(store.last_persist_error().unwrap().contains("denied"));
    }

    #[test]
    fn test_every_mutation_persists_full_record() {
        let storage = MemoryStorage::new();
        let mut store = CartStore::new(storage.clone(), KEY);

        store.add_to_cart(&product(1, 1000, 5), 3).unwrap();
        let raw = storage.get_item(KEY).unwrap().unwrap();
        assert_eq!(
            raw,
            r#"[{"id":1,"name":"Product 1","price":1000,"stockQuantity":5,"quantity":3}]"#
        );

        store.remove_from_cart(ProductId::new(1));
        assert_eq!(storage.get_item(KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_add_one_defaults_to_single_unit() {
        let mut store = CartStore::new(MemoryStorage::new(), KEY);
        let outcome = store.add_one(&product(1, 1000, 5)).unwrap();
        assert_eq!(outcome.quantity, 1);
    }

    #[test]
    fn test_rejected_add_does_not_touch_storage() {
        let storage = MemoryStorage::new();
        let mut store = CartStore::new(storage.clone(), KEY);

        assert!(store.add_to_cart(&product(1, 1000, 0), 1).is_err());
        assert!(store.add_to_cart(&product(1, 1000, 5), 0).is_err());
        assert_eq!(storage.get_item(KEY).unwrap(), None);
    }

    #[test]
    fn test_subscribers_see_events_in_order() {
        let seen: Arc<Mutex<Vec<(CartEvent, u64)>>> = Arc::default();
        let mut store = CartStore::new(MemoryStorage::new(), KEY);

        let sink = Arc::clone(&seen);
        let id = store.subscribe(move |event, cart| {
            sink.lock().unwrap().push((event.clone(), cart.total_count()));
        });

        store.add_to_cart(&product(1, 1000, 5), 2).unwrap();
        store.remove_from_cart(ProductId::new(99)); // no-op: no event
        store.remove_from_cart(ProductId::new(1));
        store.clear_cart();

        assert!(store.unsubscribe(id));
        store.add_to_cart(&product(2, 1000, 5), 1).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(matches!(seen[0], (CartEvent::Added { .. }, 2)));
        assert_eq!(
            seen[1],
            (
                CartEvent::Removed {
                    product_id: ProductId::new(1)
                },
                0
            )
        );
        assert_eq!(seen[2], (CartEvent::Cleared, 0));
        assert!(!store.unsubscribe(id));
    }

    #[test]
    fn test_shared_store_serializes_access() {
        let shared = SharedCartStore::new(CartStore::new(MemoryStorage::new(), KEY));
        let handles: Vec<_> = (1..=4u64)
            .map(|id| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        shared
                            .with_store_mut(|s| s.add_to_cart(&product(id, 100, 100), 1))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let totals = shared.with_store(|s| s.totals());
        assert_eq!(totals.item_count, 4);
        assert_eq!(totals.total_count, 40);
    }
}
