//! # Cart
//!
//! The in-memory cart: an ordered list of line items keyed by product id.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  UI Action                Cart Method            Effect                 │
//! │  ─────────                ───────────            ──────                 │
//! │                                                                         │
//! │  Add (new product) ──────► add() ──────────────► items.push(line)      │
//! │                                                                         │
//! │  Add (already carted) ───► add() ──────────────► line.qty =            │
//! │                                                   min(qty + n, stock)   │
//! │                                                                         │
//! │  Click Remove ───────────► remove() ───────────► items.retain(..)      │
//! │                                                                         │
//! │  Click Clear ────────────► clear() ────────────► items.clear()         │
//! │                                                                         │
//! │  Badge / Summary ────────► total_count()         (computed on read)    │
//! │                            total_amount()                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one line item per product id (insertion order preserved)
//! - `0 < quantity <= stock_quantity` for every line item
//! - `price > 0` for every line item
//! - The sum of line totals fits in a `Money`
//!
//! Totals are never stored; they are recomputed from the items on every
//! call.

use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{ProductId, ProductRef};
use crate::validation::{validate_price, validate_quantity};

// =============================================================================
// Line Item
// =============================================================================

/// One product entry in the cart.
///
/// This is also the element of the persisted record:
/// `{"id", "name", "price", "stockQuantity", "quantity"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLineItem {
    /// Product id (unique within the cart)
    pub id: ProductId,

    /// Product name at time of adding (frozen)
    pub name: String,

    /// Unit price in cents at time of adding (frozen)
    pub price: Money,

    /// Purchasable maximum, as last reported by the catalog
    pub stock_quantity: u32,

    /// Quantity in cart
    pub quantity: u32,
}

impl CartLineItem {
    /// Creates a line item from a product snapshot and quantity.
    ///
    /// The quantity is taken as-is; callers clamp before constructing.
    pub fn from_product(product: &ProductRef, quantity: u32) -> Self {
        CartLineItem {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            stock_quantity: product.stock_quantity,
            quantity,
        }
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }

    /// Unit price × quantity, or `None` if it does not fit in a `Money`.
    #[inline]
    pub fn checked_line_total(&self) -> Option<Money> {
        self.price.checked_multiply_quantity(self.quantity)
    }

    /// Checks the per-line invariant `0 < quantity <= stock_quantity`.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.quantity > 0 && self.quantity <= self.stock_quantity
    }
}

// =============================================================================
// Add Outcome
// =============================================================================

/// What an `add` call did to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AddOutcome {
    /// Resulting quantity of the line item.
    pub quantity: u32,
    /// True when the request was reduced to fit the stock snapshot.
    pub clamped: bool,
    /// True when a new line item was appended.
    pub inserted: bool,
}

// =============================================================================
// Normalization Report
// =============================================================================

/// Corrections applied while building a cart from untrusted line items
/// (a hydrated storage record).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normalization {
    /// Entries folded into an earlier entry with the same id.
    pub merged_duplicates: usize,
    /// Entries whose quantity was lowered to their stock snapshot.
    pub clamped: usize,
    /// Entries removed because no positive quantity fits, the price is
    /// not positive, or the line would overflow the cart total.
    pub dropped: usize,
}

impl Normalization {
    /// True when the input already satisfied every cart invariant.
    pub fn is_clean(&self) -> bool {
        self.merged_duplicates == 0 && self.clamped == 0 && self.dropped == 0
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// Serializes as a bare JSON array of line items. Deserializing goes
/// through [`Cart::from_line_items`], so a decoded cart always holds the
/// invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct Cart(Vec<CartLineItem>);

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart(Vec::new())
    }

    /// Builds a cart from line items that may break the cart invariants.
    ///
    /// ## Rules
    /// - Duplicate ids merge into the first occurrence (quantities summed)
    /// - Quantities above the stock snapshot are clamped
    /// - Entries with zero quantity, zero stock or a non-positive price
    ///   are dropped
    /// - Entries that would push the cart total past `i64::MAX` cents are
    ///   dropped
    pub fn from_line_items(raw: Vec<CartLineItem>) -> (Self, Normalization) {
        let mut report = Normalization::default();
        let mut items: Vec<CartLineItem> = Vec::with_capacity(raw.len());

        for entry in raw {
            if let Some(existing) = items.iter_mut().find(|i| i.id == entry.id) {
                existing.quantity = existing.quantity.saturating_add(entry.quantity);
                report.merged_duplicates += 1;
            } else {
                items.push(entry);
            }
        }

        let mut running = Money::zero();
        items.retain_mut(|item| {
            if item.quantity == 0 || item.stock_quantity == 0 || !item.price.is_positive() {
                report.dropped += 1;
                return false;
            }
            if item.quantity > item.stock_quantity {
                item.quantity = item.stock_quantity;
                report.clamped += 1;
            }
            match item.checked_line_total().and_then(|line| running.checked_add(line)) {
                Some(total) => {
                    running = total;
                    true
                }
                None => {
                    report.dropped += 1;
                    false
                }
            }
        });

        (Cart(items), report)
    }

    /// Adds a product or increases its quantity.
    ///
    /// ## Behavior
    /// - Already in cart: quantity becomes `min(existing + quantity, stock)`
    ///   and the stock snapshot is refreshed from `product`. Name and price
    ///   stay frozen from the first insertion.
    /// - Not in cart: appends a new line item, clamped to stock.
    ///
    /// Clamping is reported through [`AddOutcome::clamped`], never as an
    /// error.
    ///
    /// ## Errors
    /// - `quantity == 0` or `price <= 0`: validation error, cart unchanged
    /// - `product.stock_quantity == 0`: [`CoreError::OutOfStock`], cart unchanged
    /// - resulting total past `i64::MAX` cents: [`CoreError::AmountOverflow`],
    ///   cart unchanged
    pub fn add(&mut self, product: &ProductRef, quantity: u32) -> CoreResult<AddOutcome> {
        validate_quantity(quantity)?;
        validate_price(product.price)?;

        if !product.in_stock() {
            return Err(CoreError::OutOfStock {
                product_id: product.id,
            });
        }

        let stock = product.stock_quantity;
        let existing = self.0.iter().position(|i| i.id == product.id);

        let (requested, price) = match existing {
            Some(idx) => (self.0[idx].quantity.saturating_add(quantity), self.0[idx].price),
            None => (quantity, product.price),
        };
        let granted = requested.min(stock);

        let fits = price
            .checked_multiply_quantity(granted)
            .and_then(|line| self.checked_total_excluding(product.id)?.checked_add(line))
            .is_some();
        if !fits {
            return Err(CoreError::AmountOverflow {
                product_id: product.id,
            });
        }

        let outcome = AddOutcome {
            quantity: granted,
            clamped: granted < requested,
            inserted: existing.is_none(),
        };

        match existing {
            Some(idx) => {
                let item = &mut self.0[idx];
                item.quantity = granted;
                item.stock_quantity = stock;
            }
            None => self.0.push(CartLineItem::from_product(product, granted)),
        }

        Ok(outcome)
    }

    /// Sum of every line total except the one for `product_id`.
    fn checked_total_excluding(&self, product_id: ProductId) -> Option<Money> {
        self.0
            .iter()
            .filter(|i| i.id != product_id)
            .try_fold(Money::zero(), |acc, i| acc.checked_add(i.checked_line_total()?))
    }

    /// Removes the line item for `product_id`.
    ///
    /// Returns `false` (and leaves the cart unchanged) if it was not present.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let initial_len = self.0.len();
        self.0.retain(|i| i.id != product_id);
        self.0.len() != initial_len
    }

    /// Clears all items from the cart.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Line items in insertion order.
    pub fn items(&self) -> &[CartLineItem] {
        &self.0
    }

    /// Looks up the line item for a product.
    pub fn get(&self, product_id: ProductId) -> Option<&CartLineItem> {
        self.0.iter().find(|i| i.id == product_id)
    }

    /// Returns the number of distinct line items.
    pub fn item_count(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the cart has no line items.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of quantities across all line items.
    pub fn total_count(&self) -> u64 {
        self.0.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of `price * quantity` across all line items.
    ///
    /// Cannot overflow: `add` and `from_line_items` refuse any line that
    /// would push this past `i64::MAX` cents.
    pub fn total_amount(&self) -> Money {
        self.0.iter().map(CartLineItem::line_total).sum()
    }

    /// Computes the totals summary.
    pub fn totals(&self) -> CartTotals {
        CartTotals::from(self)
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items = Vec::<CartLineItem>::deserialize(deserializer)?;
        Ok(Cart::from_line_items(items).0)
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Cart totals summary for display and API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    pub item_count: usize,
    #[ts(type = "number")]
    pub total_count: u64,
    pub total_amount: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_count: cart.total_count(),
            total_amount: cart.total_amount(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
