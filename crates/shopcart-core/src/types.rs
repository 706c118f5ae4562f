//! # Domain Types
//!
//! Product-side types the cart consumes.
//!
//! ## Snapshot Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   Catalog (backend)          ProductRef             CartLineItem        │
//! │  ─────────────────          ─────────────          ─────────────        │
//! │  id            ──────────►  id          ────────►  id                   │
//! │  name          ──────────►  name        ────────►  name      (frozen)   │
//! │  price         ──────────►  price       ────────►  price     (frozen)   │
//! │  stock_quantity ─────────►  stock_qty   ────────►  stock_qty (frozen)   │
//! │  description, keywords, status … (not carried)      quantity            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! The cart never re-fetches a product after insertion; later catalog
//! changes do not reach existing line items.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product Id
// =============================================================================

/// Catalog identifier of a product (the backend's integer primary key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct ProductId(#[ts(type = "number")] u64);

impl ProductId {
    #[inline]
    pub const fn new(id: u64) -> Self {
        ProductId(id)
    }

    #[inline]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProductId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(ProductId)
    }
}

// =============================================================================
// Product Reference
// =============================================================================

/// The fields of a catalog product the cart needs at add-time.
///
/// Supplied by the product lookup service; treated as an immutable
/// snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductRef {
    pub id: ProductId,
    pub name: String,
    /// Unit price in cents.
    pub price: Money,
    /// Units available at lookup time.
    pub stock_quantity: u32,
}

impl ProductRef {
    pub fn new(id: ProductId, name: impl Into<String>, price: Money, stock_quantity: u32) -> Self {
        ProductRef {
            id,
            name: name.into(),
            price,
            stock_quantity,
        }
    }

    /// Checks if any quantity of this product can be carted.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_parse_and_display() {
        let id: ProductId = " 17 ".parse().unwrap();
        assert_eq!(id, ProductId::new(17));
        assert_eq!(id.to_string(), "17");
        assert!("abc".parse::<ProductId>().is_err());
    }

    #[test]
    fn test_product_ref_json_shape() {
        let product = ProductRef::new(ProductId::new(1), "A", Money::from_cents(1000), 5);
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 1, "name": "A", "price": 1000, "stockQuantity": 5})
        );
    }

    #[test]
    fn test_in_stock() {
        let mut product = ProductRef::new(ProductId::new(1), "A", Money::from_cents(1000), 1);
        assert!(product.in_stock());
        product.stock_quantity = 0;
        assert!(!product.in_stock());
    }
}
