//! # Checkout Drafts
//!
//! Turns a cart into the payload the order service's batch endpoint
//! accepts. Nothing here submits anything.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart (client)                                                          │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  OrderDraft::from_cart(user_id, &cart) ← THIS MODULE                    │
//! │      │   • user_id must be non-zero                                     │
//! │      │   • cart must not be empty                                       │
//! │      │   • at most 50 line items                                        │
//! │      ▼                                                                  │
//! │  draft.to_request() → { user_id, order_items: [{product_id, quantity}] }│
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  HTTP client (out of this workspace) → POST /orders/batch_create/       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Prices are not sent; the order service charges its own current price.
//! `expected_total` records what the cart displayed so a caller can
//! detect a price change.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::ProductId;
use crate::validation::{validate_order_size, validate_user_id};

// =============================================================================
// Order Number
// =============================================================================

/// Order reference in the order service's format:
/// `ORD` + `%Y%m%d%H%M%S` + 6 uppercase characters of a v4 UUID.
///
/// ```rust
/// use shopcart_core::OrderNumber;
///
/// let no = OrderNumber::generate();
/// assert!(no.as_str().starts_with("ORD"));
/// assert_eq!(no.as_str().len(), 23);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct OrderNumber(String);

impl OrderNumber {
    const PREFIX: &'static str = "ORD";
    const SUFFIX_LEN: usize = 6;

    /// Generates a number from the local clock and a random UUID.
    pub fn generate() -> Self {
        Self::generate_at(Local::now(), Uuid::new_v4())
    }

    /// Deterministic form of [`generate`](Self::generate).
    pub fn generate_at(now: DateTime<Local>, nonce: Uuid) -> Self {
        let suffix: String = nonce
            .to_string()
            .chars()
            .take(Self::SUFFIX_LEN)
            .collect::<String>()
            .to_uppercase();
        OrderNumber(format!(
            "{}{}{}",
            Self::PREFIX,
            now.format("%Y%m%d%H%M%S"),
            suffix
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Order Draft
// =============================================================================

/// One requested line of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A validated, not-yet-submitted order built from a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDraft {
    pub reference: OrderNumber,
    #[ts(type = "number")]
    pub user_id: u64,
    pub order_items: Vec<OrderLine>,
    /// Cart total at the time the draft was built.
    pub expected_total: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Body of the batch order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOrderRequest<'a> {
    pub user_id: u64,
    pub order_items: &'a [OrderLine],
}

impl OrderDraft {
    /// Builds a draft from the current cart contents.
    ///
    /// ## Errors
    /// - `user_id == 0`: validation error
    /// - empty cart: [`CoreError::EmptyCart`]
    /// - more than [`MAX_ORDER_ITEMS`](crate::MAX_ORDER_ITEMS) line items:
    ///   validation error
    pub fn from_cart(user_id: u64, cart: &Cart) -> CoreResult<Self> {
        validate_user_id(user_id)?;
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        validate_order_size(cart.item_count())?;

        let order_items = cart
            .items()
            .iter()
            .map(|item| OrderLine {
                product_id: item.id,
                quantity: item.quantity,
            })
            .collect();

        Ok(OrderDraft {
            reference: OrderNumber::generate(),
            user_id,
            order_items,
            expected_total: cart.total_amount(),
            created_at: Utc::now(),
        })
    }

    pub fn to_request(&self) -> BatchOrderRequest<'_> {
        BatchOrderRequest {
            user_id: self.user_id,
            order_items: &self.order_items,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductRef;
    use crate::{ValidationError, MAX_ORDER_ITEMS};
    use chrono::TimeZone;

    fn cart_with(n: u64) -> Cart {
        let mut cart = Cart::new();
        for id in 1..=n {
            let product = ProductRef::new(
                ProductId::new(id),
                format!("P{}", id),
                Money::from_cents(100),
                10,
            );
            cart.add(&product, 2).unwrap();
        }
        cart
    }

    #[test]
    fn test_order_number_format() {
        let now = Local.with_ymd_and_hms(2026, 3, 9, 14, 5, 7).unwrap();
        let nonce = Uuid::parse_str("a1b2c3d4-0000-4000-8000-000000000000").unwrap();

        let no = OrderNumber::generate_at(now, nonce);
        assert_eq!(no.as_str(), "ORD20260309140507A1B2C3");
    }

    #[test]
    fn test_draft_from_cart() {
        let cart = cart_with(3);
        let draft = OrderDraft::from_cart(7, &cart).unwrap();

        assert_eq!(draft.user_id, 7);
        assert_eq!(draft.order_items.len(), 3);
        assert_eq!(draft.order_items[0].product_id, ProductId::new(1));
        assert_eq!(draft.order_items[0].quantity, 2);
        assert_eq!(draft.expected_total, Money::from_cents(600));
    }

    #[test]
    fn test_request_body_shape() {
        let cart = cart_with(1);
        let draft = OrderDraft::from_cart(7, &cart).unwrap();

        let json = serde_json::to_value(draft.to_request()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"user_id": 7, "order_items": [{"product_id": 1, "quantity": 2}]})
        );
    }

    #[test]
    fn test_empty_cart_rejected() {
        let err = OrderDraft::from_cart(7, &Cart::new()).unwrap_err();
        assert!(matches!(err, CoreError::EmptyCart));
    }

    #[test]
    fn test_missing_user_rejected() {
        let err = OrderDraft::from_cart(0, &cart_with(1)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_oversized_cart_rejected() {
        let cart = cart_with(MAX_ORDER_ITEMS as u64 + 1);
        let err = OrderDraft::from_cart(7, &cart).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::TooMany { .. })
        ));

        assert!(OrderDraft::from_cart(7, &cart_with(MAX_ORDER_ITEMS as u64)).is_ok());
    }
}
