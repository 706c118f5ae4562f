//! # Validation Module
//!
//! Input checks that run before cart or checkout logic.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI (quantity spinner bounded by stock)                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (quantity > 0, price > 0, order size, user id)   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Order service (locks stock, rejects shortfalls)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shopcart_core::validation::{validate_quantity, validate_order_size};
//!
//! assert!(validate_quantity(3).is_ok());
//! assert!(validate_quantity(0).is_err());
//! assert!(validate_order_size(51).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_ORDER_ITEMS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a requested line quantity.
///
/// Only positivity is checked here. The stock bound is applied by
/// clamping, not by rejection.
pub fn validate_quantity(quantity: u32) -> ValidationResult<()> {
    if quantity == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a unit price. Free or negative prices never reach a cart.
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Validates the number of line items in an order submission.
pub fn validate_order_size(line_items: usize) -> ValidationResult<()> {
    if line_items > MAX_ORDER_ITEMS {
        return Err(ValidationError::TooMany {
            field: "items".to_string(),
            max: MAX_ORDER_ITEMS,
            actual: line_items,
        });
    }
    Ok(())
}

/// Validates the customer placing an order.
pub fn validate_user_id(user_id: u64) -> ValidationResult<()> {
    if user_id == 0 {
        return Err(ValidationError::Required {
            field: "user_id".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(u32::MAX).is_ok());
        assert!(matches!(
            validate_quantity(0),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::from_cents(1)).is_ok());
        assert!(validate_price(Money::zero()).is_err());
        assert!(matches!(
            validate_price(Money::from_cents(-100)),
            Err(ValidationError::MustBePositive { field }) if field == "price"
        ));
    }

    #[test]
    fn test_validate_order_size() {
        assert!(validate_order_size(0).is_ok());
        assert!(validate_order_size(MAX_ORDER_ITEMS).is_ok());
        assert!(matches!(
            validate_order_size(MAX_ORDER_ITEMS + 1),
            Err(ValidationError::TooMany { actual: 51, .. })
        ));
    }

    #[test]
    fn test_validate_user_id() {
        assert!(validate_user_id(7).is_ok());
        assert!(validate_user_id(0).is_err());
    }
}
