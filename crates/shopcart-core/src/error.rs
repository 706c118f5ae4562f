//! # Error Types
//!
//! Domain-specific error types for shopcart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopcart-core errors (this file)                                      │
//! │  ├── CoreError        - Cart / checkout rule violations                │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shopcart-store errors (separate crate)                                │
//! │  ├── StorageError     - Local storage backend failures                 │
//! │  └── StoreError       - Config, serialization, wraps the above         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → UI message           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Quantity clamping is not an error. A request that exceeds stock is
//! reduced and reported through `AddOutcome::clamped`.

use thiserror::Error;

use crate::types::ProductId;

// =============================================================================
// Core Error
// =============================================================================

/// Cart and checkout rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The product has no stock, so no positive quantity fits.
    ///
    /// ## When This Occurs
    /// - The catalog snapshot says `stockQuantity == 0`
    /// - The UI offered "Add to cart" on a sold-out product
    #[error("Product {product_id} is out of stock")]
    OutOfStock { product_id: ProductId },

    /// The line total or the cart total would not fit in a `Money`.
    ///
    /// ## When This Occurs
    /// - A catalog price far beyond any real product
    /// - A quantity that multiplies a large price past `i64::MAX` cents
    #[error("Cart total would overflow adding product {product_id}")]
    AmountOverflow { product_id: ProductId },

    /// A checkout was requested for a cart with no line items.
    #[error("Cart is empty")]
    EmptyCart,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// A collection holds more entries than allowed.
    #[error("{field} cannot have more than {max} entries (got {actual})")]
    TooMany {
        field: String,
        max: usize,
        actual: usize,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
