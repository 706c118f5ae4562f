//! # shopcart-core: Pure Cart Logic for the Storefront
//!
//! This crate holds the cart rules as pure functions with zero I/O
//! dependencies. Persistence lives one level up, in `shopcart-store`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Cart                                  │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI event handlers                            │   │
//! │  │    Product page ──► Add to cart ──► Cart drawer ──► Checkout    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             shopcart-store (CartStore + Storage)                │   │
//! │  │    mutate ──► persist mirror ──► notify subscribers             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shopcart-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ checkout  │  │   │
//! │  │   │ ProductRef│  │   Money   │  │   Cart    │  │OrderDraft │  │   │
//! │  │   │ ProductId │  │           │  │ LineItem  │  │OrderNumber│  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product references and identifiers
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart and line items, with stock clamping
//! - [`checkout`] - Order drafts built from a cart
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use shopcart_core::{Cart, Money, ProductId, ProductRef};
//!
//! let product = ProductRef::new(ProductId::new(1), "A", Money::from_cents(1000), 5);
//!
//! let mut cart = Cart::new();
//! cart.add(&product, 3).unwrap();
//! assert_eq!(cart.total_amount(), Money::from_cents(3000));
//!
//! // Re-adding clamps to the stock snapshot instead of failing
//! let outcome = cart.add(&product, 4).unwrap();
//! assert_eq!(outcome.quantity, 5);
//! assert!(outcome.clamped);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{AddOutcome, Cart, CartLineItem, CartTotals, Normalization};
pub use checkout::{BatchOrderRequest, OrderDraft, OrderLine, OrderNumber};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::{ProductId, ProductRef};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Quantity used when the caller does not ask for one.
pub const DEFAULT_ADD_QUANTITY: u32 = 1;

/// Maximum line items accepted by a single order submission.
///
/// ## Business Reason
/// The order service rejects batches larger than this, so a draft is
/// refused up front instead of failing at the API.
pub const MAX_ORDER_ITEMS: usize = 50;
