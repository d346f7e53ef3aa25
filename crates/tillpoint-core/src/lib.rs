//! # tillpoint-core: Pure Business Logic for Tillpoint
//!
//! This crate is the **heart** of Tillpoint. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Tillpoint Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 HTTP / auth layer (external)                    │   │
//! │  │   routes requests, authenticates the cashier principal          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                tillpoint-engine (posting engine)                │   │
//! │  │    post_sale, post_refund, lookups, receipts, print relay       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ tillpoint-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ quantity  │  │   code    │  │   │
//! │  │   │  Product  │  │   Money   │  │ Quantity  │  │ txn code  │  │   │
//! │  │   │Transaction│  │  TaxCalc  │  │ milliunit │  │ formatter │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 tillpoint-db (storage layer)                    │   │
//! │  │          SQLite queries, migrations, repositories               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Store, Register, Product, Transaction, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`quantity`] - Fixed-point quantities so weighed goods stay integral
//! - [`code`] - Transaction code formatting
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Arithmetic**: Cents for money, milliunits for quantities
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use tillpoint_core::money::Money;
//! use tillpoint_core::quantity::Quantity;
//! use tillpoint_core::types::TaxRate;
//!
//! // Price a line: 3 units of a $2.99 product taxed at 5%
//! let unit_price = Money::from_cents(299);
//! let line_total = unit_price.line_total(Quantity::from_units(3));
//! assert_eq!(line_total.cents(), 897);
//!
//! let tax = line_total.calculate_tax(TaxRate::from_bps(500));
//! assert_eq!(tax.cents(), 45);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod code;
pub mod error;
pub mod money;
pub mod quantity;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tillpoint_core::Money` instead of
// `use tillpoint_core::money::Money`

pub use code::transaction_code;
pub use error::ValidationError;
pub use money::Money;
pub use quantity::Quantity;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single sale or refund request.
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
pub const MAX_TRANSACTION_LINES: usize = 200;

/// Maximum length of a recorded payment method label.
///
/// Payment methods are opaque labels here ("cash", "card", "voucher");
/// authorization is someone else's job.
pub const MAX_PAYMENT_METHOD_LEN: usize = 40;
