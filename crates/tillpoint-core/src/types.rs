//! # Domain Types
//!
//! Core domain types used throughout Tillpoint.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Store       │   │    Register     │   │    Product      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  code "001"     │   │  code "R1"      │   │  sku (business) │       │
//! │  │  name, address  │   │  store_id (FK)  │   │  price_cents    │       │
//! │  └─────────────────┘   └─────────────────┘   │  tax_rate_bps   │       │
//! │                                              └─────────────────┘       │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  Transaction    │   │ TransactionLine │   │ TransactionKind │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  snapshots      │   │  Sale           │       │
//! │  │  code (ledger)  │   │  signed qty     │   │  Refund         │       │
//! │  │  totals (cents) │   │  signed amounts │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations, opaque to callers
//! - Business code: (store code, register code, transaction code) -
//!   human-readable, printed on receipts, keyed in at the till

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::quantity::Quantity;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 500 bps = 5.00%, 825 bps = 8.25%
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Store & Register
// =============================================================================

/// A physical store. Provisioned at setup time, never deleted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Store {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Short business code embedded in transaction codes (e.g. "001").
    pub code: String,

    /// Display name shown on receipts.
    pub name: String,

    /// Street address for the receipt header.
    pub address: Option<String>,

    /// Phone number for the receipt header.
    pub phone: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// A till within a store. The register code is unique per store, not
/// globally, so "R1" can exist in every store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Register {
    pub id: String,
    pub store_id: String,

    /// Short code embedded in transaction codes (e.g. "R1").
    pub code: String,

    pub name: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// Price and tax rate are copied into transaction lines at posting time
/// (snapshot pattern), so later edits never alter committed history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier, unique across the catalog.
    pub sku: String,

    /// Barcode (EAN-13, UPC-A, etc.). Unique when present.
    pub barcode: Option<String>,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Optional category for reporting ("produce", "dairy", ...).
    pub category: Option<String>,

    /// Price in cents (smallest currency unit). Never negative.
    pub price_cents: i64,

    /// Tax rate in basis points (500 = 5%).
    pub tax_rate_bps: u32,

    /// Whether product is active (soft delete). Inactive products cannot be
    /// sold but remain referenced by historical lines.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the tax rate.
    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// Per-store stock level for one product, in milliunits.
///
/// This is the only contended mutable state in the system. The posting
/// engine mutates it exclusively through relative deltas inside the atomic
/// unit; levels may go negative (oversell is a stock-accuracy problem for
/// reporting, not a reason to block the lane).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryLevel {
    pub store_id: String,
    pub product_id: String,
    pub quantity_millis: i64,
    pub updated_at: DateTime<Utc>,
}

impl InventoryLevel {
    /// Returns the level as a Quantity.
    #[inline]
    pub fn quantity(&self) -> Quantity {
        Quantity::from_millis(self.quantity_millis)
    }
}

// =============================================================================
// Transaction Kind
// =============================================================================

/// The kind of a ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// A completed sale. Quantities and amounts are non-negative.
    Sale,
    /// A reversal of (part of) a prior sale. Quantities and amounts are
    /// negative mirrors of the original. A refund can never be refunded.
    Refund,
}

impl TransactionKind {
    #[inline]
    pub const fn is_sale(&self) -> bool {
        matches!(self, TransactionKind::Sale)
    }

    #[inline]
    pub const fn is_refund(&self) -> bool {
        matches!(self, TransactionKind::Refund)
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A committed ledger transaction (sale or refund).
///
/// ## Code Lifecycle
/// `code` is None only inside the write transaction that creates the row:
/// the insert obtains the ledger-assigned sequence, the code is generated
/// from it and written back before commit. No committed transaction is ever
/// observable without a code.
///
/// ## Invariants
/// - `total_cents = subtotal_cents + tax_total_cents`
/// - Sale: all three totals >= 0. Refund: all three <= 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Transaction {
    pub id: String,

    /// Human-readable ledger code: `YYYYMMDD-STORE-REG-HHMM-SEQ`.
    pub code: Option<String>,

    pub kind: TransactionKind,
    pub store_id: String,
    pub register_id: String,

    /// The authenticated cashier who posted this transaction.
    pub cashier_id: String,

    /// Cashier display name at posting time (snapshot).
    pub cashier_name: String,

    pub subtotal_cents: i64,
    pub tax_total_cents: i64,
    pub total_cents: i64,

    /// Recorded payment label ("cash", "card", ...). Never authorized here.
    pub payment_method: String,

    /// For refunds: the sale being reversed. Always None on sales.
    pub reference_transaction_id: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Transaction {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn tax_total(&self) -> Money {
        Money::from_cents(self.tax_total_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Transaction Line
// =============================================================================

/// A line in a committed transaction.
/// Uses the snapshot pattern to freeze product data at posting time.
///
/// Sign convention: `quantity_millis`, `line_total_cents` and `tax_cents`
/// are positive on sale lines and negative on refund lines, while
/// `unit_price_cents` is always the original non-negative unit price.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransactionLine {
    pub id: String,
    pub transaction_id: String,
    pub product_id: String,

    /// SKU at posting time (frozen).
    pub sku_snapshot: String,

    /// Barcode at posting time (frozen).
    pub barcode_snapshot: Option<String>,

    /// Product name at posting time (frozen).
    pub name_snapshot: String,

    /// Category at posting time (frozen).
    pub category_snapshot: Option<String>,

    /// Quantity in milliunits. Negative on refund lines.
    pub quantity_millis: i64,

    /// Unit price in cents at posting time (frozen, non-negative).
    pub unit_price_cents: i64,

    /// Line total before tax. `unit_price × quantity`, cent-rounded.
    pub line_total_cents: i64,

    /// Tax for this line. Sign matches the quantity.
    pub tax_cents: i64,

    /// For refund lines: the original sale line being reversed. The
    /// cumulative refund bound sums committed refund quantities over it.
    pub reference_line_id: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl TransactionLine {
    #[inline]
    pub fn quantity(&self) -> Quantity {
        Quantity::from_millis(self.quantity_millis)
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }

    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_cents(self.tax_cents)
    }
}

// =============================================================================
// Cashier
// =============================================================================

/// The authenticated principal posting a transaction.
///
/// Authentication happens upstream (HTTP middleware); the engine receives
/// the already-verified identity and denormalizes the name into the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cashier {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Unit Tests
// =============================================================================
