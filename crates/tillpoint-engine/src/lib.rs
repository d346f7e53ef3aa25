//! # tillpoint-engine: Transaction Posting Engine
//!
//! The heart of the Tillpoint system: turns carts and refund requests into
//! committed, auditable ledger transactions.
//!
//! ## Module Organization
//!
//! - [`engine`] - The [`TransactionEngine`] facade and lookup surfaces
//! - [`sale`] - SALE posting (validate → price → atomic commit)
//! - [`refund`] - REFUND posting (bounds, negation, restock)
//! - [`receipt`] - Pure 40-column receipt rendering
//! - [`notify`] - Fire-and-forget print relay
//! - [`error`] - Engine error taxonomy and wire body
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tillpoint_db::{Database, DbConfig};
//! use tillpoint_engine::{LogEndpoint, PrintRelay, SaleRequest, TransactionEngine};
//!
//! let db = Database::new(DbConfig::new("tillpoint.db")).await?;
//! let printer = PrintRelay::spawn(LogEndpoint);
//! let engine = TransactionEngine::new(db, printer);
//!
//! let posted = engine.post_sale(&cashier, request).await?;
//! println!("{}", posted.receipt_text);
//! ```
//!
//! ## Design Invariants
//!
//! - A transaction's money and snapshots are immutable once committed;
//!   reversals are new REFUND transactions, never edits.
//! - Every posting is one SQLite write transaction: ledger rows, code
//!   backfill and inventory deltas commit together or not at all.
//! - Receipt rendering and print dispatch happen after commit and can
//!   never fail a posting.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod notify;
pub mod receipt;
pub mod refund;
pub mod sale;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use engine::{LedgerEntry, PostedTransaction, TransactionEngine};
pub use error::{EngineError, EngineResult, ErrorBody, ErrorDetail};
pub use notify::{
    LogEndpoint, PrintEndpoint, PrintHandle, PrintJob, PrintRelay, DEFAULT_QUEUE_CAPACITY,
};
pub use receipt::{render, ReceiptContext, RECEIPT_WIDTH};
pub use refund::{RefundLine, RefundRequest};
pub use sale::{SaleLine, SaleRequest};
