//! # tillpoint-db: Database Layer for Tillpoint
//!
//! This crate provides database access for the Tillpoint system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (catalog, ledger, reports)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tillpoint_db::{Database, DbConfig};
//!
//! // Create database with default config (runs migrations)
//! let config = DbConfig::new("path/to/tillpoint.db");
//! let db = Database::new(config).await?;
//!
//! // Pool-backed reads through repositories
//! let product = db.catalog().get_product_by_barcode("5901234123457").await?;
//!
//! // The posting engine composes repository methods inside one
//! // write transaction:
//! let mut tx = db.begin().await?;
//! let seq = db.ledger().insert_transaction(&mut tx, &txn).await?;
//! // ... code backfill, lines, inventory deltas ...
//! tx.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::ledger::LedgerRepository;
pub use repository::report::ReportRepository;
