//! # Repository Module
//!
//! Database repository implementations for Tillpoint.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Posting Engine                                                        │
//! │       │                                                                 │
//! │       │  db.catalog().get_product("uuid")                              │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  CatalogRepository                                                     │
//! │  ├── get_product(&self, id)                                            │
//! │  ├── search_products(&self, query, limit)                              │
//! │  └── adjust_inventory(&self, conn, store, product, delta)              │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • SQL is isolated in one place                                        │
//! │  • Write methods that take &mut SqliteConnection compose inside        │
//! │    the engine's atomic posting transaction                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`catalog::CatalogRepository`] - Products, stores, registers, inventory
//! - [`ledger::LedgerRepository`] - Append-only transactions and lines
//! - [`report::ReportRepository`] - Read-only grouped aggregations

pub mod catalog;
pub mod ledger;
pub mod report;
