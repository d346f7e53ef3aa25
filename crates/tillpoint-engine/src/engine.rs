//! # Transaction Engine
//!
//! The stateless facade callers hold: sale/refund posting, ledger lookups
//! and receipt re-rendering.
//!
//! ## Position in the System
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP / auth layer (external)                                          │
//! │     │  authenticated Cashier + validated request body                  │
//! │     ▼                                                                   │
//! │  TransactionEngine                                                     │
//! │     ├── post_sale ──────► sale::post_sale                              │
//! │     ├── post_refund ────► refund::post_refund                          │
//! │     ├── lookup / lookup_by_code ──► LedgerRepository                   │
//! │     └── receipt_text ───► receipt::render                              │
//! │                                                                         │
//! │  Holds: Database (pool) + PrintHandle. No other state between calls;   │
//! │  every piece of cross-request mutable state lives in SQLite.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use tillpoint_core::{Cashier, Transaction, TransactionLine};
use tillpoint_db::Database;

use crate::error::{EngineError, EngineResult};
use crate::notify::PrintHandle;
use crate::receipt::{self, ReceiptContext};
use crate::refund::{self, RefundRequest};
use crate::sale::{self, SaleRequest};

/// A committed posting: the transaction, its lines, and the rendered
/// receipt, exactly as returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct PostedTransaction {
    pub transaction: Transaction,
    pub lines: Vec<TransactionLine>,
    pub receipt_text: String,
}

/// A ledger lookup result.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    pub transaction: Transaction,
    pub lines: Vec<TransactionLine>,
}

/// The posting engine. Cheap to clone; safe to share across request
/// handlers.
#[derive(Debug, Clone)]
pub struct TransactionEngine {
    db: Database,
    printer: PrintHandle,
}

impl TransactionEngine {
    /// Creates an engine over an initialized database and a print handle.
    pub fn new(db: Database, printer: PrintHandle) -> Self {
        TransactionEngine { db, printer }
    }

    /// Posts a sale. See [`SaleRequest`] for the input shape.
    ///
    /// On success the transaction, its lines and the inventory decrements
    /// are all committed; on any error nothing is.
    pub async fn post_sale(
        &self,
        cashier: &Cashier,
        request: SaleRequest,
    ) -> EngineResult<PostedTransaction> {
        sale::post_sale(&self.db, &self.printer, cashier, request).await
    }

    /// Posts a refund against a prior sale. See [`RefundRequest`].
    pub async fn post_refund(
        &self,
        cashier: &Cashier,
        request: RefundRequest,
    ) -> EngineResult<PostedTransaction> {
        refund::post_refund(&self.db, &self.printer, cashier, request).await
    }

    /// Looks a transaction up by its opaque id.
    pub async fn lookup(&self, transaction_id: &str) -> EngineResult<LedgerEntry> {
        let transaction = self
            .db
            .ledger()
            .get_transaction(transaction_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Transaction", transaction_id))?;
        let lines = self.db.ledger().get_lines(&transaction.id).await?;

        Ok(LedgerEntry { transaction, lines })
    }

    /// Looks a transaction up by its human-scannable code (the refund-desk
    /// path: the code is printed on the original receipt).
    pub async fn lookup_by_code(&self, code: &str) -> EngineResult<LedgerEntry> {
        let transaction = self
            .db
            .ledger()
            .get_transaction_by_code(code)
            .await?
            .ok_or_else(|| EngineError::not_found("Transaction", code))?;
        let lines = self.db.ledger().get_lines(&transaction.id).await?;

        Ok(LedgerEntry { transaction, lines })
    }

    /// Re-renders the receipt of a committed transaction (reprints).
    pub async fn receipt_text(&self, transaction_id: &str) -> EngineResult<String> {
        let entry = self.lookup(transaction_id).await?;

        let store = self
            .db
            .catalog()
            .get_store(&entry.transaction.store_id)
            .await?
            .ok_or_else(|| {
                tillpoint_db::DbError::not_found("Store", &entry.transaction.store_id)
            })?;

        // Refunds print the original's code on the reprint too.
        let original_code = match &entry.transaction.reference_transaction_id {
            Some(original_id) => self
                .db
                .ledger()
                .get_transaction(original_id)
                .await?
                .and_then(|t| t.code),
            None => None,
        };

        Ok(receipt::render(&ReceiptContext {
            store: &store,
            transaction: &entry.transaction,
            lines: &entry.lines,
            original_code: original_code.as_deref(),
        }))
    }

    /// The underlying database handle, for collaborators that share the
    /// pool (reporting, provisioning).
    pub fn db(&self) -> &Database {
        &self.db
    }
}

// =============================================================================
// Integration Tests
// =============================================================================
