//! # Ledger Repository
//!
//! Database operations for the append-only transaction ledger.
//!
//! ## Posting Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Atomic Posting Unit (one write tx)                     │
//! │                                                                         │
//! │  1. INSERT TRANSACTION (code NULL)                                     │
//! │     └── insert_transaction() → rowid = ledger-assigned sequence        │
//! │                                                                         │
//! │  2. BACKFILL CODE                                                      │
//! │     └── assign_code() ← code built from store/register/time/sequence   │
//! │                                                                         │
//! │  3. INSERT LINES                                                       │
//! │     └── insert_lines() ← product snapshots, signed amounts             │
//! │                                                                         │
//! │  4. ADJUST INVENTORY (CatalogRepository, same connection)              │
//! │                                                                         │
//! │  5. COMMIT ── only now is anything visible, code already set           │
//! │                                                                         │
//! │  Collision on the unique code index aborts the whole unit and          │
//! │  surfaces as a retryable storage error, never a silent overwrite.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no update or delete path for committed rows: the ledger is
//! append-only. Refunds are new rows linked by `reference_transaction_id`.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tillpoint_core::{Transaction, TransactionLine};

/// Repository for ledger database operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    // =========================================================================
    // Writes (inside the atomic posting unit)
    // =========================================================================

    /// Inserts a transaction row and returns the ledger-assigned sequence.
    ///
    /// The sequence is the SQLite rowid of the insert: unique, monotonically
    /// increasing, and exactly what the transaction code embeds. The row
    /// goes in with `code = NULL`; [`assign_code`](Self::assign_code) must
    /// run before the surrounding transaction commits.
    pub async fn insert_transaction(
        &self,
        conn: &mut SqliteConnection,
        txn: &Transaction,
    ) -> DbResult<i64> {
        debug!(id = %txn.id, kind = ?txn.kind, "Inserting ledger transaction");

        let result = sqlx::query(
            r#"
            INSERT INTO transactions (
                id, code, kind, store_id, register_id,
                cashier_id, cashier_name,
                subtotal_cents, tax_total_cents, total_cents,
                payment_method, reference_transaction_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&txn.id)
        .bind(&txn.code)
        .bind(txn.kind)
        .bind(&txn.store_id)
        .bind(&txn.register_id)
        .bind(&txn.cashier_id)
        .bind(&txn.cashier_name)
        .bind(txn.subtotal_cents)
        .bind(txn.tax_total_cents)
        .bind(txn.total_cents)
        .bind(&txn.payment_method)
        .bind(&txn.reference_transaction_id)
        .bind(txn.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Backfills the generated code onto a freshly inserted transaction.
    ///
    /// Runs inside the same write transaction as the insert, so no reader
    /// ever observes a committed row with a NULL code. A collision on the
    /// unique code index surfaces here as `DbError::UniqueViolation`.
    pub async fn assign_code(
        &self,
        conn: &mut SqliteConnection,
        transaction_id: &str,
        code: &str,
    ) -> DbResult<()> {
        debug!(id = %transaction_id, code = %code, "Assigning transaction code");

        let result = sqlx::query(
            r#"
            UPDATE transactions SET code = ?2
            WHERE id = ?1 AND code IS NULL
            "#,
        )
        .bind(transaction_id)
        .bind(code)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Transaction (uncoded)", transaction_id));
        }

        Ok(())
    }

    /// Bulk-inserts the lines of a transaction.
    ///
    /// ## Snapshot Pattern
    /// Each line carries the product's sku/barcode/name/category frozen at
    /// posting time; later catalog edits never rewrite history.
    pub async fn insert_lines(
        &self,
        conn: &mut SqliteConnection,
        lines: &[TransactionLine],
    ) -> DbResult<()> {
        debug!(count = lines.len(), "Inserting transaction lines");

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO transaction_lines (
                    id, transaction_id, product_id,
                    sku_snapshot, barcode_snapshot, name_snapshot, category_snapshot,
                    quantity_millis, unit_price_cents, line_total_cents, tax_cents,
                    reference_line_id, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                "#,
            )
            .bind(&line.id)
            .bind(&line.transaction_id)
            .bind(&line.product_id)
            .bind(&line.sku_snapshot)
            .bind(&line.barcode_snapshot)
            .bind(&line.name_snapshot)
            .bind(&line.category_snapshot)
            .bind(line.quantity_millis)
            .bind(line.unit_price_cents)
            .bind(line.line_total_cents)
            .bind(line.tax_cents)
            .bind(&line.reference_line_id)
            .bind(line.created_at)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Sums the quantity already refunded against one original sale line,
    /// in milliunits, as a positive number.
    ///
    /// Refund lines store negated quantities, hence the `-SUM`. Reading
    /// this inside the refund's own write transaction is what makes the
    /// cumulative bound hold against the latest committed state.
    pub async fn refunded_quantity_millis(
        &self,
        conn: &mut SqliteConnection,
        original_line_id: &str,
    ) -> DbResult<i64> {
        let refunded: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(-SUM(quantity_millis), 0)
            FROM transaction_lines
            WHERE reference_line_id = ?1
            "#,
        )
        .bind(original_line_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(refunded)
    }

    // =========================================================================
    // Reads (pool-backed)
    // =========================================================================

    /// Gets a transaction by its ID.
    pub async fn get_transaction(&self, id: &str) -> DbResult<Option<Transaction>> {
        let txn = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, code, kind, store_id, register_id,
                   cashier_id, cashier_name,
                   subtotal_cents, tax_total_cents, total_cents,
                   payment_method, reference_transaction_id, created_at
            FROM transactions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(txn)
    }

    /// Gets a transaction by its unique human-scannable code.
    ///
    /// This is the refund path: the cashier scans or keys in the code
    /// printed on the original receipt.
    pub async fn get_transaction_by_code(&self, code: &str) -> DbResult<Option<Transaction>> {
        let txn = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, code, kind, store_id, register_id,
                   cashier_id, cashier_name,
                   subtotal_cents, tax_total_cents, total_cents,
                   payment_method, reference_transaction_id, created_at
            FROM transactions
            WHERE code = ?1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(txn)
    }

    /// Gets all lines of a transaction in insertion order.
    pub async fn get_lines(&self, transaction_id: &str) -> DbResult<Vec<TransactionLine>> {
        let lines = sqlx::query_as::<_, TransactionLine>(
            r#"
            SELECT id, transaction_id, product_id,
                   sku_snapshot, barcode_snapshot, name_snapshot, category_snapshot,
                   quantity_millis, unit_price_cents, line_total_cents, tax_cents,
                   reference_line_id, created_at
            FROM transaction_lines
            WHERE transaction_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Counts ledger transactions (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Generates a new ledger entity ID.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use tillpoint_core::{Register, Store, TransactionKind};

    async fn test_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let store = Store {
            id: "s-1".to_string(),
            code: "001".to_string(),
            name: "Test Store".to_string(),
            address: None,
            phone: None,
            created_at: Utc::now(),
        };
        db.catalog().insert_store(&store).await.unwrap();

        let register = Register {
            id: "r-1".to_string(),
            store_id: "s-1".to_string(),
            code: "R1".to_string(),
            name: "Front".to_string(),
            created_at: Utc::now(),
        };
        db.catalog().insert_register(&register).await.unwrap();

        db
    }

    fn sale_txn(id: &str) -> Transaction {
        Transaction {
            id: id.to_string(),
            code: None,
            kind: TransactionKind::Sale,
            store_id: "s-1".to_string(),
            register_id: "r-1".to_string(),
            cashier_id: "u-1".to_string(),
            cashier_name: "Jo".to_string(),
            subtotal_cents: 897,
            tax_total_cents: 45,
            total_cents: 942,
            payment_method: "cash".to_string(),
            reference_transaction_id: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_sequence() {
        let db = test_db().await;
        let ledger = db.ledger();

        let mut tx = db.begin().await.unwrap();
        let seq1 = ledger.insert_transaction(&mut tx, &sale_txn("t-1")).await.unwrap();
        ledger.assign_code(&mut tx, "t-1", "20260131-001-R1-1432-000001").await.unwrap();
        let seq2 = ledger.insert_transaction(&mut tx, &sale_txn("t-2")).await.unwrap();
        ledger.assign_code(&mut tx, "t-2", "20260131-001-R1-1432-000002").await.unwrap();
        tx.commit().await.unwrap();

        assert!(seq2 > seq1);
        assert_eq!(ledger.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_lookup_by_code_and_id() {
        let db = test_db().await;
        let ledger = db.ledger();

        let mut tx = db.begin().await.unwrap();
        ledger.insert_transaction(&mut tx, &sale_txn("t-1")).await.unwrap();
        ledger.assign_code(&mut tx, "t-1", "20260131-001-R1-1432-000001").await.unwrap();
        tx.commit().await.unwrap();

        let by_code = ledger
            .get_transaction_by_code("20260131-001-R1-1432-000001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_code.id, "t-1");
        assert_eq!(by_code.kind, TransactionKind::Sale);
        assert_eq!(by_code.total_cents, 942);

        let by_id = ledger.get_transaction("t-1").await.unwrap().unwrap();
        assert_eq!(by_id.code.as_deref(), Some("20260131-001-R1-1432-000001"));

        assert!(ledger.get_transaction("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_code_is_unique_violation() {
        let db = test_db().await;
        let ledger = db.ledger();

        let mut tx = db.begin().await.unwrap();
        ledger.insert_transaction(&mut tx, &sale_txn("t-1")).await.unwrap();
        ledger.assign_code(&mut tx, "t-1", "20260131-001-R1-1432-000001").await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = db.begin().await.unwrap();
        ledger.insert_transaction(&mut tx, &sale_txn("t-2")).await.unwrap();
        let err = ledger
            .assign_code(&mut tx, "t-2", "20260131-001-R1-1432-000001")
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert!(err.is_code_collision());
    }

    #[tokio::test]
    async fn test_lines_roundtrip_and_refunded_sum() {
        let db = test_db().await;
        let ledger = db.ledger();
        let catalog = db.catalog();

        let product = tillpoint_core::Product {
            id: "p-1".to_string(),
            sku: "APL-GALA".to_string(),
            barcode: None,
            name: "Gala Apples".to_string(),
            category: None,
            price_cents: 299,
            tax_rate_bps: 500,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        catalog.insert_product(&product).await.unwrap();

        let line = TransactionLine {
            id: "l-1".to_string(),
            transaction_id: "t-1".to_string(),
            product_id: "p-1".to_string(),
            sku_snapshot: "APL-GALA".to_string(),
            barcode_snapshot: None,
            name_snapshot: "Gala Apples".to_string(),
            category_snapshot: None,
            quantity_millis: 3_000,
            unit_price_cents: 299,
            line_total_cents: 897,
            tax_cents: 45,
            reference_line_id: None,
            created_at: Utc::now(),
        };

        let mut tx = db.begin().await.unwrap();
        ledger.insert_transaction(&mut tx, &sale_txn("t-1")).await.unwrap();
        ledger.assign_code(&mut tx, "t-1", "20260131-001-R1-1432-000001").await.unwrap();
        ledger.insert_lines(&mut tx, std::slice::from_ref(&line)).await.unwrap();
        tx.commit().await.unwrap();

        // Nothing refunded yet.
        let mut tx = db.begin().await.unwrap();
        assert_eq!(
            ledger.refunded_quantity_millis(&mut tx, "l-1").await.unwrap(),
            0
        );
        tx.commit().await.unwrap();

        // A refund line with negated quantity linked back to l-1.
        let refund = Transaction {
            id: "t-2".to_string(),
            kind: TransactionKind::Refund,
            subtotal_cents: -299,
            tax_total_cents: -15,
            total_cents: -314,
            reference_transaction_id: Some("t-1".to_string()),
            ..sale_txn("t-2")
        };
        let refund_line = TransactionLine {
            id: "l-2".to_string(),
            transaction_id: "t-2".to_string(),
            quantity_millis: -1_000,
            line_total_cents: -299,
            tax_cents: -15,
            reference_line_id: Some("l-1".to_string()),
            ..line.clone()
        };

        let mut tx = db.begin().await.unwrap();
        ledger.insert_transaction(&mut tx, &refund).await.unwrap();
        ledger.assign_code(&mut tx, "t-2", "20260131-001-R1-1433-000002").await.unwrap();
        ledger.insert_lines(&mut tx, std::slice::from_ref(&refund_line)).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = db.begin().await.unwrap();
        assert_eq!(
            ledger.refunded_quantity_millis(&mut tx, "l-1").await.unwrap(),
            1_000
        );
        tx.commit().await.unwrap();

        let lines = ledger.get_lines("t-2").await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity_millis, -1_000);
        assert_eq!(lines[0].unit_price_cents, 299);
        assert_eq!(lines[0].reference_line_id.as_deref(), Some("l-1"));
    }
}
