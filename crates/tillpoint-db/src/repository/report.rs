//! # Report Repository
//!
//! Read-only grouped aggregations over the ledger.
//!
//! ## Why No Branching On Kind
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │               Signed Rows Make Aggregation Trivial                      │
//! │                                                                         │
//! │  transactions                    transaction_lines                      │
//! │  ─────────────                   ─────────────────                      │
//! │  sale    total  942              sale    qty  3000   total  897        │
//! │  refund  total -314              refund  qty -1000   total -299        │
//! │                                                                         │
//! │  SUM(total_cents) = 628  ← net revenue, no CASE on kind needed         │
//! │  SUM(quantity_millis) = 2000 ← net units sold                          │
//! │                                                                         │
//! │  Sale/refund splits are still available via CASE when a report         │
//! │  wants them (daily summary shows both columns).                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

// =============================================================================
// Report Row Types
// =============================================================================

/// One day of a store's trading summary.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DailySummary {
    /// Calendar day, `YYYY-MM-DD` (UTC).
    pub day: String,

    /// Number of sale transactions.
    pub sale_count: i64,

    /// Number of refund transactions.
    pub refund_count: i64,

    /// Sum of sale totals only (positive).
    pub gross_cents: i64,

    /// Sum of refund totals only (negative or zero).
    pub refunded_cents: i64,

    /// Net tax across both kinds.
    pub tax_cents: i64,

    /// Net revenue: gross + refunded.
    pub net_cents: i64,
}

/// Net movement of one product over a period.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductSales {
    pub product_id: String,

    /// SKU as captured on the lines (reporting stays stable against
    /// later catalog edits).
    pub sku_snapshot: String,

    /// Name as captured on the lines.
    pub name_snapshot: String,

    /// Net quantity sold, in milliunits (refunds subtract).
    pub quantity_millis: i64,

    /// Net pre-tax revenue in cents.
    pub revenue_cents: i64,
}

/// One cashier's totals over a period.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CashierSummary {
    pub cashier_id: String,

    /// Name as denormalized onto the transactions.
    pub cashier_name: String,

    /// Sales plus refunds posted.
    pub transaction_count: i64,

    /// Net revenue in cents.
    pub net_cents: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for read-only reporting queries.
///
/// Never writes. Periods are half-open ranges `[from, to)` in UTC.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Daily trading summary for a store over a period, oldest day first.
    pub async fn daily_summary(
        &self,
        store_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<DailySummary>> {
        debug!(store_id = %store_id, %from, %to, "Running daily summary");

        let rows = sqlx::query_as::<_, DailySummary>(
            r#"
            SELECT date(created_at) AS day,
                   COALESCE(SUM(CASE WHEN kind = 'sale' THEN 1 ELSE 0 END), 0) AS sale_count,
                   COALESCE(SUM(CASE WHEN kind = 'refund' THEN 1 ELSE 0 END), 0) AS refund_count,
                   COALESCE(SUM(CASE WHEN kind = 'sale' THEN total_cents ELSE 0 END), 0) AS gross_cents,
                   COALESCE(SUM(CASE WHEN kind = 'refund' THEN total_cents ELSE 0 END), 0) AS refunded_cents,
                   COALESCE(SUM(tax_total_cents), 0) AS tax_cents,
                   COALESCE(SUM(total_cents), 0) AS net_cents
            FROM transactions
            WHERE store_id = ?1 AND created_at >= ?2 AND created_at < ?3
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(store_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Net product movement for a store over a period, best sellers first.
    pub async fn product_sales(
        &self,
        store_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: u32,
    ) -> DbResult<Vec<ProductSales>> {
        debug!(store_id = %store_id, %from, %to, "Running product sales report");

        let rows = sqlx::query_as::<_, ProductSales>(
            r#"
            SELECT l.product_id,
                   l.sku_snapshot,
                   l.name_snapshot,
                   COALESCE(SUM(l.quantity_millis), 0) AS quantity_millis,
                   COALESCE(SUM(l.line_total_cents), 0) AS revenue_cents
            FROM transaction_lines l
            INNER JOIN transactions t ON t.id = l.transaction_id
            WHERE t.store_id = ?1 AND t.created_at >= ?2 AND t.created_at < ?3
            GROUP BY l.product_id, l.sku_snapshot, l.name_snapshot
            ORDER BY quantity_millis DESC
            LIMIT ?4
            "#,
        )
        .bind(store_id)
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Per-cashier totals for a store over a period, highest net first.
    pub async fn cashier_summary(
        &self,
        store_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<CashierSummary>> {
        debug!(store_id = %store_id, %from, %to, "Running cashier summary");

        let rows = sqlx::query_as::<_, CashierSummary>(
            r#"
            SELECT cashier_id,
                   cashier_name,
                   COUNT(*) AS transaction_count,
                   COALESCE(SUM(total_cents), 0) AS net_cents
            FROM transactions
            WHERE store_id = ?1 AND created_at >= ?2 AND created_at < ?3
            GROUP BY cashier_id, cashier_name
            ORDER BY net_cents DESC
            "#,
        )
        .bind(store_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;
    use tillpoint_core::{Register, Store, Transaction, TransactionKind, TransactionLine};

    async fn test_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.catalog()
            .insert_store(&Store {
                id: "s-1".to_string(),
                code: "001".to_string(),
                name: "Test Store".to_string(),
                address: None,
                phone: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        db.catalog()
            .insert_register(&Register {
                id: "r-1".to_string(),
                store_id: "s-1".to_string(),
                code: "R1".to_string(),
                name: "Front".to_string(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        db.catalog()
            .insert_product(&tillpoint_core::Product {
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
            })
            .await
            .unwrap();

        db
    }

    async fn post(
        db: &Database,
        id: &str,
        seq: i64,
        kind: TransactionKind,
        totals: (i64, i64, i64),
        qty_millis: i64,
    ) {
        let (subtotal, tax, total) = totals;
        let txn = Transaction {
            id: id.to_string(),
            code: None,
            kind,
            store_id: "s-1".to_string(),
            register_id: "r-1".to_string(),
            cashier_id: "u-1".to_string(),
            cashier_name: "Jo".to_string(),
            subtotal_cents: subtotal,
            tax_total_cents: tax,
            total_cents: total,
            payment_method: "cash".to_string(),
            reference_transaction_id: None,
            created_at: Utc::now(),
        };
        let line = TransactionLine {
            id: format!("{}-l", id),
            transaction_id: id.to_string(),
            product_id: "p-1".to_string(),
            sku_snapshot: "APL-GALA".to_string(),
            barcode_snapshot: None,
            name_snapshot: "Gala Apples".to_string(),
            category_snapshot: None,
            quantity_millis: qty_millis,
            unit_price_cents: 299,
            line_total_cents: subtotal,
            tax_cents: tax,
            reference_line_id: None,
            created_at: Utc::now(),
        };

        let ledger = db.ledger();
        let mut tx = db.begin().await.unwrap();
        ledger.insert_transaction(&mut tx, &txn).await.unwrap();
        ledger
            .assign_code(&mut tx, id, &format!("20260131-001-R1-1432-{:06}", seq))
            .await
            .unwrap();
        ledger.insert_lines(&mut tx, std::slice::from_ref(&line)).await.unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_reports_sum_signed_rows_without_branching() {
        let db = test_db().await;

        // A sale of 3 and a refund of 1 on the same day.
        post(&db, "t-1", 1, TransactionKind::Sale, (897, 45, 942), 3_000).await;
        post(&db, "t-2", 2, TransactionKind::Refund, (-299, -15, -314), -1_000).await;

        let from = Utc::now() - Duration::days(1);
        let to = Utc::now() + Duration::days(1);

        let daily = db.reports().daily_summary("s-1", from, to).await.unwrap();
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].sale_count, 1);
        assert_eq!(daily[0].refund_count, 1);
        assert_eq!(daily[0].gross_cents, 942);
        assert_eq!(daily[0].refunded_cents, -314);
        assert_eq!(daily[0].tax_cents, 30);
        assert_eq!(daily[0].net_cents, 628);

        let products = db
            .reports()
            .product_sales("s-1", from, to, 10)
            .await
            .unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].quantity_millis, 2_000);
        assert_eq!(products[0].revenue_cents, 598);

        let cashiers = db.reports().cashier_summary("s-1", from, to).await.unwrap();
        assert_eq!(cashiers.len(), 1);
        assert_eq!(cashiers[0].transaction_count, 2);
        assert_eq!(cashiers[0].net_cents, 628);
    }

    #[tokio::test]
    async fn test_period_is_half_open_and_store_scoped() {
        let db = test_db().await;
        post(&db, "t-1", 1, TransactionKind::Sale, (897, 45, 942), 3_000).await;

        // Period entirely in the past sees nothing.
        let from = Utc::now() - Duration::days(10);
        let to = Utc::now() - Duration::days(9);
        assert!(db
            .reports()
            .daily_summary("s-1", from, to)
            .await
            .unwrap()
            .is_empty());

        // Another store sees nothing.
        let from = Utc::now() - Duration::days(1);
        let to = Utc::now() + Duration::days(1);
        assert!(db
            .reports()
            .daily_summary("s-other", from, to)
            .await
            .unwrap()
            .is_empty());
    }
}
