//! # REFUND Posting
//!
//! Quantity-bounded, auditable reversal of a prior sale.
//!
//! ## Posting Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       REFUND Posting Flow                               │
//! │                                                                         │
//! │  RefundRequest + Cashier                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. RESOLVE ORIGINAL (pool reads)                                      │
//! │     ├── transaction exists, kind == Sale (refunds are final)           │
//! │     ├── it has lines; every requested line id matches one of them      │
//! │     ├── entries naming the same line fold into one batch total         │
//! │     └── fast per-line bound: requested ≤ purchased                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. MONEY (negated mirrors)                                            │
//! │     ├── line_total = unit_price × qty, then negated                    │
//! │     └── tax = original tax prorated by refunded fraction, negated      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. ATOMIC UNIT                                                        │
//! │     ├── CUMULATIVE BOUND re-check against committed refunds            │
//! │     │   (read inside this write tx: two racing refunds cannot          │
//! │     │    both pass for quantities that together exceed purchased)      │
//! │     ├── insert refund transaction (reference → original)               │
//! │     ├── generate + backfill code (original's store/register codes)     │
//! │     ├── insert negated lines (reference_line_id → original line)       │
//! │     ├── increment inventory at the original's store (restock)          │
//! │     └── COMMIT                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  4. POST-COMMIT: receipt + print job                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Local, Utc};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use tillpoint_core::{
    transaction_code, Cashier, Money, Quantity, TaxRate, Transaction, TransactionKind,
    TransactionLine,
};
use tillpoint_db::{Database, DbError};

use crate::engine::PostedTransaction;
use crate::error::{EngineError, EngineResult};
use crate::notify::{PrintHandle, PrintJob};
use crate::receipt::{self, ReceiptContext};

/// A refund posting request, addressing the original sale by its opaque id.
/// (Callers that start from a scanned code resolve it via lookup first.)
#[derive(Debug, Clone, Deserialize)]
pub struct RefundRequest {
    pub original_transaction_id: String,
    pub lines: Vec<RefundLine>,
}

/// One requested reversal, addressing a line of the original sale.
#[derive(Debug, Clone, Deserialize)]
pub struct RefundLine {
    pub original_line_id: String,

    /// How much of the original line to reverse, in MILLIUNITS on the
    /// wire (`1000` is one unit). Positive; the engine applies the
    /// negation when it writes.
    pub quantity: Quantity,
}

// =============================================================================
// Money Helpers (pure)
// =============================================================================

/// Tax to refund for `requested` units of an original line.
///
/// Prorates the line's recorded tax by the refunded fraction, so a full
/// refund returns exactly the original tax and partial refunds stay within
/// one cent of it. Falls back to recomputing from the product's current
/// rate when the original quantity was zero (should not occur, handled
/// defensively), and to zero when no rate is available.
pub(crate) fn refund_tax(
    original: &TransactionLine,
    requested: Quantity,
    fallback_rate: Option<TaxRate>,
) -> Money {
    let purchased = original.quantity().abs();
    if !purchased.is_zero() {
        return original.tax().prorate(requested, purchased);
    }

    match fallback_rate {
        Some(rate) => original.unit_price().line_total(requested).calculate_tax(rate),
        None => Money::zero(),
    }
}

// =============================================================================
// Posting
// =============================================================================

/// One validated reversal, paired with its original line.
struct RefundItem {
    original: TransactionLine,
    quantity: Quantity,
    line_total: Money,
    tax: Money,
}

/// Posts a refund against a prior sale.
pub(crate) async fn post_refund(
    db: &Database,
    printer: &PrintHandle,
    cashier: &Cashier,
    request: RefundRequest,
) -> EngineResult<PostedTransaction> {
    // ------------------------------------------------------------------
    // 1. Resolve and validate against the original sale.
    // ------------------------------------------------------------------
    // Entries naming the same original line are folded together: the
    // quantity bound applies to the batch total per line, never to each
    // entry in isolation.
    let mut requested: Vec<(String, Quantity)> = Vec::with_capacity(request.lines.len());
    for line in &request.lines {
        if line.quantity.is_zero() {
            continue; // zero-quantity entries are dropped, not rejected
        }
        if !line.quantity.is_positive() {
            return Err(EngineError::invalid_reference(format!(
                "refund quantity for line {} must be positive",
                line.original_line_id
            )));
        }
        match requested
            .iter_mut()
            .find(|(id, _)| *id == line.original_line_id)
        {
            Some((_, quantity)) => *quantity += line.quantity,
            None => requested.push((line.original_line_id.clone(), line.quantity)),
        }
    }
    if requested.is_empty() {
        return Err(EngineError::EmptyRefund);
    }

    let ledger = db.ledger();
    let catalog = db.catalog();

    let original = ledger
        .get_transaction(&request.original_transaction_id)
        .await?
        .ok_or_else(|| {
            EngineError::not_found("Transaction", &request.original_transaction_id)
        })?;

    if !original.kind.is_sale() {
        return Err(EngineError::invalid_state(format!(
            "transaction {} is not a sale and cannot be refunded",
            original.code.as_deref().unwrap_or(&original.id)
        )));
    }

    let original_lines = ledger.get_lines(&original.id).await?;
    if original_lines.is_empty() {
        return Err(EngineError::invalid_state(format!(
            "sale {} has no lines",
            original.code.as_deref().unwrap_or(&original.id)
        )));
    }

    // ------------------------------------------------------------------
    // 2. Pair requests with original lines and compute refund money.
    // ------------------------------------------------------------------
    let mut items = Vec::with_capacity(requested.len());
    let mut subtotal = Money::zero();
    let mut tax_total = Money::zero();

    for (line_id, quantity) in requested {
        let matched = original_lines
            .iter()
            .find(|l| l.id == line_id)
            .ok_or_else(|| {
                EngineError::invalid_reference(format!(
                    "line {} is not part of the original sale",
                    line_id
                ))
            })?;

        let purchased = matched.quantity().abs();
        if quantity > purchased {
            return Err(EngineError::QuantityExceeded {
                line_id: matched.id.clone(),
                requested: quantity.to_string(),
                refundable: purchased.to_string(),
            });
        }

        // Fallback rate only matters for the defensive zero-quantity case.
        let fallback_rate = if matched.quantity_millis == 0 {
            catalog
                .get_product(&matched.product_id)
                .await?
                .map(|p| p.tax_rate())
        } else {
            None
        };

        let line_total = matched.unit_price().line_total(quantity);
        let tax = refund_tax(matched, quantity, fallback_rate);

        subtotal += line_total;
        tax_total += tax;

        items.push(RefundItem {
            original: matched.clone(),
            quantity,
            line_total,
            tax,
        });
    }

    // Store and register come from the original sale; their codes feed the
    // refund's own transaction code. Missing rows mean a corrupted ledger,
    // which is a storage failure, not a caller mistake.
    let store = catalog
        .get_store(&original.store_id)
        .await?
        .ok_or_else(|| DbError::not_found("Store", &original.store_id))?;
    let register = catalog
        .get_register(&original.register_id)
        .await?
        .ok_or_else(|| DbError::not_found("Register", &original.register_id))?;

    let now = Utc::now();
    let mut txn = Transaction {
        id: Uuid::new_v4().to_string(),
        code: None,
        kind: TransactionKind::Refund,
        store_id: store.id.clone(),
        register_id: register.id.clone(),
        cashier_id: cashier.id.clone(),
        cashier_name: cashier.name.clone(),
        subtotal_cents: (-subtotal).cents(),
        tax_total_cents: (-tax_total).cents(),
        total_cents: (-(subtotal + tax_total)).cents(),
        payment_method: original.payment_method.clone(),
        reference_transaction_id: Some(original.id.clone()),
        created_at: now,
    };

    let lines: Vec<TransactionLine> = items
        .iter()
        .map(|item| TransactionLine {
            id: Uuid::new_v4().to_string(),
            transaction_id: txn.id.clone(),
            product_id: item.original.product_id.clone(),
            sku_snapshot: item.original.sku_snapshot.clone(),
            barcode_snapshot: item.original.barcode_snapshot.clone(),
            name_snapshot: item.original.name_snapshot.clone(),
            category_snapshot: item.original.category_snapshot.clone(),
            quantity_millis: (-item.quantity).millis(),
            unit_price_cents: item.original.unit_price_cents,
            line_total_cents: (-item.line_total).cents(),
            tax_cents: (-item.tax).cents(),
            reference_line_id: Some(item.original.id.clone()),
            created_at: now,
        })
        .collect();

    debug!(
        original = %original.code.as_deref().unwrap_or(&original.id),
        lines = lines.len(),
        total_cents = txn.total_cents,
        "Posting refund"
    );

    // ------------------------------------------------------------------
    // 3. Atomic unit. The cumulative bound re-check reads inside this
    //    write transaction and precedes every write, so concurrent
    //    refunds cannot jointly exceed what was purchased.
    // ------------------------------------------------------------------
    let mut tx = db.begin().await?;

    for item in &items {
        let already = ledger
            .refunded_quantity_millis(&mut tx, &item.original.id)
            .await?;
        let purchased = item.original.quantity().abs();
        let refundable = purchased - Quantity::from_millis(already);

        if item.quantity > refundable {
            return Err(EngineError::QuantityExceeded {
                line_id: item.original.id.clone(),
                requested: item.quantity.to_string(),
                refundable: refundable.to_string(),
            });
        }
    }

    let seq = ledger.insert_transaction(&mut tx, &txn).await?;
    let code = transaction_code(&store.code, &register.code, seq, Local::now());
    ledger.assign_code(&mut tx, &txn.id, &code).await?;
    ledger.insert_lines(&mut tx, &lines).await?;

    for line in &lines {
        // Refund lines carry negative quantities; negating the delta
        // restocks the original's store.
        catalog
            .adjust_inventory(&mut tx, &store.id, &line.product_id, -line.quantity_millis)
            .await?;
    }

    tx.commit().await.map_err(DbError::from)?;
    txn.code = Some(code.clone());

    info!(
        code = %code,
        original = %original.code.as_deref().unwrap_or(&original.id),
        total_cents = txn.total_cents,
        "Refund committed"
    );

    // ------------------------------------------------------------------
    // 4. Post-commit: receipt + best-effort print notification.
    // ------------------------------------------------------------------
    let receipt_text = receipt::render(&ReceiptContext {
        store: &store,
        transaction: &txn,
        lines: &lines,
        original_code: original.code.as_deref(),
    });

    printer.dispatch(PrintJob {
        transaction_id: txn.id.clone(),
        code,
        store_code: store.code.clone(),
        receipt_text: receipt_text.clone(),
    });

    Ok(PostedTransaction {
        transaction: txn,
        lines,
        receipt_text,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn original_line(quantity_millis: i64, tax_cents: i64) -> TransactionLine {
        TransactionLine {
            id: "l-1".to_string(),
            transaction_id: "t-1".to_string(),
            product_id: "p-1".to_string(),
            sku_snapshot: "APL-GALA".to_string(),
            barcode_snapshot: None,
            name_snapshot: "Gala Apples".to_string(),
            category_snapshot: None,
            quantity_millis,
            unit_price_cents: 299,
            line_total_cents: 897,
            tax_cents,
            reference_line_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_refund_tax_prorates_original() {
        // Original: qty 3, tax 45¢. Refund 1 → 15¢.
        let line = original_line(3_000, 45);
        assert_eq!(refund_tax(&line, Quantity::from_units(1), None).cents(), 15);

        // Full refund restores the exact original tax.
        assert_eq!(refund_tax(&line, Quantity::from_units(3), None).cents(), 45);
    }

    #[test]
    fn test_refund_tax_zero_quantity_fallback() {
        // Defensive path: original quantity zero, recompute from the rate.
        let line = original_line(0, 0);
        let tax = refund_tax(&line, Quantity::from_units(1), Some(TaxRate::from_bps(500)));
        assert_eq!(tax.cents(), 15); // 2.99 × 5% → 0.1495 → 0.15

        // No rate available → zero, never a panic or a division by zero.
        assert_eq!(refund_tax(&line, Quantity::from_units(1), None).cents(), 0);
    }
}
