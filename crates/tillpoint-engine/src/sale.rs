//! # SALE Posting
//!
//! Turns a cart into a committed ledger transaction.
//!
//! ## Posting Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SALE Posting Flow                                │
//! │                                                                         │
//! │  SaleRequest + Cashier                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. VALIDATE (pool reads, no writes)                                   │
//! │     ├── cart not empty, quantities > 0, payment label sane             │
//! │     ├── store exists, register exists AND belongs to the store         │
//! │     └── every product exists and is active                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. PRICE (pure, tillpoint-core math)                                  │
//! │     └── line_total = price × qty; tax = line_total × rate              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. ATOMIC UNIT (one write transaction)                                │
//! │     ├── insert transaction (code NULL) → sequence                      │
//! │     ├── generate + backfill code                                       │
//! │     ├── insert lines (product snapshots, positive sign)                │
//! │     ├── decrement inventory per line (may go negative)                 │
//! │     └── COMMIT                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  4. POST-COMMIT (never fails the request)                              │
//! │     ├── render receipt text                                            │
//! │     └── dispatch print job (fire-and-forget)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Local, Utc};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use tillpoint_core::validation::{validate_payment_method, validate_quantity};
use tillpoint_core::{
    transaction_code, Cashier, Money, Product, Quantity, Transaction, TransactionKind,
    TransactionLine, MAX_TRANSACTION_LINES,
};
use tillpoint_db::{Database, DbError};

use crate::engine::PostedTransaction;
use crate::error::{EngineError, EngineResult};
use crate::notify::{PrintHandle, PrintJob};
use crate::receipt::{self, ReceiptContext};

/// A sale posting request. The cashier identity arrives separately, from
/// the caller's authentication layer.
#[derive(Debug, Clone, Deserialize)]
pub struct SaleRequest {
    pub store_id: String,
    pub register_id: String,

    /// Recorded tender label ("cash", "card", ...). Never authorized.
    pub payment_method: String,

    pub lines: Vec<SaleLine>,
}

/// One cart entry.
#[derive(Debug, Clone, Deserialize)]
pub struct SaleLine {
    pub product_id: String,

    /// Quantity in MILLIUNITS on the wire: `3000` is three units, `335`
    /// is 0.335 of a weighed unit. A bare `3` means 0.003 units.
    pub quantity: Quantity,
}

// =============================================================================
// Pricing (pure)
// =============================================================================

/// A cart line with its product resolved and its money computed.
#[derive(Debug, Clone)]
pub(crate) struct PricedLine {
    pub product: Product,
    pub quantity: Quantity,
    pub line_total: Money,
    pub tax: Money,
}

/// A fully priced cart.
#[derive(Debug, Clone)]
pub(crate) struct PricedCart {
    pub lines: Vec<PricedLine>,
    pub subtotal: Money,
    pub tax_total: Money,
    pub total: Money,
}

/// Prices a resolved cart. Pure function of the frozen product data.
pub(crate) fn price_cart(items: Vec<(Product, Quantity)>) -> PricedCart {
    let mut lines = Vec::with_capacity(items.len());
    let mut subtotal = Money::zero();
    let mut tax_total = Money::zero();

    for (product, quantity) in items {
        let line_total = product.price().line_total(quantity);
        let tax = line_total.calculate_tax(product.tax_rate());

        subtotal += line_total;
        tax_total += tax;

        lines.push(PricedLine {
            product,
            quantity,
            line_total,
            tax,
        });
    }

    PricedCart {
        lines,
        subtotal,
        tax_total,
        total: subtotal + tax_total,
    }
}

// =============================================================================
// Posting
// =============================================================================

/// Posts a sale: validates, prices, commits the atomic unit, then renders
/// the receipt and notifies the print relay.
pub(crate) async fn post_sale(
    db: &Database,
    printer: &PrintHandle,
    cashier: &Cashier,
    request: SaleRequest,
) -> EngineResult<PostedTransaction> {
    // ------------------------------------------------------------------
    // 1. Validate, resolving every reference before anything is written.
    // ------------------------------------------------------------------
    if request.lines.is_empty() {
        return Err(EngineError::EmptyCart);
    }
    if request.lines.len() > MAX_TRANSACTION_LINES {
        return Err(EngineError::invalid_reference(format!(
            "cart exceeds {} lines",
            MAX_TRANSACTION_LINES
        )));
    }
    validate_payment_method(&request.payment_method)?;

    let catalog = db.catalog();

    let store = catalog
        .get_store(&request.store_id)
        .await?
        .ok_or_else(|| {
            EngineError::invalid_reference(format!("unknown store: {}", request.store_id))
        })?;

    let register = catalog
        .get_register(&request.register_id)
        .await?
        .ok_or_else(|| {
            EngineError::invalid_reference(format!("unknown register: {}", request.register_id))
        })?;
    if register.store_id != store.id {
        return Err(EngineError::invalid_reference(format!(
            "register {} does not belong to store {}",
            register.code, store.code
        )));
    }

    let mut items = Vec::with_capacity(request.lines.len());
    for line in &request.lines {
        validate_quantity(line.quantity).map_err(|_| {
            EngineError::invalid_reference(format!(
                "quantity for product {} must be positive",
                line.product_id
            ))
        })?;

        let product = catalog.get_product(&line.product_id).await?.ok_or_else(|| {
            EngineError::invalid_reference(format!("unknown product: {}", line.product_id))
        })?;
        if !product.is_active {
            return Err(EngineError::invalid_reference(format!(
                "product {} is not active",
                product.sku
            )));
        }

        items.push((product, line.quantity));
    }

    // ------------------------------------------------------------------
    // 2. Price the cart (pure integer math in tillpoint-core).
    // ------------------------------------------------------------------
    let cart = price_cart(items);

    let now = Utc::now();
    let mut txn = Transaction {
        id: Uuid::new_v4().to_string(),
        code: None,
        kind: TransactionKind::Sale,
        store_id: store.id.clone(),
        register_id: register.id.clone(),
        cashier_id: cashier.id.clone(),
        cashier_name: cashier.name.clone(),
        subtotal_cents: cart.subtotal.cents(),
        tax_total_cents: cart.tax_total.cents(),
        total_cents: cart.total.cents(),
        payment_method: request.payment_method.trim().to_string(),
        reference_transaction_id: None,
        created_at: now,
    };

    let lines: Vec<TransactionLine> = cart
        .lines
        .iter()
        .map(|priced| TransactionLine {
            id: Uuid::new_v4().to_string(),
            transaction_id: txn.id.clone(),
            product_id: priced.product.id.clone(),
            sku_snapshot: priced.product.sku.clone(),
            barcode_snapshot: priced.product.barcode.clone(),
            name_snapshot: priced.product.name.clone(),
            category_snapshot: priced.product.category.clone(),
            quantity_millis: priced.quantity.millis(),
            unit_price_cents: priced.product.price_cents,
            line_total_cents: priced.line_total.cents(),
            tax_cents: priced.tax.cents(),
            reference_line_id: None,
            created_at: now,
        })
        .collect();

    debug!(
        store = %store.code,
        register = %register.code,
        lines = lines.len(),
        total_cents = txn.total_cents,
        "Posting sale"
    );

    // ------------------------------------------------------------------
    // 3. Atomic unit: ledger rows plus inventory decrements, one commit.
    // ------------------------------------------------------------------
    let ledger = db.ledger();
    let mut tx = db.begin().await?;

    let seq = ledger.insert_transaction(&mut tx, &txn).await?;
    let code = transaction_code(&store.code, &register.code, seq, Local::now());
    ledger.assign_code(&mut tx, &txn.id, &code).await?;
    ledger.insert_lines(&mut tx, &lines).await?;

    for line in &lines {
        catalog
            .adjust_inventory(&mut tx, &store.id, &line.product_id, -line.quantity_millis)
            .await?;
    }

    tx.commit().await.map_err(DbError::from)?;
    txn.code = Some(code.clone());

    info!(code = %code, total_cents = txn.total_cents, "Sale committed");

    // ------------------------------------------------------------------
    // 4. Post-commit: receipt + best-effort print notification.
    // ------------------------------------------------------------------
    let receipt_text = receipt::render(&ReceiptContext {
        store: &store,
        transaction: &txn,
        lines: &lines,
        original_code: None,
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

    fn product(price_cents: i64, tax_rate_bps: u32) -> Product {
        Product {
            id: "p-1".to_string(),
            sku: "APL-GALA".to_string(),
            barcode: None,
            name: "Gala Apples".to_string(),
            category: None,
            price_cents,
            tax_rate_bps,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_price_cart_reference_scenario() {
        // price 2.99, tax 5%, qty 3 → subtotal 8.97, tax 0.45, total 9.42
        let cart = price_cart(vec![(product(299, 500), Quantity::from_units(3))]);

        assert_eq!(cart.subtotal.cents(), 897);
        assert_eq!(cart.tax_total.cents(), 45);
        assert_eq!(cart.total.cents(), 942);
        assert_eq!(cart.lines[0].line_total.cents(), 897);
        assert_eq!(cart.lines[0].tax.cents(), 45);
    }

    #[test]
    fn test_price_cart_accumulates_lines() {
        let cart = price_cart(vec![
            (product(299, 500), Quantity::from_units(3)),
            (product(1200, 0), Quantity::from_millis(500)), // 0.5 kg at $12.00
        ]);

        assert_eq!(cart.subtotal.cents(), 897 + 600);
        assert_eq!(cart.tax_total.cents(), 45);
        assert_eq!(cart.total.cents(), cart.subtotal.cents() + 45);
    }

    #[test]
    fn test_price_cart_weighed_goods_round_half_up() {
        // 0.335 kg × $12.00/kg = $4.02
        let cart = price_cart(vec![(product(1200, 0), Quantity::from_millis(335))]);
        assert_eq!(cart.subtotal.cents(), 402);
    }

    #[test]
    fn test_total_is_subtotal_plus_tax() {
        let cart = price_cart(vec![
            (product(199, 825), Quantity::from_units(2)),
            (product(999, 1000), Quantity::from_units(1)),
        ]);
        assert_eq!(
            cart.total.cents(),
            cart.subtotal.cents() + cart.tax_total.cents()
        );
    }
}
