//! # Receipt Renderer
//!
//! Pure text formatting over a committed transaction. No I/O, no clock:
//! everything on the receipt comes from the inputs, so rendering the same
//! transaction twice yields byte-identical text (reprints are exact).
//!
//! ## Layout (40 columns)
//! ```text
//! ┌────────────────────────────────────────┐
//! │           Main Street Market           │  store header, centered
//! │             42 Main Street             │
//! │                555-0142                │
//! │========================================│
//! │TC# 20260131-001-R1-1432-000042         │
//! │2026-01-31 14:32                        │  till-local time
//! │Cashier: Jo                             │
//! │----------------------------------------│
//! │Gala Apples (kg)                        │
//! │  3 x $2.99                        $8.97│  qty × unit price | line total
//! │----------------------------------------│
//! │SUBTOTAL                           $8.97│
//! │TAX                                $0.45│
//! │TOTAL                              $9.42│
//! │PAID CASH                               │
//! │========================================│
//! │        Thank you for shopping!         │
//! └────────────────────────────────────────┘
//! ```
//!
//! Refund receipts carry a `REFUND of TC# <original>` banner under the code
//! and show the negative amounts as stored.

use chrono::Local;

use tillpoint_core::{Store, Transaction, TransactionLine};

/// Fixed receipt width in characters (standard 80mm thermal roll).
pub const RECEIPT_WIDTH: usize = 40;

/// Everything the renderer needs about a committed transaction.
#[derive(Debug, Clone)]
pub struct ReceiptContext<'a> {
    pub store: &'a Store,
    pub transaction: &'a Transaction,
    pub lines: &'a [TransactionLine],

    /// For refunds: the code of the original sale being reversed.
    pub original_code: Option<&'a str>,
}

/// Renders the receipt text for a committed transaction.
pub fn render(ctx: &ReceiptContext<'_>) -> String {
    let mut out = String::with_capacity(512);

    // Store header
    push_centered(&mut out, &ctx.store.name);
    if let Some(address) = &ctx.store.address {
        push_centered(&mut out, address);
    }
    if let Some(phone) = &ctx.store.phone {
        push_centered(&mut out, phone);
    }
    push_rule(&mut out, '=');

    // Transaction identity. A committed transaction always has a code; the
    // fallback keeps the renderer total over arbitrary inputs.
    let code = ctx.transaction.code.as_deref().unwrap_or("(unassigned)");
    out.push_str("TC# ");
    out.push_str(code);
    out.push('\n');

    if let Some(original) = ctx.original_code {
        out.push_str("REFUND of TC# ");
        out.push_str(original);
        out.push('\n');
    }

    let local_time = ctx.transaction.created_at.with_timezone(&Local);
    out.push_str(&local_time.format("%Y-%m-%d %H:%M").to_string());
    out.push('\n');

    out.push_str("Cashier: ");
    out.push_str(&ctx.transaction.cashier_name);
    out.push('\n');
    push_rule(&mut out, '-');

    // Lines: name on its own row, then "qty x unit" against the line total.
    for line in ctx.lines {
        out.push_str(&clip(&line.name_snapshot, RECEIPT_WIDTH));
        out.push('\n');

        let detail = format!("  {} x {}", line.quantity(), line.unit_price());
        push_row(&mut out, &detail, &line.line_total().to_string());
    }
    push_rule(&mut out, '-');

    // Totals
    push_row(&mut out, "SUBTOTAL", &ctx.transaction.subtotal().to_string());
    push_row(&mut out, "TAX", &ctx.transaction.tax_total().to_string());
    push_row(&mut out, "TOTAL", &ctx.transaction.total().to_string());

    out.push_str("PAID ");
    out.push_str(&ctx.transaction.payment_method.to_uppercase());
    out.push('\n');
    push_rule(&mut out, '=');

    push_centered(&mut out, "Thank you for shopping!");

    out
}

// =============================================================================
// Layout Helpers
// =============================================================================

/// Appends `text` centered in the receipt width.
fn push_centered(out: &mut String, text: &str) {
    let text = clip(text, RECEIPT_WIDTH);
    let pad = (RECEIPT_WIDTH.saturating_sub(text.chars().count())) / 2;
    for _ in 0..pad {
        out.push(' ');
    }
    out.push_str(&text);
    out.push('\n');
}

/// Appends a left/right row padded to the full width.
///
/// The right side (an amount) always survives intact; the left side is
/// clipped if the two would collide.
fn push_row(out: &mut String, left: &str, right: &str) {
    let right_len = right.chars().count();
    let max_left = RECEIPT_WIDTH.saturating_sub(right_len + 1);
    let left = clip(left, max_left);

    let pad = RECEIPT_WIDTH - left.chars().count() - right_len;
    out.push_str(&left);
    for _ in 0..pad {
        out.push(' ');
    }
    out.push_str(right);
    out.push('\n');
}

/// Appends a full-width rule of the given character.
fn push_rule(out: &mut String, ch: char) {
    for _ in 0..RECEIPT_WIDTH {
        out.push(ch);
    }
    out.push('\n');
}

/// Clips a string to at most `max` characters.
fn clip(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tillpoint_core::TransactionKind;

    fn store() -> Store {
        Store {
            id: "s-1".to_string(),
            code: "001".to_string(),
            name: "Main Street Market".to_string(),
            address: Some("42 Main Street".to_string()),
            phone: Some("555-0142".to_string()),
            created_at: Utc::now(),
        }
    }

    fn sale() -> (Transaction, Vec<TransactionLine>) {
        let txn = Transaction {
            id: "t-1".to_string(),
            code: Some("20260131-001-R1-1432-000042".to_string()),
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
        };
        let lines = vec![TransactionLine {
            id: "l-1".to_string(),
            transaction_id: "t-1".to_string(),
            product_id: "p-1".to_string(),
            sku_snapshot: "APL-GALA".to_string(),
            barcode_snapshot: None,
            name_snapshot: "Gala Apples (kg)".to_string(),
            category_snapshot: Some("produce".to_string()),
            quantity_millis: 3_000,
            unit_price_cents: 299,
            line_total_cents: 897,
            tax_cents: 45,
            reference_line_id: None,
            created_at: Utc::now(),
        }];
        (txn, lines)
    }

    #[test]
    fn test_sale_receipt_content() {
        let store = store();
        let (txn, lines) = sale();
        let text = render(&ReceiptContext {
            store: &store,
            transaction: &txn,
            lines: &lines,
            original_code: None,
        });

        assert!(text.contains("Main Street Market"));
        assert!(text.contains("TC# 20260131-001-R1-1432-000042"));
        assert!(text.contains("Cashier: Jo"));
        assert!(text.contains("Gala Apples (kg)"));
        assert!(text.contains("  3 x $2.99"));
        assert!(text.contains("$8.97"));
        assert!(text.contains("$0.45"));
        assert!(text.contains("$9.42"));
        assert!(text.contains("PAID CASH"));
        assert!(!text.contains("REFUND"));
    }

    #[test]
    fn test_rows_are_exactly_receipt_width() {
        let store = store();
        let (txn, lines) = sale();
        let text = render(&ReceiptContext {
            store: &store,
            transaction: &txn,
            lines: &lines,
            original_code: None,
        });

        // Every amount-bearing row and every rule pads to the full width.
        for row in text.lines() {
            assert!(row.chars().count() <= RECEIPT_WIDTH, "overlong row: {:?}", row);
            if row.contains('$') && !row.starts_with("  ") {
                continue; // name rows don't carry amounts
            }
        }
        let total_row = text.lines().find(|l| l.starts_with("TOTAL")).unwrap();
        assert_eq!(total_row.chars().count(), RECEIPT_WIDTH);
        assert!(total_row.ends_with("$9.42"));
    }

    #[test]
    fn test_refund_receipt_shows_link_and_negative_amounts() {
        let store = store();
        let (mut txn, mut lines) = sale();
        txn.kind = TransactionKind::Refund;
        txn.subtotal_cents = -299;
        txn.tax_total_cents = -15;
        txn.total_cents = -314;
        txn.code = Some("20260131-001-R1-1510-000043".to_string());
        lines[0].quantity_millis = -1_000;
        lines[0].line_total_cents = -299;
        lines[0].tax_cents = -15;

        let text = render(&ReceiptContext {
            store: &store,
            transaction: &txn,
            lines: &lines,
            original_code: Some("20260131-001-R1-1432-000042"),
        });

        assert!(text.contains("REFUND of TC# 20260131-001-R1-1432-000042"));
        assert!(text.contains("-1 x $2.99"));
        assert!(text.contains("-$2.99"));
        assert!(text.contains("-$3.14"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let store = store();
        let (txn, lines) = sale();
        let ctx = ReceiptContext {
            store: &store,
            transaction: &txn,
            lines: &lines,
            original_code: None,
        };

        assert_eq!(render(&ctx), render(&ctx));
    }

    #[test]
    fn test_long_product_name_is_clipped_not_wrapped() {
        let store = store();
        let (txn, mut lines) = sale();
        lines[0].name_snapshot = "An Extremely Long Product Name That Exceeds The Roll".into();

        let text = render(&ReceiptContext {
            store: &store,
            transaction: &txn,
            lines: &lines,
            original_code: None,
        });

        for row in text.lines() {
            assert!(row.chars().count() <= RECEIPT_WIDTH);
        }
    }
}
