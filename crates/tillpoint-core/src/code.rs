//! # Transaction Code Formatting
//!
//! Builds the human-readable ledger code printed on receipts and keyed in
//! at the till for refunds.
//!
//! ## Format
//! ```text
//! YYYYMMDD-STORECODE-REGCODE-HHMM-SEQ
//! 20260131-001-R1-1432-000042
//! │        │   │  │    └── ledger-assigned sequence, zero-padded to 6
//! │        │   │  └── local wall-clock hour+minute
//! │        │   └── register code
//! │        └── store code
//! └── local date
//! ```
//!
//! The formatter is a pure function and does NOT guarantee uniqueness by
//! itself: two registers posting in the same minute could collide if
//! sequences ever repeated. The ledger's unique index on `code` is the
//! arbiter; the sequence comes from the ledger insert, and a collision
//! surfaces as a retryable storage error, never a silent overwrite.

use chrono::{DateTime, Local};

/// Formats a transaction code from its parts.
///
/// `at` is the local wall-clock time of posting (receipts show till-local
/// time, not UTC). `seq` is the sequence assigned by the ledger insert;
/// values beyond six digits widen the field rather than truncate.
///
/// ## Example
/// ```rust
/// use chrono::{Local, TimeZone};
/// use tillpoint_core::code::transaction_code;
///
/// let at = Local.with_ymd_and_hms(2026, 1, 31, 14, 32, 5).unwrap();
/// let code = transaction_code("001", "R1", 42, at);
/// assert_eq!(code, "20260131-001-R1-1432-000042");
/// ```
pub fn transaction_code(
    store_code: &str,
    register_code: &str,
    seq: i64,
    at: DateTime<Local>,
) -> String {
    format!(
        "{}-{}-{}-{}-{:06}",
        at.format("%Y%m%d"),
        store_code,
        register_code,
        at.format("%H%M"),
        seq
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 1, 31, h, m, 7).unwrap()
    }

    #[test]
    fn test_basic_format() {
        let code = transaction_code("001", "R1", 42, at(14, 32));
        assert_eq!(code, "20260131-001-R1-1432-000042");
    }

    #[test]
    fn test_zero_padding_of_time_fields() {
        let code = transaction_code("001", "R1", 1, at(9, 5));
        assert_eq!(code, "20260131-001-R1-0905-000001");
    }

    #[test]
    fn test_sequence_padding_and_widening() {
        assert!(transaction_code("001", "R1", 7, at(12, 0)).ends_with("-000007"));
        // Sequences beyond six digits widen, never truncate.
        assert!(transaction_code("001", "R1", 1_234_567, at(12, 0)).ends_with("-1234567"));
    }

    #[test]
    fn test_shape_matches_ledger_contract() {
        // ^\d{8}-001-R1-\d{4}-\d{6}$ without pulling in a regex crate.
        let code = transaction_code("001", "R1", 42, at(14, 32));
        let parts: Vec<&str> = code.split('-').collect();

        assert_eq!(parts.len(), 5);
        assert_eq!(parts[0].len(), 8);
        assert!(parts[0].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[1], "001");
        assert_eq!(parts[2], "R1");
        assert_eq!(parts[3].len(), 4);
        assert!(parts[3].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[4].len(), 6);
        assert!(parts[4].chars().all(|c| c.is_ascii_digit()));
    }
}
