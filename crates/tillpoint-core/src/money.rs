//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In many retail systems:                                                │
//! │    $10.00 / 3 = $3.33 (×3 = $9.99)  → Lost $0.01!                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    1000 cents / 3 = 333 cents (×3 = 999 cents)                         │
//! │    We KNOW we lost 1 cent, and handle it explicitly                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tillpoint_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(1099); // $10.99
//!
//! // Arithmetic operations
//! let doubled = price * 2;            // $21.98
//! let total = price + Money::from_cents(500); // $15.99
//!
//! // NEVER do this:
//! // let bad = Money::from_float(10.99); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::quantity::Quantity;
use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Refund lines and refund totals are negative mirrors
///   of their originals, so the sign carries meaning through the ledger
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// Product.price_cents ──► line_total(quantity) ──► calculate_tax(rate)
///                                  │                        │
///                                  ▼                        ▼
///                         TransactionLine.line_total   TransactionLine.tax
///                                  │                        │
///                                  └────────┬───────────────┘
///                                           ▼
///                              Transaction subtotal / tax / total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use tillpoint_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    ///
    /// ## Why Cents?
    /// Using the smallest unit eliminates all floating-point concerns.
    /// The database, calculations, and API all use cents.
    /// Only display code converts to dollars.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Calculates tax on this amount, rounding half-up at cent precision.
    ///
    /// ## Implementation
    /// Integer math throughout: `(amount * bps + 5000) / 10000`.
    /// The +5000 provides the rounding (5000/10000 = 0.5). i128 intermediate
    /// prevents overflow on large amounts.
    ///
    /// ## Example
    /// ```rust
    /// use tillpoint_core::money::Money;
    /// use tillpoint_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(897); // $8.97
    /// let rate = TaxRate::from_bps(500);     // 5%
    ///
    /// let tax = subtotal.calculate_tax(rate);
    /// // $8.97 × 5% = $0.4485 → rounds to $0.45
    /// assert_eq!(tax.cents(), 45);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Multiplies a unit price by a fixed-point quantity, rounding half-up
    /// at cent precision.
    ///
    /// ## Why Quantity and Not i64?
    /// Weighed goods sell in fractional amounts (1.5 kg of apples). Quantity
    /// carries milliunits, so the line total is still pure integer math:
    /// `(price_cents * quantity_millis + 500) / 1000`.
    ///
    /// ## Example
    /// ```rust
    /// use tillpoint_core::money::Money;
    /// use tillpoint_core::quantity::Quantity;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    ///
    /// // Whole units: 3 × $2.99 = $8.97
    /// assert_eq!(unit_price.line_total(Quantity::from_units(3)).cents(), 897);
    ///
    /// // Fractional: 1.5 × $2.99 = $4.485 → $4.49
    /// assert_eq!(unit_price.line_total(Quantity::from_millis(1500)).cents(), 449);
    /// ```
    pub fn line_total(&self, quantity: Quantity) -> Money {
        let total = (self.0 as i128 * quantity.millis() as i128 + 500) / 1000;
        Money::from_cents(total as i64)
    }

    /// Prorates this amount by `part / whole` of a quantity, rounding half-up.
    ///
    /// Used for refund tax: the tax refunded for a partial-quantity refund is
    /// the original line's tax scaled by the refunded fraction. Refunding the
    /// full quantity returns exactly the original amount; the cent error on a
    /// partial refund is at most one.
    ///
    /// Returns zero when `whole` is zero (nothing was purchased, nothing to
    /// prorate).
    pub fn prorate(&self, part: Quantity, whole: Quantity) -> Money {
        if whole.millis() == 0 {
            return Money::zero();
        }
        let scaled = (self.0 as i128 * part.millis() as i128 + whole.millis() as i128 / 2)
            / whole.millis() as i128;
        Money::from_cents(scaled as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// Used on receipts, so keep the format stable: `$8.97`, `-$3.14`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (whole-unit quantities, split tenders).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Negation. Refund amounts are the negation of their sale counterparts.
impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-314)), "-$3.14");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!((-a).cents(), -1000);
    }

    #[test]
    fn test_tax_calculation_basic() {
        // $10.00 at 10% = $1.00
        let amount = Money::from_cents(1000);
        let rate = TaxRate::from_bps(1000);
        let tax = amount.calculate_tax(rate);
        assert_eq!(tax.cents(), 100);
    }

    #[test]
    fn test_tax_calculation_with_rounding() {
        // $8.97 at 5% = $0.4485 → rounds up to $0.45
        let amount = Money::from_cents(897);
        let rate = TaxRate::from_bps(500);
        assert_eq!(amount.calculate_tax(rate).cents(), 45);

        // $10.00 at 8.25% = $0.825 → $0.83
        let amount = Money::from_cents(1000);
        let rate = TaxRate::from_bps(825);
        assert_eq!(amount.calculate_tax(rate).cents(), 83);
    }

    #[test]
    fn test_line_total_whole_units() {
        let unit_price = Money::from_cents(299);
        let total = unit_price.line_total(Quantity::from_units(3));
        assert_eq!(total.cents(), 897);
    }

    #[test]
    fn test_line_total_fractional() {
        // 1.5 × $2.99 = $4.485 → $4.49
        let unit_price = Money::from_cents(299);
        assert_eq!(unit_price.line_total(Quantity::from_millis(1500)).cents(), 449);

        // 0.335 kg × $12.00/kg = $4.02
        let per_kilo = Money::from_cents(1200);
        assert_eq!(per_kilo.line_total(Quantity::from_millis(335)).cents(), 402);
    }

    #[test]
    fn test_prorate_partial_and_full() {
        // Original line: qty 3, tax 45¢. Refund 1 of 3 → 15¢.
        let tax = Money::from_cents(45);
        let one = tax.prorate(Quantity::from_units(1), Quantity::from_units(3));
        assert_eq!(one.cents(), 15);

        // Full refund restores the exact original tax.
        let full = tax.prorate(Quantity::from_units(3), Quantity::from_units(3));
        assert_eq!(full.cents(), 45);
    }

    #[test]
    fn test_prorate_rounds_half_up() {
        // 10¢ over qty 3, refund 1 → 3.33 → 3; refund 2 → 6.67 → 7
        let tax = Money::from_cents(10);
        assert_eq!(tax.prorate(Quantity::from_units(1), Quantity::from_units(3)).cents(), 3);
        assert_eq!(tax.prorate(Quantity::from_units(2), Quantity::from_units(3)).cents(), 7);
    }

    #[test]
    fn test_prorate_zero_whole() {
        let tax = Money::from_cents(45);
        assert_eq!(tax.prorate(Quantity::from_units(1), Quantity::zero()).cents(), 0);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(positive.is_positive());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }
}
