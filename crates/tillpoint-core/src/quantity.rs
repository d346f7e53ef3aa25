//! # Quantity Module
//!
//! Fixed-point quantities in milliunits (three decimal places).
//!
//! Weighed goods sell in fractional amounts: 1.5 kg of apples, 0.335 kg of
//! cheese. Storing quantities as integer milliunits keeps every line-total
//! and refund-bound calculation in pure integer arithmetic, exactly like
//! [`Money`](crate::money::Money) does for cents.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};

/// A quantity in milliunits. `1500` means 1.5 units.
///
/// Signed: refund lines carry the negated quantity of the sale line they
/// reverse, so ledger aggregations can sum across sale and refund rows
/// without branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Quantity(i64);

impl Quantity {
    /// Creates a quantity from milliunits.
    #[inline]
    pub const fn from_millis(millis: i64) -> Self {
        Quantity(millis)
    }

    /// Creates a quantity from whole units. `from_units(3)` = 3.000.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * 1000)
    }

    /// Returns the raw milliunit count.
    #[inline]
    pub const fn millis(&self) -> i64 {
        self.0
    }

    /// The zero quantity.
    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Quantity(self.0.abs())
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::zero()
    }
}

/// Displays whole quantities without decimals ("3") and fractional ones
/// with trailing zeros trimmed ("1.5", "0.335"). Receipt code relies on this.
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.0 / 1000;
        let frac = (self.0 % 1000).abs();
        let sign = if self.0 < 0 && units == 0 { "-" } else { "" };

        if frac == 0 {
            return write!(f, "{}{}", sign, units);
        }

        let mut frac_str = format!("{:03}", frac);
        while frac_str.ends_with('0') {
            frac_str.pop();
        }
        write!(f, "{}{}.{}", sign, units, frac_str)
    }
}

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

impl Neg for Quantity {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Quantity(-self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
