//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A quotation that is off by a paisa per line item is off by rupees     │
//! │  by the time GST, freight, and margin have compounded.                 │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    ₹50,000.00 = 5_000_000 paise, and every calculation stays exact.    │
//! │    Where division must round, we round once, explicitly.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use meridian_core::money::Money;
//!
//! // Create from paise (preferred)
//! let price = Money::from_paise(109_900); // ₹1,099.00
//!
//! // Arithmetic operations
//! let doubled = price * 2;
//! let total = price + Money::from_paise(50_000);
//!
//! // NEVER do this:
//! // let bad = Money::from_float(1099.0); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::GstRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (paise for INR).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for losses and margin shortfalls
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// Every monetary value in the system flows through this type: vendor prices,
/// target prices, GST amounts, freight, cost-sheet lines, net margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use meridian_core::money::Money;
    ///
    /// let price = Money::from_paise(109_900); // Represents ₹1,099.00
    /// assert_eq!(price.paise(), 109_900);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from major and minor units (rupees and paise).
    ///
    /// ## Example
    /// ```rust
    /// use meridian_core::money::Money;
    ///
    /// let price = Money::from_rupees(1099, 50); // ₹1,099.50
    /// assert_eq!(price.paise(), 109_950);
    ///
    /// let negative = Money::from_rupees(-5, 50); // -₹5.50
    /// assert_eq!(negative.paise(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_rupees(-5, 50)` = -₹5.50, not -₹4.50
    #[inline]
    pub const fn from_rupees(rupees: i64, paise: i64) -> Self {
        if rupees < 0 {
            Money(rupees * 100 - paise)
        } else {
            Money(rupees * 100 + paise)
        }
    }

    /// Returns the value in paise (smallest currency unit).
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (rupees) portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (paise) portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
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

    /// Calculates GST on this amount at the given slab rate.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`. The +5000 rounds the
    /// half-paisa boundary up; the slab rates in use (0/5/12/18/28 on
    /// whole-paise bases) divide evenly far more often than not, so the
    /// rounding path is the exception rather than the rule.
    ///
    /// ## Example
    /// ```rust
    /// use meridian_core::money::Money;
    /// use meridian_core::types::GstRate;
    ///
    /// let base = Money::from_paise(100_000); // ₹1,000.00
    /// let gst = base.calculate_gst(GstRate::Eighteen);
    /// assert_eq!(gst.paise(), 18_000); // ₹180.00
    /// ```
    pub fn calculate_gst(&self, rate: GstRate) -> Money {
        self.percentage(rate.bps())
    }

    /// Returns the given share of this amount, in basis points.
    ///
    /// Used for GST slabs, percentage margins, and admin overhead.
    /// 1 basis point = 0.01%; 1850 bps = 18.5%.
    ///
    /// ## Example
    /// ```rust
    /// use meridian_core::money::Money;
    ///
    /// let subtotal = Money::from_paise(10_000);
    /// assert_eq!(subtotal.percentage(2_000).paise(), 2_000); // 20%
    /// ```
    pub fn percentage(&self, bps: u32) -> Money {
        // i128 prevents overflow on large amounts
        let share = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money::from_paise(share as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use meridian_core::money::Money;
    ///
    /// let unit_price = Money::from_paise(29_900); // ₹299.00
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.paise(), 89_700); // ₹897.00
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and logs. The frontend formats for display
/// (lakh/crore grouping, locale) from the raw paise value.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
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

/// Multiplication by integer (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let m = Money::from_paise(109_900);
        assert_eq!(m.paise(), 109_900);
        assert_eq!(m.rupees(), 1099);
        assert_eq!(m.paise_part(), 0);
    }

    #[test]
    fn test_from_rupees_negative() {
        let m = Money::from_rupees(-5, 50);
        assert_eq!(m.paise(), -550);
        assert_eq!(m.rupees(), -5);
        assert_eq!(m.paise_part(), 50);
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(250);
        assert_eq!((a + b).paise(), 1250);
        assert_eq!((a - b).paise(), 750);
        assert_eq!((a * 3).paise(), 3000);

        let mut c = a;
        c += b;
        assert_eq!(c.paise(), 1250);
        c -= b;
        assert_eq!(c.paise(), 1000);
    }

    #[test]
    fn test_calculate_gst_exact() {
        // ₹1,000.00 at 18% = ₹180.00, no rounding needed
        let gst = Money::from_paise(100_000).calculate_gst(GstRate::Eighteen);
        assert_eq!(gst.paise(), 18_000);
    }

    #[test]
    fn test_calculate_gst_rounds_half_up() {
        // 99 paise at 5% = 4.95 paise, rounds to 5
        let gst = Money::from_paise(99).calculate_gst(GstRate::Five);
        assert_eq!(gst.paise(), 5);
    }

    #[test]
    fn test_calculate_gst_zero_rate() {
        let gst = Money::from_paise(123_456).calculate_gst(GstRate::Zero);
        assert!(gst.is_zero());
    }

    #[test]
    fn test_percentage() {
        // 12.5% of ₹80.00 = ₹10.00
        assert_eq!(Money::from_paise(8_000).percentage(1_250).paise(), 1_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_paise(109_950).to_string(), "₹1099.50");
        assert_eq!(Money::from_paise(-550).to_string(), "-₹5.50");
    }

    #[test]
    fn test_large_amounts_no_overflow() {
        // ₹50 crore at 28% GST
        let big = Money::from_paise(50_000_000_000);
        let gst = big.calculate_gst(GstRate::TwentyEight);
        assert_eq!(gst.paise(), 14_000_000_000);
    }
}
