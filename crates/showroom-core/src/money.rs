//! # Money Module
//!
//! Provides the `Money` type for rupee amounts.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE DECIMAL STRING PROBLEM                                             │
//! │                                                                         │
//! │  The backend sends amounts as decimal strings: "1000.50"               │
//! │  Summing them as floats drifts:                                         │
//! │    0.1 + 0.2 = 0.30000000000000004                                     │
//! │  And a malformed value ("abc") becomes NaN and poisons every total.    │
//! │                                                                         │
//! │  OUR SOLUTION: Parse once into integer paise                            │
//! │    "1000.50" → 100050 paise                                             │
//! │    "abc"     → 0 paise (parse_or_zero)                                  │
//! │    Sums, averages and trends never see a float NaN                      │
//! │    Sums saturate, so an absurd amount cannot wrap a total negative      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use showroom_core::money::Money;
//!
//! let price = Money::from_paise(150_000); // ₹1,500.00
//! let total = price + Money::parse_or_zero("250.25");
//! assert_eq!(total.paise(), 175_025);
//! assert_eq!(total.to_string(), "1750.25");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (1/100 of a rupee).
///
/// ## Design Decisions
/// - **i64 (signed)**: Deltas between months can be negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serialized as paise**: Metrics travel as integers, never floats
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees.saturating_mul(100))
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion (truncated toward zero).
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    // =========================================================================
    // Parsing
    // =========================================================================

    /// Parses a decimal amount string such as `"1000.50"`.
    ///
    /// ## Accepted Input
    /// ```text
    /// "1000"     → 100000 paise
    /// "1000.5"   → 100050 paise
    /// " 12.345 " → 1235 paise   (third fraction digit rounds half away from zero)
    /// "-40.10"   → -4010 paise
    /// ".5"       → 50 paise
    /// ```
    ///
    /// Anything else (empty, exponent notation, thousands separators,
    /// letters, overflow) is an error.
    pub fn parse_decimal(raw: &str) -> CoreResult<Money> {
        let invalid = || CoreError::InvalidDecimal(raw.to_string());
        let trimmed = raw.trim();

        let (negative, body) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (whole, fraction) = match body.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (body, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let mut paise: i64 = 0;
        for digit in whole.bytes() {
            paise = paise
                .checked_mul(10)
                .and_then(|p| p.checked_add(i64::from(digit - b'0')))
                .ok_or_else(invalid)?;
        }
        paise = paise.checked_mul(100).ok_or_else(invalid)?;

        let mut fraction_digits = fraction.bytes().map(|b| i64::from(b - b'0'));
        let tenths = fraction_digits.next().unwrap_or(0);
        let hundredths = fraction_digits.next().unwrap_or(0);
        let round_up = fraction_digits.next().is_some_and(|d| d >= 5);

        paise = paise
            .checked_add(tenths * 10 + hundredths + i64::from(round_up))
            .ok_or_else(invalid)?;

        Ok(Money(if negative { -paise } else { paise }))
    }

    /// Parses a decimal amount, treating anything unparseable as zero.
    ///
    /// This is the parser every aggregate uses so a single malformed
    /// `amount_received` can never turn a dashboard total into garbage.
    pub fn parse_or_zero(raw: &str) -> Money {
        Self::parse_decimal(raw).unwrap_or_default()
    }

    // =========================================================================
    // Arithmetic Helpers
    // =========================================================================

    /// Divides by a count, rounding half away from zero.
    ///
    /// Returns zero for a zero divisor.
    pub fn divide_rounded(&self, divisor: i64) -> Money {
        if divisor == 0 {
            return Money::zero();
        }
        let numerator = self.0 as i128;
        let divisor = divisor as i128;
        let magnitude = (2 * numerator.abs() + divisor.abs()) / (2 * divisor.abs());
        let negative = (numerator < 0) != (divisor < 0);
        Money(clamp_i64(if negative { -magnitude } else { magnitude }))
    }

    /// Rounds to whole rupees, half away from zero.
    pub fn round_to_rupees(&self) -> i64 {
        let magnitude = (i128::from(self.0).abs() + 50) / 100;
        clamp_i64(if self.0 < 0 { -magnitude } else { magnitude })
    }
}

fn clamp_i64(value: i128) -> i64 {
    value.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering (`"1000.50"`, `"-5.05"`).
///
/// For operator-facing text use [`crate::format::format_currency`].
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Saturating: totals pin at the `i64` bounds instead of wrapping.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
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
        let money = Money::from_paise(100_050);
        assert_eq!(money.paise(), 100_050);
        assert_eq!(money.rupees(), 1000);
        assert_eq!(money.paise_part(), 50);
        assert_eq!(Money::from_rupees(12).paise(), 1200);
    }

    #[test]
    fn test_parse_decimal_accepts_backend_amounts() {
        assert_eq!(Money::parse_decimal("1000.50").unwrap().paise(), 100_050);
        assert_eq!(Money::parse_decimal("1000").unwrap().paise(), 100_000);
        assert_eq!(Money::parse_decimal("1000.5").unwrap().paise(), 100_050);
        assert_eq!(Money::parse_decimal(" 75000.00 ").unwrap().paise(), 7_500_000);
        assert_eq!(Money::parse_decimal(".5").unwrap().paise(), 50);
        assert_eq!(Money::parse_decimal("5.").unwrap().paise(), 500);
        assert_eq!(Money::parse_decimal("-40.10").unwrap().paise(), -4010);
    }

    #[test]
    fn test_parse_decimal_rounds_extra_fraction_digits() {
        assert_eq!(Money::parse_decimal("12.345").unwrap().paise(), 1235);
        assert_eq!(Money::parse_decimal("12.344").unwrap().paise(), 1234);
        assert_eq!(Money::parse_decimal("-12.345").unwrap().paise(), -1235);
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        for raw in ["", " ", "abc", "12abc", "1,000", "1e3", "-", ".", "1.2.3", "NaN"] {
            assert!(Money::parse_decimal(raw).is_err(), "expected '{}' to fail", raw);
        }
        assert!(Money::parse_decimal("99999999999999999999").is_err());
    }

    #[test]
    fn test_parse_or_zero() {
        assert_eq!(Money::parse_or_zero("abc"), Money::zero());
        assert_eq!(Money::parse_or_zero(""), Money::zero());
        assert_eq!(Money::parse_or_zero("250.25").paise(), 25_025);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_paise(100_050).to_string(), "1000.50");
        assert_eq!(Money::from_paise(500).to_string(), "5.00");
        assert_eq!(Money::from_paise(-505).to_string(), "-5.05");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(500);

        assert_eq!((a + b).paise(), 1500);

        let total: Money = vec![a, b, Money::from_paise(-200)].into_iter().sum();
        assert_eq!(total.paise(), 1300);
    }

    #[test]
    fn test_divide_rounded() {
        assert_eq!(Money::from_paise(1000).divide_rounded(3).paise(), 333);
        assert_eq!(Money::from_paise(1001).divide_rounded(2).paise(), 501);
        assert_eq!(Money::from_paise(-1001).divide_rounded(2).paise(), -501);
        assert_eq!(Money::from_paise(1000).divide_rounded(0), Money::zero());
    }

    #[test]
    fn test_round_to_rupees() {
        assert_eq!(Money::from_paise(100_050).round_to_rupees(), 1001);
        assert_eq!(Money::from_paise(100_049).round_to_rupees(), 1000);
        assert_eq!(Money::from_paise(-150).round_to_rupees(), -2);
    }

    #[test]
    fn test_sums_saturate_instead_of_overflowing() {
        let huge = Money::parse_decimal("90000000000000000").unwrap();
        let total: Money = vec![huge, huge, Money::from_paise(1)].into_iter().sum();
        assert_eq!(total.paise(), i64::MAX);

        let mut running = Money::from_paise(i64::MIN + 1);
        running += Money::from_paise(-5);
        assert_eq!(running.paise(), i64::MIN);

        assert_eq!(Money::from_rupees(i64::MAX).paise(), i64::MAX);
    }

    #[test]
    fn test_rounding_at_the_bounds() {
        assert_eq!(Money::from_paise(i64::MAX).round_to_rupees(), i64::MAX / 100);
        assert_eq!(Money::from_paise(i64::MIN).round_to_rupees(), i64::MIN / 100);
        assert_eq!(Money::from_paise(i64::MIN).divide_rounded(-1).paise(), i64::MAX);
        assert_eq!(Money::from_paise(i64::MAX).divide_rounded(2).paise(), i64::MAX / 2 + 1);
    }

    #[test]
    fn test_is_negative() {
        assert!(!Money::zero().is_negative());
        assert!(Money::from_paise(-1).is_negative());
    }
}
