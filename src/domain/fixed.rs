//! Two-decimal fixed-point amounts.

use std::fmt;
use std::ops::{Add, Sub};

/// A decimal with exactly two fractional digits, stored as hundredths.
///
/// Used for money, weights in grams, and percentage rates so that CSV output
/// never shows binary floating point artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fixed2(i64);

impl Fixed2 {
    pub const ZERO: Fixed2 = Fixed2(0);

    pub const fn from_hundredths(hundredths: i64) -> Self {
        Fixed2(hundredths)
    }

    pub const fn from_units(units: i64) -> Self {
        Fixed2(units * 100)
    }

    pub const fn hundredths(self) -> i64 {
        self.0
    }

    /// Multiply by another two-decimal value, rounding half away from zero.
    pub fn times(self, rhs: Fixed2) -> Fixed2 {
        scaled_product(self, rhs, 100)
    }

    /// Take `percent` (itself a two-decimal value) of this amount.
    ///
    /// Rounds once, half away from zero.
    pub fn percent(self, percent: Fixed2) -> Fixed2 {
        scaled_product(self, percent, 10_000)
    }
}

/// `a * b / divisor` on the raw hundredths, rounded half away from zero.
fn scaled_product(a: Fixed2, b: Fixed2, divisor: i128) -> Fixed2 {
    let product = i128::from(a.0) * i128::from(b.0);
    let half = divisor / 2;
    let rounded = if product >= 0 {
        (product + half) / divisor
    } else {
        (product - half) / divisor
    };
    Fixed2(rounded as i64)
}

impl Add for Fixed2 {
    type Output = Fixed2;

    fn add(self, rhs: Fixed2) -> Fixed2 {
        Fixed2(self.0 + rhs.0)
    }
}

impl Sub for Fixed2 {
    type Output = Fixed2;

    fn sub(self, rhs: Fixed2) -> Fixed2 {
        Fixed2(self.0 - rhs.0)
    }
}

impl fmt::Display for Fixed2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Fixed2::from_hundredths(123_456).to_string(), "1234.56");
        assert_eq!(Fixed2::from_hundredths(5).to_string(), "0.05");
        assert_eq!(Fixed2::from_hundredths(-250).to_string(), "-2.50");
        assert_eq!(Fixed2::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_times_rounds_half_away_from_zero() {
        // 12.35 g * 7000.00 per g
        let value = Fixed2::from_hundredths(1235).times(Fixed2::from_units(7000));
        assert_eq!(value, Fixed2::from_units(86_450));

        let value = Fixed2::from_hundredths(105).times(Fixed2::from_hundredths(50));
        assert_eq!(value, Fixed2::from_hundredths(53));
    }

    #[test]
    fn test_percent() {
        // 1.50% of 1000.00
        let tax = Fixed2::from_units(1000).percent(Fixed2::from_hundredths(150));
        assert_eq!(tax, Fixed2::from_units(15));
    }

    #[test]
    fn test_percent_rounds_once() {
        // 1.50% of 1000.33 is 15.00495
        let tax = Fixed2::from_hundredths(100_033).percent(Fixed2::from_hundredths(150));
        assert_eq!(tax, Fixed2::from_hundredths(1500));

        // 1.50% of 0.33 is 0.00495
        let tax = Fixed2::from_hundredths(33).percent(Fixed2::from_hundredths(150));
        assert_eq!(tax, Fixed2::ZERO);

        // 1.50% of 1.00 is exactly 0.015
        let tax = Fixed2::from_units(1).percent(Fixed2::from_hundredths(150));
        assert_eq!(tax, Fixed2::from_hundredths(2));

        let refund = Fixed2::from_units(-1).percent(Fixed2::from_hundredths(150));
        assert_eq!(refund, Fixed2::from_hundredths(-2));
    }

    #[test]
    fn test_add_sub() {
        let a = Fixed2::from_units(10);
        let b = Fixed2::from_hundredths(250);
        assert_eq!((a + b).to_string(), "12.50");
        assert_eq!((b - a).to_string(), "-7.50");
    }
}
