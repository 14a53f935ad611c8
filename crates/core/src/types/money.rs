//! Money amounts in the smallest currency unit.
//!
//! Menu prices, fees and totals are whole numbers of the smallest unit the
//! shop charges in, so amounts are integers. Percentages (tax, discount) are
//! applied through [`rust_decimal`] and rounded half-up back to an integer.

use core::fmt;
use core::iter::Sum;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A non-negative amount in the smallest currency unit.
///
/// Arithmetic saturates instead of wrapping; a cart large enough to hit
/// `u64::MAX` is not a real cart.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Create an amount from smallest currency units.
    #[must_use]
    pub const fn new(units: u64) -> Self {
        Self(units)
    }

    /// Get the amount in smallest currency units.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Whether the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Add two amounts, saturating at `u64::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtract, flooring at zero.
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Multiply by a quantity, saturating at `u64::MAX`.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(u64::from(quantity)))
    }

    /// Apply a fractional rate and round half-up to a whole unit.
    ///
    /// `rate` is expected to lie in `[0, 1]`; a negative product rounds to zero.
    ///
    /// ```
    /// use brewhouse_core::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let rate = Decimal::new(10, 2); // 10%
    /// assert_eq!(Money::new(25).apply_rate(rate), Money::new(3)); // 2.5 -> 3
    /// assert_eq!(Money::new(24).apply_rate(rate), Money::new(2)); // 2.4 -> 2
    /// ```
    #[must_use]
    pub fn apply_rate(self, rate: Decimal) -> Self {
        let scaled = (Decimal::from(self.0) * rate)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        if scaled.is_sign_negative() {
            return Self::ZERO;
        }
        Self(scaled.to_u64().unwrap_or(u64::MAX))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Money {
    fn from(units: u64) -> Self {
        Self(units)
    }
}

impl From<Money> for u64 {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_rate_rounds_half_up() {
        let ten_percent = Decimal::new(10, 2);
        assert_eq!(Money::new(15).apply_rate(ten_percent), Money::new(2));
        assert_eq!(Money::new(14).apply_rate(ten_percent), Money::new(1));
        assert_eq!(Money::new(5).apply_rate(ten_percent), Money::new(1));
        assert_eq!(Money::new(4).apply_rate(ten_percent), Money::ZERO);
    }

    #[test]
    fn test_apply_rate_exact_values() {
        let five_percent = Decimal::new(5, 2);
        assert_eq!(Money::new(250_000).apply_rate(five_percent), Money::new(12_500));
    }

    #[test]
    fn test_apply_negative_rate_floors_at_zero() {
        assert_eq!(Money::new(100).apply_rate(Decimal::new(-5, 2)), Money::ZERO);
    }

    #[test]
    fn test_saturating_arithmetic() {
        assert_eq!(Money::new(u64::MAX).saturating_add(Money::new(1)), Money::new(u64::MAX));
        assert_eq!(Money::new(3).saturating_sub(Money::new(5)), Money::ZERO);
        assert_eq!(Money::new(u64::MAX).times(2), Money::new(u64::MAX));
    }

    #[test]
    fn test_sum() {
        let total: Money = [Money::new(1), Money::new(2), Money::new(3)].into_iter().sum();
        assert_eq!(total, Money::new(6));
    }
}
