use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};

/// Balances below this absolute value are treated as settled.
pub const MATERIALITY: Money = Money(dec!(0.01));

/// Maximum drift allowed between an expense amount and the sum of its shares.
///
/// Absorbs the cent lost or gained when an amount is divided equally.
pub const SHARE_TOLERANCE: Money = Money(dec!(0.02));

/// Largest amount a single expense may carry.
///
/// Keeps every stored amount far enough below `Decimal::MAX` that folding a
/// group's whole history can never overflow.
pub const MAX_AMOUNT: Money = Money(dec!(1_000_000_000_000));

/// A signed currency value.
///
/// Wraps `rust_decimal::Decimal` so sums of many small shares reconcile exactly
/// and never leak sub-cent artifacts into reported totals.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(pub Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Rounds to whole cents, half away from zero, always carrying two decimals.
    ///
    /// Never truncates: truncation would under-report every debt with a
    /// fractional cent.
    pub fn round_cents(self) -> Self {
        let mut rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(2);
        Self(rounded)
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Whether the value is large enough to be reported as an open balance.
    pub fn is_material(&self) -> bool {
        self.abs() >= MATERIALITY
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// The positive part of the value, zero otherwise.
    pub fn positive_part(self) -> Self {
        if self.is_positive() { self } else { Self::ZERO }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_arithmetic() {
        let m1 = Money::new(dec!(10.0));
        let m2 = Money::new(dec!(5.0));
        assert_eq!(m1 + m2, Money::new(dec!(15.0)));
        assert_eq!(m1 - m2, Money::new(dec!(5.0)));
        assert_eq!(-m1, Money::new(dec!(-10.0)));
    }

    #[test]
    fn test_round_cents_half_away_from_zero() {
        assert_eq!(Money::new(dec!(0.005)).round_cents(), Money::new(dec!(0.01)));
        assert_eq!(Money::new(dec!(-0.005)).round_cents(), Money::new(dec!(-0.01)));
        assert_eq!(Money::new(dec!(33.334)).round_cents(), Money::new(dec!(33.33)));
        assert_eq!(Money::new(dec!(2.675)).round_cents(), Money::new(dec!(2.68)));
    }

    #[test]
    fn test_round_cents_carries_two_decimals() {
        assert_eq!(Money::new(dec!(170)).round_cents().to_string(), "170.00");
        assert_eq!(Money::new(dec!(0.1)).round_cents().to_string(), "0.10");
    }

    #[test]
    fn test_materiality() {
        assert!(Money::new(dec!(0.01)).is_material());
        assert!(Money::new(dec!(-0.01)).is_material());
        assert!(!Money::new(dec!(0.009)).is_material());
        assert!(!Money::ZERO.is_material());
    }

    #[test]
    fn test_checked_add_reports_overflow() {
        assert_eq!(
            Money::new(dec!(1.5)).checked_add(Money::new(dec!(2))),
            Some(Money::new(dec!(3.5)))
        );
        assert_eq!(Money::new(Decimal::MAX).checked_add(Money::new(Decimal::MAX)), None);
    }

    #[test]
    fn test_sum_of_small_values_is_exact() {
        let total: Money = std::iter::repeat_n(Money::new(dec!(0.1)), 30).sum();
        assert_eq!(total, Money::new(dec!(3.0)));
    }
}
