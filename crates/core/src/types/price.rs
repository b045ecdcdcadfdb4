//! Type-safe price representation using decimal arithmetic.
//!
//! The catalogue stores whole-ruble prices with an optional percentage
//! discount. The discounted price shown to shoppers (and charged in the cart)
//! is `round(price × (1 − discount / 100))`, rounding halves away from zero.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Symbol appended to formatted prices.
pub const CURRENCY_SYMBOL: &str = "₽";

/// A non-negative amount in the store currency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from whole currency units.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// Get the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Apply a percentage discount and round to whole units.
    ///
    /// Percentages outside `[0, 100]` are clamped. A zero discount returns
    /// the price untouched (no rounding), so fractional list prices survive.
    #[must_use]
    pub fn discounted(self, percent: Decimal) -> Self {
        let percent = percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
        if percent.is_zero() {
            return self;
        }

        let factor = Decimal::ONE - percent / Decimal::ONE_HUNDRED;
        Self((self.0 * factor).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Multiply by a quantity (line total).
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {CURRENCY_SYMBOL}", self.0.normalize())
    }
}
