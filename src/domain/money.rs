//! Money type
//!
//! Domain primitive for payroll amounts. Every stored figure (salaries,
//! novelties, advances, computed pay) is a `Money`: never negative and held
//! at the currency's minor-unit precision.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

/// Minor-unit precision (2 decimal places)
pub const MINOR_UNITS: u32 = 2;

/// Maximum allowed amount (1 quadrillion currency units)
fn max_amount() -> Decimal {
    Decimal::from(1_000_000_000_000_000i64)
}

/// Money represents a validated, non-negative monetary value.
///
/// # Invariants
/// - Value is zero or positive
/// - At most 2 decimal places
/// - At most 1 quadrillion
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use payroll_ledger::domain::Money;
///
/// let salary = Money::new(Decimal::new(1_000_000, 0)).unwrap();
/// assert_eq!(salary.value(), Decimal::new(1_000_000, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

/// Errors that can occur when creating a Money value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("Amount cannot be negative (got {0})")]
    Negative(Decimal),

    #[error("Amount has too many decimal places (max 2, got {0})")]
    TooManyDecimals(u32),

    #[error("Amount exceeds maximum allowed value")]
    Overflow,

    #[error("Invalid amount format: {0}")]
    ParseError(String),
}

impl Money {
    /// Zero amount
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Create a new Money value with validation.
    ///
    /// # Errors
    /// - `MoneyError::Negative` if value < 0
    /// - `MoneyError::TooManyDecimals` if more than 2 decimal places
    /// - `MoneyError::Overflow` if value exceeds the maximum
    pub fn new(value: Decimal) -> Result<Self, MoneyError> {
        if value < Decimal::ZERO {
            return Err(MoneyError::Negative(value));
        }

        // Trailing zeros past the minor unit are harmless ("10.500")
        let normalized = value.normalize();
        if normalized.scale() > MINOR_UNITS {
            return Err(MoneyError::TooManyDecimals(normalized.scale()));
        }

        if value > max_amount() {
            return Err(MoneyError::Overflow);
        }

        Ok(Self(value))
    }

    /// Round a computed value to minor units (half away from zero) and validate it.
    pub fn rounded(value: Decimal) -> Result<Self, MoneyError> {
        Self::new(round_minor(value))
    }

    /// Create from a whole number of currency units.
    pub fn from_integer(value: i64) -> Result<Self, MoneyError> {
        Self::new(Decimal::from(value))
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Add two amounts, failing on overflow.
    pub fn try_add(&self, other: &Money) -> Result<Money, MoneyError> {
        Money::new(self.0 + other.0)
    }

    /// Subtract, clamping at zero. Returns the clamped result and the shortfall.
    pub fn saturating_sub(&self, other: &Money) -> (Money, Money) {
        if self.0 >= other.0 {
            (Money(self.0 - other.0), Money::ZERO)
        } else {
            (Money::ZERO, Money(other.0 - self.0))
        }
    }
}

/// Round to the currency's minor unit, half away from zero.
pub fn round_minor(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MINOR_UNITS, RoundingStrategy::MidpointAwayFromZero)
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s.trim())
            .map_err(|e| MoneyError::ParseError(e.to_string()))?;
        Money::new(decimal)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Money::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl Add for Money {
    type Output = Result<Money, MoneyError>;

    fn add(self, rhs: Self) -> Self::Output {
        self.try_add(&rhs)
    }
}

impl<'a> Sum<&'a Money> for Decimal {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Decimal::ZERO, |acc, m| acc + m.0)
    }
}
