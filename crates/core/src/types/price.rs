//! Type-safe price representation.
//!
//! Prices are stored as an integer number of cents, which survives any
//! relational backend without floating-point drift. [`rust_decimal`] handles
//! the boundary with humans: parsing form input and rendering dollar amounts.

use core::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PriceError {
    /// The input is not a valid decimal number.
    #[error("not a valid price: {0}")]
    Invalid(String),
    /// Prices cannot be negative.
    #[error("price cannot be negative")]
    Negative,
    /// The amount does not fit in the supported range.
    #[error("price out of range")]
    OutOfRange,
}

/// A non-negative price in the smallest currency unit (cents).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(0);

    /// Create a price from a cent amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `cents` is negative.
    pub const fn from_cents(cents: i64) -> Result<Self, PriceError> {
        if cents < 0 {
            return Err(PriceError::Negative);
        }
        Ok(Self(cents))
    }

    /// Get the underlying cent amount.
    #[must_use]
    pub const fn as_cents(&self) -> i64 {
        self.0
    }

    /// The amount as a decimal in the currency's standard unit (dollars).
    #[must_use]
    pub fn amount(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Parse a price from user input such as `"10"`, `"10.5"`, or `"10.00"`.
    ///
    /// Fractions beyond cents are rounded half away from zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a decimal number, is negative,
    /// or does not fit in the supported range.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount: Decimal = s
            .trim()
            .parse()
            .map_err(|_| PriceError::Invalid(s.to_owned()))?;

        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }

        let cents = amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(PriceError::OutOfRange)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or(PriceError::OutOfRange)?;

        Self::from_cents(cents)
    }

    /// Total for `quantity` units at this price, saturating at the range limit.
    #[must_use]
    pub const fn line_total(&self, quantity: i64) -> Self {
        Self(self.0.saturating_mul(quantity))
    }

    /// Sum two prices, saturating at the range limit.
    #[must_use]
    pub const fn saturating_add(&self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Price {
    /// Formats as a dollar amount, e.g. `$19.99`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl std::str::FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// SQLx support (with sqlite feature): stored as INTEGER cents.
#[cfg(feature = "sqlite")]
impl sqlx::Type<sqlx::Sqlite> for Price {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <i64 as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

#[cfg(feature = "sqlite")]
impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for Price {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let cents = <i64 as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self(cents))
    }
}

#[cfg(feature = "sqlite")]
impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<'q, sqlx::Sqlite>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_dollars() {
        assert_eq!(Price::parse("10").unwrap().as_cents(), 1000);
        assert_eq!(Price::parse("0").unwrap().as_cents(), 0);
    }

    #[test]
    fn test_parse_with_cents() {
        assert_eq!(Price::parse("10.50").unwrap().as_cents(), 1050);
        assert_eq!(Price::parse("19.99").unwrap().as_cents(), 1999);
        assert_eq!(Price::parse(" 3.5 ").unwrap().as_cents(), 350);
    }

    #[test]
    fn test_parse_rounds_sub_cent() {
        assert_eq!(Price::parse("1.005").unwrap().as_cents(), 101);
        assert_eq!(Price::parse("1.004").unwrap().as_cents(), 100);
    }

    #[test]
    fn test_parse_negative() {
        assert!(matches!(Price::parse("-1"), Err(PriceError::Negative)));
        assert!(matches!(Price::parse("-0.01"), Err(PriceError::Negative)));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            Price::parse("ten dollars"),
            Err(PriceError::Invalid(_))
        ));
        assert!(matches!(Price::parse(""), Err(PriceError::Invalid(_))));
    }

    #[test]
    fn test_from_cents_negative() {
        assert!(matches!(Price::from_cents(-5), Err(PriceError::Negative)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::from_cents(1999).unwrap().to_string(), "$19.99");
        assert_eq!(Price::from_cents(1000).unwrap().to_string(), "$10.00");
        assert_eq!(Price::from_cents(5).unwrap().to_string(), "$0.05");
        assert_eq!(Price::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn test_amount_decimal() {
        let price = Price::from_cents(1050).unwrap();
        assert_eq!(price.amount(), Decimal::new(1050, 2));
    }

    #[test]
    fn test_line_total() {
        let price = Price::from_cents(1000).unwrap();
        assert_eq!(price.line_total(3).as_cents(), 3000);
    }

    #[test]
    fn test_saturating_add() {
        let a = Price::from_cents(100).unwrap();
        let b = Price::from_cents(250).unwrap();
        assert_eq!(a.saturating_add(b).as_cents(), 350);
    }
}
