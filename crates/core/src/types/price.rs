//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PriceError {
    /// The input string is not a valid decimal number.
    #[error("invalid decimal: {0}")]
    InvalidDecimal(String),
    /// Prices must be strictly positive.
    #[error("price must be positive (got {0})")]
    NotPositive(Decimal),
}

/// A positive price in the store currency.
///
/// Amounts are held as [`Decimal`] to avoid floating-point rounding in
/// totals. Stored in the database as TEXT and re-parsed on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a `Price` from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::NotPositive` if the amount is zero or negative.
    pub fn from_decimal(amount: Decimal) -> Result<Self, PriceError> {
        if amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive(amount));
        }
        Ok(Self(amount))
    }

    /// Parse a `Price` from a decimal string (e.g. `"499"` or `"19.99"`).
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a decimal or not positive.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount =
            Decimal::from_str(s).map_err(|_| PriceError::InvalidDecimal(s.to_owned()))?;
        Self::from_decimal(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Line total for `quantity` units of this price.
    #[must_use]
    pub fn times(&self, quantity: i64) -> Decimal {
        self.0 * Decimal::from(quantity)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// SQLx support (with sqlite feature)
#[cfg(feature = "sqlite")]
impl sqlx::Type<sqlx::Sqlite> for Price {
    fn type_info() -> <sqlx::Sqlite as sqlx::Database>::TypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &<sqlx::Sqlite as sqlx::Database>::TypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

#[cfg(feature = "sqlite")]
impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for Price {
    fn decode(
        value: <sqlx::Sqlite as sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "sqlite")]
impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Sqlite as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<'q, sqlx::Sqlite>>::encode(self.0.to_string(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_number() {
        let price = Price::parse("499").unwrap();
        assert_eq!(price.amount(), Decimal::from(499));
    }

    #[test]
    fn test_parse_fractional() {
        let price = Price::parse("19.99").unwrap();
        assert_eq!(price.amount().to_string(), "19.99");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            Price::parse("not-a-number"),
            Err(PriceError::InvalidDecimal(_))
        ));
    }

    #[test]
    fn test_rejects_zero_and_negative() {
        assert!(matches!(
            Price::parse("0"),
            Err(PriceError::NotPositive(_))
        ));
        assert!(matches!(
            Price::parse("-5"),
            Err(PriceError::NotPositive(_))
        ));
    }

    #[test]
    fn test_times() {
        let price = Price::parse("119").unwrap();
        assert_eq!(price.times(2), Decimal::from(238));
    }

    #[test]
    fn test_display_two_decimal_places() {
        let price = Price::parse("499").unwrap();
        assert_eq!(price.to_string(), "$499.00");

        let price = Price::parse("19.9").unwrap();
        assert_eq!(price.to_string(), "$19.90");
    }

    #[test]
    fn test_serde_as_string() {
        let price = Price::parse("499").unwrap();
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"499\"");
    }
}
