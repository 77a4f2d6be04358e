//! Peso amounts using decimal arithmetic.
//!
//! All money in Pawtopia is Philippine pesos. Amounts are kept as
//! [`Decimal`] so that `₱0.10 + ₱0.20` is exactly `₱0.30`, and they are
//! serialized as decimal strings (`"1499.00"`) to avoid float rounding in
//! JavaScript clients. Deserialization also accepts plain JSON numbers.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("price cannot be negative")]
    Negative,
    #[error("price is too large")]
    Overflow,
}

/// A non-negative amount in Philippine pesos.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest amount a `NUMERIC(12, 2)` column holds: `9,999,999,999.99`.
    pub const MAX_STORED: Self = Self(Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2));

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of pesos.
    #[must_use]
    pub const fn from_pesos(pesos: u32) -> Self {
        Self(Decimal::from_parts(pesos, 0, 0, false, 0))
    }

    /// Create a price from a whole number of centavos.
    #[must_use]
    pub const fn from_centavos(centavos: u32) -> Self {
        Self(Decimal::from_parts(centavos, 0, 0, false, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Whether the amount fits the money columns without rounding past centavos.
    #[must_use]
    pub fn is_storable(&self) -> bool {
        *self <= Self::MAX_STORED
    }

    /// Price of `quantity` units at this unit price.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the product does not fit in a `Decimal`.
    pub fn times(self, quantity: u32) -> Result<Self, PriceError> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .map(Self)
            .ok_or(PriceError::Overflow)
    }

    /// Amount in centavos, truncating anything below one centavo.
    ///
    /// Payment gateways bill in the smallest currency unit.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the amount does not fit in an `i64`.
    pub fn to_centavos(self) -> Result<i64, PriceError> {
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|c| c.trunc().to_i64())
            .ok_or(PriceError::Overflow)
    }

    /// Format for display, e.g. `₱1,234.50`.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self.0.round_dp(2);
        let text = format!("{rounded:.2}");
        let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        format!("₱{grouped}.{cents}")
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
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

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0.round_dp(2))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn peso(s: &str) -> Price {
        Price::new(Decimal::from_str(s).unwrap()).unwrap()
    }

    #[test]
    fn test_rejects_negative() {
        assert_eq!(
            Price::new(Decimal::from_str("-0.01").unwrap()),
            Err(PriceError::Negative)
        );
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_times_and_sum_are_exact() {
        let total: Price = [peso("0.10"), peso("0.20")].into_iter().sum();
        assert_eq!(total, peso("0.30"));
        assert_eq!(peso("149.50").times(3).unwrap(), peso("448.50"));
        assert_eq!(peso("149.50").times(0).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_max_stored_matches_column_bound() {
        assert_eq!(Price::MAX_STORED, peso("9999999999.99"));
        assert!(peso("9999999999.99").is_storable());
        assert!(!peso("10000000000").is_storable());
    }

    #[test]
    fn test_to_centavos_truncates() {
        assert_eq!(peso("1499.99").to_centavos().unwrap(), 149_999);
        assert_eq!(peso("10.005").to_centavos().unwrap(), 1000);
        assert_eq!(Price::ZERO.to_centavos().unwrap(), 0);
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(peso("0").display(), "₱0.00");
        assert_eq!(peso("30").display(), "₱30.00");
        assert_eq!(peso("999.5").display(), "₱999.50");
        assert_eq!(peso("1234.5").display(), "₱1,234.50");
        assert_eq!(peso("1234567.891").display(), "₱1,234,567.89");
    }

    #[test]
    fn test_serializes_as_string_and_accepts_numbers() {
        let json = serde_json::to_string(&peso("250.00")).unwrap();
        assert_eq!(json, "\"250.00\"");

        let from_number: Price = serde_json::from_str("250.5").unwrap();
        assert_eq!(from_number, peso("250.5"));
        assert!(serde_json::from_str::<Price>("\"-1\"").is_err());
    }
}
