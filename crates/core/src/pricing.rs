//! Checkout arithmetic shared by the cart, order, and payment paths.
//!
//! The order total a customer sees in the cart is the same total that is
//! charged at checkout: subtotal of the selected lines plus a flat shipping
//! fee whenever anything is being bought.

use serde::{Deserialize, Serialize};

use crate::types::price::{Price, PriceError};

/// Flat shipping fee applied to every non-empty order.
pub const SHIPPING_FEE: Price = Price::from_centavos(3000);

/// Errors from quantity validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    #[error("quantity must be at least 1")]
    NotPositive,
}

/// One priced line of a cart or order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub unit_price: Price,
    pub quantity: u32,
}

impl CartLine {
    #[must_use]
    pub const fn new(unit_price: Price, quantity: u32) -> Self {
        Self {
            unit_price,
            quantity,
        }
    }

    /// Unit price times quantity.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the line total is not representable.
    pub fn total(&self) -> Result<Price, PriceError> {
        line_total(self.unit_price, self.quantity)
    }
}

/// Price of `quantity` units at `unit_price`.
///
/// # Errors
///
/// Returns `PriceError::Overflow` if the total is not representable.
pub fn line_total(unit_price: Price, quantity: u32) -> Result<Price, PriceError> {
    unit_price.times(quantity)
}

/// Totals for a set of cart lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: u32,
    pub subtotal: Price,
    pub shipping_fee: Price,
    pub total: Price,
}

impl CartTotals {
    /// Totals for an empty selection.
    pub const EMPTY: Self = Self {
        item_count: 0,
        subtotal: Price::ZERO,
        shipping_fee: Price::ZERO,
        total: Price::ZERO,
    };

    /// Compute subtotal, shipping, and total for `lines`.
    ///
    /// Shipping is charged only when the subtotal is above zero.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if any line or the sum is not representable.
    pub fn compute<'a, I>(lines: I) -> Result<Self, PriceError>
    where
        I: IntoIterator<Item = &'a CartLine>,
    {
        let mut subtotal = Price::ZERO;
        let mut item_count: u32 = 0;
        for line in lines {
            subtotal = subtotal + line.total()?;
            item_count = item_count.saturating_add(line.quantity);
        }

        let shipping_fee = if subtotal.is_zero() {
            Price::ZERO
        } else {
            SHIPPING_FEE
        };

        Ok(Self {
            item_count,
            subtotal,
            shipping_fee,
            total: subtotal + shipping_fee,
        })
    }
}

/// Clamp a requested cart quantity to the stock on hand.
///
/// Returns `Ok(None)` when the product is out of stock and the line cannot
/// stay in the cart.
///
/// # Errors
///
/// Returns `QuantityError::NotPositive` if `requested` is below 1.
pub fn clamp_to_stock(requested: i32, stock: i32) -> Result<Option<u32>, QuantityError> {
    let requested = u32::try_from(requested)
        .ok()
        .filter(|q| *q > 0)
        .ok_or(QuantityError::NotPositive)?;
    let stock = u32::try_from(stock).unwrap_or(0);
    if stock == 0 {
        return Ok(None);
    }
    Ok(Some(requested.min(stock)))
}

/// Mean of 1-5 star ratings, rounded to one decimal place.
#[must_use]
pub fn average_rating(ratings: &[i16]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let sum: f64 = ratings.iter().map(|r| f64::from(*r)).sum();
    #[allow(clippy::cast_precision_loss)] // review counts stay far below 2^52
    let mean = sum / ratings.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::*;

    fn peso(s: &str) -> Price {
        Price::new(Decimal::from_str(s).unwrap()).unwrap()
    }

    #[test]
    fn test_shipping_fee_is_thirty_pesos() {
        assert_eq!(SHIPPING_FEE, Price::from_pesos(30));
    }

    #[test]
    fn test_empty_cart_has_no_shipping() {
        let totals = CartTotals::compute(&[]).unwrap();
        assert_eq!(totals, CartTotals::EMPTY);
    }

    #[test]
    fn test_totals_add_shipping() {
        let lines = [
            CartLine::new(peso("249.75"), 2),
            CartLine::new(peso("120"), 1),
        ];
        let totals = CartTotals::compute(&lines).unwrap();
        assert_eq!(totals.item_count, 3);
        assert_eq!(totals.subtotal, peso("619.50"));
        assert_eq!(totals.shipping_fee, SHIPPING_FEE);
        assert_eq!(totals.total, peso("649.50"));
    }

    #[test]
    fn test_free_items_do_not_trigger_shipping() {
        let lines = [CartLine::new(Price::ZERO, 4)];
        let totals = CartTotals::compute(&lines).unwrap();
        assert_eq!(totals.item_count, 4);
        assert_eq!(totals.total, Price::ZERO);
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(peso("89.90"), 3).unwrap(), peso("269.70"));
        assert_eq!(line_total(peso("89.90"), 0).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_clamp_to_stock() {
        assert_eq!(clamp_to_stock(3, 10), Ok(Some(3)));
        assert_eq!(clamp_to_stock(12, 10), Ok(Some(10)));
        assert_eq!(clamp_to_stock(1, 0), Ok(None));
        assert_eq!(clamp_to_stock(1, -5), Ok(None));
        assert_eq!(clamp_to_stock(0, 10), Err(QuantityError::NotPositive));
        assert_eq!(clamp_to_stock(-2, 10), Err(QuantityError::NotPositive));
    }

    #[test]
    fn test_average_rating() {
        assert_eq!(average_rating(&[]), None);
        assert_eq!(average_rating(&[5]), Some(5.0));
        assert_eq!(average_rating(&[4, 5, 5]), Some(4.7));
    }
}
