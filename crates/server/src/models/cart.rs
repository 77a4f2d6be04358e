//! Carts and cart items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pawtopia_core::{
    CartId, CartItemId, CartLine, CartTotals, Price, PriceError, ProductId, clamp_to_stock,
};

/// A customer's cart.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(rename = "cartId")]
    pub id: CartId,
    pub created_at: DateTime<Utc>,
}

/// A cart line joined with the product it refers to.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(rename = "cartItemId")]
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub last_updated: DateTime<Utc>,
    pub product_name: String,
    pub product_price: Price,
    pub product_image: Option<String>,
    /// Current stock of the product.
    pub stock: i32,
}

impl CartItem {
    #[must_use]
    pub const fn available(&self) -> bool {
        self.stock > 0
    }

    /// Priced line for totals, at the quantity the stock can cover.
    ///
    /// `None` for out-of-stock items.
    #[must_use]
    pub fn line(&self) -> Option<CartLine> {
        clamp_to_stock(self.quantity, self.stock)
            .ok()
            .flatten()
            .map(|q| CartLine::new(self.product_price, q))
    }
}

/// A cart item with its derived fields, as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    #[serde(flatten)]
    pub item: CartItem,
    pub available: bool,
    pub line_total: Price,
}

impl CartItemView {
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the line total is not representable.
    pub fn new(item: CartItem) -> Result<Self, PriceError> {
        let line_total = match item.line() {
            Some(line) => line.total()?,
            None => Price::ZERO,
        };
        Ok(Self {
            available: item.available(),
            line_total,
            item,
        })
    }
}

/// A cart with its items (newest first) and totals for the available items.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub cart_id: CartId,
    pub items: Vec<CartItemView>,
    pub totals: CartTotals,
}

impl CartView {
    /// Build the view. `items` must already be sorted newest first.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if any total is not representable.
    pub fn new(cart_id: CartId, items: Vec<CartItem>) -> Result<Self, PriceError> {
        let totals = totals_for(items.iter())?;
        let items = items
            .into_iter()
            .map(CartItemView::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            cart_id,
            items,
            totals,
        })
    }
}

/// Totals over the available items in `items`.
///
/// # Errors
///
/// Returns `PriceError::Overflow` if any total is not representable.
pub fn totals_for<'a>(items: impl Iterator<Item = &'a CartItem>) -> Result<CartTotals, PriceError> {
    let lines: Vec<CartLine> = items.filter_map(CartItem::line).collect();
    CartTotals::compute(&lines)
}

/// Add a product to the cart.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemInput {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Change the quantity of a cart item.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct QuantityInput {
    pub quantity: i32,
}

/// Selection of cart items for a summary, e.g. `?items=3,5,8`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryQuery {
    pub items: Option<String>,
}

impl SummaryQuery {
    /// Parsed item IDs, or `None` when no selection was given.
    ///
    /// # Errors
    ///
    /// Returns the offending token if an ID is not an integer.
    pub fn selected(&self) -> Result<Option<Vec<CartItemId>>, String> {
        let Some(raw) = self.items.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<CartItemId>().map_err(|_| s.to_owned()))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pawtopia_core::SHIPPING_FEE;

    use super::*;

    fn item(id: i32, price: u32, quantity: i32, stock: i32) -> CartItem {
        CartItem {
            id: CartItemId::new(id),
            cart_id: CartId::new(1),
            product_id: ProductId::new(id),
            quantity,
            last_updated: Utc::now(),
            product_name: format!("Product {id}"),
            product_price: Price::from_pesos(price),
            product_image: None,
            stock,
        }
    }

    #[test]
    fn test_out_of_stock_items_are_excluded_from_totals() {
        let view = CartView::new(
            CartId::new(1),
            vec![item(1, 100, 2, 5), item(2, 999, 1, 0)],
        )
        .unwrap();
        assert_eq!(view.totals.subtotal, Price::from_pesos(200));
        assert_eq!(view.totals.total, Price::from_pesos(230));
        assert!(view.items[0].available);
        assert!(!view.items[1].available);
        assert_eq!(view.items[1].line_total, Price::ZERO);
    }

    #[test]
    fn test_empty_cart_totals_are_zero() {
        let view = CartView::new(CartId::new(1), vec![]).unwrap();
        assert_eq!(view.totals, CartTotals::EMPTY);
    }

    #[test]
    fn test_totals_for_selection() {
        let items = [item(1, 50, 1, 5), item(2, 70, 3, 5)];
        let totals = totals_for(items.iter().filter(|i| i.id == CartItemId::new(2))).unwrap();
        assert_eq!(totals.subtotal, Price::from_pesos(210));
        assert_eq!(totals.shipping_fee, SHIPPING_FEE);
    }

    #[test]
    fn test_totals_price_quantity_capped_at_stock() {
        let items = [item(1, 100, 5, 2)];
        let totals = totals_for(items.iter()).unwrap();
        assert_eq!(totals.item_count, 2);
        assert_eq!(totals.subtotal, Price::from_pesos(200));

        let view = CartItemView::new(item(1, 100, 5, 2)).unwrap();
        assert_eq!(view.line_total, Price::from_pesos(200));
    }

    #[test]
    fn test_summary_query_parsing() {
        let q = SummaryQuery {
            items: Some("3, 5,,8".into()),
        };
        assert_eq!(
            q.selected().unwrap().unwrap(),
            vec![CartItemId::new(3), CartItemId::new(5), CartItemId::new(8)]
        );
        assert_eq!(SummaryQuery::default().selected().unwrap(), None);
        let bad = SummaryQuery {
            items: Some("3,x".into()),
        };
        assert_eq!(bad.selected().unwrap_err(), "x");
    }

    #[test]
    fn test_view_serializes_flat() {
        let view = CartItemView::new(item(4, 10, 2, 9)).unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["cartItemId"], 4);
        assert_eq!(json["productPrice"], "10");
        assert_eq!(json["lineTotal"], "20");
        assert_eq!(json["available"], true);
    }
}
