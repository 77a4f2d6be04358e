//! Orders and order items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pawtopia_core::{
    CartItemId, OrderId, OrderItemId, OrderStatus, PaymentMethod, PaymentStatus, Price, ProductId,
    UserId,
};

use super::{ValidationError, optional};

/// Description stamped on every new order.
pub const DEFAULT_DESCRIPTION: &str = "A Great Way to Spend Money to your Pets!";
/// Remarks stamped on every new order.
pub const DEFAULT_REMARKS: &str = "Shop Again!";
/// Upper bound on distinct lines in one order.
pub const MAX_ORDER_LINES: usize = 100;

/// A placed order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "orderId")]
    pub id: OrderId,
    pub user_id: UserId,
    pub order_date: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub shipping_fee: Price,
    pub total_price: Price,
    pub description: String,
    pub remarks: String,
    #[sqlx(skip)]
    pub order_items: Vec<OrderItem>,
}

/// One line of an order, with the product details captured at checkout.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(rename = "orderItemId")]
    pub id: OrderItemId,
    pub order_id: OrderId,
    /// `None` once the product has been removed from the catalog.
    pub product_id: Option<ProductId>,
    #[serde(rename = "orderItemName")]
    pub name: String,
    #[serde(rename = "orderItemImage")]
    pub image: Option<String>,
    pub price: Price,
    pub quantity: i32,
    pub is_rated: bool,
}

/// One requested line of a new order.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Checkout request. Prices are always taken from the catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[serde(default)]
    pub order_items: Vec<NewOrderLine>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Cart items to remove once the order is placed.
    #[serde(default)]
    pub cart_item_ids: Vec<CartItemId>,
}

impl NewOrder {
    /// Merge duplicate products and check quantities.
    ///
    /// Returns `(product, quantity)` pairs sorted by product ID so row locks
    /// are always taken in the same order.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty order, a non-positive quantity, or too many lines.
    pub fn lines(&self) -> Result<Vec<(ProductId, u32)>, ValidationError> {
        if self.order_items.is_empty() {
            return Err(ValidationError::Required("orderItems"));
        }
        if self.order_items.len() > MAX_ORDER_LINES {
            return Err(ValidationError::invalid(
                "orderItems",
                format!("cannot exceed {MAX_ORDER_LINES} lines"),
            ));
        }

        let mut merged: Vec<(ProductId, u32)> = Vec::with_capacity(self.order_items.len());
        for line in &self.order_items {
            let quantity = u32::try_from(line.quantity)
                .ok()
                .filter(|q| *q > 0)
                .ok_or_else(|| ValidationError::invalid("quantity", "must be at least 1"))?;
            match merged.iter_mut().find(|(id, _)| *id == line.product_id) {
                Some((_, q)) => *q = q.saturating_add(quantity),
                None => merged.push((line.product_id, quantity)),
            }
        }
        merged.sort_by_key(|(id, _)| *id);
        Ok(merged)
    }
}

/// Admin edit of an order. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: Option<PaymentStatus>,
    pub order_status: Option<String>,
}

/// `?status=` for the status endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusQuery {
    pub status: String,
}

/// `?id=` used by the legacy admin edit endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct IdQuery<T> {
    pub id: T,
}

/// `?userId=` for listing a customer's orders.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdQuery {
    pub user_id: UserId,
}

/// Admin edit of an order item's display fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemUpdate {
    pub order_item_name: Option<String>,
    pub order_item_image: Option<String>,
    pub is_rated: Option<bool>,
}

impl OrderItemUpdate {
    /// Trimmed name; a blank name is rejected rather than cleared.
    ///
    /// # Errors
    ///
    /// Returns an error if a name was given but is blank.
    pub fn name(&self) -> Result<Option<String>, ValidationError> {
        match self.order_item_name.as_deref() {
            None => Ok(None),
            Some(n) => optional(Some(n))
                .map(Some)
                .ok_or(ValidationError::Required("orderItemName")),
        }
    }
}

/// Body of the `updateIsRated` endpoint.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatedInput {
    pub is_rated: bool,
}

/// Sum of order totals.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalIncome {
    pub total_income: Price,
}
