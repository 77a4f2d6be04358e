//! Order and order item repository.
//!
//! Placing an order is a single transaction: product rows are locked in ID
//! order, stock is checked and decremented, name/image/price are copied onto
//! the order items, and the purchased cart lines are removed.

use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use pawtopia_core::{
    CartItemId, CartLine, CartTotals, OrderId, OrderItemId, OrderStatus, PaymentMethod,
    PaymentStatus, Price, ProductId, UserId,
};

use super::RepositoryError;
use crate::models::order::{DEFAULT_DESCRIPTION, DEFAULT_REMARKS, Order, OrderItem};

const ORDER_COLUMNS: &str = "id, user_id, order_date, payment_method, payment_status, \
                             order_status, shipping_fee, total_price, description, remarks";

const ITEM_COLUMNS: &str = "id, order_id, product_id, name, image, price, quantity, is_rated";

/// A product row locked for checkout.
#[derive(Debug, sqlx::FromRow)]
struct StockRow {
    id: ProductId,
    name: String,
    image: Option<String>,
    price: Price,
    quantity: i32,
}

/// Admin changes to an order. `None` leaves a field unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderChanges {
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: Option<PaymentStatus>,
    pub order_status: Option<OrderStatus>,
}

/// Admin changes to an order item's display fields.
#[derive(Debug, Clone, Default)]
pub struct OrderItemChanges {
    pub name: Option<String>,
    pub image: Option<String>,
    pub is_rated: Option<bool>,
}

/// Repository for orders and their items.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order for `lines`, which must be sorted by product ID with no
    /// duplicates.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if a product does not exist.
    /// Returns `RepositoryError::Conflict` if a product has insufficient stock.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, lines, cart_item_ids), fields(user_id = %user_id, lines = lines.len()))]
    pub async fn create(
        &self,
        user_id: UserId,
        lines: &[(ProductId, u32)],
        payment_method: PaymentMethod,
        cart_item_ids: &[CartItemId],
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let product_ids: Vec<i32> = lines.iter().map(|(id, _)| id.as_i32()).collect();
        let stock = sqlx::query_as::<_, StockRow>(
            "SELECT id, name, image, price, quantity FROM products
             WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(&product_ids)
        .fetch_all(&mut *tx)
        .await?;

        let mut priced = Vec::with_capacity(lines.len());
        for &(product_id, quantity) in lines {
            let row = stock
                .iter()
                .find(|row| row.id == product_id)
                .ok_or(RepositoryError::NotFound)?;
            if i64::from(row.quantity) < i64::from(quantity) {
                return Err(RepositoryError::Conflict(format!(
                    "insufficient stock for {}: {} available",
                    row.name,
                    row.quantity.max(0)
                )));
            }
            priced.push((row, quantity));
        }

        let cart_lines: Vec<CartLine> = priced
            .iter()
            .map(|(row, quantity)| CartLine::new(row.price, *quantity))
            .collect();
        let totals = order_totals(&cart_lines)?;

        let mut order = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders
                 (user_id, payment_method, shipping_fee, total_price, description, remarks)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(payment_method)
        .bind(totals.shipping_fee)
        .bind(totals.total)
        .bind(DEFAULT_DESCRIPTION)
        .bind(DEFAULT_REMARKS)
        .fetch_one(&mut *tx)
        .await?;

        for (row, quantity) in priced {
            let quantity = i32::try_from(quantity).map_err(|_| {
                RepositoryError::Conflict(format!("quantity for {} is too large", row.name))
            })?;

            let item = sqlx::query_as::<_, OrderItem>(&format!(
                "INSERT INTO order_items (order_id, product_id, name, image, price, quantity)
                 VALUES ($1, $2, $3, $4, $5, $6)
                 RETURNING {ITEM_COLUMNS}"
            ))
            .bind(order.id)
            .bind(row.id)
            .bind(&row.name)
            .bind(row.image.as_deref())
            .bind(row.price)
            .bind(quantity)
            .fetch_one(&mut *tx)
            .await?;
            order.order_items.push(item);

            sqlx::query(
                "UPDATE products SET
                     quantity = quantity - $2,
                     quantity_sold = quantity_sold + $2,
                     updated_at = now()
                 WHERE id = $1",
            )
            .bind(row.id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
        }

        if !cart_item_ids.is_empty() {
            let ids: Vec<i32> = cart_item_ids.iter().map(|id| id.as_i32()).collect();
            sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND id = ANY($2)")
                .bind(user_id.cart_id())
                .bind(&ids)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(order)
    }

    /// Get an order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match order {
            Some(mut order) => {
                order.order_items = self.items_for(&[order.id]).await?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    /// Every order with its items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY order_date DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        self.with_items(orders).await
    }

    /// A customer's orders with their items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1
             ORDER BY order_date DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        self.with_items(orders).await
    }

    /// Sum of totals over orders that were not cancelled.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn total_income(&self) -> Result<Price, RepositoryError> {
        let total: Price = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_price), 0) FROM orders WHERE order_status <> 'CANCELLED'",
        )
        .fetch_one(self.pool)
        .await?;
        Ok(total)
    }

    /// Number of orders, optionally only those in `status`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, status: Option<OrderStatus>) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE $1::order_status IS NULL OR order_status = $1",
        )
        .bind(status)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Apply admin changes. A status change must follow the transition graph,
    /// and cancelling returns the items to stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    /// Returns `RepositoryError::Conflict` for a disallowed status transition.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn update(&self, id: OrderId, changes: OrderChanges) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: OrderStatus =
            sqlx::query_scalar("SELECT order_status FROM orders WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(RepositoryError::NotFound)?;

        let next = changes.order_status.filter(|next| *next != current);
        if let Some(next) = next {
            if !current.can_transition_to(next) {
                return Err(RepositoryError::Conflict(format!(
                    "cannot change order status from {} to {}",
                    current.as_str(),
                    next.as_str()
                )));
            }
            if next == OrderStatus::Cancelled {
                restock(&mut tx, id).await?;
            }
        }

        let mut order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET
                 payment_method = COALESCE($2, payment_method),
                 payment_status = COALESCE($3, payment_status),
                 order_status = COALESCE($4, order_status)
             WHERE id = $1
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.payment_method)
        .bind(changes.payment_status)
        .bind(next)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        order.order_items = self.items_for(&[order.id]).await?;
        Ok(order)
    }

    /// Delete an order and its items. Stock is not returned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Order items
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_items(&self) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }

    /// The customer who placed the order containing `item_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn item_owner(&self, item_id: OrderItemId) -> Result<Option<UserId>, RepositoryError> {
        let owner: Option<UserId> = sqlx::query_scalar(
            "SELECT o.user_id FROM order_items oi
             JOIN orders o ON o.id = oi.order_id
             WHERE oi.id = $1",
        )
        .bind(item_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(owner)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist.
    pub async fn update_item(
        &self,
        id: OrderItemId,
        changes: &OrderItemChanges,
    ) -> Result<OrderItem, RepositoryError> {
        sqlx::query_as::<_, OrderItem>(&format!(
            "UPDATE order_items SET
                 name = COALESCE($2, name),
                 image = COALESCE($3, image),
                 is_rated = COALESCE($4, is_rated)
             WHERE id = $1
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.image.as_deref())
        .bind(changes.is_rated)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist.
    pub async fn set_rated(&self, id: OrderItemId, is_rated: bool) -> Result<OrderItem, RepositoryError> {
        self.update_item(
            id,
            &OrderItemChanges {
                is_rated: Some(is_rated),
                ..OrderItemChanges::default()
            },
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist.
    pub async fn delete_item(&self, id: OrderItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM order_items WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn items_for(&self, order_ids: &[OrderId]) -> Result<Vec<OrderItem>, RepositoryError> {
        let ids: Vec<i32> = order_ids.iter().map(|id| id.as_i32()).collect();
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1) ORDER BY id"
        ))
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }

    async fn with_items(&self, mut orders: Vec<Order>) -> Result<Vec<Order>, RepositoryError> {
        if orders.is_empty() {
            return Ok(orders);
        }
        let ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
        let mut items = self.items_for(&ids).await?;
        for order in &mut orders {
            let (mine, rest): (Vec<_>, Vec<_>) =
                items.into_iter().partition(|item| item.order_id == order.id);
            order.order_items = mine;
            items = rest;
        }
        Ok(orders)
    }
}

/// Totals for a new order, rejecting amounts the order columns cannot hold.
fn order_totals(lines: &[CartLine]) -> Result<CartTotals, RepositoryError> {
    let too_large = || {
        RepositoryError::Conflict(format!(
            "order total exceeds the maximum of {}",
            Price::MAX_STORED.display()
        ))
    };
    let totals = CartTotals::compute(lines).map_err(|_| too_large())?;
    if !totals.total.is_storable() {
        return Err(too_large());
    }
    Ok(totals)
}

/// Return a cancelled order's items to stock.
async fn restock(tx: &mut Transaction<'_, Postgres>, order_id: OrderId) -> Result<(), RepositoryError> {
    sqlx::query(
        "UPDATE products p SET
             quantity = p.quantity + oi.quantity,
             quantity_sold = GREATEST(p.quantity_sold - oi.quantity, 0),
             updated_at = now()
         FROM order_items oi
         WHERE oi.order_id = $1 AND oi.product_id = p.id",
    )
    .bind(order_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pawtopia_core::SHIPPING_FEE;

    use super::*;

    #[test]
    fn test_order_totals_include_shipping() {
        let totals = order_totals(&[CartLine::new(Price::from_pesos(250), 2)]).unwrap();
        assert_eq!(totals.total, Price::from_pesos(500) + SHIPPING_FEE);
    }

    #[test]
    fn test_order_totals_reject_amounts_beyond_columns() {
        let lines = [CartLine::new(Price::from_pesos(1_000_000), 20_000)];
        assert!(matches!(
            order_totals(&lines),
            Err(RepositoryError::Conflict(msg)) if msg.contains("₱9,999,999,999.99")
        ));
    }
}
