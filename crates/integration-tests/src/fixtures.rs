//! Rows for database-backed tests.
//!
//! Each helper inserts directly with SQL so a test only goes through the
//! router for the behavior it is checking.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use pawtopia_core::{OrderStatus, Price};

/// `last_updated` given to seeded cart items (2026-01-01T00:00:00Z).
///
/// # Panics
///
/// Never; the timestamp is in range.
#[must_use]
pub fn seeded_at() -> DateTime<Utc> {
    DateTime::from_timestamp(1_767_225_600, 0).unwrap_or_else(|| panic!("timestamp out of range"))
}

/// Insert a customer with an empty cart. Returns the user ID.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn customer(pool: &PgPool, username: &str) -> i32 {
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO users (username, password_hash, email)
         VALUES ($1, 'not-a-real-hash', $1 || '@pawtopia.test')
         RETURNING id",
    )
    .bind(username)
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| panic!("insert customer {username}: {e}"));

    sqlx::query("INSERT INTO carts (id) VALUES ($1)")
        .bind(id)
        .execute(pool)
        .await
        .unwrap_or_else(|e| panic!("insert cart {id}: {e}"));
    id
}

/// Insert a product priced at whole `pesos` with `stock` on hand.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn product(pool: &PgPool, name: &str, pesos: u32, stock: i32) -> i32 {
    sqlx::query_scalar(
        "INSERT INTO products (name, price, product_type, quantity)
         VALUES ($1, $2, 'Food', $3)
         RETURNING id",
    )
    .bind(name)
    .bind(Price::from_pesos(pesos))
    .bind(stock)
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| panic!("insert product {name}: {e}"))
}

/// Current `(quantity, quantity_sold)` of a product.
///
/// # Panics
///
/// Panics if the product does not exist.
pub async fn stock(pool: &PgPool, product_id: i32) -> (i32, i32) {
    sqlx::query_as("SELECT quantity, quantity_sold FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_one(pool)
        .await
        .unwrap_or_else(|e| panic!("read stock of {product_id}: {e}"))
}

/// Put `quantity` of a product in a customer's cart, stamped [`seeded_at`].
///
/// The quantity is stored as given, even above stock.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn cart_item(pool: &PgPool, user_id: i32, product_id: i32, quantity: i32) -> i32 {
    sqlx::query_scalar(
        "INSERT INTO cart_items (cart_id, product_id, quantity, last_updated)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .bind(seeded_at())
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| panic!("insert cart item: {e}"))
}

/// Stored `(quantity, last_updated)` of a cart item, or `None` once deleted.
///
/// # Panics
///
/// Panics if the query fails.
pub async fn stored_cart_item(pool: &PgPool, id: i32) -> Option<(i32, DateTime<Utc>)> {
    sqlx::query_as("SELECT quantity, last_updated FROM cart_items WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .unwrap_or_else(|e| panic!("read cart item {id}: {e}"))
}

/// Insert a one-line order in `status`. Returns `(order_id, order_item_id)`.
///
/// Stock is left untouched.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn order(
    pool: &PgPool,
    user_id: i32,
    product_id: i32,
    quantity: i32,
    status: OrderStatus,
) -> (i32, i32) {
    let order_id: i32 = sqlx::query_scalar(
        "INSERT INTO orders
             (user_id, payment_method, order_status, shipping_fee, total_price, description, remarks)
         VALUES ($1, 'CASH_ON_DELIVERY', $2, 30, 30, 'Seeded order', 'Seeded')
         RETURNING id",
    )
    .bind(user_id)
    .bind(status)
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| panic!("insert order: {e}"));

    let item_id: i32 = sqlx::query_scalar(
        "INSERT INTO order_items (order_id, product_id, name, price, quantity)
         SELECT $1, p.id, p.name, p.price, $3 FROM products p WHERE p.id = $2
         RETURNING id",
    )
    .bind(order_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| panic!("insert order item: {e}"));

    (order_id, item_id)
}

/// Whether an order item has been marked rated.
///
/// # Panics
///
/// Panics if the item does not exist.
pub async fn is_rated(pool: &PgPool, order_item_id: i32) -> bool {
    sqlx::query_scalar("SELECT is_rated FROM order_items WHERE id = $1")
        .bind(order_item_id)
        .fetch_one(pool)
        .await
        .unwrap_or_else(|e| panic!("read order item {order_item_id}: {e}"))
}

/// Number of orders placed by a customer.
///
/// # Panics
///
/// Panics if the query fails.
pub async fn order_count(pool: &PgPool, user_id: i32) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap_or_else(|e| panic!("count orders: {e}"))
}

/// Book a pending grooming appointment a week from today.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn appointment(pool: &PgPool, user_id: i32) -> i32 {
    sqlx::query_scalar(
        "INSERT INTO appointments (user_id, date, time, email, contact_no, service, price)
         VALUES ($1, CURRENT_DATE + 7, '10:00', 'owner@pawtopia.test', '09171234567',
                 'GROOMING', 500)
         RETURNING id",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| panic!("insert appointment: {e}"))
}
