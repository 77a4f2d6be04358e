//! Cart and cart item repository.
//!
//! A cart's ID is its owner's user ID. Cart items are always read joined with
//! their product so callers see current price and stock.

use sqlx::PgPool;

use pawtopia_core::{CartId, CartItemId, ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::{Cart, CartItem};

const ITEM_SELECT: &str = "SELECT ci.id, ci.cart_id, ci.product_id, ci.quantity, ci.last_updated,
            p.name AS product_name, p.price AS product_price,
            p.image AS product_image, p.quantity AS stock
     FROM cart_items ci
     JOIN products p ON p.id = ci.product_id";

/// Repository for carts and their items.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Return the customer's cart, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ensure(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        let cart = sqlx::query_as::<_, Cart>(
            "INSERT INTO carts (id) VALUES ($1)
             ON CONFLICT (id) DO UPDATE SET id = EXCLUDED.id
             RETURNING id, created_at",
        )
        .bind(user_id.cart_id())
        .fetch_one(self.pool)
        .await?;
        Ok(cart)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CartId) -> Result<Option<Cart>, RepositoryError> {
        let cart = sqlx::query_as::<_, Cart>("SELECT id, created_at FROM carts WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(cart)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Cart>, RepositoryError> {
        let carts = sqlx::query_as::<_, Cart>("SELECT id, created_at FROM carts ORDER BY id")
            .fetch_all(self.pool)
            .await?;
        Ok(carts)
    }

    /// Items in a cart, most recently touched first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, cart_id: CartId) -> Result<Vec<CartItem>, RepositoryError> {
        let items = sqlx::query_as::<_, CartItem>(&format!(
            "{ITEM_SELECT} WHERE ci.cart_id = $1 ORDER BY ci.last_updated DESC, ci.id DESC"
        ))
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }

    /// Every cart item in the store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn all_items(&self) -> Result<Vec<CartItem>, RepositoryError> {
        let items = sqlx::query_as::<_, CartItem>(&format!("{ITEM_SELECT} ORDER BY ci.id"))
            .fetch_all(self.pool)
            .await?;
        Ok(items)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_item(&self, id: CartItemId) -> Result<Option<CartItem>, RepositoryError> {
        let item = sqlx::query_as::<_, CartItem>(&format!("{ITEM_SELECT} WHERE ci.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(item)
    }

    /// Add `quantity` of a product to a cart, merging with an existing line.
    ///
    /// The merged quantity is capped at the product's stock in the same
    /// statement, so concurrent adds for one line never lose an increment.
    /// Returns `None` if the product is out of stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the cart does not exist.
    pub async fn add_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let id: Option<CartItemId> = sqlx::query_scalar(
            "INSERT INTO cart_items (cart_id, product_id, quantity)
             SELECT $1, p.id, LEAST($3, p.quantity)
             FROM products p
             WHERE p.id = $2 AND p.quantity > 0
             ON CONFLICT (cart_id, product_id) DO UPDATE SET
                 quantity = LEAST(
                     cart_items.quantity::BIGINT + $3,
                     (SELECT p.quantity FROM products p WHERE p.id = EXCLUDED.product_id)
                 )::INTEGER,
                 last_updated = now()
             RETURNING id",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(to_db_quantity(quantity)?)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                RepositoryError::NotFound
            }
            other => RepositoryError::Database(other),
        })?;

        match id {
            Some(id) => self.get_item(id).await,
            None => Ok(None),
        }
    }

    /// Set a line's quantity. `touch` also bumps `last_updated`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist.
    pub async fn set_quantity(
        &self,
        id: CartItemId,
        quantity: u32,
        touch: bool,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE cart_items SET
                 quantity = $2,
                 last_updated = CASE WHEN $3 THEN now() ELSE last_updated END
             WHERE id = $1",
        )
        .bind(id)
        .bind(to_db_quantity(quantity)?)
        .bind(touch)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist.
    pub async fn delete_item(&self, id: CartItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove every item from a cart. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, cart_id: CartId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

fn to_db_quantity(quantity: u32) -> Result<i32, RepositoryError> {
    i32::try_from(quantity)
        .map_err(|_| RepositoryError::DataCorruption(format!("quantity {quantity} out of range")))
}
