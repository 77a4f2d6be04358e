//! Product review repository.

use sqlx::PgPool;

use pawtopia_core::{OrderId, OrderItemId, OrderStatus, ProductId, ReviewId, UserId};

use super::{RepositoryError, map_unique_violation};
use crate::models::review::Review;

const REVIEW_SELECT: &str = "SELECT r.id, r.product_id, r.user_id, r.order_id, r.ratings, \
                             r.comment, u.username, r.created_at";

/// The order line a review would be attached to.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct ReviewableItem {
    pub order_item_id: OrderItemId,
    pub order_status: OrderStatus,
    pub is_rated: bool,
}

/// Repository for product reviews.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find the line for `product_id` in one of `user_id`'s orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_order_item(
        &self,
        user_id: UserId,
        order_id: OrderId,
        product_id: ProductId,
    ) -> Result<Option<ReviewableItem>, RepositoryError> {
        let item = sqlx::query_as::<_, ReviewableItem>(
            "SELECT oi.id AS order_item_id, o.order_status, oi.is_rated
             FROM order_items oi
             JOIN orders o ON o.id = oi.order_id
             WHERE o.id = $1 AND o.user_id = $2 AND oi.product_id = $3
             LIMIT 1",
        )
        .bind(order_id)
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(item)
    }

    /// Insert a review and mark its order item as rated in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already reviewed the product.
    pub async fn create(
        &self,
        user_id: UserId,
        item: &ReviewableItem,
        product_id: ProductId,
        order_id: OrderId,
        ratings: i16,
        comment: Option<&str>,
    ) -> Result<Review, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let review = sqlx::query_as::<_, Review>(&format!(
            "WITH r AS (
                 INSERT INTO reviews (product_id, user_id, order_id, ratings, comment)
                 VALUES ($1, $2, $3, $4, $5)
                 RETURNING *
             )
             {REVIEW_SELECT} FROM r JOIN users u ON u.id = r.user_id"
        ))
        .bind(product_id)
        .bind(user_id)
        .bind(order_id)
        .bind(ratings)
        .bind(comment)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            map_unique_violation(
                e,
                &[("reviews_user_product_key", "you have already reviewed this product")],
                "review already exists",
            )
        })?;

        sqlx::query("UPDATE order_items SET is_rated = TRUE WHERE id = $1")
            .bind(item.order_item_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(review)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "{REVIEW_SELECT} FROM reviews r JOIN users u ON u.id = r.user_id WHERE r.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(review)
    }

    /// All reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Review>, RepositoryError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "{REVIEW_SELECT} FROM reviews r JOIN users u ON u.id = r.user_id
             ORDER BY r.created_at DESC, r.id DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(reviews)
    }

    /// Reviews of one product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_product(&self, product_id: ProductId) -> Result<Vec<Review>, RepositoryError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "{REVIEW_SELECT} FROM reviews r JOIN users u ON u.id = r.user_id
             WHERE r.product_id = $1
             ORDER BY r.created_at DESC, r.id DESC"
        ))
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;
        Ok(reviews)
    }

    /// Star ratings for one product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ratings_for(&self, product_id: ProductId) -> Result<Vec<i16>, RepositoryError> {
        let ratings: Vec<i16> = sqlx::query_scalar("SELECT ratings FROM reviews WHERE product_id = $1")
            .bind(product_id)
            .fetch_all(self.pool)
            .await?;
        Ok(ratings)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    pub async fn update(
        &self,
        id: ReviewId,
        ratings: i16,
        comment: Option<&str>,
    ) -> Result<Review, RepositoryError> {
        sqlx::query_as::<_, Review>(&format!(
            "WITH r AS (
                 UPDATE reviews SET ratings = $2, comment = $3 WHERE id = $1 RETURNING *
             )
             {REVIEW_SELECT} FROM r JOIN users u ON u.id = r.user_id"
        ))
        .bind(id)
        .bind(ratings)
        .bind(comment)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    pub async fn delete(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
