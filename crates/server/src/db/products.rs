//! Product catalog repository.

use sqlx::PgPool;

use pawtopia_core::ProductId;

use super::{RepositoryError, map_unique_violation};
use crate::models::product::{Product, ValidProduct};

const PRODUCT_COLUMNS: &str = "id, name, description, price, product_type, quantity, \
                               quantity_sold, image, created_at, updated_at";

const PRODUCT_CONFLICTS: &[(&str, &str)] =
    &[("products_name_key", "a product with this name already exists")];

/// Repository for catalog products.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create(&self, product: &ValidProduct) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (name, description, price, product_type, quantity, image)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.product_type)
        .bind(product.quantity)
        .bind(product.image.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, PRODUCT_CONFLICTS, "product already exists"))
    }

    /// Insert a product or update the one with the same name.
    ///
    /// Used by catalog seeding. An omitted image keeps the stored one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_by_name(&self, product: &ValidProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (name, description, price, product_type, quantity, image)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (name) DO UPDATE SET
                 description = EXCLUDED.description,
                 price = EXCLUDED.price,
                 product_type = EXCLUDED.product_type,
                 quantity = EXCLUDED.quantity,
                 image = COALESCE(EXCLUDED.image, products.image),
                 updated_at = now()
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.product_type)
        .bind(product.quantity)
        .bind(product.image.as_deref())
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    /// All products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// Replace a product's fields. An omitted image keeps the stored one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if the new name is taken.
    pub async fn update(
        &self,
        id: ProductId,
        product: &ValidProduct,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET
                 name = $2,
                 description = $3,
                 price = $4,
                 product_type = $5,
                 quantity = $6,
                 image = COALESCE($7, image),
                 updated_at = now()
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.product_type)
        .bind(product.quantity)
        .bind(product.image.as_deref())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, PRODUCT_CONFLICTS, "product already exists"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product. Past order items keep their snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Units sold across all products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn total_quantity_sold(&self) -> Result<i64, RepositoryError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(quantity_sold), 0)::BIGINT FROM products")
                .fetch_one(self.pool)
                .await?;
        Ok(total)
    }
}
