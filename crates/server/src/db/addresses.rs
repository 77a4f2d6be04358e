//! Shipping address repository. Each customer has at most one address.

use sqlx::PgPool;

use pawtopia_core::UserId;

use super::RepositoryError;
use crate::models::address::{Address, ValidAddress};

const ADDRESS_COLUMNS: &str = "user_id, region, province, city, barangay, postal_code, \
                               street_building_house_no, updated_at";

pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert or replace a customer's address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn upsert(
        &self,
        user_id: UserId,
        address: &ValidAddress,
    ) -> Result<Address, RepositoryError> {
        sqlx::query_as::<_, Address>(&format!(
            "INSERT INTO addresses
                 (user_id, region, province, city, barangay, postal_code, street_building_house_no)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (user_id) DO UPDATE SET
                 region = EXCLUDED.region,
                 province = EXCLUDED.province,
                 city = EXCLUDED.city,
                 barangay = EXCLUDED.barangay,
                 postal_code = EXCLUDED.postal_code,
                 street_building_house_no = EXCLUDED.street_building_house_no,
                 updated_at = now()
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&address.region)
        .bind(&address.province)
        .bind(&address.city)
        .bind(&address.barangay)
        .bind(&address.postal_code)
        .bind(address.street_building_house_no.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                RepositoryError::NotFound
            }
            other => RepositoryError::Database(other),
        })
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, user_id: UserId) -> Result<Option<Address>, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(address)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Address>, RepositoryError> {
        let addresses = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses ORDER BY user_id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(addresses)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer has no address.
    pub async fn delete(&self, user_id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM addresses WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
