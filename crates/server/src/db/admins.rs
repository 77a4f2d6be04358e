//! Admin account repository.

use sqlx::PgPool;

use pawtopia_core::AdminId;

use super::{RepositoryError, map_unique_violation};
use crate::models::user::Admin;

/// Stored login credentials for an admin.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminCredentials {
    pub id: AdminId,
    pub username: String,
    pub password_hash: String,
}

/// Repository for admin accounts.
pub struct AdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an admin.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken.
    pub async fn create(&self, username: &str, password_hash: &str) -> Result<Admin, RepositoryError> {
        sqlx::query_as::<_, Admin>(
            "INSERT INTO admins (username, password_hash) VALUES ($1, $2)
             RETURNING id, username, created_at",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(
                e,
                &[("admins_username_key", "admin username is already taken")],
                "admin already exists",
            )
        })
    }

    /// Look up login credentials by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_credentials(
        &self,
        username: &str,
    ) -> Result<Option<AdminCredentials>, RepositoryError> {
        let creds = sqlx::query_as::<_, AdminCredentials>(
            "SELECT id, username, password_hash FROM admins WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;
        Ok(creds)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
