//! Admin account management.
//!
//! There is no built-in default admin; the first account is created here and
//! later ones can be added through `POST /admin/add`.

use pawtopia_core::Username;
use pawtopia_server::db::{AdminRepository, RepositoryError};
use pawtopia_server::services::auth::{AuthError, hash_password, validate_password};

use super::{CommandError, connect};

/// Create an admin with an Argon2-hashed password.
///
/// # Errors
///
/// Returns an error for an invalid username, a weak password, a taken
/// username, or a database failure.
pub async fn create(username: &str, password: &str) -> Result<(), CommandError> {
    // Validate before touching the database
    let username = Username::parse(username).map_err(AuthError::from)?;
    validate_password(password)?;
    let password_hash = hash_password(password)?;

    let pool = connect().await?;

    let admin = AdminRepository::new(&pool)
        .create(username.as_str(), &password_hash)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(msg) => CommandError::Auth(AuthError::UserAlreadyExists(msg)),
            other => CommandError::Repository(other),
        })?;

    tracing::info!(
        "Admin created successfully! ID: {}, Username: {}",
        admin.id,
        admin.username
    );
    Ok(())
}
