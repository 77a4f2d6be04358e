//! Authentication service.
//!
//! Provides password signup and login for customers and admins, issuing
//! bearer tokens on success.

mod error;
pub mod token;

pub use error::AuthError;
pub use token::{Claims, Principal, TokenError, TokenService};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use tracing::{info, instrument};

use pawtopia_core::{Email, Role, Username};

use crate::db::users::{NewUser, UserRepository};
use crate::db::{AdminRepository, RepositoryError};
use crate::models::user::{Admin, AdminLoginResponse, LoginResponse, SignupRequest, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length, bounding Argon2 work per request.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    admins: AdminRepository<'a>,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenService) -> Self {
        Self {
            users: UserRepository::new(pool),
            admins: AdminRepository::new(pool),
            tokens,
        }
    }

    /// Register a customer. Their cart is created alongside the account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` or `AuthError::InvalidEmail` for bad input.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the username or email is taken.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn signup(&self, request: &SignupRequest) -> Result<User, AuthError> {
        let username = Username::parse(&request.username)?;
        let email = Email::parse(&request.email)?;
        validate_password(&request.password)?;
        let password_hash = hash_password(&request.password)?;

        let user = self
            .users
            .create(&NewUser {
                username: username.as_str(),
                password_hash: &password_hash,
                first_name: request.first_name.trim(),
                last_name: request.last_name.trim(),
                email: &email,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(msg) => AuthError::UserAlreadyExists(msg),
                other => AuthError::Repository(other),
            })?;

        info!(user_id = %user.id, "Customer registered");
        Ok(user)
    }

    /// Log a customer in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username or password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let creds = self
            .users
            .get_credentials(username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, &creds.password_hash)?;

        let token = self
            .tokens
            .issue(&Principal::customer(creds.id, creds.username.clone()))?;

        Ok(LoginResponse {
            token,
            user_id: creds.id,
            username: creds.username,
            email: creds.email,
            role: creds.role,
        })
    }

    /// Log an admin in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username or password is wrong.
    #[instrument(skip(self, password))]
    pub async fn admin_login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AdminLoginResponse, AuthError> {
        let creds = self
            .admins
            .get_credentials(username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, &creds.password_hash)?;

        let token = self.tokens.issue(&Principal {
            id: creds.id.as_i32(),
            username: creds.username.clone(),
            role: Role::Admin,
        })?;

        Ok(AdminLoginResponse {
            token,
            admin_id: creds.id,
            username: creds.username,
            role: Role::Admin,
        })
    }

    /// Create another admin account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` or `AuthError::WeakPassword` for bad input.
    /// Returns `AuthError::UserAlreadyExists` if the username is taken.
    #[instrument(skip(self, password))]
    pub async fn create_admin(&self, username: &str, password: &str) -> Result<Admin, AuthError> {
        let username = Username::parse(username)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let admin = self
            .admins
            .create(username.as_str(), &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(msg) => AuthError::UserAlreadyExists(msg),
                other => AuthError::Repository(other),
            })?;

        info!(admin_id = %admin.id, "Admin created");
        Ok(admin)
    }
}

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short or too long.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at most {MAX_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the password does not match.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
