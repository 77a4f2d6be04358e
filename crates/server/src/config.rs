//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PAWTOPIA_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `PAWTOPIA_JWT_SECRET` - Access token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `PAWTOPIA_HOST` - Bind address (default: 127.0.0.1)
//! - `PAWTOPIA_PORT` - Listen port (default: 8080)
//! - `PAWTOPIA_TOKEN_TTL_MINUTES` - Access token lifetime (default: 60)
//! - `PAWTOPIA_CORS_ORIGINS` - Comma-separated allowed origins (default: `http://localhost:5173`)
//! - `PAYMONGO_SECRET` - `PayMongo` secret key; online payments are disabled without it
//! - `PAYMONGO_URL` - Payment link endpoint (default: `https://api.paymongo.com/v1/links`)
//! - `PAYMENT_REDIRECT_URL` - Where `PayMongo` sends the customer afterwards (default: `http://localhost:5173`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;
const DEFAULT_PAYMONGO_URL: &str = "https://api.paymongo.com/v1/links";
const DEFAULT_CLIENT_ORIGIN: &str = "http://localhost:5173";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// HS256 signing key for access tokens
    pub jwt_secret: SecretString,
    /// Access token lifetime in minutes
    pub token_ttl_minutes: i64,
    /// Origins allowed to call the API from a browser
    pub cors_origins: Vec<String>,
    /// Online payment configuration, if enabled
    pub payment: Option<PaymentConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (production, staging, ...)
    pub sentry_environment: Option<String>,
}

/// `PayMongo` payment link configuration.
///
/// Implements `Debug` manually to redact the secret key.
#[derive(Clone)]
pub struct PaymentConfig {
    /// `PayMongo` secret API key
    pub secret_key: SecretString,
    /// Payment link creation endpoint
    pub api_url: Url,
    /// Where the customer lands after paying or cancelling
    pub redirect_url: Url,
}

impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("secret_key", &"[REDACTED]")
            .field("api_url", &self.api_url.as_str())
            .field("redirect_url", &self.redirect_url.as_str())
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("PAWTOPIA_DATABASE_URL")?;
        let host = parse_env("PAWTOPIA_HOST", "127.0.0.1")?;
        let port = parse_env("PAWTOPIA_PORT", "8080")?;

        let jwt_secret = get_validated_secret("PAWTOPIA_JWT_SECRET")?;
        validate_secret_length(&jwt_secret, "PAWTOPIA_JWT_SECRET")?;

        let token_ttl_minutes: i64 = parse_env(
            "PAWTOPIA_TOKEN_TTL_MINUTES",
            &DEFAULT_TOKEN_TTL_MINUTES.to_string(),
        )?;
        if token_ttl_minutes <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "PAWTOPIA_TOKEN_TTL_MINUTES".to_string(),
                "must be positive".to_string(),
            ));
        }

        let cors_origins = parse_origins(&get_env_or_default(
            "PAWTOPIA_CORS_ORIGINS",
            DEFAULT_CLIENT_ORIGIN,
        ));

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            token_ttl_minutes,
            cors_origins,
            payment: PaymentConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl PaymentConfig {
    /// Payments are optional: no secret key means online checkout is off.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(secret) = get_optional_env("PAYMONGO_SECRET") else {
            return Ok(None);
        };
        validate_secret_strength(&secret, "PAYMONGO_SECRET")?;

        Ok(Some(Self {
            secret_key: SecretString::from(secret),
            api_url: parse_env("PAYMONGO_URL", DEFAULT_PAYMONGO_URL)?,
            redirect_url: parse_env("PAYMENT_REDIRECT_URL", DEFAULT_CLIENT_ORIGIN)?,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Split a comma-separated origin list, dropping blanks and trailing slashes.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

/// Validate that a signing secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_bounds() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("zzzzzz") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("Qm7#vR2!kT9@wX4$") > 3.3);
    }

    #[test]
    fn test_placeholder_secrets_rejected() {
        for value in ["your-jwt-key-here", "changeme-now-please", "my-secret-key-123"] {
            let err = validate_secret_strength(value, "PAWTOPIA_JWT_SECRET").unwrap_err();
            assert!(matches!(err, ConfigError::InsecureSecret(_, _)), "{value}");
        }
    }

    #[test]
    fn test_low_entropy_secret_rejected() {
        let result = validate_secret_strength(&"ab".repeat(20), "PAWTOPIA_JWT_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_random_secret_accepted() {
        assert!(
            validate_secret_strength("Qm7#vR2!kT9@wX4$zL6^pN8&hJ3*fD5(", "PAWTOPIA_JWT_SECRET")
                .is_ok()
        );
    }

    #[test]
    fn test_secret_length() {
        let short = SecretString::from("Qm7#vR2!");
        assert!(validate_secret_length(&short, "PAWTOPIA_JWT_SECRET").is_err());
        let long = SecretString::from("k".repeat(32));
        assert!(validate_secret_length(&long, "PAWTOPIA_JWT_SECRET").is_ok());
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" http://localhost:5173/ , https://pawtopia.ph,,"),
            vec!["http://localhost:5173", "https://pawtopia.ph"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            database_url: SecretString::from("postgres://localhost/pawtopia"),
            host: "0.0.0.0".parse().unwrap(),
            port: 8080,
            jwt_secret: SecretString::from("Qm7#vR2!kT9@wX4$zL6^pN8&hJ3*fD5("),
            token_ttl_minutes: 60,
            cors_origins: vec![DEFAULT_CLIENT_ORIGIN.to_string()],
            payment: None,
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "0.0.0.0");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_payment_config_debug_redacts_key() {
        let config = PaymentConfig {
            secret_key: SecretString::from("sk_test_Qm7vR2kT9wX4zL6pN8hJ"),
            api_url: Url::parse(DEFAULT_PAYMONGO_URL).unwrap(),
            redirect_url: Url::parse(DEFAULT_CLIENT_ORIGIN).unwrap(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("api.paymongo.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("sk_test_Qm7vR2kT9wX4zL6pN8hJ"));
    }
}
