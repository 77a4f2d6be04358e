//! HS256 JSON Web Tokens.
//!
//! Tokens are `base64url(header).base64url(claims).base64url(hmac)` with no
//! padding. Only `HS256` is accepted; the signature is checked in constant
//! time before the claims are parsed.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use pawtopia_core::{Role, UserId};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

/// Errors from issuing or verifying a token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("unsupported token algorithm")]
    UnsupportedAlgorithm,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("unknown role in token")]
    UnknownRole,
    #[error("invalid signing key")]
    Key,
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username.
    pub sub: String,
    /// Customer or admin ID, depending on `role`.
    pub uid: i32,
    /// `ROLE_CUSTOMER` or `ROLE_ADMIN`.
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Customer ID, or admin ID for admins.
    pub id: i32,
    pub username: String,
    pub role: Role,
}

impl Principal {
    #[must_use]
    pub const fn customer(id: UserId, username: String) -> Self {
        Self {
            id: id.as_i32(),
            username,
            role: Role::Customer,
        }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// The customer ID, or `None` for admins.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self.role {
            Role::Customer => Some(UserId::new(self.id)),
            Role::Admin => None,
        }
    }

    /// Whether the caller may act on records owned by `owner`.
    #[must_use]
    pub fn can_access(&self, owner: UserId) -> bool {
        self.is_admin() || self.user_id() == Some(owner)
    }
}

/// Issues and verifies access tokens.
pub struct TokenService {
    secret: SecretString,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenService {
    #[must_use]
    pub const fn new(secret: SecretString, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    /// How long issued tokens stay valid.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `principal`, valid from now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Key` if the signing key is rejected.
    pub fn issue(&self, principal: &Principal) -> Result<String, TokenError> {
        self.issue_at(principal, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (Unix seconds).
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Key` if the signing key is rejected.
    pub fn issue_at(&self, principal: &Principal, now: i64) -> Result<String, TokenError> {
        let header = Header {
            alg: ALGORITHM.to_owned(),
            typ: "JWT".to_owned(),
        };
        let claims = Claims {
            sub: principal.username.clone(),
            uid: principal.id,
            role: principal.role.claim().to_owned(),
            iat: now,
            exp: now.saturating_add(self.ttl.num_seconds()),
        };

        let header = encode_part(&header)?;
        let claims = encode_part(&claims)?;
        let signing_input = format!("{header}.{claims}");
        let signature = URL_SAFE_NO_PAD.encode(self.mac(&signing_input)?.finalize().into_bytes());
        Ok(format!("{signing_input}.{signature}"))
    }

    /// Verify a token and return its principal.
    ///
    /// # Errors
    ///
    /// Returns a `TokenError` describing why the token was rejected.
    pub fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify a token as if the current time were `now` (Unix seconds).
    ///
    /// # Errors
    ///
    /// Returns a `TokenError` describing why the token was rejected.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Principal, TokenError> {
        let mut parts = token.split('.');
        let (Some(header), Some(claims), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let header: Header = decode_part(header)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::UnsupportedAlgorithm);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;
        let signing_input_len = token.len() - signature_len(token);
        self.mac(&token[..signing_input_len])?
            .verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let claims: Claims = decode_part(claims)?;
        if claims.exp <= now {
            return Err(TokenError::Expired);
        }
        let role = Role::from_claim(&claims.role).ok_or(TokenError::UnknownRole)?;

        Ok(Principal {
            id: claims.uid,
            username: claims.sub,
            role,
        })
    }

    fn mac(&self, signing_input: &str) -> Result<HmacSha256, TokenError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| TokenError::Key)?;
        mac.update(signing_input.as_bytes());
        Ok(mac)
    }
}

/// Length of the signature segment plus its leading dot.
fn signature_len(token: &str) -> usize {
    token.rfind('.').map_or(0, |dot| token.len() - dot)
}

fn encode_part<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value).map_err(|_| TokenError::Malformed)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_part<T: for<'de> Deserialize<'de>>(part: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}
