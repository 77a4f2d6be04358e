//! `PayMongo` payment link client.
//!
//! Online checkout creates a payment link for an order's total and hands the
//! hosted checkout URL back to the client. Amounts are sent in centavos.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};
use url::Url;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use pawtopia_core::{Price, PriceError};

use crate::config::PaymentConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors that can occur when creating a payment link.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// `PayMongo` answered with a non-success status.
    #[error("PayMongo API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response did not contain a checkout URL.
    #[error("parse error: {0}")]
    Parse(String),

    /// Order total cannot be expressed in centavos.
    #[error("invalid amount: {0}")]
    Amount(#[from] PriceError),

    /// Client could not be configured.
    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Serialize)]
struct LinkRequest<'a> {
    data: LinkData<'a>,
}

#[derive(Debug, Serialize)]
struct LinkData<'a> {
    attributes: LinkAttributes<'a>,
}

#[derive(Debug, Serialize)]
struct LinkAttributes<'a> {
    amount: i64,
    description: &'a str,
    remarks: &'a str,
    redirect: Redirect<'a>,
}

#[derive(Debug, Serialize)]
struct Redirect<'a> {
    success: &'a str,
    failed: &'a str,
}

#[derive(Debug, Deserialize)]
struct LinkResponse {
    data: LinkResponseData,
}

#[derive(Debug, Deserialize)]
struct LinkResponseData {
    attributes: LinkResponseAttributes,
}

#[derive(Debug, Deserialize)]
struct LinkResponseAttributes {
    checkout_url: String,
}

/// Client for the `PayMongo` links API.
#[derive(Clone)]
pub struct PaymentClient {
    client: reqwest::Client,
    api_url: Url,
    redirect_url: Url,
}

impl std::fmt::Debug for PaymentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentClient")
            .field("api_url", &self.api_url.as_str())
            .field("redirect_url", &self.redirect_url.as_str())
            .finish_non_exhaustive()
    }
}

impl PaymentClient {
    /// Create a new client using HTTP Basic auth with the secret key.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &PaymentConfig) -> Result<Self, PaymentError> {
        let mut headers = HeaderMap::new();

        let mut auth = HeaderValue::from_str(&basic_auth(config.secret_key.expose_secret()))
            .map_err(|e| PaymentError::Config(format!("invalid secret key: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            redirect_url: config.redirect_url.clone(),
        })
    }

    /// Create a payment link and return its checkout URL.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Api` if `PayMongo` rejects the request.
    /// Returns `PaymentError::Parse` if the response has no checkout URL.
    #[instrument(skip(self, description, remarks), fields(amount = %amount))]
    pub async fn create_link(
        &self,
        amount: Price,
        description: &str,
        remarks: &str,
    ) -> Result<Url, PaymentError> {
        let body = link_request(amount, description, remarks, self.redirect_url.as_str())?;

        let response = self
            .client
            .post(self.api_url.clone())
            .json(&body)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "PayMongo rejected payment link");
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        let url = parse_checkout_url(&text)?;
        info!("Payment link created");
        Ok(url)
    }
}

fn basic_auth(secret_key: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{secret_key}:")))
}

fn link_request<'a>(
    amount: Price,
    description: &'a str,
    remarks: &'a str,
    redirect: &'a str,
) -> Result<LinkRequest<'a>, PaymentError> {
    Ok(LinkRequest {
        data: LinkData {
            attributes: LinkAttributes {
                amount: amount.to_centavos()?,
                description,
                remarks,
                redirect: Redirect {
                    success: redirect,
                    failed: redirect,
                },
            },
        },
    })
}

fn parse_checkout_url(body: &str) -> Result<Url, PaymentError> {
    let response: LinkResponse =
        serde_json::from_str(body).map_err(|e| PaymentError::Parse(e.to_string()))?;
    Url::parse(&response.data.attributes.checkout_url)
        .map_err(|e| PaymentError::Parse(format!("invalid checkout_url: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_basic_auth_appends_colon() {
        // base64("sk_test_abc:")
        assert_eq!(basic_auth("sk_test_abc"), "Basic c2tfdGVzdF9hYmM6");
    }

    #[test]
    fn test_request_body_shape() {
        let amount = Price::new(Decimal::from_str("1529.50").unwrap()).unwrap();
        let body = link_request(amount, "Pet food", "Shop Again!", "http://localhost:5173").unwrap();
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["data"]["attributes"]["amount"], 152_950);
        assert_eq!(json["data"]["attributes"]["description"], "Pet food");
        assert_eq!(json["data"]["attributes"]["remarks"], "Shop Again!");
        assert_eq!(
            json["data"]["attributes"]["redirect"]["success"],
            "http://localhost:5173"
        );
        assert_eq!(
            json["data"]["attributes"]["redirect"]["failed"],
            "http://localhost:5173"
        );
    }

    #[test]
    fn test_parse_checkout_url() {
        let body = r#"{"data":{"id":"link_1","type":"link","attributes":{
            "amount":152950,"checkout_url":"https://pm.link/pawtopia/abc123","status":"unpaid"}}}"#;
        let url = parse_checkout_url(body).unwrap();
        assert_eq!(url.as_str(), "https://pm.link/pawtopia/abc123");
    }

    #[test]
    fn test_parse_rejects_missing_checkout_url() {
        let body = r#"{"data":{"attributes":{"amount":100}}}"#;
        assert!(matches!(
            parse_checkout_url(body),
            Err(PaymentError::Parse(_))
        ));
        assert!(matches!(
            parse_checkout_url("not json"),
            Err(PaymentError::Parse(_))
        ));
    }
}
