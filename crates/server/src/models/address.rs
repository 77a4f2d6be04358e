//! Shipping addresses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pawtopia_core::UserId;

use super::{ValidationError, optional, required};

/// A customer's shipping address.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub user_id: UserId,
    pub region: String,
    pub province: String,
    pub city: String,
    pub barangay: String,
    pub postal_code: String,
    pub street_building_house_no: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Address as submitted by a client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub barangay: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub street_building_house_no: Option<String>,
}

/// Address fields after trimming and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidAddress {
    pub region: String,
    pub province: String,
    pub city: String,
    pub barangay: String,
    pub postal_code: String,
    pub street_building_house_no: Option<String>,
}

impl AddressInput {
    /// Every field except the street line is required.
    ///
    /// # Errors
    ///
    /// Returns the first missing field, or an invalid postal code.
    pub fn validate(&self) -> Result<ValidAddress, ValidationError> {
        let postal_code = required("postalCode", &self.postal_code)?;
        if !postal_code.chars().all(|c| c.is_ascii_digit()) || postal_code.len() > 10 {
            return Err(ValidationError::invalid(
                "postalCode",
                "must be up to 10 digits",
            ));
        }

        Ok(ValidAddress {
            region: required("region", &self.region)?,
            province: required("province", &self.province)?,
            city: required("city", &self.city)?,
            barangay: required("barangay", &self.barangay)?,
            postal_code,
            street_building_house_no: optional(self.street_building_house_no.as_deref()),
        })
    }
}
