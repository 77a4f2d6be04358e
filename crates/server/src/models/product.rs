//! Catalog products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pawtopia_core::{Price, ProductId};

use super::{ValidationError, optional, required};

/// Maximum length of an inline (base64) product image.
pub const MAX_IMAGE_LEN: usize = 6 * 1024 * 1024;

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "productId")]
    pub id: ProductId,
    #[serde(rename = "productName")]
    pub name: String,
    pub description: String,
    #[serde(rename = "productPrice")]
    pub price: Price,
    pub product_type: String,
    /// Units in stock.
    pub quantity: i32,
    pub quantity_sold: i32,
    #[serde(rename = "productImage")]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// Product fields as submitted by an admin.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub product_price: Price,
    #[serde(default)]
    pub product_type: String,
    #[serde(default)]
    pub quantity: i32,
    /// Omitted on update to keep the stored image.
    #[serde(default)]
    pub product_image: Option<String>,
}

/// Product fields after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub product_type: String,
    pub quantity: i32,
    pub image: Option<String>,
}

impl ProductInput {
    /// # Errors
    ///
    /// Returns an error for a blank name or type, negative stock, a price
    /// beyond the money columns, or an oversized image.
    pub fn validate(&self) -> Result<ValidProduct, ValidationError> {
        let name = required("productName", &self.product_name)?;
        if name.chars().count() > 200 {
            return Err(ValidationError::invalid(
                "productName",
                "must be at most 200 characters",
            ));
        }
        if self.quantity < 0 {
            return Err(ValidationError::invalid("quantity", "cannot be negative"));
        }
        if !self.product_price.is_storable() {
            return Err(ValidationError::invalid("productPrice", "is too large"));
        }
        let image = optional(self.product_image.as_deref());
        if image.as_ref().is_some_and(|i| i.len() > MAX_IMAGE_LEN) {
            return Err(ValidationError::invalid("productImage", "is too large"));
        }

        Ok(ValidProduct {
            name,
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_owned(),
            price: self.product_price,
            product_type: required("productType", &self.product_type)?,
            quantity: self.quantity,
            image,
        })
    }
}

/// Query parameters for listing products.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    /// Exact product type, case-insensitive.
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    /// Substring of the name or description, case-insensitive.
    pub search: Option<String>,
}

impl ProductFilter {
    /// Whether `product` passes this filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let type_ok = self
            .product_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .is_none_or(|t| product.product_type.eq_ignore_ascii_case(t));

        let search_ok = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .is_none_or(|s| {
                let needle = s.to_lowercase();
                product.name.to_lowercase().contains(&needle)
                    || product.description.to_lowercase().contains(&needle)
            });

        type_ok && search_ok
    }
}

/// Units sold across the whole catalog.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantitySold {
    pub total_quantity_sold: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(name: &str, product_type: &str) -> Product {
        Product {
            id: ProductId::new(1),
            name: name.to_owned(),
            description: "Grain-free formula".to_owned(),
            price: Price::from_pesos(499),
            product_type: product_type.to_owned(),
            quantity: 5,
            quantity_sold: 0,
            image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_validate_accepts_client_payload() {
        let input: ProductInput = serde_json::from_str(
            r#"{"productName":" Dog Food ","productPrice":499.5,
                "productType":"Food","quantity":10}"#,
        )
        .unwrap();
        let valid = input.validate().unwrap();
        assert_eq!(valid.name, "Dog Food");
        assert_eq!(valid.description, "");
        assert_eq!(valid.image, None);
    }

    #[test]
    fn test_validate_rejects_negative_stock_and_blank_type() {
        let mut input: ProductInput = serde_json::from_str(
            r#"{"productName":"Leash","productPrice":"120","productType":"","quantity":1}"#,
        )
        .unwrap();
        assert_eq!(
            input.validate(),
            Err(ValidationError::Required("productType"))
        );
        input.product_type = "Accessories".into();
        input.quantity = -1;
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unstorable_price() {
        let input: ProductInput = serde_json::from_str(
            r#"{"productName":"Gold Collar","productPrice":"10000000000","productType":"Toys"}"#,
        )
        .unwrap();
        assert!(matches!(
            input.validate(),
            Err(ValidationError::Invalid { field: "productPrice", .. })
        ));
    }

    #[test]
    fn test_negative_price_fails_to_deserialize() {
        let result = serde_json::from_str::<ProductInput>(
            r#"{"productName":"Leash","productPrice":"-1","productType":"Toys"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_filter_by_type_and_search() {
        let food = product("Dog Food", "Food");
        let toy = product("Chew Toy", "Toys");

        let by_type = ProductFilter {
            product_type: Some("food".into()),
            search: None,
        };
        assert!(by_type.matches(&food));
        assert!(!by_type.matches(&toy));

        let by_search = ProductFilter {
            product_type: None,
            search: Some("GRAIN".into()),
        };
        assert!(by_search.matches(&food));

        assert!(ProductFilter::default().matches(&toy));
    }

    #[test]
    fn test_serializes_client_field_names() {
        let json = serde_json::to_value(product("Dog Food", "Food")).unwrap();
        assert_eq!(json["productId"], 1);
        assert_eq!(json["productName"], "Dog Food");
        assert_eq!(json["productPrice"], "499");
        assert_eq!(json["quantitySold"], 0);
    }
}
