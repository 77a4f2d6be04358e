//! Seed the product catalog from YAML.
//!
//! The file holds a `products` list using the same field names as the
//! product API:
//!
//! ```yaml
//! products:
//!   - productName: Salmon Kibble 2kg
//!     description: Grain-free dry food for adult dogs
//!     productPrice: "849.00"
//!     productType: Food
//!     quantity: 40
//! ```
//!
//! Products are matched by name, so re-running a seed updates stock and
//! prices instead of duplicating rows.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use pawtopia_server::db::ProductRepository;
use pawtopia_server::models::product::{ProductInput, ValidProduct};

use super::{CommandError, connect};

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    products: Vec<ProductInput>,
}

/// Insert or update every product in `file_path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, any entry is
/// invalid, or a database operation fails. Nothing is written unless the
/// whole file validates.
pub async fn products(file_path: &str) -> Result<(), CommandError> {
    let content = tokio::fs::read_to_string(Path::new(file_path))
        .await
        .map_err(|source| CommandError::Io {
            path: file_path.to_owned(),
            source,
        })?;

    let products = parse_catalog(&content)?;
    info!(count = products.len(), path = %file_path, "Catalog validated");

    let pool = connect().await?;
    let repo = ProductRepository::new(&pool);

    for product in &products {
        let saved = repo.upsert_by_name(product).await?;
        info!(product_id = %saved.id, name = %saved.name, stock = saved.quantity, "Seeded product");
    }

    info!("Seeding complete! {} products written", products.len());
    Ok(())
}

/// Parse and validate a YAML catalog.
fn parse_catalog(content: &str) -> Result<Vec<ValidProduct>, CommandError> {
    let file: SeedFile = serde_yaml::from_str(content)?;
    file.products
        .iter()
        .enumerate()
        .map(|(i, input)| {
            input.validate().map_err(|source| CommandError::InvalidProduct {
                index: i + 1,
                name: input.product_name.clone(),
                source,
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pawtopia_core::Price;

    use super::*;

    const CATALOG: &str = r#"
products:
  - productName: "  Salmon Kibble 2kg "
    description: Grain-free dry food
    productPrice: "849.00"
    productType: Food
    quantity: 40
  - productName: Rope Toy
    productPrice: 120
    productType: Toys
"#;

    #[test]
    fn test_parse_catalog() {
        let products = parse_catalog(CATALOG).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Salmon Kibble 2kg");
        assert_eq!(products[0].quantity, 40);
        assert_eq!(products[1].price, Price::from_pesos(120));
        assert_eq!(products[1].quantity, 0);
        assert_eq!(products[1].description, "");
    }

    #[test]
    fn test_invalid_entry_names_its_position() {
        let yaml = "products:\n  - productName: Leash\n    productPrice: 10\n    productType: Gear\n    quantity: -1\n";
        let err = parse_catalog(yaml).unwrap_err();
        assert!(matches!(err, CommandError::InvalidProduct { index: 1, .. }));
        assert!(err.to_string().contains("Leash"));
    }

    #[test]
    fn test_negative_price_is_rejected_by_yaml() {
        let yaml = "products:\n  - productName: Leash\n    productPrice: \"-5\"\n    productType: Gear\n";
        assert!(matches!(
            parse_catalog(yaml).unwrap_err(),
            CommandError::Yaml(_)
        ));
    }

    #[tokio::test]
    async fn test_missing_file_reports_path() {
        let err = products("/nonexistent/catalog.yaml").await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/catalog.yaml"));
    }
}
