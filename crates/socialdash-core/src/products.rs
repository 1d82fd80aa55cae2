use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A product (workspace) the dashboard can be scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Identifier sent to the API as `productType`.
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductsFile {
    pub products: Vec<Product>,
}

impl ProductsFile {
    /// Catalogue used when no products file is present.
    #[must_use]
    pub fn builtin() -> Self {
        let product = |id: &str, name: &str| Product {
            id: id.to_string(),
            name: name.to_string(),
        };
        Self {
            products: vec![
                product("pirai-infotech", "Pirai Infotech"),
                product("astraops", "Astraops"),
                product("g4-guides", "G4 Guides"),
            ],
        }
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}

/// Load and validate the product catalogue from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_products(path: &Path) -> Result<ProductsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ProductsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let products_file: ProductsFile = serde_yaml::from_str(&content)?;
    validate_products(&products_file)?;
    Ok(products_file)
}

/// Like [`load_products`], but falls back to [`ProductsFile::builtin`] when
/// the file does not exist.
///
/// # Errors
///
/// Returns `ConfigError` for any failure other than a missing file.
pub fn load_products_or_default(path: &Path) -> Result<ProductsFile, ConfigError> {
    match load_products(path) {
        Err(ConfigError::ProductsFileIo { ref source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            Ok(ProductsFile::builtin())
        }
        other => other,
    }
}

fn validate_products(products_file: &ProductsFile) -> Result<(), ConfigError> {
    if products_file.products.is_empty() {
        return Err(ConfigError::Validation(
            "at least one product must be configured".to_string(),
        ));
    }

    let mut seen_ids = HashSet::new();
    for product in &products_file.products {
        if product.id.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "product '{}' has an empty id",
                product.name
            )));
        }
        if product.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "product '{}' has an empty name",
                product.id
            )));
        }
        if !seen_ids.insert(product.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate product id: '{}'",
                product.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_yaml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_valid_catalogue() {
        let file = write_yaml(
            "products:\n  - id: astraops\n    name: Astraops\n  - id: g4-guides\n    name: G4 Guides\n",
        );
        let products = load_products(file.path()).unwrap();
        assert_eq!(products.products.len(), 2);
        assert_eq!(products.find("g4-guides").map(|p| p.name.as_str()), Some("G4 Guides"));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let file = write_yaml(
            "products:\n  - id: astraops\n    name: Astraops\n  - id: astraops\n    name: Other\n",
        );
        let err = load_products(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("duplicate")));
    }

    #[test]
    fn rejects_empty_catalogue() {
        let file = write_yaml("products: []\n");
        assert!(matches!(
            load_products(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let file = write_yaml("products: [ {id: \n");
        assert!(matches!(
            load_products(file.path()),
            Err(ConfigError::ProductsFileParse(_))
        ));
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let products = load_products_or_default(&dir.path().join("nope.yaml")).unwrap();
        assert_eq!(products.products, ProductsFile::builtin().products);
    }
}
