use super::ProductId;
use crate::error::{BotError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// A menu entry. Prices are expressed in the smallest currency unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: u64,
    /// File name of the product picture, relative to the images directory.
    #[serde(default)]
    pub image: Option<String>,
}

/// Immutable product lookup built once at startup.
///
/// A catalog that failed to load is simply empty: browsing yields nothing and
/// every lookup fails with `UnknownProduct`, but the bot keeps running.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    by_id: HashMap<ProductId, usize>,
    images_dir: Option<PathBuf>,
}

impl Catalog {
    /// Builds a catalog preserving menu order. Duplicate ids keep the first entry.
    pub fn from_products(products: Vec<Product>) -> Self {
        let mut catalog = Self::default();
        for product in products {
            if catalog.by_id.contains_key(&product.id) {
                warn!(product_id = product.id, "duplicate product id in menu, skipping");
                continue;
            }
            catalog.by_id.insert(product.id, catalog.products.len());
            catalog.products.push(product);
        }
        catalog
    }

    /// Reads a JSON menu (an array of products) from `path`.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let products: Vec<Product> = serde_json::from_slice(&bytes)?;
        Ok(Self::from_products(products))
    }

    /// Loads the menu, degrading to an empty catalog when the file is missing or malformed.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::read(path) {
            Ok(catalog) => {
                info!(path = %path.display(), products = catalog.len(), "menu loaded");
                catalog
            }
            Err(e) => {
                error!(path = %path.display(), "error reading menu: {}", e);
                Self::default()
            }
        }
    }

    pub fn with_images_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.images_dir = Some(dir.into());
        self
    }

    pub fn lookup(&self, id: ProductId) -> Result<&Product> {
        self.by_id
            .get(&id)
            .map(|&index| &self.products[index])
            .ok_or(BotError::UnknownProduct(id))
    }

    /// Products in menu order.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Path of the product picture, only if an images directory is configured
    /// and the file actually exists.
    pub fn image_path(&self, product: &Product) -> Option<PathBuf> {
        let dir = self.images_dir.as_ref()?;
        let name = product.image.as_deref()?;
        let path = dir.join(name);
        path.is_file().then_some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, tempdir};

    fn product(id: ProductId, name: &str, price: u64) -> Product {
        Product {
            id,
            name: name.to_string(),
            description: String::new(),
            price,
            image: None,
        }
    }

    #[test]
    fn test_lookup_known_and_unknown() {
        let catalog = Catalog::from_products(vec![product(1, "Bread", 5000)]);
        assert_eq!(catalog.lookup(1).unwrap().name, "Bread");
        assert!(matches!(
            catalog.lookup(9),
            Err(BotError::UnknownProduct(9))
        ));
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let catalog = Catalog::from_products(vec![
            product(1, "Bread", 5000),
            product(1, "Cake", 9000),
            product(2, "Milk", 7000),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.lookup(1).unwrap().name, "Bread");
        let names: Vec<_> = catalog.products().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Bread", "Milk"]);
    }

    #[test]
    fn test_load_menu_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 1, "name": "Somsa", "description": "Hot", "price": 8000, "image": "somsa.jpg"}},
                {{"id": 2, "name": "Tea", "price": 3000}}]"#
        )
        .unwrap();

        let catalog = Catalog::load(file.path());
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.lookup(1).unwrap().image.as_deref(), Some("somsa.jpg"));
        assert_eq!(catalog.lookup(2).unwrap().description, "");
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let catalog = Catalog::load("definitely/not/here/menu.json");
        assert!(catalog.is_empty());
        assert!(catalog.lookup(1).is_err());
    }

    #[test]
    fn test_load_malformed_file_is_empty() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(Catalog::load(file.path()).is_empty());
        assert!(matches!(
            Catalog::read(file.path()),
            Err(BotError::JsonError(_))
        ));
    }

    #[test]
    fn test_image_path_requires_existing_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("bread.jpg"), b"jpg").unwrap();

        let mut with_image = product(1, "Bread", 5000);
        with_image.image = Some("bread.jpg".to_string());
        let mut missing_image = product(2, "Milk", 7000);
        missing_image.image = Some("milk.jpg".to_string());

        let catalog = Catalog::from_products(vec![with_image.clone(), missing_image.clone()])
            .with_images_dir(dir.path());
        assert_eq!(
            catalog.image_path(&with_image),
            Some(dir.path().join("bread.jpg"))
        );
        assert_eq!(catalog.image_path(&missing_image), None);

        let no_dir = Catalog::from_products(vec![with_image.clone()]);
        assert_eq!(no_dir.image_path(&with_image), None);
    }
}
