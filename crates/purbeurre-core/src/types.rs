//! # Domain Types
//!
//! Entities of the Pur Beurre catalog.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Primary                 Reference (upsert on name)                     │
//! │  ┌─────────────────┐     ┌─────────────────┐   ┌─────────────────┐     │
//! │  │    Product      │     │    Category     │   │      Store      │     │
//! │  │  ─────────────  │     │  ─────────────  │   │  ─────────────  │     │
//! │  │  id (barcode)   │     │  id (generated) │   │  id (generated) │     │
//! │  │  name, url      │     │  name (unique)  │   │  name (unique)  │     │
//! │  │  nutriscore     │     └────────┬────────┘   └────────┬────────┘     │
//! │  └────────┬────────┘              │                     │              │
//! │           │                       │                     │              │
//! │  Join records (composite keys)    │                     │              │
//! │  ┌────────┴────────────┐  ┌───────┴─────────┐  ┌────────┴─────────┐    │
//! │  │ Favorite            │  │ ProductCategory │  │ ProductStore     │    │
//! │  │ product_id          │  │ product_id      │  │ product_id       │    │
//! │  │ substitute_id       │  │ category_id     │  │ store_id         │    │
//! │  └─────────────────────┘  └─────────────────┘  └──────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Construction
//! Text fields are cut to their column width when an entity is built, so an
//! overlong feed value never reaches the database. Join records have two
//! constructors: `new` takes raw foreign keys, `link`/`between` take the
//! entities themselves.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::validation::{capitalize, truncate};
use crate::{NUTRISCORE_LEN, PRODUCT_NAME_MAX, PRODUCT_URL_MAX, REFERENCE_NAME_MAX};

// =============================================================================
// Product
// =============================================================================

/// A food product.
///
/// The id is the product barcode. It comes from the feed and is never
/// generated by the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Barcode.
    pub id: i64,

    /// Full product name.
    pub name: String,

    /// Product page on the site the data was downloaded from.
    pub url: String,

    /// Nutritional grade letter (`a` is best).
    pub nutriscore: String,

    /// Free-text description.
    pub description: Option<String>,
}

impl Product {
    /// Builds a product, truncating each text field to its column width.
    pub fn new(
        id: i64,
        name: &str,
        url: &str,
        nutriscore: &str,
        description: Option<&str>,
    ) -> Self {
        Product {
            id,
            name: truncate(name, PRODUCT_NAME_MAX),
            url: truncate(url, PRODUCT_URL_MAX),
            nutriscore: truncate(nutriscore, NUTRISCORE_LEN),
            description: description.map(str::to_string),
        }
    }

    /// Renders the detail block shown when a product is selected.
    ///
    /// ## Layout
    /// ```text
    /// Product #3017620422003
    /// Name: Nutella
    /// URL: https://fr.openfoodfacts.org/produit/3017620422003
    /// Nutriscore: E
    /// Description: Pâte à tartiner aux noisettes
    /// ```
    /// A missing description renders as `-`.
    pub fn format_info(&self) -> String {
        format!(
            "Product #{}\nName: {}\nURL: {}\nNutriscore: {}\nDescription: {}",
            self.id,
            capitalize(&self.name),
            self.url,
            self.nutriscore.to_uppercase(),
            self.description.as_deref().unwrap_or("-"),
        )
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&capitalize(&self.name))
    }
}

// =============================================================================
// Category
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    /// Assigned by the database on first save.
    pub id: Option<i64>,

    /// Unique category name.
    pub name: String,
}

impl Category {
    /// Builds an unsaved category.
    pub fn new(name: &str) -> Self {
        Category {
            id: None,
            name: truncate(name, REFERENCE_NAME_MAX),
        }
    }

    /// Returns the id, or an error if the category was never saved.
    pub fn require_id(&self) -> CoreResult<i64> {
        self.id.ok_or_else(|| CoreError::NotPersisted {
            entity: format!("Category '{}'", self.name),
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&capitalize(&self.name))
    }
}

// =============================================================================
// Store
// =============================================================================

/// A store where products can be bought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Store {
    /// Assigned by the database on first save.
    pub id: Option<i64>,

    /// Unique store name.
    pub name: String,
}

impl Store {
    /// Builds an unsaved store.
    pub fn new(name: &str) -> Self {
        Store {
            id: None,
            name: truncate(name, REFERENCE_NAME_MAX),
        }
    }

    /// Returns the id, or an error if the store was never saved.
    pub fn require_id(&self) -> CoreResult<i64> {
        self.id.ok_or_else(|| CoreError::NotPersisted {
            entity: format!("Store '{}'", self.name),
        })
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&capitalize(&self.name))
    }
}

// =============================================================================
// Join Records
// =============================================================================

/// Product ↔ category association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductCategory {
    pub product_id: i64,
    pub category_id: i64,
}

impl ProductCategory {
    pub fn new(product_id: i64, category_id: i64) -> Self {
        ProductCategory {
            product_id,
            category_id,
        }
    }

    /// Links two entities; the category must already be saved.
    pub fn link(product: &Product, category: &Category) -> CoreResult<Self> {
        Ok(ProductCategory::new(product.id, category.require_id()?))
    }
}

/// Product ↔ store association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductStore {
    pub product_id: i64,
    pub store_id: i64,
}

impl ProductStore {
    pub fn new(product_id: i64, store_id: i64) -> Self {
        ProductStore {
            product_id,
            store_id,
        }
    }

    /// Links two entities; the store must already be saved.
    pub fn link(product: &Product, store: &Store) -> CoreResult<Self> {
        Ok(ProductStore::new(product.id, store.require_id()?))
    }
}

/// A saved substitution: `product` can be replaced by `substitute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Favorite {
    pub product_id: i64,
    pub substitute_id: i64,
}

impl Favorite {
    pub fn new(product_id: i64, substitute_id: i64) -> Self {
        Favorite {
            product_id,
            substitute_id,
        }
    }

    /// Records that `product` can be substituted by `substitute`.
    pub fn between(product: &Product, substitute: &Product) -> Self {
        Favorite::new(product.id, substitute.id)
    }
}

impl fmt::Display for Favorite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} → #{}", self.product_id, self.substitute_id)
    }
}

// =============================================================================
// Feed Record
// =============================================================================

/// A product as delivered by the feed client after normalization.
///
/// ## Shape
/// ```json
/// {
///   "id": 3017620422003,
///   "name": "nutella",
///   "url": "https://fr.openfoodfacts.org/produit/3017620422003",
///   "nutriscore": "e",
///   "description": "pâte à tartiner aux noisettes",
///   "categories": ["pâtes à tartiner", "produits au chocolat"],
///   "stores": ["carrefour"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub nutriscore: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub stores: Vec<String>,
}

impl ProductRecord {
    /// The product part of the record.
    pub fn to_product(&self) -> Product {
        Product::new(
            self.id,
            &self.name,
            &self.url,
            &self.nutriscore,
            self.description.as_deref(),
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn nutella() -> Product {
        Product::new(
            3017620422003,
            "nutella",
            "https://fr.openfoodfacts.org/produit/3017620422003",
            "e",
            Some("Pâte à tartiner aux noisettes"),
        )
    }

    #[test]
    fn test_product_new_keeps_fields() {
        let product = nutella();
        assert_eq!(product.id, 3017620422003);
        assert_eq!(product.name, "nutella");
        assert_eq!(product.nutriscore, "e");
        assert_eq!(
            product.description.as_deref(),
            Some("Pâte à tartiner aux noisettes")
        );
    }

    #[test]
    fn test_product_new_truncates() {
        let long_name = "x".repeat(PRODUCT_NAME_MAX + 50);
        let long_url = "u".repeat(PRODUCT_URL_MAX + 1);
        let product = Product::new(1, &long_name, &long_url, "abc", None);

        assert_eq!(product.name.chars().count(), PRODUCT_NAME_MAX);
        assert_eq!(product.url.chars().count(), PRODUCT_URL_MAX);
        assert_eq!(product.nutriscore, "a");
        assert!(product.description.is_none());
    }

    #[test]
    fn test_reference_names_truncate() {
        let name = "é".repeat(REFERENCE_NAME_MAX + 1);
        assert_eq!(Category::new(&name).name.chars().count(), REFERENCE_NAME_MAX);
        assert_eq!(Store::new(&name).name.chars().count(), REFERENCE_NAME_MAX);
    }

    #[test]
    fn test_reference_entities_start_without_id() {
        assert!(Category::new("pizzas").id.is_none());
        assert!(Store::new("carrefour").id.is_none());
    }

    #[test]
    fn test_format_info_layout() {
        let expected = "Product #3017620422003\n\
                        Name: Nutella\n\
                        URL: https://fr.openfoodfacts.org/produit/3017620422003\n\
                        Nutriscore: E\n\
                        Description: Pâte à tartiner aux noisettes";
        assert_eq!(nutella().format_info(), expected);
    }

    #[test]
    fn test_format_info_without_description() {
        let product = Product::new(2, "pizza margherita", "http", "d", None);
        assert!(product.format_info().ends_with("Description: -"));
    }

    #[test]
    fn test_display_capitalizes() {
        assert_eq!(nutella().to_string(), "Nutella");
        assert_eq!(Category::new("pizzas").to_string(), "Pizzas");
        assert_eq!(Store::new("leclerc").to_string(), "Leclerc");
        assert_eq!(Favorite::new(1, 2).to_string(), "#1 → #2");
    }

    #[test]
    fn test_link_requires_saved_category() {
        let unsaved = Category::new("pizzas");
        let err = ProductCategory::link(&nutella(), &unsaved).unwrap_err();
        assert!(matches!(err, CoreError::NotPersisted { .. }));

        let saved = Category {
            id: Some(7),
            name: "pizzas".to_string(),
        };
        let link = ProductCategory::link(&nutella(), &saved).unwrap();
        assert_eq!(link, ProductCategory::new(3017620422003, 7));
    }

    #[test]
    fn test_link_requires_saved_store() {
        assert!(ProductStore::link(&nutella(), &Store::new("auchan")).is_err());

        let saved = Store {
            id: Some(3),
            name: "auchan".to_string(),
        };
        assert_eq!(
            ProductStore::link(&nutella(), &saved).unwrap(),
            ProductStore::new(3017620422003, 3)
        );
    }

    #[test]
    fn test_favorite_between() {
        let substitute = Product::new(42, "pâte à tartiner bio", "http", "c", None);
        let favorite = Favorite::between(&nutella(), &substitute);
        assert_eq!(favorite.product_id, 3017620422003);
        assert_eq!(favorite.substitute_id, 42);
    }

    #[test]
    fn test_product_record_from_json() {
        let json = r#"{
            "id": 3017620422003,
            "name": "nutella",
            "url": "https://fr.openfoodfacts.org/produit/3017620422003",
            "nutriscore": "e",
            "categories": ["pâtes à tartiner", "produits au chocolat"],
            "stores": ["carrefour"]
        }"#;

        let record: ProductRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.categories.len(), 2);
        assert_eq!(record.stores, vec!["carrefour".to_string()]);
        assert!(record.description.is_none());

        let product = record.to_product();
        assert_eq!(product.id, 3017620422003);
        assert_eq!(product.name, "nutella");
    }
}
