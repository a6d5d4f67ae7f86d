//! # Entity Relations
//!
//! Convenience methods on the core entities that read or write their
//! links. The entities themselves hold no connection, so every method
//! takes the [`Database`] explicitly.
//!
//! ```rust,ignore
//! use purbeurre_db::prelude::*;
//!
//! nutella.add_categories(&db, &[spreads, chocolate]).await?;
//! let categories = nutella.get_categories(&db, &QueryOptions::new()).await?;
//! ```

use async_trait::async_trait;
use purbeurre_core::{
    Category, Favorite, Product, ProductCategory, ProductStore, QueryOptions, Store,
};

use crate::error::DbResult;
use crate::pool::Database;

/// Links reachable from a product.
#[async_trait]
pub trait ProductRelations {
    /// Categories the product is filed under.
    async fn get_categories(&self, db: &Database, options: &QueryOptions) -> DbResult<Vec<Category>>;

    /// Stores selling the product.
    async fn get_stores(&self, db: &Database, options: &QueryOptions) -> DbResult<Vec<Store>>;

    /// Substitutes saved for the product.
    async fn get_substitutes(&self, db: &Database, options: &QueryOptions) -> DbResult<Vec<Product>>;

    /// Products this one was saved as a substitute for.
    async fn get_products(&self, db: &Database, options: &QueryOptions) -> DbResult<Vec<Product>>;

    async fn add_categories(&self, db: &Database, categories: &[Category]) -> DbResult<Vec<ProductCategory>>;

    async fn add_stores(&self, db: &Database, stores: &[Store]) -> DbResult<Vec<ProductStore>>;

    /// Saves `substitutes` as replacements for this product.
    async fn add_substitutes(&self, db: &Database, substitutes: &[Product]) -> DbResult<Vec<Favorite>>;

    /// Saves this product as a replacement for each of `products`.
    async fn add_products(&self, db: &Database, products: &[Product]) -> DbResult<Vec<Favorite>>;
}

#[async_trait]
impl ProductRelations for Product {
    async fn get_categories(&self, db: &Database, options: &QueryOptions) -> DbResult<Vec<Category>> {
        db.categories().get_categories_by_product(self, options).await
    }

    async fn get_stores(&self, db: &Database, options: &QueryOptions) -> DbResult<Vec<Store>> {
        db.stores().get_stores_by_product(self, options).await
    }

    async fn get_substitutes(&self, db: &Database, options: &QueryOptions) -> DbResult<Vec<Product>> {
        db.products().get_substitutes_by_product(self, options).await
    }

    async fn get_products(&self, db: &Database, options: &QueryOptions) -> DbResult<Vec<Product>> {
        db.products().get_products_by_substitute(self, options).await
    }

    async fn add_categories(&self, db: &Database, categories: &[Category]) -> DbResult<Vec<ProductCategory>> {
        db.product_categories()
            .add_categories_to_product(self, categories)
            .await
    }

    async fn add_stores(&self, db: &Database, stores: &[Store]) -> DbResult<Vec<ProductStore>> {
        db.product_stores().add_stores_to_product(self, stores).await
    }

    async fn add_substitutes(&self, db: &Database, substitutes: &[Product]) -> DbResult<Vec<Favorite>> {
        db.favorites()
            .add_substitutes_to_product(self, substitutes)
            .await
    }

    async fn add_products(&self, db: &Database, products: &[Product]) -> DbResult<Vec<Favorite>> {
        db.favorites()
            .add_products_to_substitute(self, products)
            .await
    }
}

#[async_trait]
pub trait CategoryRelations {
    /// Products filed under the category.
    async fn get_products(&self, db: &Database, options: &QueryOptions) -> DbResult<Vec<Product>>;
}

#[async_trait]
impl CategoryRelations for Category {
    async fn get_products(&self, db: &Database, options: &QueryOptions) -> DbResult<Vec<Product>> {
        db.products().get_products_by_category(self, options).await
    }
}

#[async_trait]
pub trait StoreRelations {
    /// Products sold by the store.
    async fn get_products(&self, db: &Database, options: &QueryOptions) -> DbResult<Vec<Product>>;
}

#[async_trait]
impl StoreRelations for Store {
    async fn get_products(&self, db: &Database, options: &QueryOptions) -> DbResult<Vec<Product>> {
        db.products().get_products_by_store(self, options).await
    }
}

/// Both ends of a saved substitution.
#[async_trait]
pub trait FavoriteRelations {
    /// The product that gets replaced.
    ///
    /// `DbError::NotFound` if it was deleted since.
    async fn get_product(&self, db: &Database) -> DbResult<Product>;

    /// The replacement.
    async fn get_substitute(&self, db: &Database) -> DbResult<Product>;
}

#[async_trait]
impl FavoriteRelations for Favorite {
    async fn get_product(&self, db: &Database) -> DbResult<Product> {
        db.products().get_by_id(self.product_id).await
    }

    async fn get_substitute(&self, db: &Database) -> DbResult<Product> {
        db.products().get_by_id(self.substitute_id).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
