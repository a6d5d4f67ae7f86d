//! # Association Managers
//!
//! Join-table rows: which categories a product is filed under, which stores
//! sell it, and which substitutes the user saved for it.
//!
//! ## Bulk Adds
//! ```text
//! add_categories_to_product(nutella, [spreads, chocolate, pizzas])
//!       │
//!       ├── INSERT (nutella, spreads)     ✓ kept
//!       ├── INSERT (nutella, chocolate)   ✓ kept
//!       └── INSERT (nutella, pizzas)      ✗ UniqueViolation → returned
//! ```
//!
//! Each link is its own statement. There is no enclosing transaction, so
//! links written before a failure stay in the table.

use async_trait::async_trait;
use purbeurre_core::{Category, Favorite, Product, ProductCategory, ProductStore, Store};
use sqlx::SqlitePool;
use tracing::debug;

use super::Manager;
use crate::error::DbResult;
use crate::model::{insert_columns, Model, Persist};

/// A join-table row holding two ids.
pub trait Association: Model {
    /// Ids in [`Model::COLUMNS`] order.
    fn pair(&self) -> (i64, i64);
}

impl Association for ProductCategory {
    fn pair(&self) -> (i64, i64) {
        (self.product_id, self.category_id)
    }
}

impl Association for ProductStore {
    fn pair(&self) -> (i64, i64) {
        (self.product_id, self.store_id)
    }
}

impl Association for Favorite {
    fn pair(&self) -> (i64, i64) {
        (self.product_id, self.substitute_id)
    }
}

async fn insert_pair<M: Association>(link: &M, pool: &SqlitePool) -> DbResult<()> {
    let (left, right) = link.pair();
    debug!(table = M::TABLE, left = %left, right = %right, "Inserting link");

    let sql = format!(
        "INSERT INTO {} ({}) VALUES (?, ?)",
        M::TABLE,
        insert_columns::<M>().join(", ")
    );

    sqlx::query(&sql).bind(left).bind(right).execute(pool).await?;
    Ok(())
}

#[async_trait]
impl Persist for ProductCategory {
    async fn save(&mut self, pool: &SqlitePool) -> DbResult<()> {
        insert_pair(self, pool).await
    }
}

#[async_trait]
impl Persist for ProductStore {
    async fn save(&mut self, pool: &SqlitePool) -> DbResult<()> {
        insert_pair(self, pool).await
    }
}

#[async_trait]
impl Persist for Favorite {
    async fn save(&mut self, pool: &SqlitePool) -> DbResult<()> {
        insert_pair(self, pool).await
    }
}

impl<M: Association + Persist> Manager<M> {
    /// Inserts `links` one by one and returns them.
    ///
    /// Stops at the first failure; earlier links stay.
    pub async fn create_all(&self, links: Vec<M>) -> DbResult<Vec<M>> {
        let mut created = Vec::with_capacity(links.len());

        for link in links {
            created.push(self.create(link).await?);
        }

        debug!(table = M::TABLE, count = created.len(), "Links created");
        Ok(created)
    }
}

impl Manager<ProductCategory> {
    /// Files `product` under each of `categories`.
    ///
    /// ## Errors
    /// * `DbError::NotPersisted` - a category has no id yet
    /// * `DbError::UniqueViolation` - the link already exists
    /// * `DbError::ForeignKeyViolation` - product or category is not stored
    pub async fn add_categories_to_product(
        &self,
        product: &Product,
        categories: &[Category],
    ) -> DbResult<Vec<ProductCategory>> {
        let mut links = Vec::with_capacity(categories.len());

        for category in categories {
            links.push(self.create(ProductCategory::link(product, category)?).await?);
        }

        Ok(links)
    }

    /// Files each of `products` under `category`.
    pub async fn add_products_to_category(
        &self,
        category: &Category,
        products: &[Product],
    ) -> DbResult<Vec<ProductCategory>> {
        let mut links = Vec::with_capacity(products.len());

        for product in products {
            links.push(self.create(ProductCategory::link(product, category)?).await?);
        }

        Ok(links)
    }
}

impl Manager<ProductStore> {
    /// Records that each of `stores` sells `product`.
    pub async fn add_stores_to_product(
        &self,
        product: &Product,
        stores: &[Store],
    ) -> DbResult<Vec<ProductStore>> {
        let mut links = Vec::with_capacity(stores.len());

        for store in stores {
            links.push(self.create(ProductStore::link(product, store)?).await?);
        }

        Ok(links)
    }

    /// Records that `store` sells each of `products`.
    pub async fn add_products_to_store(
        &self,
        store: &Store,
        products: &[Product],
    ) -> DbResult<Vec<ProductStore>> {
        let mut links = Vec::with_capacity(products.len());

        for product in products {
            links.push(self.create(ProductStore::link(product, store)?).await?);
        }

        Ok(links)
    }
}

impl Manager<Favorite> {
    /// Saves each of `substitutes` as a replacement for `product`.
    pub async fn add_substitutes_to_product(
        &self,
        product: &Product,
        substitutes: &[Product],
    ) -> DbResult<Vec<Favorite>> {
        let links = substitutes
            .iter()
            .map(|substitute| Favorite::between(product, substitute))
            .collect();

        self.create_all(links).await
    }

    /// Saves `substitute` as a replacement for each of `products`.
    pub async fn add_products_to_substitute(
        &self,
        substitute: &Product,
        products: &[Product],
    ) -> DbResult<Vec<Favorite>> {
        let links = products
            .iter()
            .map(|product| Favorite::between(product, substitute))
            .collect();

        self.create_all(links).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
