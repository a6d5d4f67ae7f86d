//! # Reference-Entity Managers
//!
//! Category and Store: small name-keyed lookup tables.
//!
//! ## Upsert on Name
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  create(Category::new("pizzas")) twice                  │
//! │                                                                         │
//! │  1st call:  INSERT … VALUES ('pizzas')          → new row, id = 7       │
//! │  2nd call:  INSERT … VALUES ('pizzas')                                  │
//! │               ON CONFLICT(name) DO UPDATE …     → same row              │
//! │               RETURNING id                      → id = 7                │
//! │                                                                         │
//! │  Both entities carry id 7; the table holds a single 'pizzas' row.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The installer creates a category and a store for every name each
//! product mentions and relies on this to collapse repeats.

use async_trait::async_trait;
use purbeurre_core::validation::truncate;
use purbeurre_core::{Category, Product, QueryOptions, Store, REFERENCE_NAME_MAX};
use sqlx::SqlitePool;
use tracing::debug;

use super::Manager;
use crate::clause::Clauses;
use crate::error::DbResult;
use crate::model::{insert_columns, select_list, Model, Persist};

/// A name-keyed entity linked to products through a join table.
pub trait ReferenceModel: Model {
    /// Join table linking this entity to products.
    const JOIN_TABLE: &'static str;

    /// Column of [`ReferenceModel::JOIN_TABLE`] holding this entity's id.
    const JOIN_COLUMN: &'static str;

    fn set_id(&mut self, id: i64);

    fn name(&self) -> &str;
}

impl ReferenceModel for Category {
    const JOIN_TABLE: &'static str = "product_category";
    const JOIN_COLUMN: &'static str = "category_id";

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl ReferenceModel for Store {
    const JOIN_TABLE: &'static str = "product_store";
    const JOIN_COLUMN: &'static str = "store_id";

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Inserts `entity`, or recovers the id of the row that already has its
/// name, and writes the id back onto `entity`.
async fn upsert_by_name<M: ReferenceModel>(entity: &mut M, pool: &SqlitePool) -> DbResult<()> {
    debug!(table = M::TABLE, name = %entity.name(), "Upserting by name");

    // The id is always assigned by SQLite; one already set on `entity` is
    // replaced by the id of the row holding its name
    let sql = format!(
        "INSERT INTO {} ({}) VALUES (?) \
         ON CONFLICT(name) DO UPDATE SET name = excluded.name \
         RETURNING id",
        M::TABLE,
        insert_columns::<M>().join(", ")
    );

    let id: i64 = sqlx::query_scalar(&sql)
        .bind(entity.name())
        .fetch_one(pool)
        .await?;

    entity.set_id(id);
    Ok(())
}

#[async_trait]
impl Persist for Category {
    async fn save(&mut self, pool: &SqlitePool) -> DbResult<()> {
        upsert_by_name(self, pool).await
    }
}

#[async_trait]
impl Persist for Store {
    async fn save(&mut self, pool: &SqlitePool) -> DbResult<()> {
        upsert_by_name(self, pool).await
    }
}

impl<M: ReferenceModel> Manager<M> {
    /// Rows whose name is one of `names`, in whatever order SQLite returns
    /// them. Unknown names are skipped.
    pub async fn get_by_names(&self, names: &[&str]) -> DbResult<Vec<M>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM {} WHERE name IN ({})",
            select_list::<M>(None),
            M::TABLE,
            placeholders(names.len())
        );

        self.fetch_by_names(&sql, names, None).await
    }

    /// Rows whose name is not one of `names`, ordered and limited by
    /// `options`.
    ///
    /// The menu lists the user's preferred categories first and fills the
    /// rest of the screen with random others.
    pub async fn get_with_excluded_names(
        &self,
        names: &[&str],
        options: &QueryOptions,
    ) -> DbResult<Vec<M>> {
        if names.is_empty() {
            return self.get_all(options).await;
        }

        let clauses = Clauses::build::<M>(options, None)?;
        let sql = format!(
            "SELECT {} FROM {} WHERE name NOT IN ({}){}",
            select_list::<M>(None),
            M::TABLE,
            placeholders(names.len()),
            clauses.sql()
        );

        self.fetch_by_names(&sql, names, clauses.limit()).await
    }

    /// Rows linked to `product` through the join table.
    pub async fn get_by_product(&self, product: &Product, options: &QueryOptions) -> DbResult<Vec<M>> {
        let clauses = Clauses::build::<M>(options, Some("r"))?;
        let sql = format!(
            "SELECT {} FROM {} r \
             INNER JOIN {} j ON j.{} = r.id \
             WHERE j.product_id = ?{}",
            select_list::<M>(Some("r")),
            M::TABLE,
            M::JOIN_TABLE,
            M::JOIN_COLUMN,
            clauses.sql()
        );

        let rows = self.fetch(&sql, &[product.id], &clauses).await?;

        debug!(
            table = M::TABLE,
            product_id = %product.id,
            count = rows.len(),
            "Fetched rows by product"
        );
        Ok(rows)
    }

    async fn fetch_by_names(&self, sql: &str, names: &[&str], limit: Option<i64>) -> DbResult<Vec<M>> {
        let mut query = sqlx::query_as::<_, M>(sql);

        for name in names {
            // Stored names are truncated, so look them up the same way
            query = query.bind(truncate(name, REFERENCE_NAME_MAX));
        }

        if let Some(limit) = limit {
            query = query.bind(limit);
        }

        Ok(query.fetch_all(self.pool()).await?)
    }
}

impl Manager<Category> {
    /// Categories of `product`.
    pub async fn get_categories_by_product(
        &self,
        product: &Product,
        options: &QueryOptions,
    ) -> DbResult<Vec<Category>> {
        self.get_by_product(product, options).await
    }
}

impl Manager<Store> {
    /// Stores selling `product`.
    pub async fn get_stores_by_product(
        &self,
        product: &Product,
        options: &QueryOptions,
    ) -> DbResult<Vec<Store>> {
        self.get_by_product(product, options).await
    }
}

/// `?, ?, ?` for `count` parameters.
fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use purbeurre_core::{ProductCategory, SortKey, SortOrder};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn names<M: ReferenceModel>(rows: &[M]) -> Vec<String> {
        let mut names: Vec<String> = rows.iter().map(|row| row.name().to_string()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }

    #[tokio::test]
    async fn test_create_assigns_id() {
        let db = setup().await;
        let pizzas = db.categories().create(Category::new("pizzas")).await.unwrap();
        assert!(pizzas.id.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_name_yields_same_id() {
        let db = setup().await;

        let first = db.categories().create(Category::new("pizzas")).await.unwrap();
        let other = db.categories().create(Category::new("biscuits")).await.unwrap();
        let second = db.categories().create(Category::new("pizzas")).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_ne!(first.id, other.id);
        assert_eq!(db.categories().count().await.unwrap(), 2);

        let pizzas = db.categories().get_by_names(&["pizzas"]).await.unwrap();
        assert_eq!(pizzas.len(), 1);
    }

    #[tokio::test]
    async fn test_caller_supplied_id_is_ignored() {
        let db = setup().await;
        let pizzas = db.categories().create(Category::new("pizzas")).await.unwrap();

        let mut biscuits = Category::new("biscuits");
        biscuits.id = pizzas.id;
        let biscuits = db.categories().create(biscuits).await.unwrap();

        assert!(biscuits.id.is_some());
        assert_ne!(biscuits.id, pizzas.id);
        assert_eq!(db.categories().count().await.unwrap(), 2);

        let mut again = Category::new("pizzas");
        again.id = Some(999);
        let again = db.categories().create(again).await.unwrap();
        assert_eq!(again.id, pizzas.id);
    }

    #[tokio::test]
    async fn test_store_upsert() {
        let db = setup().await;

        let first = db.stores().create(Store::new("carrefour")).await.unwrap();
        let second = db.stores().create(Store::new("carrefour")).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(db.stores().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_matches_truncated_name() {
        let db = setup().await;
        let long = "c".repeat(REFERENCE_NAME_MAX + 20);

        let first = db.categories().create(Category::new(&long)).await.unwrap();
        let second = db
            .categories()
            .create(Category::new(&long[..REFERENCE_NAME_MAX]))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(db.categories().get_by_names(&[long.as_str()]).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_by_names() {
        let db = setup().await;
        for name in ["pizzas", "biscuits", "sodas", "yaourts"] {
            db.categories().create(Category::new(name)).await.unwrap();
        }

        let found = db
            .categories()
            .get_by_names(&["pizzas", "sodas", "unknown"])
            .await
            .unwrap();
        assert_eq!(names(&found), vec!["pizzas", "sodas"]);

        assert!(db.categories().get_by_names(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_with_excluded_names() {
        let db = setup().await;
        for name in ["pizzas", "biscuits", "sodas", "yaourts"] {
            db.categories().create(Category::new(name)).await.unwrap();
        }

        let options = QueryOptions::new().order_by(SortOrder::asc(SortKey::Name));
        let rest = db
            .categories()
            .get_with_excluded_names(&["pizzas", "sodas"], &options)
            .await
            .unwrap();
        let rest: Vec<&str> = rest.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(rest, vec!["biscuits", "yaourts"]);

        let limited = db
            .categories()
            .get_with_excluded_names(&["pizzas"], &QueryOptions::random(2))
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);
        assert!(limited.iter().all(|c| c.name != "pizzas"));

        let everything = db
            .categories()
            .get_with_excluded_names(&[], &QueryOptions::new())
            .await
            .unwrap();
        assert_eq!(everything.len(), 4);
    }

    #[tokio::test]
    async fn test_get_categories_by_product() {
        let db = setup().await;
        let nutella = db
            .products()
            .create(Product::new(1, "nutella", "http", "e", Some("Info sur le produit")))
            .await
            .unwrap();
        let pizza = db
            .products()
            .create(Product::new(2, "pizza margherita", "http", "d", None))
            .await
            .unwrap();
        let spreads = db.categories().create(Category::new("pâte à tartiner")).await.unwrap();
        let chocolate = db
            .categories()
            .create(Category::new("produits au chocolat"))
            .await
            .unwrap();
        let pizzas = db.categories().create(Category::new("pizzas")).await.unwrap();

        for category in [&spreads, &chocolate] {
            db.product_categories()
                .create(ProductCategory::link(&nutella, category).unwrap())
                .await
                .unwrap();
        }
        db.product_categories()
            .create(ProductCategory::link(&pizza, &pizzas).unwrap())
            .await
            .unwrap();

        let categories = db
            .categories()
            .get_categories_by_product(&nutella, &QueryOptions::new())
            .await
            .unwrap();
        assert_eq!(names(&categories), vec!["produits au chocolat", "pâte à tartiner"]);

        let limited = db
            .categories()
            .get_categories_by_product(&nutella, &QueryOptions::new().limit(1))
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);

        let unknown = Product::new(99, "ghost", "http", "a", None);
        assert!(db
            .categories()
            .get_categories_by_product(&unknown, &QueryOptions::new())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_get_stores_by_product_rejects_bad_options() {
        let db = setup().await;
        let product = Product::new(1, "nutella", "http", "e", None);
        let options = QueryOptions::new().order_by(SortOrder::desc(SortKey::Nutriscore));

        let err = db
            .stores()
            .get_stores_by_product(&product, &options)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }
}
