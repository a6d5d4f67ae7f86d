//! # Product Manager
//!
//! Inserts products and walks the join tables from a category, a store or
//! a favorite back to products.
//!
//! ## Substitute Discovery
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                How find_substitutes_for_product Works                   │
//! │                                                                         │
//! │  Selected: Nutella (nutriscore e)                                      │
//! │            categories: spreads, chocolate                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Every other product in spreads or chocolate                           │
//! │       │                                                                 │
//! │       ▼  keep nutriscore strictly better than "e"                       │
//! │       │                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │ Hazelnut spread   spreads, chocolate  c │ ← 2 shared                │
//! │  │ Almond butter     spreads             b │ ← 1 shared                │
//! │  │ Dark chocolate    chocolate           e │   not better              │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ▼  shared categories DESC, nutriscore ASC                         │
//! │                                                                         │
//! │  Results: [Hazelnut spread, Almond butter]                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use purbeurre_core::{Category, Product, QueryOptions, Store};
use sqlx::SqlitePool;
use tracing::debug;

use super::Manager;
use crate::clause::Clauses;
use crate::error::DbResult;
use crate::model::{select_list, Model, Persist};

/// Order used by substitute discovery when the caller gives none.
const SUBSTITUTE_DEFAULT_ORDER: &str = "COUNT(*) DESC, p.nutriscore ASC, p.id ASC";

#[async_trait]
impl Persist for Product {
    /// Plain insert: a second product with the same barcode is refused with
    /// `DbError::UniqueViolation`.
    async fn save(&mut self, pool: &SqlitePool) -> DbResult<()> {
        debug!(id = %self.id, name = %self.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO product (id, name, url, nutriscore, description)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.url)
        .bind(&self.nutriscore)
        .bind(&self.description)
        .execute(pool)
        .await?;

        Ok(())
    }
}

impl Manager<Product> {
    /// Products filed under `category`.
    ///
    /// A category that was never saved has no products.
    pub async fn get_products_by_category(
        &self,
        category: &Category,
        options: &QueryOptions,
    ) -> DbResult<Vec<Product>> {
        let Some(category_id) = category.id else {
            Clauses::build::<Product>(options, Some("p"))?;
            return Ok(Vec::new());
        };

        self.get_linked("product_category", "category_id", "product_id", category_id, options)
            .await
    }

    /// Products sold by `store`.
    pub async fn get_products_by_store(
        &self,
        store: &Store,
        options: &QueryOptions,
    ) -> DbResult<Vec<Product>> {
        let Some(store_id) = store.id else {
            Clauses::build::<Product>(options, Some("p"))?;
            return Ok(Vec::new());
        };

        self.get_linked("product_store", "store_id", "product_id", store_id, options)
            .await
    }

    /// Substitutes the user saved for `product`.
    pub async fn get_substitutes_by_product(
        &self,
        product: &Product,
        options: &QueryOptions,
    ) -> DbResult<Vec<Product>> {
        self.get_linked("favorite", "product_id", "substitute_id", product.id, options)
            .await
    }

    /// Products for which the user saved `substitute` as a replacement.
    pub async fn get_products_by_substitute(
        &self,
        substitute: &Product,
        options: &QueryOptions,
    ) -> DbResult<Vec<Product>> {
        self.get_linked("favorite", "substitute_id", "product_id", substitute.id, options)
            .await
    }

    /// Healthier replacements for `product`.
    ///
    /// ## Matching
    /// - shares at least one category with `product`
    /// - has a strictly better nutriscore (`a` beats `b`)
    /// - is not `product` itself
    ///
    /// ## Order
    /// Most shared categories first, then best nutriscore. Orderings in
    /// `options` replace this default; its limit always applies.
    pub async fn find_substitutes_for_product(
        &self,
        product: &Product,
        options: &QueryOptions,
    ) -> DbResult<Vec<Product>> {
        let clauses = Clauses::build::<Product>(options, Some("p"))?;
        let sql = format!(
            "SELECT {} FROM product p \
             INNER JOIN product_category pc ON pc.product_id = p.id \
             WHERE pc.category_id IN \
                 (SELECT category_id FROM product_category WHERE product_id = ?) \
             AND p.id <> ? \
             AND LOWER(p.nutriscore) < LOWER(?) \
             GROUP BY p.id{}",
            select_list::<Product>(Some("p")),
            clauses.sql_or(Some(SUBSTITUTE_DEFAULT_ORDER))
        );

        let mut query = sqlx::query_as::<_, Product>(&sql)
            .bind(product.id)
            .bind(product.id)
            .bind(&product.nutriscore);

        if let Some(limit) = clauses.limit() {
            query = query.bind(limit);
        }

        let substitutes = query.fetch_all(self.pool()).await?;

        debug!(
            product_id = %product.id,
            nutriscore = %product.nutriscore,
            count = substitutes.len(),
            "Found substitutes"
        );
        Ok(substitutes)
    }

    /// Products reached from `key` through `join_table`.
    ///
    /// `from_column` holds `key`; `to_column` holds the product id to return.
    async fn get_linked(
        &self,
        join_table: &str,
        from_column: &str,
        to_column: &str,
        key: i64,
        options: &QueryOptions,
    ) -> DbResult<Vec<Product>> {
        let clauses = Clauses::build::<Product>(options, Some("p"))?;
        let sql = format!(
            "SELECT {} FROM {} p \
             INNER JOIN {join_table} j ON j.{to_column} = p.id \
             WHERE j.{from_column} = ?{}",
            select_list::<Product>(Some("p")),
            Product::TABLE,
            clauses.sql()
        );

        let products = self.fetch(&sql, &[key], &clauses).await?;

        debug!(
            join_table,
            key = %key,
            count = products.len(),
            "Fetched linked products"
        );
        Ok(products)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use purbeurre_core::{Favorite, ProductCategory, ProductStore, SortKey, SortOrder};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn product(db: &Database, id: i64, name: &str, nutriscore: &str) -> Product {
        db.products()
            .create(Product::new(id, name, "http", nutriscore, None))
            .await
            .unwrap()
    }

    async fn file_under(db: &Database, product: &Product, category: &Category) {
        db.product_categories()
            .create(ProductCategory::link(product, category).unwrap())
            .await
            .unwrap();
    }

    fn ids(products: &[Product]) -> Vec<i64> {
        products.iter().map(|p| p.id).collect()
    }

    fn sorted_ids(products: &[Product]) -> Vec<i64> {
        let mut ids = ids(products);
        ids.sort_unstable();
        ids
    }

    #[tokio::test]
    async fn test_duplicate_product_id_is_refused() {
        let db = setup().await;
        product(&db, 1, "nutella", "e").await;

        let err = db
            .products()
            .create(Product::new(1, "another", "http", "a", None))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        let stored = db.products().get_by_id(1).await.unwrap();
        assert_eq!(stored.name, "nutella");
        assert_eq!(db.products().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_products_by_category() {
        let db = setup().await;
        let nutella = product(&db, 1, "nutella", "e").await;
        let pizza = product(&db, 2, "pizza", "d").await;
        let cookies = product(&db, 3, "cookies", "c").await;

        let spreads = db.categories().create(Category::new("pâtes à tartiner")).await.unwrap();
        let pizzas = db.categories().create(Category::new("pizzas")).await.unwrap();
        let empty = db.categories().create(Category::new("soupes")).await.unwrap();

        file_under(&db, &nutella, &spreads).await;
        file_under(&db, &cookies, &spreads).await;
        file_under(&db, &pizza, &pizzas).await;

        let found = db
            .products()
            .get_products_by_category(&spreads, &QueryOptions::new())
            .await
            .unwrap();
        assert_eq!(sorted_ids(&found), vec![1, 3]);

        let found = db
            .products()
            .get_products_by_category(&pizzas, &QueryOptions::new())
            .await
            .unwrap();
        assert_eq!(found, vec![pizza]);

        assert!(db
            .products()
            .get_products_by_category(&empty, &QueryOptions::new())
            .await
            .unwrap()
            .is_empty());

        assert!(db
            .products()
            .get_products_by_category(&Category::new("unsaved"), &QueryOptions::new())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_get_products_by_category_ordered() {
        let db = setup().await;
        let spreads = db.categories().create(Category::new("spreads")).await.unwrap();
        for (id, name, score) in [(1, "b", "e"), (2, "c", "a"), (3, "a", "c")] {
            let p = product(&db, id, name, score).await;
            file_under(&db, &p, &spreads).await;
        }

        let by_score = QueryOptions::new().order_by(SortOrder::asc(SortKey::Nutriscore));
        let found = db
            .products()
            .get_products_by_category(&spreads, &by_score)
            .await
            .unwrap();
        assert_eq!(ids(&found), vec![2, 3, 1]);

        let by_name = QueryOptions::new()
            .order_by(SortOrder::desc(SortKey::Name))
            .limit(2);
        let found = db
            .products()
            .get_products_by_category(&spreads, &by_name)
            .await
            .unwrap();
        assert_eq!(ids(&found), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_get_products_by_store() {
        let db = setup().await;
        let nutella = product(&db, 1, "nutella", "e").await;
        product(&db, 2, "pizza", "d").await;
        let carrefour = db.stores().create(Store::new("carrefour")).await.unwrap();

        db.product_stores()
            .create(ProductStore::link(&nutella, &carrefour).unwrap())
            .await
            .unwrap();

        let found = db
            .products()
            .get_products_by_store(&carrefour, &QueryOptions::new())
            .await
            .unwrap();
        assert_eq!(found, vec![nutella]);
    }

    #[tokio::test]
    async fn test_favorites_both_directions() {
        let db = setup().await;
        let nutella = product(&db, 1, "nutella", "e").await;
        let spread = product(&db, 2, "hazelnut spread", "c").await;
        let butter = product(&db, 3, "almond butter", "b").await;

        for substitute in [&spread, &butter] {
            db.favorites()
                .create(Favorite::between(&nutella, substitute))
                .await
                .unwrap();
        }

        let substitutes = db
            .products()
            .get_substitutes_by_product(&nutella, &QueryOptions::new())
            .await
            .unwrap();
        assert_eq!(sorted_ids(&substitutes), vec![2, 3]);

        let originals = db
            .products()
            .get_products_by_substitute(&butter, &QueryOptions::new())
            .await
            .unwrap();
        assert_eq!(originals, vec![nutella.clone()]);

        assert!(db
            .products()
            .get_substitutes_by_product(&butter, &QueryOptions::new())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_find_substitutes_for_product() {
        let db = setup().await;
        let spreads = db.categories().create(Category::new("spreads")).await.unwrap();
        let chocolate = db.categories().create(Category::new("chocolate")).await.unwrap();
        let pizzas = db.categories().create(Category::new("pizzas")).await.unwrap();

        let nutella = product(&db, 1, "nutella", "e").await;
        let hazelnut = product(&db, 2, "hazelnut spread", "c").await;
        let almond = product(&db, 3, "almond butter", "b").await;
        let dark = product(&db, 4, "dark chocolate", "e").await;
        let pizza = product(&db, 5, "pizza", "a").await;

        for (p, c) in [
            (&nutella, &spreads),
            (&nutella, &chocolate),
            (&hazelnut, &spreads),
            (&hazelnut, &chocolate),
            (&almond, &spreads),
            (&dark, &chocolate),
            (&pizza, &pizzas),
        ] {
            file_under(&db, p, c).await;
        }

        let found = db
            .products()
            .find_substitutes_for_product(&nutella, &QueryOptions::new())
            .await
            .unwrap();
        assert_eq!(ids(&found), vec![2, 3]);

        let found = db
            .products()
            .find_substitutes_for_product(&nutella, &QueryOptions::new().limit(1))
            .await
            .unwrap();
        assert_eq!(ids(&found), vec![2]);

        let by_score = QueryOptions::new().order_by(SortOrder::asc(SortKey::Nutriscore));
        let found = db
            .products()
            .find_substitutes_for_product(&nutella, &by_score)
            .await
            .unwrap();
        assert_eq!(ids(&found), vec![3, 2]);

        // Nothing beats an "a"
        assert!(db
            .products()
            .find_substitutes_for_product(&pizza, &QueryOptions::new())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_traversal_rejects_bad_limit() {
        let db = setup().await;
        let nutella = product(&db, 1, "nutella", "e").await;

        let err = db
            .products()
            .get_substitutes_by_product(&nutella, &QueryOptions::new().limit(5000))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }
}
