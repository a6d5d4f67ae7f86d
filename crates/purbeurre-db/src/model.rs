//! # Table Mapping
//!
//! Binds each entity of `purbeurre-core` to its SQLite table.
//!
//! ## Table Catalog
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Entity            Table             Key              References        │
//! │  ───────────────   ───────────────   ──────────────   ───────────────   │
//! │  Product           product           id (barcode)     -                 │
//! │  Category          category          id (generated)   -                 │
//! │  Store             store             id (generated)   -                 │
//! │  ProductCategory   product_category  composite        product, category │
//! │  ProductStore      product_store     composite        product, store    │
//! │  Favorite          favorite          composite        product           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use purbeurre_core::{Category, Favorite, Product, ProductCategory, ProductStore, SortKey, Store};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqlitePool};

use crate::error::DbResult;

/// How a table is keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryKey {
    /// Single `id` column supplied by the caller.
    Natural,
    /// Single `id` column assigned by the database.
    Generated,
    /// Several columns; there is no single id to look up.
    Composite(&'static [&'static str]),
}

impl PrimaryKey {
    pub const fn is_composite(&self) -> bool {
        matches!(self, PrimaryKey::Composite(_))
    }
}

/// An entity stored in one table.
pub trait Model: for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin + 'static {
    /// Human-readable entity name used in errors and logs.
    const ENTITY: &'static str;

    const TABLE: &'static str;

    /// Selected columns, in struct field order.
    const COLUMNS: &'static [&'static str];

    const KEY: PrimaryKey;

    /// Columns callers may order by.
    const SORT_KEYS: &'static [SortKey];

    /// Tables this one holds foreign keys into.
    const REFERENCES: &'static [&'static str];

    /// `CREATE TABLE IF NOT EXISTS` statement.
    const CREATE_SQL: &'static str;
}

/// Type-specific insert used by `Manager::create`.
#[async_trait]
pub trait Persist: Model {
    /// Writes the entity and stores any database-assigned id back on it.
    async fn save(&mut self, pool: &SqlitePool) -> DbResult<()>;
}

/// Columns an insert writes. A database-assigned `id` is left out so
/// SQLite picks it.
pub(crate) fn insert_columns<M: Model>() -> Vec<&'static str> {
    M::COLUMNS
        .iter()
        .copied()
        .filter(|column| !(M::KEY == PrimaryKey::Generated && *column == "id"))
        .collect()
}

/// Comma-separated column list, optionally qualified with a table alias.
pub(crate) fn select_list<M: Model>(alias: Option<&str>) -> String {
    match alias {
        Some(alias) => M::COLUMNS
            .iter()
            .map(|column| format!("{alias}.{column}"))
            .collect::<Vec<_>>()
            .join(", "),
        None => M::COLUMNS.join(", "),
    }
}

// =============================================================================
// Primary and Reference Entities
// =============================================================================

impl Model for Product {
    const ENTITY: &'static str = "Product";
    const TABLE: &'static str = "product";
    const COLUMNS: &'static [&'static str] = &["id", "name", "url", "nutriscore", "description"];
    const KEY: PrimaryKey = PrimaryKey::Natural;
    const SORT_KEYS: &'static [SortKey] = &[SortKey::Id, SortKey::Name, SortKey::Nutriscore];
    const REFERENCES: &'static [&'static str] = &[];
    const CREATE_SQL: &'static str = r#"
        CREATE TABLE IF NOT EXISTS product (
            id INTEGER PRIMARY KEY,
            name VARCHAR(200) NOT NULL,
            url VARCHAR(255) NOT NULL,
            nutriscore CHAR(1) NOT NULL,
            description TEXT
        )
    "#;
}

impl Model for Category {
    const ENTITY: &'static str = "Category";
    const TABLE: &'static str = "category";
    const COLUMNS: &'static [&'static str] = &["id", "name"];
    const KEY: PrimaryKey = PrimaryKey::Generated;
    const SORT_KEYS: &'static [SortKey] = &[SortKey::Id, SortKey::Name];
    const REFERENCES: &'static [&'static str] = &[];
    const CREATE_SQL: &'static str = r#"
        CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name VARCHAR(100) NOT NULL UNIQUE
        )
    "#;
}

impl Model for Store {
    const ENTITY: &'static str = "Store";
    const TABLE: &'static str = "store";
    const COLUMNS: &'static [&'static str] = &["id", "name"];
    const KEY: PrimaryKey = PrimaryKey::Generated;
    const SORT_KEYS: &'static [SortKey] = &[SortKey::Id, SortKey::Name];
    const REFERENCES: &'static [&'static str] = &[];
    const CREATE_SQL: &'static str = r#"
        CREATE TABLE IF NOT EXISTS store (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name VARCHAR(100) NOT NULL UNIQUE
        )
    "#;
}

// =============================================================================
// Join Tables
// =============================================================================

impl Model for ProductCategory {
    const ENTITY: &'static str = "ProductCategory";
    const TABLE: &'static str = "product_category";
    const COLUMNS: &'static [&'static str] = &["product_id", "category_id"];
    const KEY: PrimaryKey = PrimaryKey::Composite(&["product_id", "category_id"]);
    const SORT_KEYS: &'static [SortKey] = &[];
    const REFERENCES: &'static [&'static str] = &["product", "category"];
    const CREATE_SQL: &'static str = r#"
        CREATE TABLE IF NOT EXISTS product_category (
            product_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            PRIMARY KEY (product_id, category_id),
            FOREIGN KEY (product_id) REFERENCES product(id),
            FOREIGN KEY (category_id) REFERENCES category(id)
        )
    "#;
}

impl Model for ProductStore {
    const ENTITY: &'static str = "ProductStore";
    const TABLE: &'static str = "product_store";
    const COLUMNS: &'static [&'static str] = &["product_id", "store_id"];
    const KEY: PrimaryKey = PrimaryKey::Composite(&["product_id", "store_id"]);
    const SORT_KEYS: &'static [SortKey] = &[];
    const REFERENCES: &'static [&'static str] = &["product", "store"];
    const CREATE_SQL: &'static str = r#"
        CREATE TABLE IF NOT EXISTS product_store (
            product_id INTEGER NOT NULL,
            store_id INTEGER NOT NULL,
            PRIMARY KEY (product_id, store_id),
            FOREIGN KEY (product_id) REFERENCES product(id),
            FOREIGN KEY (store_id) REFERENCES store(id)
        )
    "#;
}

impl Model for Favorite {
    const ENTITY: &'static str = "Favorite";
    const TABLE: &'static str = "favorite";
    const COLUMNS: &'static [&'static str] = &["product_id", "substitute_id"];
    const KEY: PrimaryKey = PrimaryKey::Composite(&["product_id", "substitute_id"]);
    const SORT_KEYS: &'static [SortKey] = &[];
    const REFERENCES: &'static [&'static str] = &["product"];
    const CREATE_SQL: &'static str = r#"
        CREATE TABLE IF NOT EXISTS favorite (
            product_id INTEGER NOT NULL,
            substitute_id INTEGER NOT NULL,
            PRIMARY KEY (product_id, substitute_id),
            FOREIGN KEY (product_id) REFERENCES product(id),
            FOREIGN KEY (substitute_id) REFERENCES product(id)
        )
    "#;
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_list() {
        assert_eq!(select_list::<Category>(None), "id, name");
        assert_eq!(
            select_list::<Product>(Some("p")),
            "p.id, p.name, p.url, p.nutriscore, p.description"
        );
    }

    #[test]
    fn test_insert_columns_skip_generated_id() {
        assert_eq!(insert_columns::<Category>(), vec!["name"]);
        assert_eq!(insert_columns::<Store>(), vec!["name"]);
        assert_eq!(
            insert_columns::<Product>(),
            vec!["id", "name", "url", "nutriscore", "description"]
        );
        assert_eq!(insert_columns::<Favorite>(), vec!["product_id", "substitute_id"]);
    }

    #[test]
    fn test_join_tables_are_composite() {
        assert!(ProductCategory::KEY.is_composite());
        assert!(ProductStore::KEY.is_composite());
        assert!(Favorite::KEY.is_composite());
        assert!(!Product::KEY.is_composite());
        assert!(!Category::KEY.is_composite());
    }

    #[test]
    fn test_ddl_names_its_table() {
        fn check<M: Model>() {
            let expected = format!("CREATE TABLE IF NOT EXISTS {} (", M::TABLE);
            assert!(M::CREATE_SQL.contains(&expected), "{}", M::TABLE);
        }
        check::<Product>();
        check::<Category>();
        check::<Store>();
        check::<ProductCategory>();
        check::<ProductStore>();
        check::<Favorite>();
    }
}
