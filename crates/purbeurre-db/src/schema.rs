//! # Schema Registry
//!
//! Ordered list of the tables this crate manages.
//!
//! ## How Table Setup Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Table Lifecycle                                    │
//! │                                                                         │
//! │  App Startup                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Schema::catalog()  ← explicit registration, referents first           │
//! │       │                                                                 │
//! │       │   product ─┐                                                    │
//! │       │   category ├─► product_category                                 │
//! │       │   store ───┼─► product_store                                    │
//! │       │            └─► favorite                                         │
//! │       ▼                                                                 │
//! │  create_tables()  → CREATE TABLE IF NOT EXISTS, registration order     │
//! │  drop_tables()    → DROP TABLE IF EXISTS, reverse order                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQLite only checks foreign keys when rows are written, so a join table
//! created before its referent would appear to work until the first insert.
//! [`Schema::register`] refuses that order up front instead.

use purbeurre_core::{Category, Favorite, Product, ProductCategory, ProductStore, Store};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::model::Model;

/// DDL and dependencies of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub create_sql: &'static str,
    pub references: &'static [&'static str],
}

impl TableDef {
    /// Table definition of model `M`.
    pub fn of<M: Model>() -> Self {
        TableDef {
            name: M::TABLE,
            create_sql: M::CREATE_SQL,
            references: M::REFERENCES,
        }
    }

    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.name)
    }
}

/// Tables in creation order.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    tables: Vec<TableDef>,
}

impl Schema {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every table of the catalog, referents first.
    pub fn catalog() -> DbResult<Self> {
        Schema::new()
            .register::<Product>()?
            .register::<Category>()?
            .register::<Store>()?
            .register::<ProductCategory>()?
            .register::<ProductStore>()?
            .register::<Favorite>()
    }

    /// Appends the table of model `M`.
    ///
    /// ## Errors
    /// `DbError::SchemaOrder` if `M` references a table that is not
    /// registered yet.
    pub fn register<M: Model>(self) -> DbResult<Self> {
        self.register_table(TableDef::of::<M>())
    }

    /// Appends `table`. Registering the same table twice is a no-op.
    pub fn register_table(mut self, table: TableDef) -> DbResult<Self> {
        if self.contains(table.name) {
            return Ok(self);
        }

        if let Some(missing) = table
            .references
            .iter()
            .find(|referenced| !self.contains(referenced))
        {
            return Err(DbError::SchemaOrder {
                table: table.name.to_string(),
                missing: missing.to_string(),
            });
        }

        self.tables.push(table);
        Ok(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.iter().any(|table| table.name == name)
    }

    pub fn tables(&self) -> &[TableDef] {
        &self.tables
    }

    /// Table names in creation order.
    pub fn table_names(&self) -> Vec<&'static str> {
        self.tables.iter().map(|table| table.name).collect()
    }

    /// Creates every registered table, in registration order.
    ///
    /// Idempotent: existing tables are left untouched.
    pub async fn create_tables(&self, pool: &SqlitePool) -> DbResult<()> {
        info!(tables = self.tables.len(), "Creating tables");

        for table in &self.tables {
            debug!(table = table.name, "CREATE TABLE IF NOT EXISTS");
            sqlx::query(table.create_sql)
                .execute(pool)
                .await
                .map_err(|e| DbError::SchemaFailed(format!("{}: {e}", table.name)))?;
        }

        info!("All tables created");
        Ok(())
    }

    /// Drops every registered table, in reverse registration order.
    pub async fn drop_tables(&self, pool: &SqlitePool) -> DbResult<()> {
        info!(tables = self.tables.len(), "Dropping tables");

        for table in self.tables.iter().rev() {
            debug!(table = table.name, "DROP TABLE IF EXISTS");
            sqlx::query(&table.drop_sql())
                .execute(pool)
                .await
                .map_err(|e| DbError::SchemaFailed(format!("{}: {e}", table.name)))?;
        }

        Ok(())
    }
}

/// Names of the user tables currently present in the database.
///
/// For diagnostics and tests.
pub async fn existing_tables(pool: &SqlitePool) -> DbResult<Vec<String>> {
    let names: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(names)
}

// =============================================================================
// Unit Tests
// =============================================================================
