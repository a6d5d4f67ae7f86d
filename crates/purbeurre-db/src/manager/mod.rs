//! # Manager Module
//!
//! One generic manager per entity type, specialized per table kind.
//!
//! ## Manager Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Manager Layers                                       │
//! │                                                                         │
//! │  Manager<M: Model>  (this file)                                        │
//! │  ├── create(entity)          → Persist::save, id written back          │
//! │  ├── get_all(&options)       → SELECT … [ORDER BY …] [LIMIT ?]         │
//! │  ├── get_by_id(id)           → NotFound / Unsupported                  │
//! │  ├── delete_all()            → DELETE FROM table (no cascade)          │
//! │  └── create_table() / drop_table()                                     │
//! │       │                                                                 │
//! │       ├── Manager<Product>           (product.rs)   plain insert,      │
//! │       │                                             traversal queries  │
//! │       ├── Manager<Category | Store>  (reference.rs) upsert on name     │
//! │       └── Manager<join record>       (association.rs) bulk links       │
//! │                                                                         │
//! │  Every manager holds a clone of the one pool owned by `Database`.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod association;
pub mod product;
pub mod reference;

use std::fmt;
use std::marker::PhantomData;

use purbeurre_core::QueryOptions;
use sqlx::SqlitePool;
use tracing::debug;

use crate::clause::Clauses;
use crate::error::{DbError, DbResult};
use crate::model::{select_list, Model, Persist};

/// Generic manager bound to model `M` and its table.
pub struct Manager<M> {
    pool: SqlitePool,
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for Manager<M> {
    fn clone(&self) -> Self {
        Manager {
            pool: self.pool.clone(),
            _model: PhantomData,
        }
    }
}

impl<M: Model> fmt::Debug for Manager<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager").field("table", &M::TABLE).finish()
    }
}

impl<M: Model> Manager<M> {
    /// Creates a manager on an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Manager {
            pool,
            _model: PhantomData,
        }
    }

    pub fn table(&self) -> &'static str {
        M::TABLE
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates this manager's table if it doesn't exist.
    ///
    /// Does not check that referenced tables exist; use
    /// [`Schema::create_tables`](crate::schema::Schema::create_tables) to
    /// set up the whole catalog in dependency order.
    pub async fn create_table(&self) -> DbResult<()> {
        debug!(table = M::TABLE, "Creating table");

        sqlx::query(M::CREATE_SQL)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::SchemaFailed(format!("{}: {e}", M::TABLE)))?;

        Ok(())
    }

    /// Drops this manager's table. Idempotent if absent.
    pub async fn drop_table(&self) -> DbResult<()> {
        debug!(table = M::TABLE, "Dropping table");

        sqlx::query(&format!("DROP TABLE IF EXISTS {}", M::TABLE))
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::SchemaFailed(format!("{}: {e}", M::TABLE)))?;

        Ok(())
    }

    /// Every row of the table, ordered and limited by `options`.
    ///
    /// Without an ordering, rows come back in whatever order SQLite
    /// returns them.
    pub async fn get_all(&self, options: &QueryOptions) -> DbResult<Vec<M>> {
        let clauses = Clauses::build::<M>(options, None)?;
        let sql = format!(
            "SELECT {} FROM {}{}",
            select_list::<M>(None),
            M::TABLE,
            clauses.sql()
        );

        let rows = self.fetch(&sql, &[], &clauses).await?;

        debug!(table = M::TABLE, count = rows.len(), "Fetched all rows");
        Ok(rows)
    }

    /// Looks up one row by its `id` column.
    ///
    /// ## Returns
    /// * `Ok(M)` - Row found
    /// * `Err(DbError::NotFound)` - No row has this id
    /// * `Err(DbError::Unsupported)` - The table has a composite key
    pub async fn get_by_id(&self, id: i64) -> DbResult<M> {
        if M::KEY.is_composite() {
            return Err(DbError::unsupported("get_by_id", M::ENTITY));
        }

        debug!(table = M::TABLE, id = %id, "Getting row by id");

        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?",
            select_list::<M>(None),
            M::TABLE
        );

        sqlx::query_as::<_, M>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found(M::ENTITY, id.to_string()))
    }

    /// Removes every row of the table; the table itself stays.
    ///
    /// Rows of other tables that reference these are not touched: delete
    /// them first, or SQLite rejects the statement with a foreign key
    /// violation.
    ///
    /// ## Returns
    /// Number of deleted rows.
    pub async fn delete_all(&self) -> DbResult<u64> {
        debug!(table = M::TABLE, "Deleting all rows");

        let result = sqlx::query(&format!("DELETE FROM {}", M::TABLE))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Counts rows (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", M::TABLE))
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Runs `sql`, binding `keys` in order and then the LIMIT of `clauses`.
    pub(crate) async fn fetch(&self, sql: &str, keys: &[i64], clauses: &Clauses) -> DbResult<Vec<M>> {
        let mut query = sqlx::query_as::<_, M>(sql);

        for key in keys {
            query = query.bind(*key);
        }

        if let Some(limit) = clauses.limit() {
            query = query.bind(limit);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }
}

impl<M: Persist> Manager<M> {
    /// Persists `entity` and returns it with any database-assigned id.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - duplicate product id or association pair
    /// * `DbError::ForeignKeyViolation` - association to a missing row
    pub async fn create(&self, mut entity: M) -> DbResult<M> {
        entity.save(&self.pool).await?;
        Ok(entity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
