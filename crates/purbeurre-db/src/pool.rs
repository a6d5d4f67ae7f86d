//! # Database Pool Management
//!
//! Connection pool creation and configuration for SQLite.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  Process startup (installer, menu)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::from_env() / DbConfig::new(path)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + create tables             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool                    │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       │ db.products(), db.categories(), db.favorites(), ...            │
//! │       ▼                                                                 │
//! │  Manager<M> (holds a clone of the pool, never a global)                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## SQLite Settings
//! - Foreign keys ON (SQLite has them off by default)
//! - WAL journal for file databases
//! - In-memory databases use a single connection so every statement sees
//!   the same data

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use purbeurre_core::{Category, Favorite, Product, ProductCategory, ProductStore, Store};

use crate::error::{DbError, DbResult};
use crate::manager::Manager;
use crate::model::Model;
use crate::schema::Schema;

/// Environment variable holding the database file path.
pub const ENV_DB_PATH: &str = "PURBEURRE_DB_PATH";

/// Environment variable holding the pool size.
pub const ENV_DB_MAX_CONNECTIONS: &str = "PURBEURRE_DB_MAX_CONNECTIONS";

/// Database file used when nothing else is configured.
pub const DEFAULT_DB_PATH: &str = "./purbeurre.db";

const IN_MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/purbeurre.db")
///     .max_connections(5)
///     .create_tables(true);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// How long to wait for a free connection.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes. `None` keeps connections open.
    pub idle_timeout: Option<Duration>,

    /// Whether to create the catalog tables on connect.
    /// Default: true
    pub create_tables: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// ## Arguments
    /// * `path` - Path to the SQLite database file. Will be created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            create_tables: true,
        }
    }

    /// Reads `PURBEURRE_DB_PATH` and `PURBEURRE_DB_MAX_CONNECTIONS`.
    ///
    /// Unset variables fall back to the defaults of [`DbConfig::new`];
    /// an unparsable pool size is logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`DbConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = lookup(ENV_DB_PATH).unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let mut config = DbConfig::new(path);

        if let Some(raw) = lookup(ENV_DB_MAX_CONNECTIONS) {
            match raw.trim().parse::<u32>() {
                Ok(max) if max > 0 => config = config.max_connections(max),
                _ => warn!(
                    value = %raw,
                    "Ignoring invalid {}", ENV_DB_MAX_CONNECTIONS
                ),
            }
        }

        config
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to create tables on connect.
    pub fn create_tables(mut self, create: bool) -> Self {
        self.create_tables = create;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let db = Database::new(DbConfig::in_memory()).await?;
    /// // Database is isolated, perfect for tests
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: None,
            create_tables: true,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(IN_MEMORY_PATH)
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                // WAL mode: readers don't block writers
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .create_if_missing(true)
        };

        // SQLite has them disabled by default for backwards compatibility
        Ok(options.foreign_keys(true))
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        DbConfig::new(DEFAULT_DB_PATH)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing manager access.
///
/// Created once at process start and passed by reference to whatever needs
/// persistence. Cloning is cheap (the pool is reference counted).
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::from_env()).await?;
///
/// let pizzas = db.categories().create(Category::new("pizzas")).await?;
/// let products = db.products().get_products_by_category(&pizzas, &QueryOptions::random(20)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    schema: Schema,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Enables foreign keys (and WAL for file databases)
    /// 3. Creates the connection pool
    /// 4. Creates the catalog tables (if enabled)
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_options = config.connect_options()?;
        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database {
            pool,
            schema: Schema::catalog()?,
        };

        if config.create_tables {
            db.create_tables().await?;
        }

        Ok(db)
    }

    /// Creates every catalog table that doesn't exist yet.
    pub async fn create_tables(&self) -> DbResult<()> {
        self.schema.create_tables(&self.pool).await
    }

    /// Drops every catalog table, join tables first.
    pub async fn drop_tables(&self) -> DbResult<()> {
        self.schema.drop_tables(&self.pool).await
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns a reference to the connection pool.
    ///
    /// Prefer manager methods when available.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Manager for any model.
    pub fn manager<M: Model>(&self) -> Manager<M> {
        Manager::new(self.pool.clone())
    }

    pub fn products(&self) -> Manager<Product> {
        self.manager()
    }

    pub fn categories(&self) -> Manager<Category> {
        self.manager()
    }

    pub fn stores(&self) -> Manager<Store> {
        self.manager()
    }

    pub fn product_categories(&self) -> Manager<ProductCategory> {
        self.manager()
    }

    pub fn product_stores(&self) -> Manager<ProductStore> {
        self.manager()
    }

    pub fn favorites(&self) -> Manager<Favorite> {
        self.manager()
    }

    /// Closes the database connection pool.
    ///
    /// After calling close, all manager operations will fail.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[tokio::test]
    async fn test_closed_pool_fails() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(!db.health_check().await);
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .create_tables(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.create_tables);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[test]
    fn test_config_from_lookup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_DB_PATH, "/var/lib/purbeurre/catalog.db"),
            (ENV_DB_MAX_CONNECTIONS, "3"),
        ]);
        let config = DbConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(
            config.database_path,
            PathBuf::from("/var/lib/purbeurre/catalog.db")
        );
        assert_eq!(config.max_connections, 3);
    }

    #[test]
    fn test_config_from_lookup_defaults() {
        let config = DbConfig::from_lookup(|key| {
            (key == ENV_DB_MAX_CONNECTIONS).then(|| "lots".to_string())
        });

        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.max_connections, 5);
    }
}
