//! # purbeurre-db: Persistence Layer for Pur Beurre
//!
//! This crate stores the food catalog: products, their categories and
//! stores, and the substitutes users saved. It uses SQLite with sqlx for
//! async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pur Beurre Data Flow                             │
//! │                                                                         │
//! │  Installer (feed records)          Menu (browse, save substitutes)     │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  purbeurre-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │   Managers    │    │    Schema    │  │   │
//! │  │   │   (pool.rs)   │    │  (manager/)   │    │ (schema.rs)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ Manager<M>    │    │ product      │  │   │
//! │  │   │ DbConfig      │◄───│ upserts       │    │ category     │  │   │
//! │  │   │               │    │ bulk links    │    │ … favorite   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │           $PURBEURRE_DB_PATH (default ./purbeurre.db)           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`schema`] - Ordered table registry
//! - [`model`] - Entity to table mapping
//! - [`manager`] - Generic and per-entity managers
//! - [`relations`] - Link helpers on the entities themselves
//! - [`install`] - Feed loading
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use purbeurre_db::prelude::*;
//!
//! let db = Database::new(DbConfig::from_env()).await?;
//!
//! let nutella = db.products().create(Product::new(3017620422003, "nutella", url, "e", None)).await?;
//! let spreads = db.categories().create(Category::new("pâtes à tartiner")).await?;
//! nutella.add_categories(&db, &[spreads]).await?;
//!
//! let better = db.products().find_substitutes_for_product(&nutella, &QueryOptions::new().limit(5)).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

mod clause;
pub mod error;
pub mod install;
pub mod manager;
pub mod model;
pub mod pool;
pub mod relations;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use install::{install_records, InstallError, InstallReport};
pub use manager::association::Association;
pub use manager::reference::ReferenceModel;
pub use manager::Manager;
pub use model::{Model, Persist, PrimaryKey};
pub use pool::{Database, DbConfig};
pub use schema::{Schema, TableDef};

/// Everything a caller needs in one import, relation traits included.
pub mod prelude {
    pub use crate::relations::{
        CategoryRelations, FavoriteRelations, ProductRelations, StoreRelations,
    };
    pub use crate::{Database, DbConfig, DbError, DbResult, Manager};
    pub use purbeurre_core::{
        Category, Direction, Favorite, Product, ProductCategory, ProductStore, QueryOptions,
        SortKey, SortOrder, Store,
    };
}
