//! # purbeurre-core: Pure Catalog Logic for Pur Beurre
//!
//! Entities of the food catalog and every rule that can be checked without
//! a database: column-width truncation, display formatting, and validation
//! of the ordering/limit options callers pass to the persistence layer.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pur Beurre Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │        Collaborators (feed client, installer, menu)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ entities in, entities out              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ purbeurre-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐                 │   │
//! │  │   │   types   │  │   query   │  │ validation │                 │   │
//! │  │   │  Product  │  │ SortOrder │  │ truncation │                 │   │
//! │  │   │ Category  │  │   limit   │  │   checks   │                 │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 purbeurre-db (Database Layer)                   │   │
//! │  │            SQLite managers, schema, relations                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (Product, Category, Store, join records)
//! - [`query`] - Ordering and limit options for list queries
//! - [`error`] - Domain error types
//! - [`validation`] - Truncation and bounds checks
//!
//! ## Example Usage
//!
//! ```rust
//! use purbeurre_core::{Category, Product};
//!
//! let nutella = Product::new(3017620422003, "nutella", "https://example.org", "e", None);
//! assert_eq!(nutella.to_string(), "Nutella");
//!
//! // Reference entities have no id until the database assigns one
//! let spreads = Category::new("pâtes à tartiner");
//! assert!(spreads.id.is_none());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod query;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use query::{Direction, QueryOptions, SortKey, SortOrder};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Width of `product.name`.
pub const PRODUCT_NAME_MAX: usize = 200;

/// Width of `product.url`.
pub const PRODUCT_URL_MAX: usize = 255;

/// Width of `product.nutriscore` (a single grade letter).
pub const NUTRISCORE_LEN: usize = 1;

/// Width of `category.name` and `store.name`.
pub const REFERENCE_NAME_MAX: usize = 100;

/// Largest LIMIT a list query accepts.
///
/// The menu never shows more than a screenful; anything above this is a
/// caller bug rather than a legitimate page size.
pub const MAX_QUERY_LIMIT: u32 = 1000;
