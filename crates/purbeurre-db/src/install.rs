//! # Catalog Installer
//!
//! Loads normalized product records into the database.
//!
//! ## Flow per Record
//! ```text
//! ProductRecord { id, name, …, categories: [c1, c2], stores: [s1] }
//!       │
//!       ├── products().create(product)          duplicate id → error
//!       ├── categories().create(c1), (c2)       upsert, ids recovered
//!       ├── product.add_categories([c1, c2])
//!       ├── stores().create(s1)                 upsert
//!       └── product.add_stores([s1])
//! ```
//!
//! The first error aborts the install. Records written before it stay.

use std::collections::HashSet;
use std::path::Path;

use purbeurre_core::{Category, ProductRecord, Store};
use thiserror::Error;
use tracing::{debug, info};

use crate::error::DbError;
use crate::pool::Database;
use crate::relations::ProductRelations;

/// Installer errors.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Cannot read feed {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed feed: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Db(#[from] DbError),
}

pub type InstallResult<T> = Result<T, InstallError>;

/// What an install wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub products: usize,
    /// Distinct category names seen.
    pub categories: usize,
    /// Distinct store names seen.
    pub stores: usize,
    pub category_links: usize,
    pub store_links: usize,
}

/// Parses a JSON array of records.
pub fn parse_records(json: &str) -> InstallResult<Vec<ProductRecord>> {
    Ok(serde_json::from_str(json)?)
}

/// Reads and parses a feed file.
pub fn load_records(path: impl AsRef<Path>) -> InstallResult<Vec<ProductRecord>> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| InstallError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_records(&json)
}

/// Writes every record, with its categories and stores.
///
/// Category and store names repeated across records map to a single row.
/// A name repeated inside one record is linked once.
pub async fn install_records(db: &Database, records: &[ProductRecord]) -> InstallResult<InstallReport> {
    info!(records = records.len(), "Installing catalog");

    let mut report = InstallReport::default();
    let mut category_names = HashSet::new();
    let mut store_names = HashSet::new();

    for record in records {
        let product = db.products().create(record.to_product()).await?;
        report.products += 1;

        let mut categories = Vec::new();
        for name in distinct(&record.categories) {
            categories.push(db.categories().create(Category::new(name)).await?);
            category_names.insert(name);
        }
        report.category_links += product.add_categories(db, &categories).await?.len();

        let mut stores = Vec::new();
        for name in distinct(&record.stores) {
            stores.push(db.stores().create(Store::new(name)).await?);
            store_names.insert(name);
        }
        report.store_links += product.add_stores(db, &stores).await?.len();

        debug!(
            id = %product.id,
            categories = categories.len(),
            stores = stores.len(),
            "Installed product"
        );
    }

    report.categories = category_names.len();
    report.stores = store_names.len();

    info!(
        products = report.products,
        categories = report.categories,
        stores = report.stores,
        "Catalog installed"
    );
    Ok(report)
}

/// `names` without repeats, first occurrence kept.
fn distinct(names: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(String::as_str)
        .filter(|name| seen.insert(*name))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
