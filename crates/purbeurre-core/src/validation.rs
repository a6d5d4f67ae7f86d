//! # Validation Module
//!
//! Column-width truncation and bounds checks.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Feed normalizer (outside this workspace)                     │
//! │  └── Lowercasing, splitting category/store lists                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Entity construction (THIS MODULE)                            │
//! │  ├── Silent truncation to column width                                 │
//! │  └── Limit / sort key checks for list queries                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use purbeurre_core::validation::{truncate, validate_limit};
//!
//! assert_eq!(truncate("chocolat", 4), "choc");
//! assert!(validate_limit(20).is_ok());
//! assert!(validate_limit(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::query::SortKey;
use crate::MAX_QUERY_LIMIT;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Helpers
// =============================================================================

/// Cuts `value` down to at most `max` characters.
///
/// Counts characters, not bytes, so accented names ("pâtes à tartiner")
/// are never split inside a code point.
///
/// ## Example
/// ```rust
/// use purbeurre_core::validation::truncate;
///
/// assert_eq!(truncate("pâtes", 2), "pâ");
/// assert_eq!(truncate("pizza", 100), "pizza");
/// ```
pub fn truncate(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((byte_idx, _)) => value[..byte_idx].to_string(),
        None => value.to_string(),
    }
}

/// Uppercases the first character and leaves the rest untouched.
///
/// ## Example
/// ```rust
/// use purbeurre_core::validation::capitalize;
///
/// assert_eq!(capitalize("éclair au chocolat"), "Éclair au chocolat");
/// assert_eq!(capitalize(""), "");
/// ```
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// =============================================================================
// Query Validators
// =============================================================================

/// Validates a LIMIT value.
///
/// ## Rules
/// - Must be at least 1
/// - Must not exceed [`MAX_QUERY_LIMIT`]
pub fn validate_limit(limit: u32) -> ValidationResult<u32> {
    if limit == 0 || limit > MAX_QUERY_LIMIT {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: i64::from(MAX_QUERY_LIMIT),
        });
    }

    Ok(limit)
}

/// Validates that `key` is one of the sort keys a table exposes.
pub fn validate_sort_key(key: SortKey, allowed: &[SortKey]) -> ValidationResult<SortKey> {
    if allowed.contains(&key) {
        return Ok(key);
    }

    Err(ValidationError::NotAllowed {
        field: format!("sort key '{}'", key.column()),
        allowed: allowed.iter().map(|k| k.column().to_string()).collect(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
