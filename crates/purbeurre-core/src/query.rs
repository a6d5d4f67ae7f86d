//! # Query Options
//!
//! Ordering and limit options accepted by every list query.
//!
//! ## Why Enums Instead of SQL Fragments
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  From caller intent to SQL                              │
//! │                                                                         │
//! │  QueryOptions::new()                                                   │
//! │      .order_by(SortOrder::Random)                                      │
//! │      .limit(20)                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  purbeurre-db checks each SortKey against the table's whitelist        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ORDER BY RANDOM() LIMIT ?   ← limit is a bound parameter              │
//! │                                                                         │
//! │  Nothing the caller supplies is ever spliced into the query text.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::validation::{validate_limit, validate_sort_key, ValidationResult};

/// A column a list query can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Id,
    Name,
    Nutriscore,
}

impl SortKey {
    /// Column name this key maps to.
    pub const fn column(&self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Name => "name",
            SortKey::Nutriscore => "nutriscore",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub const fn keyword(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// One ORDER BY term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Shuffle the result set (the menu shows random picks).
    Random,
    /// Order by a column.
    By(SortKey, Direction),
}

impl SortOrder {
    /// Ascending order on `key`.
    pub const fn asc(key: SortKey) -> Self {
        SortOrder::By(key, Direction::Asc)
    }

    /// Descending order on `key`.
    pub const fn desc(key: SortKey) -> Self {
        SortOrder::By(key, Direction::Desc)
    }
}

/// Ordering and limit for a list query.
///
/// The default value means "no ORDER BY, no LIMIT": rows come back in
/// whatever order the database returns them.
///
/// ## Example
/// ```rust
/// use purbeurre_core::{QueryOptions, SortKey, SortOrder};
///
/// let options = QueryOptions::new()
///     .order_by(SortOrder::asc(SortKey::Nutriscore))
///     .order_by(SortOrder::asc(SortKey::Name))
///     .limit(5);
///
/// assert_eq!(options.orders().len(), 2);
/// assert_eq!(options.max_rows(), Some(5));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default)]
    order_by: Vec<SortOrder>,
    #[serde(default)]
    limit: Option<u32>,
}

impl QueryOptions {
    /// No ordering, no limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Random order, capped at `limit` rows.
    pub fn random(limit: u32) -> Self {
        Self::new().order_by(SortOrder::Random).limit(limit)
    }

    /// Appends an ORDER BY term. Terms apply in the order they were added.
    pub fn order_by(mut self, order: SortOrder) -> Self {
        self.order_by.push(order);
        self
    }

    /// Sets the maximum number of rows.
    ///
    /// Bounds are checked by [`QueryOptions::validate`] when the query runs.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn orders(&self) -> &[SortOrder] {
        &self.order_by
    }

    pub fn max_rows(&self) -> Option<u32> {
        self.limit
    }

    /// True when neither ordering nor limit was requested.
    pub fn is_empty(&self) -> bool {
        self.order_by.is_empty() && self.limit.is_none()
    }

    /// Checks every sort key against `allowed` and the limit against its
    /// bounds.
    pub fn validate(&self, allowed: &[SortKey]) -> ValidationResult<()> {
        for order in &self.order_by {
            if let SortOrder::By(key, _) = order {
                validate_sort_key(*key, allowed)?;
            }
        }

        if let Some(limit) = self.limit {
            validate_limit(limit)?;
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_QUERY_LIMIT;

    #[test]
    fn test_default_is_empty() {
        let options = QueryOptions::default();
        assert!(options.is_empty());
        assert!(options.validate(&[]).is_ok());
    }

    #[test]
    fn test_random_builder() {
        let options = QueryOptions::random(10);
        assert_eq!(options.orders(), &[SortOrder::Random]);
        assert_eq!(options.max_rows(), Some(10));
        assert!(!options.is_empty());
    }

    #[test]
    fn test_random_needs_no_whitelist() {
        let options = QueryOptions::new().order_by(SortOrder::Random);
        assert!(options.validate(&[]).is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_key() {
        let options = QueryOptions::new().order_by(SortOrder::desc(SortKey::Nutriscore));
        assert!(options.validate(&[SortKey::Id, SortKey::Name]).is_err());
        assert!(options.validate(&[SortKey::Nutriscore]).is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_limit() {
        assert!(QueryOptions::new().limit(0).validate(&[]).is_err());
        assert!(QueryOptions::new()
            .limit(MAX_QUERY_LIMIT + 1)
            .validate(&[])
            .is_err());
    }

    #[test]
    fn test_direction_keywords() {
        assert_eq!(Direction::default().keyword(), "ASC");
        assert_eq!(Direction::Desc.keyword(), "DESC");
        assert_eq!(SortOrder::asc(SortKey::Name), SortOrder::By(SortKey::Name, Direction::Asc));
    }
}
