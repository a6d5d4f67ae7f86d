//! # ORDER BY / LIMIT Builder
//!
//! Turns [`QueryOptions`] into SQL shared by every manager.
//!
//! ```text
//! QueryOptions { order_by: [Random], limit: Some(20) }
//!       │
//!       ▼ validate against M::SORT_KEYS
//!       │
//!       ▼
//! " ORDER BY RANDOM() LIMIT ?"   + bind(20)
//! ```
//!
//! Column names come from the [`SortKey`](purbeurre_core::SortKey) enum and
//! the limit is bound as a parameter, so the rendered text only ever
//! contains identifiers this crate defines.

use purbeurre_core::{QueryOptions, SortOrder};

use crate::error::DbResult;
use crate::model::Model;

/// Validated ORDER BY and LIMIT parts of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Clauses {
    order_terms: Vec<String>,
    limit: Option<i64>,
}

impl Clauses {
    /// Validates `options` for model `M` and renders its ORDER BY terms,
    /// qualifying columns with `alias` when the query joins tables.
    pub(crate) fn build<M: Model>(options: &QueryOptions, alias: Option<&str>) -> DbResult<Self> {
        options.validate(M::SORT_KEYS)?;

        let order_terms = options
            .orders()
            .iter()
            .map(|order| match order {
                SortOrder::Random => "RANDOM()".to_string(),
                SortOrder::By(key, direction) => match alias {
                    Some(alias) => format!("{alias}.{} {}", key.column(), direction.keyword()),
                    None => format!("{} {}", key.column(), direction.keyword()),
                },
            })
            .collect();

        Ok(Clauses {
            order_terms,
            limit: options.max_rows().map(i64::from),
        })
    }

    /// The value to bind for the trailing `LIMIT ?`, if any.
    pub(crate) fn limit(&self) -> Option<i64> {
        self.limit
    }

    /// Renders `" ORDER BY … LIMIT ?"`; empty when nothing was requested.
    pub(crate) fn sql(&self) -> String {
        self.sql_or(None)
    }

    /// Same as [`Clauses::sql`], using `default_order` when the caller gave
    /// no ordering.
    pub(crate) fn sql_or(&self, default_order: Option<&str>) -> String {
        let mut sql = String::new();

        if !self.order_terms.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_terms.join(", "));
        } else if let Some(default_order) = default_order {
            sql.push_str(" ORDER BY ");
            sql.push_str(default_order);
        }

        if self.limit.is_some() {
            sql.push_str(" LIMIT ?");
        }

        sql
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use purbeurre_core::{Category, Favorite, Product, SortKey};

    #[test]
    fn test_empty_options_render_nothing() {
        let clauses = Clauses::build::<Product>(&QueryOptions::new(), None).unwrap();
        assert_eq!(clauses.sql(), "");
        assert_eq!(clauses.limit(), None);
    }

    #[test]
    fn test_random_with_limit() {
        let clauses = Clauses::build::<Category>(&QueryOptions::random(10), None).unwrap();
        assert_eq!(clauses.sql(), " ORDER BY RANDOM() LIMIT ?");
        assert_eq!(clauses.limit(), Some(10));
    }

    #[test]
    fn test_terms_keep_caller_order() {
        let options = QueryOptions::new()
            .order_by(SortOrder::asc(SortKey::Nutriscore))
            .order_by(SortOrder::desc(SortKey::Name));
        let clauses = Clauses::build::<Product>(&options, Some("p")).unwrap();
        assert_eq!(clauses.sql(), " ORDER BY p.nutriscore ASC, p.name DESC");
    }

    #[test]
    fn test_limit_only() {
        let clauses = Clauses::build::<Product>(&QueryOptions::new().limit(5), None).unwrap();
        assert_eq!(clauses.sql(), " LIMIT ?");
    }

    #[test]
    fn test_default_order_only_when_caller_gave_none() {
        let clauses = Clauses::build::<Product>(&QueryOptions::new().limit(5), None).unwrap();
        assert_eq!(clauses.sql_or(Some("shared DESC")), " ORDER BY shared DESC LIMIT ?");

        let options = QueryOptions::new().order_by(SortOrder::Random);
        let clauses = Clauses::build::<Product>(&options, None).unwrap();
        assert_eq!(clauses.sql_or(Some("shared DESC")), " ORDER BY RANDOM()");
    }

    #[test]
    fn test_rejects_key_outside_whitelist() {
        let options = QueryOptions::new().order_by(SortOrder::asc(SortKey::Nutriscore));
        let err = Clauses::build::<Category>(&options, None).unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        let options = QueryOptions::new().order_by(SortOrder::asc(SortKey::Id));
        assert!(Clauses::build::<Favorite>(&options, None).is_err());
    }

    #[test]
    fn test_rejects_zero_limit() {
        let err = Clauses::build::<Product>(&QueryOptions::new().limit(0), None).unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }
}
