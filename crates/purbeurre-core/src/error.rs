//! # Error Types
//!
//! Domain-specific error types for purbeurre-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  purbeurre-core errors (this file)                                     │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  purbeurre-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → DbError → collaborator (menu, installer)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core catalog errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An association was built from an entity that has no id yet.
    ///
    /// ## When This Occurs
    /// - Linking a `Category` or `Store` that was constructed but never
    ///   passed to its manager's `create`
    #[error("{entity} has not been saved yet")]
    NotPersisted { entity: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::NotPersisted {
            entity: "Category".to_string(),
        };
        assert_eq!(err.to_string(), "Category has not been saved yet");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: 1000,
        };
        assert_eq!(err.to_string(), "limit must be between 1 and 1000");

        let err = ValidationError::NotAllowed {
            field: "sort key".to_string(),
            allowed: vec!["id".to_string(), "name".to_string()],
        };
        assert_eq!(err.to_string(), "sort key must be one of: [\"id\", \"name\"]");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: 1000,
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
