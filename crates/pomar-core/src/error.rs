//! # Error Types
//!
//! Domain-specific error types for pomar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  pomar-core errors (this file)                                      │
//! │  ├── ValidationError  - Malformed or missing input                  │
//! │  ├── StateError       - Lifecycle preconditions violated            │
//! │  └── CoreError        - Umbrella over both                          │
//! │                                                                     │
//! │  pomar-db errors (separate crate)                                   │
//! │  └── StoreError       - NotFound + persistence failures,            │
//! │                         wraps the two above transparently           │
//! │                                                                     │
//! │  The split matters downstream: a StateError means the user can      │
//! │  fix it (receive the device, reopen the proposal); a persistence    │
//! │  error means the write batch rolled back and nothing changed.       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ids, field names)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Lifecycle precondition violated (wraps StateError).
    #[error("State error: {0}")]
    State(#[from] StateError),
}

// =============================================================================
// State Error
// =============================================================================

/// Lifecycle precondition failures.
///
/// Each variant names the exact rule that blocked the operation, so the
/// caller can surface a precise message instead of a generic "not allowed".
/// These never mean data was lost: the operation refused to start.
#[derive(Debug, Error)]
pub enum StateError {
    /// The proposal was already sold; sold is terminal.
    #[error("Proposal {id} is already sold")]
    AlreadySold { id: String },

    /// The proposal expired; selling, promoting and in-place edits are
    /// blocked. Editing goes through reopen, which clones a fresh draft.
    #[error("Proposal {id} has expired")]
    Expired { id: String },

    /// The linked product is still on order. It must be received into
    /// stock before the sale can complete.
    ///
    /// ## User Workflow
    /// ```text
    /// Sell proposal
    ///      │
    ///      ▼
    /// Linked product status: ordered
    ///      │
    ///      ▼
    /// AwaitingReceipt { product_id }
    ///      │
    ///      ▼
    /// UI shows: "Receive the device into stock first"
    /// ```
    #[error("Product {product_id} is still on order; receive it before selling")]
    AwaitingReceipt { product_id: String },

    /// Receive was called on an item that is already in stock.
    #[error("Product {id} is already in stock")]
    AlreadyInStock { id: String },

    /// Order placement was requested for a proposal that is already ordered.
    #[error("Proposal {id} is already ordered")]
    AlreadyOrdered { id: String },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, malformed decimal).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
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
    fn test_state_error_messages() {
        let err = StateError::AwaitingReceipt {
            product_id: "p-123".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Product p-123 is still on order; receive it before selling"
        );

        let err = StateError::Expired {
            id: "s-9".to_string(),
        };
        assert_eq!(err.to_string(), "Proposal s-9 has expired");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustBePositive {
            field: "exchange_rate".to_string(),
        };
        assert_eq!(err.to_string(), "exchange_rate must be positive");
    }

    #[test]
    fn test_conversions_to_core_error() {
        let core_err: CoreError = ValidationError::Required {
            field: "memory".to_string(),
        }
        .into();
        assert!(matches!(core_err, CoreError::Validation(_)));

        let core_err: CoreError = StateError::AlreadySold {
            id: "s-1".to_string(),
        }
        .into();
        assert!(matches!(core_err, CoreError::State(_)));
    }
}
