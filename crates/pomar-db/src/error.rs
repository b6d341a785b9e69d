//! # Store Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds context and categorization            │
//! │       │                                                                 │
//! │       ├── Validation / State  → precondition failed, nothing written   │
//! │       ├── NotFound            → the id does not exist                  │
//! │       └── everything else     → persistence failure; the surrounding  │
//! │                                 write batch rolled back, all stores    │
//! │                                 are exactly as they were               │
//! │       ▼                                                                 │
//! │  App layer serializes a user-facing message                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The Validation/State variants are `#[error(transparent)]` re-exports of
//! the pomar-core enums, so matching on the business rule stays possible
//! after the store wraps it.

use pomar_core::error::{StateError, ValidationError};
use thiserror::Error;

/// Store operation errors.
///
/// These errors wrap sqlx errors and pomar-core precondition errors and
/// provide additional context for debugging and user feedback.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Input validation failed before any write happened.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A lifecycle precondition blocked the operation (already sold,
    /// expired, still on order, ...). Nothing was written.
    #[error(transparent)]
    State(#[from] StateError),

    /// Entity not found in the database.
    ///
    /// ## When This Occurs
    /// - `require`-style lookups on a missing id
    /// - An UPDATE/DELETE inside a write batch matched zero rows
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a duplicate product / proposal / ledger id
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        StoreError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True when the error is a precondition the user can fix (validation,
    /// lifecycle state, missing id) rather than a storage failure.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            StoreError::Validation(_) | StoreError::State(_) | StoreError::NotFound { .. }
        )
    }

    /// True when the error means the underlying write batch rolled back.
    pub fn is_persistence(&self) -> bool {
        !self.is_precondition()
    }
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → StoreError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → StoreError::PoolExhausted
/// Other                       → StoreError::Internal
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    StoreError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    StoreError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    StoreError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => StoreError::PoolExhausted,

            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("Pool is closed".to_string()),

            _ => StoreError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

impl From<pomar_core::error::CoreError> for StoreError {
    fn from(err: pomar_core::error::CoreError) -> Self {
        match err {
            pomar_core::error::CoreError::Validation(e) => StoreError::Validation(e),
            pomar_core::error::CoreError::State(e) => StoreError::State(e),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
