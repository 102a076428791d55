//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)          ValidationError (crm-core)        │
//! │       │                                    │                            │
//! │       ▼                                    ▼                            │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ErrorKind ← Connection / ForeignKey / Constraint /                    │
//! │              InvalidFormat / NotFound / Storage                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller decides what is fatal                                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Foreign Keys on Insert vs Delete
//! SQLite reports both a dangling reference on insert and a blocked
//! delete as `FOREIGN KEY constraint failed`. The conversion below yields
//! `ForeignKeyViolation`; delete paths call [`DbError::on_delete`] to turn
//! it into `ConstraintViolation`.

use crm_core::{EntityId, ValidationError};
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - An update matched zero rows (the id was deleted)
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Linking a customer to a product it is already linked to
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation on a write.
    ///
    /// ## When This Occurs
    /// - Inserting a customer for a client that does not exist
    /// - Linking to a product that does not exist
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A delete was blocked by dependent rows.
    ///
    /// ## When This Occurs
    /// - Deleting a client that still owns customers
    /// - Deleting a product that is still linked to customers
    #[error("Delete of {entity} {id} blocked by dependent rows: {message}")]
    ConstraintViolation {
        entity: String,
        id: String,
        message: String,
    },

    /// Input rejected before any statement was executed.
    #[error("Invalid format: {0}")]
    InvalidFormat(#[from] ValidationError),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created or opened
    /// - File permissions issue
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed to begin, commit or roll back.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Coarse classification of a [`DbError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The storage connection could not be established or was lost.
    Connection,
    /// A write referenced a row that does not exist.
    ForeignKey,
    /// A delete was blocked by dependent rows.
    Constraint,
    /// Malformed input, nothing was written.
    InvalidFormat,
    /// The targeted row does not exist.
    NotFound,
    /// Any other engine failure.
    Storage,
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Reclassifies a foreign key failure raised by a DELETE.
    ///
    /// A DELETE can only trip a foreign key when dependent rows exist,
    /// so the failure is a blocked delete rather than a dangling write.
    pub fn on_delete(self, entity: &str, id: Option<EntityId>) -> Self {
        match self {
            DbError::ForeignKeyViolation { message } => DbError::ConstraintViolation {
                entity: entity.to_string(),
                id: id.map_or_else(|| "*".to_string(), |id| id.to_string()),
                message,
            },
            other => other,
        }
    }

    /// Returns the coarse error classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::NotFound { .. } => ErrorKind::NotFound,
            DbError::ForeignKeyViolation { .. } => ErrorKind::ForeignKey,
            DbError::ConstraintViolation { .. } => ErrorKind::Constraint,
            DbError::InvalidFormat(_) => ErrorKind::InvalidFormat,
            DbError::ConnectionFailed(_) | DbError::PoolExhausted => ErrorKind::Connection,
            DbError::UniqueViolation { .. }
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::TransactionFailed(_)
            | DbError::Internal(_) => ErrorKind::Storage,
        }
    }

    /// True for a delete blocked by dependent rows.
    pub fn is_constraint_violation(&self) -> bool {
        self.kind() == ErrorKind::Constraint
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Classify by constraint kind
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::PoolClosed     → DbError::ConnectionFailed
/// sqlx::Error::Io / Tls       → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message().to_string();

                // SQLite messages:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>, ..."
                // FK constraint:     "FOREIGN KEY constraint failed"
                match db_err.kind() {
                    sqlx::error::ErrorKind::UniqueViolation => unique_violation(&msg),
                    sqlx::error::ErrorKind::ForeignKeyViolation => {
                        DbError::ForeignKeyViolation { message: msg }
                    }
                    _ if msg.contains("UNIQUE constraint failed") => unique_violation(&msg),
                    _ if msg.contains("FOREIGN KEY constraint failed") => {
                        DbError::ForeignKeyViolation { message: msg }
                    }
                    _ => DbError::QueryFailed(msg),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(_) | sqlx::Error::Tls(_) => DbError::ConnectionFailed(err.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

fn unique_violation(msg: &str) -> DbError {
    let field = msg
        .split("UNIQUE constraint failed: ")
        .nth(1)
        .unwrap_or("unknown")
        .to_string();
    DbError::UniqueViolation {
        field,
        value: "unknown".to_string(),
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_delete_reclassifies_foreign_key() {
        let err = DbError::ForeignKeyViolation {
            message: "FOREIGN KEY constraint failed".to_string(),
        }
        .on_delete("Client", Some(2));

        assert_eq!(err.kind(), ErrorKind::Constraint);
        assert!(err.is_constraint_violation());
        assert_eq!(
            err.to_string(),
            "Delete of Client 2 blocked by dependent rows: FOREIGN KEY constraint failed"
        );
    }

    #[test]
    fn test_on_delete_keeps_other_errors() {
        let err = DbError::QueryFailed("disk I/O error".to_string()).on_delete("Client", None);
        assert_eq!(err.kind(), ErrorKind::Storage);
    }

    #[test]
    fn test_bulk_delete_uses_wildcard_id() {
        let err = DbError::ForeignKeyViolation {
            message: "FOREIGN KEY constraint failed".to_string(),
        }
        .on_delete("Client", None);
        assert!(matches!(err, DbError::ConstraintViolation { ref id, .. } if id == "*"));
    }

    #[test]
    fn test_validation_error_converts() {
        let err: DbError = ValidationError::invalid_format("full_name", "expected 2 names").into();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(DbError::not_found("Customer", 8).kind(), ErrorKind::NotFound);
        assert_eq!(DbError::PoolExhausted.kind(), ErrorKind::Connection);
        assert_eq!(DbError::duplicate("sku", "x").kind(), ErrorKind::Storage);
        assert_eq!(
            DbError::not_found("Customer", 8).to_string(),
            "Customer not found: 8"
        );
    }
}
