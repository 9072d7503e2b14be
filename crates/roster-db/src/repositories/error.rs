//! Error handling utilities for repositories

use roster_core::DomainError;
use sqlx::Error as SqlxError;

/// Convert a SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return the given conflict error, otherwise
/// fall back to a generic database error
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    DomainError::DatabaseError(e.to_string())
}

/// Like `map_unique_violation`, but the conflict error depends on which
/// constraint tripped (primary key vs a secondary unique index)
pub fn map_constraint_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce(&str) -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            if let Some(constraint) = db_err.constraint() {
                return on_unique(constraint);
            }
        }
    }
    DomainError::DatabaseError(e.to_string())
}
