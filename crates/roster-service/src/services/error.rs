//! Service layer error types
//!
//! Provides a unified error type for all service operations. Every variant
//! maps to an HTTP status for the read API and to an ephemeral reply for the
//! command surface; nothing here ever crashes the process.

use roster_core::DomainError;
use std::fmt;

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain rule violation
    Domain(DomainError),

    /// Resource not found
    NotFound { resource: &'static str, id: String },

    /// Access to a resource is switched off
    Forbidden(String),

    /// Validation error
    Validation(String),

    /// Conflict (e.g., duplicate resource)
    Conflict(String),

    /// Command issued again too quickly
    Cooldown { seconds_remaining: u64 },

    /// Internal error
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::Cooldown { seconds_remaining } => {
                write!(f, "Slow down: try again in {seconds_remaining}s")
            }
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) => {
                if e.is_not_found() {
                    404
                } else if e.is_validation() {
                    400
                } else if e.is_conflict() {
                    409
                } else {
                    500
                }
            }
            Self::NotFound { .. } => 404,
            Self::Forbidden(_) => 403,
            Self::Validation(_) => 400,
            Self::Conflict(_) => 409,
            Self::Cooldown { .. } => 429,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Cooldown { .. } => "COOLDOWN",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// A message suitable for an ephemeral command reply. Infrastructure
    /// failures are flattened to a generic retry message; everything else is
    /// specific and actionable.
    pub fn user_message(&self) -> String {
        match self {
            Self::Domain(DomainError::DatabaseError(_)) | Self::Internal(_) => {
                "Something went wrong on our side, please try again later.".to_string()
            }
            Self::Domain(DomainError::PlatformUnavailable(_)) => {
                "Discord did not answer in time, please try again later.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let err = ServiceError::not_found("Guild", "123");
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(err.to_string().contains("Guild not found: 123"));
    }

    #[test]
    fn test_forbidden_error() {
        let err = ServiceError::forbidden("API access is disabled");
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.error_code(), "FORBIDDEN");
    }

    #[test]
    fn test_cooldown_error() {
        let err = ServiceError::Cooldown { seconds_remaining: 12 };
        assert_eq!(err.status_code(), 429);
        assert!(err.to_string().contains("12s"));
    }

    #[test]
    fn test_domain_error_mapping() {
        let err = ServiceError::from(DomainError::EmptyName);
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "EMPTY_NAME");
    }

    #[test]
    fn test_user_message_hides_infrastructure_detail() {
        let err = ServiceError::from(DomainError::DatabaseError("connection reset".into()));
        assert!(!err.user_message().contains("connection reset"));

        let err = ServiceError::from(DomainError::EmptyName);
        assert_eq!(err.user_message(), "Name is empty");
    }
}
