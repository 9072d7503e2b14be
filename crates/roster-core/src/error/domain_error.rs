//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{PersonId, Snowflake, MAX_NAME_LEN};

/// Domain layer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Guild not registered: {0}")]
    GuildNotFound(Snowflake),

    #[error("No sponsor record for {0}")]
    SponsorNotFound(PersonId),

    #[error("No binding for {0}")]
    BindingNotFound(PersonId),

    #[error("No external sponsor named {0:?}")]
    ExternalSponsorNotFound(String),

    #[error("Member not found in guild")]
    MemberNotFound,

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Name is empty")]
    EmptyName,

    #[error("Name is too long: {len} characters (max {MAX_NAME_LEN})")]
    NameTooLong { len: usize },

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("No roles given")]
    EmptyRoleList,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Sponsor record already exists for {0}")]
    DuplicateSponsor(PersonId),

    #[error("External sponsor {0:?} already exists")]
    DuplicateExternalSponsor(String),

    #[error("Person {0} is already linked to another external sponsor")]
    ExternalLinkTaken(PersonId),

    #[error("A sync is already running for this guild")]
    SyncAlreadyRunning,

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Binding is disabled: no managed roles are configured")]
    BindingDisabled,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Platform unavailable: {0}")]
    PlatformUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::GuildNotFound(_) => "UNKNOWN_GUILD",
            Self::SponsorNotFound(_) => "UNKNOWN_SPONSOR",
            Self::BindingNotFound(_) => "UNKNOWN_BINDING",
            Self::ExternalSponsorNotFound(_) => "UNKNOWN_EXTERNAL_SPONSOR",
            Self::MemberNotFound => "UNKNOWN_MEMBER",

            Self::EmptyName => "EMPTY_NAME",
            Self::NameTooLong { .. } => "NAME_TOO_LONG",
            Self::InvalidId(_) => "INVALID_ID",
            Self::EmptyRoleList => "EMPTY_ROLE_LIST",

            Self::DuplicateSponsor(_) => "DUPLICATE_SPONSOR",
            Self::DuplicateExternalSponsor(_) => "DUPLICATE_EXTERNAL_SPONSOR",
            Self::ExternalLinkTaken(_) => "EXTERNAL_LINK_TAKEN",
            Self::SyncAlreadyRunning => "SYNC_ALREADY_RUNNING",

            Self::BindingDisabled => "BINDING_DISABLED",

            Self::PlatformUnavailable(_) => "PLATFORM_UNAVAILABLE",
            Self::DatabaseError(_) => "DATABASE_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::GuildNotFound(_)
                | Self::SponsorNotFound(_)
                | Self::BindingNotFound(_)
                | Self::ExternalSponsorNotFound(_)
                | Self::MemberNotFound
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyName
                | Self::NameTooLong { .. }
                | Self::InvalidId(_)
                | Self::EmptyRoleList
                | Self::BindingDisabled
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::DuplicateSponsor(_)
                | Self::DuplicateExternalSponsor(_)
                | Self::ExternalLinkTaken(_)
                | Self::SyncAlreadyRunning
        )
    }
}
