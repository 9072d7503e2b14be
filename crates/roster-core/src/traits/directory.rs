//! Member directory port - the live platform seen as an opaque data source
//!
//! Sync, progress, and aggregation all need current platform state (member
//! listings, role names) that must not be cached at write time: role names
//! drift independently of the IDs stored in sponsor records. The gateway
//! adapter implements this over the Discord REST API; tests implement it
//! in memory.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// A guild member as the live platform reports it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryMember {
    pub user_id: Snowflake,
    pub display_name: String,
    pub avatar_url: Option<String>,
    /// Bots and other service accounts never count as sponsors
    pub is_service_account: bool,
    pub is_booster: bool,
    pub role_ids: Vec<Snowflake>,
    pub joined_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// Full member listing for a guild
    async fn guild_members(&self, guild_id: Snowflake)
        -> Result<Vec<DirectoryMember>, DomainError>;

    /// A single member, or None when the person is not in the guild
    async fn member(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> Result<Option<DirectoryMember>, DomainError>;

    /// Current role ID → display name mapping for a guild
    async fn role_names(&self, guild_id: Snowflake)
        -> Result<HashMap<Snowflake, String>, DomainError>;

    /// Deliver a direct message to a person
    async fn notify(&self, user_id: Snowflake, message: &str) -> Result<(), DomainError>;
}
