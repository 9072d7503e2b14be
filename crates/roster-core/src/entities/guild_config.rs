//! Guild configuration entity

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Per-guild settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildConfig {
    pub guild_id: Snowflake,
    pub owner_id: Snowflake,
    pub api_enabled: bool,
    /// Roles that gate the binding feature. Empty means binding is disabled.
    pub managed_role_ids: Vec<Snowflake>,
    /// Person to DM when a member binds or changes their name
    pub notify_user_id: Option<Snowflake>,
    pub joined_at: DateTime<Utc>,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub last_api_call_at: Option<DateTime<Utc>>,
    pub sync_in_progress: bool,
}

impl GuildConfig {
    /// Create a new GuildConfig with defaults
    pub fn new(guild_id: Snowflake, owner_id: Snowflake) -> Self {
        Self {
            guild_id,
            owner_id,
            api_enabled: true,
            managed_role_ids: Vec::new(),
            notify_user_id: None,
            joined_at: Utc::now(),
            last_sync_at: None,
            last_api_call_at: None,
            sync_in_progress: false,
        }
    }

    /// The canonical feature-gate check: binding is enabled iff at least one
    /// role is managed.
    #[inline]
    pub fn binding_enabled(&self) -> bool {
        !self.managed_role_ids.is_empty()
    }

    /// Check if a role is managed
    #[inline]
    pub fn is_managed(&self, role_id: Snowflake) -> bool {
        self.managed_role_ids.contains(&role_id)
    }

    /// Add a managed role, preserving order; returns false if already present
    pub fn add_managed_role(&mut self, role_id: Snowflake) -> bool {
        if self.is_managed(role_id) {
            return false;
        }
        self.managed_role_ids.push(role_id);
        true
    }

    /// Remove a managed role; returns false if it was not managed
    pub fn remove_managed_role(&mut self, role_id: Snowflake) -> bool {
        let before = self.managed_role_ids.len();
        self.managed_role_ids.retain(|&id| id != role_id);
        self.managed_role_ids.len() != before
    }
}
