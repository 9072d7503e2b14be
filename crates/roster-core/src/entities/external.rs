//! External sponsor entity - sponsors with no platform account
//!
//! Identified by VRChat name within a guild, optionally linked to a platform
//! account later. Only ever created, edited, or removed by explicit admin
//! action; sync never touches these records.

use chrono::{DateTime, Utc};

use crate::value_objects::{PersonId, Snowflake};

/// External sponsor record, one per (guild, VRChat name)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalSponsor {
    pub guild_id: Snowflake,
    /// Identity key within the guild
    pub vrchat_name: String,
    /// Unique per guild when present
    pub linked_person: Option<PersonId>,
    /// Virtual role names, used directly by aggregation
    pub role_names: Vec<String>,
    pub display_name: Option<String>,
    pub added_by: Snowflake,
    pub added_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl ExternalSponsor {
    /// Create a new external sponsor
    pub fn new(
        guild_id: Snowflake,
        vrchat_name: String,
        role_names: Vec<String>,
        added_by: Snowflake,
    ) -> Self {
        let now = Utc::now();
        Self {
            guild_id,
            vrchat_name,
            linked_person: None,
            role_names,
            display_name: None,
            added_by,
            added_at: now,
            updated_at: now,
            notes: None,
        }
    }

    /// Replace the virtual role set
    pub fn set_role_names(&mut self, role_names: Vec<String>) {
        self.role_names = role_names;
        self.updated_at = Utc::now();
    }

    /// Whole days since the sponsor was added
    pub fn supported_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.added_at).num_days().max(0)
    }
}
