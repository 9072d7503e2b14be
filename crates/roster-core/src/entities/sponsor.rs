//! Sponsor entity - a person tracked in a guild's roster
//!
//! Platform-linked sponsors mirror live Discord role state and are written by
//! the sync engine and the member-event path. Manual sponsors are curated by
//! admins and carry free-text virtual role names instead of role IDs. The two
//! shapes share one record keyed by (guild, person); the variant is the
//! compile-time discriminator.

use chrono::{DateTime, Utc};

use crate::value_objects::{PersonId, RoleSnapshot, Snowflake};

/// What kind of sponsor record this is, with the kind-specific fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SponsorKind {
    /// Backed by a platform account; role IDs resolve to names at read time
    Platform {
        role_ids: Vec<Snowflake>,
        is_booster: bool,
    },
    /// Manually entered by an admin; role names are stored verbatim
    Manual {
        role_names: Vec<String>,
        added_by: Option<Snowflake>,
        notes: Option<String>,
    },
}

/// Sponsor record, one per (guild, person)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sponsor {
    pub guild_id: Snowflake,
    pub person: PersonId,
    pub kind: SponsorKind,
    /// Display-name override; falls back to the live platform name
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sponsor {
    /// Create a platform-linked sponsor from a role snapshot
    pub fn from_snapshot(
        guild_id: Snowflake,
        person: PersonId,
        snapshot: RoleSnapshot,
        display_name: Option<String>,
        avatar: Option<String>,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            guild_id,
            person,
            kind: SponsorKind::Platform {
                role_ids: snapshot.role_ids,
                is_booster: snapshot.is_booster,
            },
            display_name,
            avatar,
            joined_at,
            updated_at: Utc::now(),
        }
    }

    /// Create a manually-entered sponsor
    pub fn manual(
        guild_id: Snowflake,
        person: PersonId,
        role_names: Vec<String>,
        display_name: Option<String>,
        notes: Option<String>,
        added_by: Option<Snowflake>,
    ) -> Self {
        let now = Utc::now();
        Self {
            guild_id,
            person,
            kind: SponsorKind::Manual {
                role_names,
                added_by,
                notes,
            },
            display_name,
            avatar: None,
            joined_at: now,
            updated_at: now,
        }
    }

    /// Is this record backed by a platform account?
    #[inline]
    pub fn is_platform(&self) -> bool {
        matches!(self.kind, SponsorKind::Platform { .. })
    }

    /// Platform role IDs, empty for manual entries
    pub fn role_ids(&self) -> &[Snowflake] {
        match &self.kind {
            SponsorKind::Platform { role_ids, .. } => role_ids,
            SponsorKind::Manual { .. } => &[],
        }
    }

    /// Boost flag; manual entries are never boosters
    pub fn is_booster(&self) -> bool {
        match &self.kind {
            SponsorKind::Platform { is_booster, .. } => *is_booster,
            SponsorKind::Manual { .. } => false,
        }
    }

    /// Apply a fresh role snapshot to a platform-linked record
    pub fn apply_snapshot(&mut self, snapshot: RoleSnapshot) {
        self.kind = SponsorKind::Platform {
            role_ids: snapshot.role_ids,
            is_booster: snapshot.is_booster,
        };
        self.updated_at = Utc::now();
    }
}
