//! Role snapshot - normalized projection of a member's live role state

use serde::{Deserialize, Serialize};

use crate::traits::DirectoryMember;

use super::snowflake::Snowflake;

/// A member's role/boost state at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoleSnapshot {
    pub role_ids: Vec<Snowflake>,
    pub is_booster: bool,
}

impl RoleSnapshot {
    /// Project a live directory member into a snapshot.
    ///
    /// The implicit everyone role carries the guild's own ID and is excluded;
    /// it is held by every member and gates nothing.
    pub fn from_directory(member: &DirectoryMember, guild_id: Snowflake) -> Self {
        Self {
            role_ids: member
                .role_ids
                .iter()
                .copied()
                .filter(|&id| id != guild_id)
                .collect(),
            is_booster: member.is_booster,
        }
    }

    /// Does this snapshot include at least one of the given roles?
    pub fn holds_any(&self, roles: &[Snowflake]) -> bool {
        self.role_ids.iter().any(|id| roles.contains(id))
    }
}
