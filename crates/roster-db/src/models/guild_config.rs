//! Guild config database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the guild_configs table
#[derive(Debug, Clone, FromRow)]
pub struct GuildConfigModel {
    pub guild_id: i64,
    pub owner_id: i64,
    pub api_enabled: bool,
    pub managed_role_ids: Vec<i64>,
    pub notify_user_id: Option<i64>,
    pub joined_at: DateTime<Utc>,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub last_api_call_at: Option<DateTime<Utc>>,
    pub sync_in_progress: bool,
}
