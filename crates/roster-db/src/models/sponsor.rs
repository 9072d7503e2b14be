//! Sponsor database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the sponsors table. `kind` discriminates which of
/// role_ids / role_names carries the record's roles.
#[derive(Debug, Clone, FromRow)]
pub struct SponsorModel {
    pub guild_id: i64,
    pub person_id: String,
    pub kind: String,
    pub role_ids: Vec<i64>,
    pub role_names: Vec<String>,
    pub is_booster: bool,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub notes: Option<String>,
    pub added_by: Option<i64>,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
