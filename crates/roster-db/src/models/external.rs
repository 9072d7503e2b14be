//! External sponsor database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the external_sponsors table
#[derive(Debug, Clone, FromRow)]
pub struct ExternalSponsorModel {
    pub guild_id: i64,
    pub vrchat_name: String,
    pub linked_person_id: Option<String>,
    pub role_names: Vec<String>,
    pub display_name: Option<String>,
    pub added_by: i64,
    pub added_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub notes: Option<String>,
}
