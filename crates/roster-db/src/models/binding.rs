//! Binding database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the bindings table
#[derive(Debug, Clone, FromRow)]
pub struct BindingModel {
    pub guild_id: i64,
    pub person_id: String,
    pub vrchat_name: String,
    pub first_bound_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for binding_history rows
#[derive(Debug, Clone, FromRow)]
pub struct NameChangeModel {
    pub previous_name: String,
    pub changed_at: DateTime<Utc>,
}
