//! Binding entity - the association between a person and their VRChat name

use chrono::{DateTime, Utc};

use crate::value_objects::{PersonId, Snowflake, VrchatName};

/// One entry in a binding's name-change history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameChange {
    pub previous_name: String,
    pub changed_at: DateTime<Utc>,
}

/// Binding record, one per (guild, person)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub guild_id: Snowflake,
    pub person: PersonId,
    pub current_name: String,
    /// Immutable after creation
    pub first_bound_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Most recent change first. Append-only; entries are never rewritten.
    pub history: Vec<NameChange>,
}

impl Binding {
    /// Create a first-time binding with empty history
    pub fn new(guild_id: Snowflake, person: PersonId, name: VrchatName) -> Self {
        let now = Utc::now();
        Self {
            guild_id,
            person,
            current_name: name.into_inner(),
            first_bound_at: now,
            updated_at: now,
            history: Vec::new(),
        }
    }

    /// Re-bind to a (possibly unchanged) name.
    ///
    /// If the name differs the old one is pushed onto history and the change
    /// is returned; if it is identical only the update timestamp moves, so
    /// re-binding the same name never grows history.
    pub fn rebind(&mut self, name: VrchatName) -> Option<NameChange> {
        let now = Utc::now();
        self.updated_at = now;
        if self.current_name == name.as_str() {
            return None;
        }
        let change = NameChange {
            previous_name: std::mem::replace(&mut self.current_name, name.into_inner()),
            changed_at: now,
        };
        self.history.insert(0, change.clone());
        Some(change)
    }

    /// Whole days since the first bind
    pub fn bound_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.first_bound_at).num_days().max(0)
    }
}
