//! Response DTOs
//!
//! The roster response is shaped for the in-world display's JSON parser,
//! which cannot index arrays: each role group serializes as an object keyed
//! by stringified indexes ("0", "1", ...), and the top level carries an
//! `allRoles` array so consumers can enumerate groups without inspecting
//! keys.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use roster_core::{Binding, NameChange};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// One sponsor as the read API reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorEntry {
    pub vrchat_name: String,
    pub display_name: String,
    pub avatar: Option<String>,
    pub is_booster: bool,
    pub joined_at: Option<DateTime<Utc>>,
    pub support_days: i64,
    pub is_external: bool,
}

/// Role-grouped roster, the read API's top-level payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterResponse {
    groups: BTreeMap<String, Vec<SponsorEntry>>,
}

impl RosterResponse {
    /// Add an entry to a role group, creating the group on first use
    pub fn push(&mut self, role_name: &str, entry: SponsorEntry) {
        self.groups
            .entry(role_name.to_string())
            .or_default()
            .push(entry);
    }

    /// All role names that received at least one entry, in lexicographic
    /// order (the same order the keyed groups serialize in)
    pub fn all_roles(&self) -> Vec<&str> {
        self.groups.keys().map(String::as_str).collect()
    }

    /// The entries of one role group
    pub fn group(&self, role_name: &str) -> Option<&[SponsorEntry]> {
        self.groups.get(role_name).map(Vec::as_slice)
    }

    /// True when no role received any entry
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of entries across all groups (fan-out counted)
    pub fn entry_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// A role group rendered as {"0": entry, "1": entry, ...}
struct IndexedGroup<'a>(&'a [SponsorEntry]);

impl Serialize for IndexedGroup<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (index, entry) in self.0.iter().enumerate() {
            map.serialize_entry(&index.to_string(), entry)?;
        }
        map.end()
    }
}

impl Serialize for RosterResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len() + 1))?;
        for (role_name, entries) in &self.groups {
            map.serialize_entry(role_name, &IndexedGroup(entries))?;
        }
        map.serialize_entry("allRoles", &self.all_roles())?;
        map.end()
    }
}

/// Result of a bind operation
#[derive(Debug, Clone)]
pub struct BindOutcome {
    pub binding: Binding,
    /// True iff no prior binding existed for this (guild, person)
    pub was_new_binding: bool,
}

/// Report handed back when a binding is removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnbindReport {
    pub vrchat_name: String,
    pub bound_days: i64,
    pub history: Vec<NameChange>,
}

/// Counts reported by a managed-member sync pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Sponsor records created by this pass
    pub upserted: u64,
    /// Existing records whose state actually changed
    pub modified: u64,
    /// Platform-linked records retired because the person no longer holds a
    /// managed role
    pub retired: u64,
}

/// Fraction of managed-role holders with a binding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingProgress {
    pub bound: u64,
    pub total: u64,
    pub percentage: u32,
}

impl BindingProgress {
    /// Compute progress with 0/0 defined as 0%, never a division error
    pub fn compute(bound: u64, total: u64) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            ((bound as f64 / total as f64) * 100.0).round() as u32
        };
        Self {
            bound,
            total,
            percentage,
        }
    }
}

/// One admin-search result: a binding and the sponsor record behind it
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub binding: Binding,
    pub sponsor: Option<roster_core::Sponsor>,
}
