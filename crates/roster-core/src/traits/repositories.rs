//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Every query is partitioned by guild ID; no
//! operation crosses guild boundaries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{Binding, ExternalSponsor, GuildConfig, NameChange, Sponsor};
use crate::error::DomainError;
use crate::value_objects::{PersonId, RoleSnapshot, Snowflake};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// One member's state for a snapshot upsert (single or bulk)
#[derive(Debug, Clone)]
pub struct SnapshotUpsert {
    pub person: PersonId,
    pub snapshot: RoleSnapshot,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    /// Preserved on existing records; only applied on first insert
    pub joined_at: DateTime<Utc>,
}

/// Counts reported by a bulk snapshot upsert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncCounts {
    /// Records that did not exist before
    pub inserted: u64,
    /// Existing records whose role/boost/profile state actually changed
    pub modified: u64,
}

// ============================================================================
// Guild Config Repository
// ============================================================================

#[async_trait]
pub trait GuildConfigRepository: Send + Sync {
    /// Find config by guild ID
    async fn find(&self, guild_id: Snowflake) -> RepoResult<Option<GuildConfig>>;

    /// Create a new config
    async fn create(&self, config: &GuildConfig) -> RepoResult<()>;

    /// Update an existing config's settings (managed roles, API flag,
    /// notification target, owner)
    async fn update(&self, config: &GuildConfig) -> RepoResult<()>;

    /// Delete the config row; cascading of dependent records is orchestrated
    /// by the caller
    async fn delete(&self, guild_id: Snowflake) -> RepoResult<()>;

    /// Atomically set the in-progress-sync flag. Returns false when a sync is
    /// already marked as running.
    async fn try_begin_sync(&self, guild_id: Snowflake) -> RepoResult<bool>;

    /// Clear the in-progress flag and stamp the last-sync timestamp
    async fn finish_sync(&self, guild_id: Snowflake, at: DateTime<Utc>) -> RepoResult<()>;

    /// Stamp the last-API-call timestamp
    async fn touch_api_call(&self, guild_id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Sponsor Repository
// ============================================================================

#[async_trait]
pub trait SponsorRepository: Send + Sync {
    /// Find sponsor by guild and person
    async fn find(&self, guild_id: Snowflake, person: &PersonId) -> RepoResult<Option<Sponsor>>;

    /// List all sponsors in a guild
    async fn find_by_guild(&self, guild_id: Snowflake) -> RepoResult<Vec<Sponsor>>;

    /// Create a new sponsor record; fails with `DuplicateSponsor` if the
    /// (guild, person) key already exists
    async fn create(&self, sponsor: &Sponsor) -> RepoResult<()>;

    /// Update an existing sponsor record
    async fn update(&self, sponsor: &Sponsor) -> RepoResult<()>;

    /// Upsert a single platform-linked record from a live role snapshot.
    /// Creates the record when absent; `joined_at` is only set on insert.
    async fn upsert_snapshot(&self, guild_id: Snowflake, entry: &SnapshotUpsert) -> RepoResult<()>;

    /// Bulk variant of `upsert_snapshot`: one round trip for the whole member
    /// set, reporting inserted vs actually-modified counts separately.
    async fn upsert_snapshots(
        &self,
        guild_id: Snowflake,
        entries: &[SnapshotUpsert],
    ) -> RepoResult<SyncCounts>;

    /// Delete platform-linked records whose person is NOT in `keep`. Manual
    /// records are never touched. Returns the number of retired records.
    async fn retire_platform_except(
        &self,
        guild_id: Snowflake,
        keep: &[PersonId],
    ) -> RepoResult<u64>;

    /// Delete one sponsor record; returns whether a record existed
    async fn delete(&self, guild_id: Snowflake, person: &PersonId) -> RepoResult<bool>;

    /// Delete every sponsor record in a guild; returns the count
    async fn delete_by_guild(&self, guild_id: Snowflake) -> RepoResult<u64>;
}

// ============================================================================
// Binding Repository
// ============================================================================

#[async_trait]
pub trait BindingRepository: Send + Sync {
    /// Find binding by guild and person, history fully loaded
    /// (most recent change first)
    async fn find(&self, guild_id: Snowflake, person: &PersonId) -> RepoResult<Option<Binding>>;

    /// List all bindings in a guild. History is not populated by listings;
    /// use `find` or `history` when it is needed.
    async fn find_by_guild(&self, guild_id: Snowflake) -> RepoResult<Vec<Binding>>;

    /// Case-insensitive substring search over current names
    async fn search_by_name(&self, guild_id: Snowflake, query: &str) -> RepoResult<Vec<Binding>>;

    /// Persist a first-time binding
    async fn create(&self, binding: &Binding) -> RepoResult<()>;

    /// Persist a name change: overwrite the current name and append the
    /// superseded one to history, atomically
    async fn rename(
        &self,
        guild_id: Snowflake,
        person: &PersonId,
        new_name: &str,
        change: &NameChange,
    ) -> RepoResult<()>;

    /// Refresh the update timestamp without touching name or history
    async fn touch(&self, guild_id: Snowflake, person: &PersonId, at: DateTime<Utc>)
        -> RepoResult<()>;

    /// Name-change history, most recent first, capped at `limit`
    async fn history(
        &self,
        guild_id: Snowflake,
        person: &PersonId,
        limit: i64,
    ) -> RepoResult<Vec<NameChange>>;

    /// Delete a binding and its history, returning the deleted record for
    /// reporting (bound duration etc.)
    async fn delete(&self, guild_id: Snowflake, person: &PersonId)
        -> RepoResult<Option<Binding>>;

    /// Delete every binding (and history) in a guild; returns the count
    async fn delete_by_guild(&self, guild_id: Snowflake) -> RepoResult<u64>;
}

// ============================================================================
// External Sponsor Repository
// ============================================================================

#[async_trait]
pub trait ExternalSponsorRepository: Send + Sync {
    /// Find by guild and VRChat name (the identity key)
    async fn find(&self, guild_id: Snowflake, vrchat_name: &str)
        -> RepoResult<Option<ExternalSponsor>>;

    /// List all external sponsors in a guild
    async fn find_by_guild(&self, guild_id: Snowflake) -> RepoResult<Vec<ExternalSponsor>>;

    /// Create a new external sponsor; fails with `DuplicateExternalSponsor`
    /// on a name conflict and `ExternalLinkTaken` when the linked person is
    /// already claimed by another record in the guild
    async fn create(&self, sponsor: &ExternalSponsor) -> RepoResult<()>;

    /// Update an existing external sponsor
    async fn update(&self, sponsor: &ExternalSponsor) -> RepoResult<()>;

    /// Delete one external sponsor; returns whether a record existed
    async fn delete(&self, guild_id: Snowflake, vrchat_name: &str) -> RepoResult<bool>;

    /// Delete every external sponsor in a guild; returns the count
    async fn delete_by_guild(&self, guild_id: Snowflake) -> RepoResult<u64>;
}
