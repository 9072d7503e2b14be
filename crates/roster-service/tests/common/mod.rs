//! In-memory repository and directory implementations for service tests
//!
//! These mirror the PostgreSQL semantics closely enough for the service layer
//! not to notice: key uniqueness, upsert counts, join-timestamp preservation,
//! and retirement filtering all behave like the real store.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roster_core::{
    Binding, BindingRepository, DirectoryMember, DomainError, ExternalSponsor,
    ExternalSponsorRepository, GuildConfig, GuildConfigRepository, MemberDirectory, NameChange,
    PersonId, RepoResult, SnapshotUpsert, Snowflake, Sponsor, SponsorKind, SponsorRepository,
    SyncCounts,
};
use roster_service::{ServiceContext, ServiceContextBuilder};

type Key = (i64, String);

fn key(guild_id: Snowflake, person: &PersonId) -> Key {
    (guild_id.into_inner(), person.to_string())
}

// ============================================================================
// Guild config store
// ============================================================================

#[derive(Default)]
pub struct MemGuildConfigRepository {
    rows: Mutex<HashMap<i64, GuildConfig>>,
}

#[async_trait]
impl GuildConfigRepository for MemGuildConfigRepository {
    async fn find(&self, guild_id: Snowflake) -> RepoResult<Option<GuildConfig>> {
        Ok(self.rows.lock().unwrap().get(&guild_id.into_inner()).cloned())
    }

    async fn create(&self, config: &GuildConfig) -> RepoResult<()> {
        self.rows
            .lock()
            .unwrap()
            .insert(config.guild_id.into_inner(), config.clone());
        Ok(())
    }

    async fn update(&self, config: &GuildConfig) -> RepoResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .get_mut(&config.guild_id.into_inner())
            .ok_or(DomainError::GuildNotFound(config.guild_id))?;
        row.owner_id = config.owner_id;
        row.api_enabled = config.api_enabled;
        row.managed_role_ids = config.managed_role_ids.clone();
        row.notify_user_id = config.notify_user_id;
        Ok(())
    }

    async fn delete(&self, guild_id: Snowflake) -> RepoResult<()> {
        self.rows
            .lock()
            .unwrap()
            .remove(&guild_id.into_inner())
            .map(|_| ())
            .ok_or(DomainError::GuildNotFound(guild_id))
    }

    async fn try_begin_sync(&self, guild_id: Snowflake) -> RepoResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .get_mut(&guild_id.into_inner())
            .ok_or(DomainError::GuildNotFound(guild_id))?;
        if row.sync_in_progress {
            return Ok(false);
        }
        row.sync_in_progress = true;
        Ok(true)
    }

    async fn finish_sync(&self, guild_id: Snowflake, at: DateTime<Utc>) -> RepoResult<()> {
        if let Some(row) = self.rows.lock().unwrap().get_mut(&guild_id.into_inner()) {
            row.sync_in_progress = false;
            row.last_sync_at = Some(at);
        }
        Ok(())
    }

    async fn touch_api_call(&self, guild_id: Snowflake) -> RepoResult<()> {
        if let Some(row) = self.rows.lock().unwrap().get_mut(&guild_id.into_inner()) {
            row.last_api_call_at = Some(Utc::now());
        }
        Ok(())
    }
}

// ============================================================================
// Sponsor store
// ============================================================================

#[derive(Default)]
pub struct MemSponsorRepository {
    rows: Mutex<HashMap<Key, Sponsor>>,
}

impl MemSponsorRepository {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn apply(row: &mut Sponsor, entry: &SnapshotUpsert) -> bool {
        let next_kind = SponsorKind::Platform {
            role_ids: entry.snapshot.role_ids.clone(),
            is_booster: entry.snapshot.is_booster,
        };
        let changed = row.kind != next_kind
            || row.display_name != entry.display_name
            || row.avatar != entry.avatar;
        if changed {
            row.kind = next_kind;
            row.display_name = entry.display_name.clone();
            row.avatar = entry.avatar.clone();
        }
        row.updated_at = Utc::now();
        changed
    }
}

#[async_trait]
impl SponsorRepository for MemSponsorRepository {
    async fn find(&self, guild_id: Snowflake, person: &PersonId) -> RepoResult<Option<Sponsor>> {
        Ok(self.rows.lock().unwrap().get(&key(guild_id, person)).cloned())
    }

    async fn find_by_guild(&self, guild_id: Snowflake) -> RepoResult<Vec<Sponsor>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.guild_id == guild_id)
            .cloned()
            .collect())
    }

    async fn create(&self, sponsor: &Sponsor) -> RepoResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let k = key(sponsor.guild_id, &sponsor.person);
        if rows.contains_key(&k) {
            return Err(DomainError::DuplicateSponsor(sponsor.person.clone()));
        }
        rows.insert(k, sponsor.clone());
        Ok(())
    }

    async fn update(&self, sponsor: &Sponsor) -> RepoResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let k = key(sponsor.guild_id, &sponsor.person);
        if !rows.contains_key(&k) {
            return Err(DomainError::SponsorNotFound(sponsor.person.clone()));
        }
        rows.insert(k, sponsor.clone());
        Ok(())
    }

    async fn upsert_snapshot(&self, guild_id: Snowflake, entry: &SnapshotUpsert) -> RepoResult<()> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&key(guild_id, &entry.person)) {
            Some(row) => {
                Self::apply(row, entry);
            }
            None => {
                rows.insert(
                    key(guild_id, &entry.person),
                    Sponsor::from_snapshot(
                        guild_id,
                        entry.person.clone(),
                        entry.snapshot.clone(),
                        entry.display_name.clone(),
                        entry.avatar.clone(),
                        entry.joined_at,
                    ),
                );
            }
        }
        Ok(())
    }

    async fn upsert_snapshots(
        &self,
        guild_id: Snowflake,
        entries: &[SnapshotUpsert],
    ) -> RepoResult<SyncCounts> {
        let mut counts = SyncCounts::default();
        let mut rows = self.rows.lock().unwrap();
        for entry in entries {
            match rows.get_mut(&key(guild_id, &entry.person)) {
                Some(row) => {
                    if Self::apply(row, entry) {
                        counts.modified += 1;
                    }
                }
                None => {
                    rows.insert(
                        key(guild_id, &entry.person),
                        Sponsor::from_snapshot(
                            guild_id,
                            entry.person.clone(),
                            entry.snapshot.clone(),
                            entry.display_name.clone(),
                            entry.avatar.clone(),
                            entry.joined_at,
                        ),
                    );
                    counts.inserted += 1;
                }
            }
        }
        Ok(counts)
    }

    async fn retire_platform_except(
        &self,
        guild_id: Snowflake,
        keep: &[PersonId],
    ) -> RepoResult<u64> {
        let keep: Vec<String> = keep.iter().map(PersonId::to_string).collect();
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|(g, person_id), sponsor| {
            *g != guild_id.into_inner() || !sponsor.is_platform() || keep.contains(person_id)
        });
        Ok((before - rows.len()) as u64)
    }

    async fn delete(&self, guild_id: Snowflake, person: &PersonId) -> RepoResult<bool> {
        Ok(self.rows.lock().unwrap().remove(&key(guild_id, person)).is_some())
    }

    async fn delete_by_guild(&self, guild_id: Snowflake) -> RepoResult<u64> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|(g, _), _| *g != guild_id.into_inner());
        Ok((before - rows.len()) as u64)
    }
}

// ============================================================================
// Binding store
// ============================================================================

#[derive(Default)]
pub struct MemBindingRepository {
    rows: Mutex<HashMap<Key, Binding>>,
}

impl MemBindingRepository {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl BindingRepository for MemBindingRepository {
    async fn find(&self, guild_id: Snowflake, person: &PersonId) -> RepoResult<Option<Binding>> {
        Ok(self.rows.lock().unwrap().get(&key(guild_id, person)).cloned())
    }

    async fn find_by_guild(&self, guild_id: Snowflake) -> RepoResult<Vec<Binding>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.guild_id == guild_id)
            .cloned()
            .collect())
    }

    async fn search_by_name(&self, guild_id: Snowflake, query: &str) -> RepoResult<Vec<Binding>> {
        let needle = query.to_lowercase();
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.guild_id == guild_id)
            .filter(|b| b.current_name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn create(&self, binding: &Binding) -> RepoResult<()> {
        self.rows
            .lock()
            .unwrap()
            .insert(key(binding.guild_id, &binding.person), binding.clone());
        Ok(())
    }

    async fn rename(
        &self,
        guild_id: Snowflake,
        person: &PersonId,
        new_name: &str,
        change: &NameChange,
    ) -> RepoResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .get_mut(&key(guild_id, person))
            .ok_or_else(|| DomainError::BindingNotFound(person.clone()))?;
        row.current_name = new_name.to_string();
        row.updated_at = change.changed_at;
        row.history.insert(0, change.clone());
        Ok(())
    }

    async fn touch(
        &self,
        guild_id: Snowflake,
        person: &PersonId,
        at: DateTime<Utc>,
    ) -> RepoResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .get_mut(&key(guild_id, person))
            .ok_or_else(|| DomainError::BindingNotFound(person.clone()))?;
        row.updated_at = at;
        Ok(())
    }

    async fn history(
        &self,
        guild_id: Snowflake,
        person: &PersonId,
        limit: i64,
    ) -> RepoResult<Vec<NameChange>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(&key(guild_id, person))
            .map(|b| b.history.iter().take(limit as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn delete(&self, guild_id: Snowflake, person: &PersonId) -> RepoResult<Option<Binding>> {
        Ok(self.rows.lock().unwrap().remove(&key(guild_id, person)))
    }

    async fn delete_by_guild(&self, guild_id: Snowflake) -> RepoResult<u64> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|(g, _), _| *g != guild_id.into_inner());
        Ok((before - rows.len()) as u64)
    }
}

// ============================================================================
// External sponsor store
// ============================================================================

#[derive(Default)]
pub struct MemExternalSponsorRepository {
    rows: Mutex<HashMap<Key, ExternalSponsor>>,
}

impl MemExternalSponsorRepository {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn link_taken(
        rows: &HashMap<Key, ExternalSponsor>,
        sponsor: &ExternalSponsor,
    ) -> Option<PersonId> {
        let linked = sponsor.linked_person.as_ref()?;
        rows.values()
            .filter(|other| other.guild_id == sponsor.guild_id)
            .filter(|other| other.vrchat_name != sponsor.vrchat_name)
            .any(|other| other.linked_person.as_ref() == Some(linked))
            .then(|| linked.clone())
    }
}

#[async_trait]
impl ExternalSponsorRepository for MemExternalSponsorRepository {
    async fn find(
        &self,
        guild_id: Snowflake,
        vrchat_name: &str,
    ) -> RepoResult<Option<ExternalSponsor>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(&(guild_id.into_inner(), vrchat_name.to_string()))
            .cloned())
    }

    async fn find_by_guild(&self, guild_id: Snowflake) -> RepoResult<Vec<ExternalSponsor>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.guild_id == guild_id)
            .cloned()
            .collect())
    }

    async fn create(&self, sponsor: &ExternalSponsor) -> RepoResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let k = (sponsor.guild_id.into_inner(), sponsor.vrchat_name.clone());
        if rows.contains_key(&k) {
            return Err(DomainError::DuplicateExternalSponsor(sponsor.vrchat_name.clone()));
        }
        if let Some(person) = Self::link_taken(&rows, sponsor) {
            return Err(DomainError::ExternalLinkTaken(person));
        }
        rows.insert(k, sponsor.clone());
        Ok(())
    }

    async fn update(&self, sponsor: &ExternalSponsor) -> RepoResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let k = (sponsor.guild_id.into_inner(), sponsor.vrchat_name.clone());
        if !rows.contains_key(&k) {
            return Err(DomainError::ExternalSponsorNotFound(sponsor.vrchat_name.clone()));
        }
        if let Some(person) = Self::link_taken(&rows, sponsor) {
            return Err(DomainError::ExternalLinkTaken(person));
        }
        rows.insert(k, sponsor.clone());
        Ok(())
    }

    async fn delete(&self, guild_id: Snowflake, vrchat_name: &str) -> RepoResult<bool> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .remove(&(guild_id.into_inner(), vrchat_name.to_string()))
            .is_some())
    }

    async fn delete_by_guild(&self, guild_id: Snowflake) -> RepoResult<u64> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|(g, _), _| *g != guild_id.into_inner());
        Ok((before - rows.len()) as u64)
    }
}

// ============================================================================
// Fake member directory
// ============================================================================

#[derive(Default)]
pub struct FakeDirectory {
    members: Mutex<HashMap<i64, Vec<DirectoryMember>>>,
    roles: Mutex<HashMap<i64, HashMap<Snowflake, String>>>,
    pub dms: Mutex<Vec<(Snowflake, String)>>,
    pub fail_dms: AtomicBool,
    pub fail_roles: AtomicBool,
}

impl FakeDirectory {
    pub fn put_member(&self, guild_id: Snowflake, member: DirectoryMember) {
        let mut members = self.members.lock().unwrap();
        let list = members.entry(guild_id.into_inner()).or_default();
        list.retain(|m| m.user_id != member.user_id);
        list.push(member);
    }

    pub fn remove_member(&self, guild_id: Snowflake, user_id: Snowflake) {
        if let Some(list) = self.members.lock().unwrap().get_mut(&guild_id.into_inner()) {
            list.retain(|m| m.user_id != user_id);
        }
    }

    pub fn name_role(&self, guild_id: Snowflake, role_id: Snowflake, name: &str) {
        self.roles
            .lock()
            .unwrap()
            .entry(guild_id.into_inner())
            .or_default()
            .insert(role_id, name.to_string());
    }

    pub fn forget_role(&self, guild_id: Snowflake, role_id: Snowflake) {
        if let Some(map) = self.roles.lock().unwrap().get_mut(&guild_id.into_inner()) {
            map.remove(&role_id);
        }
    }

    pub fn dm_count(&self) -> usize {
        self.dms.lock().unwrap().len()
    }
}

#[async_trait]
impl MemberDirectory for FakeDirectory {
    async fn guild_members(&self, guild_id: Snowflake) -> Result<Vec<DirectoryMember>, DomainError> {
        Ok(self
            .members
            .lock()
            .unwrap()
            .get(&guild_id.into_inner())
            .cloned()
            .unwrap_or_default())
    }

    async fn member(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> Result<Option<DirectoryMember>, DomainError> {
        Ok(self
            .members
            .lock()
            .unwrap()
            .get(&guild_id.into_inner())
            .and_then(|list| list.iter().find(|m| m.user_id == user_id).cloned()))
    }

    async fn role_names(
        &self,
        guild_id: Snowflake,
    ) -> Result<HashMap<Snowflake, String>, DomainError> {
        if self.fail_roles.load(Ordering::SeqCst) {
            return Err(DomainError::PlatformUnavailable("role fetch failed".into()));
        }
        Ok(self
            .roles
            .lock()
            .unwrap()
            .get(&guild_id.into_inner())
            .cloned()
            .unwrap_or_default())
    }

    async fn notify(&self, user_id: Snowflake, message: &str) -> Result<(), DomainError> {
        if self.fail_dms.load(Ordering::SeqCst) {
            return Err(DomainError::PlatformUnavailable("dm delivery failed".into()));
        }
        self.dms.lock().unwrap().push((user_id, message.to_string()));
        Ok(())
    }
}

// ============================================================================
// Test world
// ============================================================================

pub struct World {
    pub ctx: ServiceContext,
    pub directory: Arc<FakeDirectory>,
    pub guild_repo: Arc<MemGuildConfigRepository>,
    pub sponsor_repo: Arc<MemSponsorRepository>,
    pub binding_repo: Arc<MemBindingRepository>,
    pub external_repo: Arc<MemExternalSponsorRepository>,
}

/// Build a fully wired in-memory service context. The bind cooldown is zero
/// so tests can re-bind freely; cooldown behavior has its own world.
pub fn world() -> World {
    world_with_cooldown(Duration::ZERO)
}

pub fn world_with_cooldown(cooldown: Duration) -> World {
    let directory = Arc::new(FakeDirectory::default());
    let guild_repo = Arc::new(MemGuildConfigRepository::default());
    let sponsor_repo = Arc::new(MemSponsorRepository::default());
    let binding_repo = Arc::new(MemBindingRepository::default());
    let external_repo = Arc::new(MemExternalSponsorRepository::default());

    let ctx = ServiceContextBuilder::new()
        .guild_repo(guild_repo.clone())
        .sponsor_repo(sponsor_repo.clone())
        .binding_repo(binding_repo.clone())
        .external_repo(external_repo.clone())
        .directory(directory.clone())
        .bind_cooldown(cooldown)
        .build()
        .expect("context must build");

    World {
        ctx,
        directory,
        guild_repo,
        sponsor_repo,
        binding_repo,
        external_repo,
    }
}

/// Register a guild with the given managed roles
pub async fn setup_guild(world: &World, guild_id: i64, managed_roles: &[i64]) {
    let mut config = GuildConfig::new(Snowflake::new(guild_id), Snowflake::new(1));
    config.managed_role_ids = managed_roles.iter().copied().map(Snowflake::new).collect();
    world
        .guild_repo
        .create(&config)
        .await
        .expect("guild config create");
}

/// A plain non-bot member holding the given roles
pub fn member(user_id: i64, display_name: &str, role_ids: &[i64]) -> DirectoryMember {
    DirectoryMember {
        user_id: Snowflake::new(user_id),
        display_name: display_name.to_string(),
        avatar_url: None,
        is_service_account: false,
        is_booster: false,
        role_ids: role_ids.iter().copied().map(Snowflake::new).collect(),
        joined_at: Some(Utc::now()),
    }
}

pub fn platform(user_id: i64) -> PersonId {
    PersonId::Platform(Snowflake::new(user_id))
}

pub fn guild(id: i64) -> Snowflake {
    Snowflake::new(id)
}
