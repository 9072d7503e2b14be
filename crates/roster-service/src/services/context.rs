//! Service context - dependency container for services
//!
//! Holds the repositories, the member directory, and the process-local
//! caches. Built once at startup and shared by the command handlers and the
//! HTTP state.

use std::sync::Arc;
use std::time::Duration;

use roster_core::{
    BindingRepository, ExternalSponsorRepository, GuildConfigRepository, MemberDirectory,
    SponsorRepository,
};

use crate::cache::{CooldownGate, RosterCache};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    guild_repo: Arc<dyn GuildConfigRepository>,
    sponsor_repo: Arc<dyn SponsorRepository>,
    binding_repo: Arc<dyn BindingRepository>,
    external_repo: Arc<dyn ExternalSponsorRepository>,
    directory: Arc<dyn MemberDirectory>,
    roster_cache: RosterCache,
    cooldowns: CooldownGate,
}

impl ServiceContext {
    /// Get the guild config repository
    pub fn guild_repo(&self) -> &dyn GuildConfigRepository {
        self.guild_repo.as_ref()
    }

    /// Get the sponsor repository
    pub fn sponsor_repo(&self) -> &dyn SponsorRepository {
        self.sponsor_repo.as_ref()
    }

    /// Get the binding repository
    pub fn binding_repo(&self) -> &dyn BindingRepository {
        self.binding_repo.as_ref()
    }

    /// Get the external sponsor repository
    pub fn external_repo(&self) -> &dyn ExternalSponsorRepository {
        self.external_repo.as_ref()
    }

    /// Get the live member directory
    pub fn directory(&self) -> &dyn MemberDirectory {
        self.directory.as_ref()
    }

    /// Get the roster response cache
    pub fn roster_cache(&self) -> &RosterCache {
        &self.roster_cache
    }

    /// Get the bind cooldown gate
    pub fn cooldowns(&self) -> &CooldownGate {
        &self.cooldowns
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("directory", &"MemberDirectory")
            .finish()
    }
}

/// Builder for creating a ServiceContext
pub struct ServiceContextBuilder {
    guild_repo: Option<Arc<dyn GuildConfigRepository>>,
    sponsor_repo: Option<Arc<dyn SponsorRepository>>,
    binding_repo: Option<Arc<dyn BindingRepository>>,
    external_repo: Option<Arc<dyn ExternalSponsorRepository>>,
    directory: Option<Arc<dyn MemberDirectory>>,
    roster_ttl: Duration,
    bind_cooldown: Duration,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            guild_repo: None,
            sponsor_repo: None,
            binding_repo: None,
            external_repo: None,
            directory: None,
            roster_ttl: Duration::from_secs(60),
            bind_cooldown: Duration::from_secs(30),
        }
    }

    pub fn guild_repo(mut self, repo: Arc<dyn GuildConfigRepository>) -> Self {
        self.guild_repo = Some(repo);
        self
    }

    pub fn sponsor_repo(mut self, repo: Arc<dyn SponsorRepository>) -> Self {
        self.sponsor_repo = Some(repo);
        self
    }

    pub fn binding_repo(mut self, repo: Arc<dyn BindingRepository>) -> Self {
        self.binding_repo = Some(repo);
        self
    }

    pub fn external_repo(mut self, repo: Arc<dyn ExternalSponsorRepository>) -> Self {
        self.external_repo = Some(repo);
        self
    }

    pub fn directory(mut self, directory: Arc<dyn MemberDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn roster_ttl(mut self, ttl: Duration) -> Self {
        self.roster_ttl = ttl;
        self
    }

    pub fn bind_cooldown(mut self, ttl: Duration) -> Self {
        self.bind_cooldown = ttl;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            guild_repo: self
                .guild_repo
                .ok_or_else(|| ServiceError::validation("guild_repo is required"))?,
            sponsor_repo: self
                .sponsor_repo
                .ok_or_else(|| ServiceError::validation("sponsor_repo is required"))?,
            binding_repo: self
                .binding_repo
                .ok_or_else(|| ServiceError::validation("binding_repo is required"))?,
            external_repo: self
                .external_repo
                .ok_or_else(|| ServiceError::validation("external_repo is required"))?,
            directory: self
                .directory
                .ok_or_else(|| ServiceError::validation("directory is required"))?,
            roster_cache: RosterCache::new(self.roster_ttl),
            cooldowns: CooldownGate::new(self.bind_cooldown),
        })
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
