//! Binding progress calculator
//!
//! How many of the people who currently hold a managed role have bound a
//! name. The total comes from a live member query, not the sponsor store:
//! progress must reflect current membership, not the last sync snapshot.

use std::collections::HashSet;

use roster_core::{DomainError, RoleSnapshot, Snowflake};
use tracing::instrument;

use crate::dto::BindingProgress;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Binding progress calculator
pub struct ProgressService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ProgressService<'a> {
    /// Create a new ProgressService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Fraction of managed-role holders with a binding. Zero qualifying
    /// members yields 0%, never a division error.
    #[instrument(skip(self))]
    pub async fn progress(&self, guild_id: Snowflake) -> ServiceResult<BindingProgress> {
        let config = self
            .ctx
            .guild_repo()
            .find(guild_id)
            .await?
            .ok_or(DomainError::GuildNotFound(guild_id))?;

        if !config.binding_enabled() {
            return Ok(BindingProgress::default());
        }

        let members = self.ctx.directory().guild_members(guild_id).await?;

        let qualifying: HashSet<Snowflake> = members
            .iter()
            .filter(|member| !member.is_service_account)
            .filter(|member| {
                RoleSnapshot::from_directory(member, guild_id)
                    .holds_any(&config.managed_role_ids)
            })
            .map(|member| member.user_id)
            .collect();

        let bindings = self.ctx.binding_repo().find_by_guild(guild_id).await?;
        let bound = bindings
            .iter()
            .filter_map(|binding| binding.person.as_platform())
            .filter(|user_id| qualifying.contains(user_id))
            .count() as u64;

        Ok(BindingProgress::compute(bound, qualifying.len() as u64))
    }
}
