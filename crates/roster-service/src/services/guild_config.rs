//! Guild config service
//!
//! Managed-role configuration, the API switch, the notification target (with
//! its delivery check), and the full guild cascade.

use roster_core::{DomainError, GuildConfig, Snowflake};
use tracing::{info, instrument, warn};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Guild config service
pub struct GuildConfigService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> GuildConfigService<'a> {
    /// Create a new GuildConfigService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Fetch a guild's config, erroring when the guild is unknown
    #[instrument(skip(self))]
    pub async fn get(&self, guild_id: Snowflake) -> ServiceResult<GuildConfig> {
        self.ctx
            .guild_repo()
            .find(guild_id)
            .await?
            .ok_or_else(|| DomainError::GuildNotFound(guild_id).into())
    }

    /// Find-or-create a guild's config (bot added to guild, or lazily on the
    /// first operation that needs one)
    #[instrument(skip(self))]
    pub async fn ensure(&self, guild_id: Snowflake, owner_id: Snowflake) -> ServiceResult<GuildConfig> {
        if let Some(config) = self.ctx.guild_repo().find(guild_id).await? {
            return Ok(config);
        }

        let config = GuildConfig::new(guild_id, owner_id);
        self.ctx.guild_repo().create(&config).await?;
        info!(%guild_id, "Guild registered");

        Ok(config)
    }

    /// Add a role to the managed set
    #[instrument(skip(self))]
    pub async fn add_managed_role(
        &self,
        guild_id: Snowflake,
        role_id: Snowflake,
    ) -> ServiceResult<GuildConfig> {
        let mut config = self.get(guild_id).await?;
        if !config.add_managed_role(role_id) {
            return Err(ServiceError::conflict(format!(
                "Role {role_id} is already managed"
            )));
        }
        self.ctx.guild_repo().update(&config).await?;
        info!(%guild_id, %role_id, "Managed role added");
        Ok(config)
    }

    /// Remove a role from the managed set
    #[instrument(skip(self))]
    pub async fn remove_managed_role(
        &self,
        guild_id: Snowflake,
        role_id: Snowflake,
    ) -> ServiceResult<GuildConfig> {
        let mut config = self.get(guild_id).await?;
        if !config.remove_managed_role(role_id) {
            return Err(ServiceError::not_found("Managed role", role_id.to_string()));
        }
        self.ctx.guild_repo().update(&config).await?;
        info!(%guild_id, %role_id, "Managed role removed");
        Ok(config)
    }

    /// Switch the read API on or off for this guild
    #[instrument(skip(self))]
    pub async fn set_api_enabled(
        &self,
        guild_id: Snowflake,
        enabled: bool,
    ) -> ServiceResult<GuildConfig> {
        let mut config = self.get(guild_id).await?;
        config.api_enabled = enabled;
        self.ctx.guild_repo().update(&config).await?;
        info!(%guild_id, enabled, "API access toggled");
        Ok(config)
    }

    /// Set the binding-notification target. A test DM goes out first; if it
    /// cannot be delivered the change is not persisted, since an unreachable
    /// target is actionable misconfiguration rather than a transient fault.
    #[instrument(skip(self))]
    pub async fn set_notify_target(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<GuildConfig> {
        let mut config = self.get(guild_id).await?;

        self.ctx
            .directory()
            .notify(
                user_id,
                "You will now receive binding notifications for this server.",
            )
            .await
            .map_err(|e| {
                warn!(%guild_id, %user_id, error = %e, "Notification target unreachable");
                ServiceError::validation(
                    "Could not DM that person; they need to allow direct messages first",
                )
            })?;

        config.notify_user_id = Some(user_id);
        self.ctx.guild_repo().update(&config).await?;
        info!(%guild_id, %user_id, "Notification target set");

        Ok(config)
    }

    /// Clear the binding-notification target
    #[instrument(skip(self))]
    pub async fn clear_notify_target(&self, guild_id: Snowflake) -> ServiceResult<GuildConfig> {
        let mut config = self.get(guild_id).await?;
        config.notify_user_id = None;
        self.ctx.guild_repo().update(&config).await?;
        Ok(config)
    }

    /// Full cascade when the bot leaves a guild: bindings (and history),
    /// sponsor records, external sponsors, the cached roster, and finally the
    /// config row itself. Leaves no queryable record behind.
    #[instrument(skip(self))]
    pub async fn delete_guild(&self, guild_id: Snowflake) -> ServiceResult<()> {
        let bindings = self.ctx.binding_repo().delete_by_guild(guild_id).await?;
        let sponsors = self.ctx.sponsor_repo().delete_by_guild(guild_id).await?;
        let externals = self.ctx.external_repo().delete_by_guild(guild_id).await?;

        match self.ctx.guild_repo().delete(guild_id).await {
            Ok(()) => {}
            // Already gone (e.g., the bot was never fully registered): fine
            Err(DomainError::GuildNotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        self.ctx.roster_cache().invalidate(guild_id);

        info!(%guild_id, bindings, sponsors, externals, "Guild data removed");

        Ok(())
    }
}
