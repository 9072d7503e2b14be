//! External sponsor service
//!
//! Sponsors without a platform account, identified by VRChat name. These are
//! curated entirely by admins; sync never touches them.

use roster_core::{ExternalSponsor, PersonId, Snowflake, VrchatName};
use tracing::{info, instrument};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::sponsor::clean_role_names;

/// External sponsor service
pub struct ExternalSponsorService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ExternalSponsorService<'a> {
    /// Create a new ExternalSponsorService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Add an external sponsor under a validated VRChat name
    #[instrument(skip(self, role_names, display_name, notes))]
    pub async fn add(
        &self,
        guild_id: Snowflake,
        raw_name: &str,
        role_names: Vec<String>,
        display_name: Option<String>,
        notes: Option<String>,
        linked_person: Option<PersonId>,
        added_by: Snowflake,
    ) -> ServiceResult<ExternalSponsor> {
        let name = VrchatName::parse(raw_name)?;
        let role_names = clean_role_names(role_names)?;

        let mut sponsor =
            ExternalSponsor::new(guild_id, name.into_inner(), role_names, added_by);
        sponsor.display_name = display_name;
        sponsor.notes = notes;
        sponsor.linked_person = linked_person;

        self.ctx.external_repo().create(&sponsor).await?;

        info!(%guild_id, name = %sponsor.vrchat_name, "External sponsor added");

        Ok(sponsor)
    }

    /// Replace an external sponsor's virtual role set
    #[instrument(skip(self, role_names))]
    pub async fn set_roles(
        &self,
        guild_id: Snowflake,
        raw_name: &str,
        role_names: Vec<String>,
    ) -> ServiceResult<ExternalSponsor> {
        let name = VrchatName::parse(raw_name)?;
        let role_names = clean_role_names(role_names)?;

        let mut sponsor = self
            .ctx
            .external_repo()
            .find(guild_id, name.as_str())
            .await?
            .ok_or_else(|| ServiceError::not_found("External sponsor", name.as_str()))?;

        sponsor.set_role_names(role_names);
        self.ctx.external_repo().update(&sponsor).await?;

        Ok(sponsor)
    }

    /// Remove an external sponsor; returns false when no such record existed
    #[instrument(skip(self))]
    pub async fn remove(&self, guild_id: Snowflake, raw_name: &str) -> ServiceResult<bool> {
        let name = VrchatName::parse(raw_name)?;
        let removed = self.ctx.external_repo().delete(guild_id, name.as_str()).await?;
        if removed {
            info!(%guild_id, name = %name, "External sponsor removed");
        }
        Ok(removed)
    }

    /// All external sponsors of a guild
    #[instrument(skip(self))]
    pub async fn list(&self, guild_id: Snowflake) -> ServiceResult<Vec<ExternalSponsor>> {
        Ok(self.ctx.external_repo().find_by_guild(guild_id).await?)
    }
}
