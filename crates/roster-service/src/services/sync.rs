//! Sync engine
//!
//! Reconciles live guild role state into the sponsor store: the bulk
//! admin-triggered pass over every managed-role holder, and the single-member
//! reconcile used by the reactive member events.

use chrono::Utc;
use roster_core::{
    DirectoryMember, DomainError, PersonId, RoleSnapshot, SnapshotUpsert, Snowflake,
};
use tracing::{info, instrument};

use crate::dto::SyncReport;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Sync engine
pub struct SyncService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SyncService<'a> {
    /// Create a new SyncService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Bulk-reconcile every managed-role holder into the sponsor store.
    ///
    /// With no managed roles the feature is disabled and sync is a no-op.
    /// The member set is written in a single bulk upsert; platform-linked
    /// records whose person no longer qualifies are retired in the same pass
    /// (their bindings survive, aggregation filters them).
    #[instrument(skip(self))]
    pub async fn sync_managed_members(&self, guild_id: Snowflake) -> ServiceResult<SyncReport> {
        let config = self
            .ctx
            .guild_repo()
            .find(guild_id)
            .await?
            .ok_or(DomainError::GuildNotFound(guild_id))?;

        if !config.binding_enabled() {
            return Ok(SyncReport::default());
        }

        if !self.ctx.guild_repo().try_begin_sync(guild_id).await? {
            return Err(DomainError::SyncAlreadyRunning.into());
        }

        // The in-progress flag must be cleared however the pass ends
        let result = self.run_sync(guild_id, &config.managed_role_ids).await;
        self.ctx.guild_repo().finish_sync(guild_id, Utc::now()).await?;

        let report = result?;
        info!(
            %guild_id,
            upserted = report.upserted,
            modified = report.modified,
            retired = report.retired,
            "Sync finished"
        );

        Ok(report)
    }

    async fn run_sync(
        &self,
        guild_id: Snowflake,
        managed_roles: &[Snowflake],
    ) -> ServiceResult<SyncReport> {
        let members = self.ctx.directory().guild_members(guild_id).await?;

        let mut entries: Vec<SnapshotUpsert> = Vec::new();
        for member in &members {
            if member.is_service_account {
                continue;
            }
            let snapshot = RoleSnapshot::from_directory(member, guild_id);
            if !snapshot.holds_any(managed_roles) {
                continue;
            }
            entries.push(SnapshotUpsert {
                person: PersonId::Platform(member.user_id),
                snapshot,
                display_name: Some(member.display_name.clone()),
                avatar: member.avatar_url.clone(),
                joined_at: member.joined_at.unwrap_or_else(Utc::now),
            });
        }

        let keep: Vec<PersonId> = entries.iter().map(|e| e.person.clone()).collect();
        let counts = self.ctx.sponsor_repo().upsert_snapshots(guild_id, &entries).await?;
        let retired = self.ctx.sponsor_repo().retire_platform_except(guild_id, &keep).await?;

        Ok(SyncReport {
            upserted: counts.inserted,
            modified: counts.modified,
            retired,
        })
    }

    /// Reconcile one member after a reactive event (join or role change).
    /// Holders of a managed role are upserted; platform-linked records of
    /// members who no longer qualify are removed, keeping their binding.
    #[instrument(skip(self, member), fields(user_id = %member.user_id))]
    pub async fn refresh_member(
        &self,
        guild_id: Snowflake,
        member: &DirectoryMember,
    ) -> ServiceResult<()> {
        let Some(config) = self.ctx.guild_repo().find(guild_id).await? else {
            return Ok(());
        };
        if !config.binding_enabled() || member.is_service_account {
            return Ok(());
        }

        let person = PersonId::Platform(member.user_id);
        let snapshot = RoleSnapshot::from_directory(member, guild_id);

        if snapshot.holds_any(&config.managed_role_ids) {
            let entry = SnapshotUpsert {
                person,
                snapshot,
                display_name: Some(member.display_name.clone()),
                avatar: member.avatar_url.clone(),
                joined_at: member.joined_at.unwrap_or_else(Utc::now),
            };
            self.ctx.sponsor_repo().upsert_snapshot(guild_id, &entry).await?;
            return Ok(());
        }

        // Lost the gate: retire the platform record, keep any binding
        if let Some(existing) = self.ctx.sponsor_repo().find(guild_id, &person).await? {
            if existing.is_platform() {
                self.ctx.sponsor_repo().delete(guild_id, &person).await?;
                info!(%guild_id, %person, "Sponsor record retired after role loss");
            }
        }

        Ok(())
    }
}
