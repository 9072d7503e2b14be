//! Binding service
//!
//! Creates and maintains VRChat name bindings: validation, history semantics,
//! the bind cooldown, the lazy sponsor-record refresh, and the optional
//! notification side-effect.

use chrono::Utc;
use roster_core::{
    Binding, DomainError, PersonId, RoleSnapshot, SnapshotUpsert, Snowflake, VrchatName,
};
use tracing::{info, instrument, warn};

use crate::dto::{BindOutcome, UnbindReport};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// How many history entries command replies show; the store keeps all of them
pub const HISTORY_DISPLAY_CAP: i64 = 10;

/// Binding service
pub struct BindingService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> BindingService<'a> {
    /// Create a new BindingService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Bind a person to a VRChat name.
    ///
    /// Re-binding the same name only refreshes the update timestamp; binding
    /// a different name pushes the old one onto history. The cooldown is
    /// armed only on success, so a rejected name costs nothing.
    #[instrument(skip(self, raw_name))]
    pub async fn bind(
        &self,
        guild_id: Snowflake,
        person: PersonId,
        raw_name: &str,
    ) -> ServiceResult<BindOutcome> {
        let config = self
            .ctx
            .guild_repo()
            .find(guild_id)
            .await?
            .ok_or(DomainError::BindingDisabled)?;

        if !config.binding_enabled() {
            return Err(DomainError::BindingDisabled.into());
        }

        if let Err(seconds_remaining) = self.ctx.cooldowns().check(guild_id, &person) {
            return Err(ServiceError::Cooldown { seconds_remaining });
        }

        let name = VrchatName::parse(raw_name)?;

        // Make sure a sponsor record exists before the binding does; the
        // aggregation joins through it. Enrichment is best-effort: a platform
        // hiccup must not block the bind itself.
        self.refresh_sponsor_record(guild_id, &person).await;

        let mut renamed = false;
        let outcome = match self.ctx.binding_repo().find(guild_id, &person).await? {
            None => {
                let binding = Binding::new(guild_id, person.clone(), name);
                self.ctx.binding_repo().create(&binding).await?;
                info!(%guild_id, %person, name = %binding.current_name, "First-time bind");
                BindOutcome {
                    binding,
                    was_new_binding: true,
                }
            }
            Some(mut binding) => {
                match binding.rebind(name) {
                    Some(change) => {
                        self.ctx
                            .binding_repo()
                            .rename(guild_id, &person, &binding.current_name, &change)
                            .await?;
                        info!(
                            %guild_id, %person,
                            from = %change.previous_name, to = %binding.current_name,
                            "Binding renamed"
                        );
                        renamed = true;
                    }
                    None => {
                        self.ctx
                            .binding_repo()
                            .touch(guild_id, &person, binding.updated_at)
                            .await?;
                    }
                }
                BindOutcome {
                    binding,
                    was_new_binding: false,
                }
            }
        };

        self.ctx.cooldowns().arm(guild_id, &person);
        if outcome.was_new_binding || renamed {
            self.send_bind_notice(&config.notify_user_id, &outcome).await;
        }

        Ok(outcome)
    }

    /// Remove a binding, reporting what was removed. The sponsor record stays
    /// untouched: unbinding detaches the name, it does not remove the person.
    #[instrument(skip(self))]
    pub async fn unbind(
        &self,
        guild_id: Snowflake,
        person: &PersonId,
    ) -> ServiceResult<Option<UnbindReport>> {
        let Some(binding) = self.ctx.binding_repo().delete(guild_id, person).await? else {
            return Ok(None);
        };

        info!(%guild_id, %person, name = %binding.current_name, "Binding removed");

        Ok(Some(UnbindReport {
            bound_days: binding.bound_days(Utc::now()),
            vrchat_name: binding.current_name,
            history: binding.history,
        }))
    }

    /// Current binding with full history, for profile display
    #[instrument(skip(self))]
    pub async fn profile(
        &self,
        guild_id: Snowflake,
        person: &PersonId,
    ) -> ServiceResult<Option<Binding>> {
        let mut binding = self.ctx.binding_repo().find(guild_id, person).await?;
        if let Some(binding) = binding.as_mut() {
            binding.history.truncate(HISTORY_DISPLAY_CAP as usize);
        }
        Ok(binding)
    }

    /// Upsert the platform sponsor record from a live member snapshot.
    /// Failures degrade to a log line; the record will be healed by the next
    /// sync pass.
    async fn refresh_sponsor_record(&self, guild_id: Snowflake, person: &PersonId) {
        let Some(user_id) = person.as_platform() else {
            return;
        };

        let member = match self.ctx.directory().member(guild_id, user_id).await {
            Ok(Some(member)) => member,
            Ok(None) => {
                warn!(%guild_id, %person, "Binding person not found in guild");
                return;
            }
            Err(e) => {
                warn!(%guild_id, %person, error = %e, "Member lookup failed, skipping record refresh");
                return;
            }
        };

        let entry = SnapshotUpsert {
            person: person.clone(),
            snapshot: RoleSnapshot::from_directory(&member, guild_id),
            display_name: Some(member.display_name),
            avatar: member.avatar_url,
            joined_at: member.joined_at.unwrap_or_else(Utc::now),
        };

        if let Err(e) = self.ctx.sponsor_repo().upsert_snapshot(guild_id, &entry).await {
            warn!(%guild_id, %person, error = %e, "Sponsor record refresh failed");
        }
    }

    /// DM the configured notification target about a bind. Best-effort; an
    /// unreachable target is reported at configuration time, not here.
    async fn send_bind_notice(&self, notify_target: &Option<Snowflake>, outcome: &BindOutcome) {
        let Some(target) = notify_target else {
            return;
        };

        // Platform persons render as a mention in the DM
        let who = match outcome.binding.person.as_platform() {
            Some(user_id) => format!("<@{user_id}>"),
            None => outcome.binding.person.to_string(),
        };

        let message = if outcome.was_new_binding {
            format!("{who} linked their VRChat name: {}", outcome.binding.current_name)
        } else if let Some(change) = outcome.binding.history.first() {
            format!(
                "{who} changed their VRChat name: {} → {}",
                change.previous_name, outcome.binding.current_name
            )
        } else {
            return;
        };

        if let Err(e) = self.ctx.directory().notify(*target, &message).await {
            warn!(target = %target, error = %e, "Bind notification delivery failed");
        }
    }
}
