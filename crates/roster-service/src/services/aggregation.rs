//! Aggregation service
//!
//! Joins bindings, sponsor records, and external sponsors into the
//! role-grouped roster the read API serves. Role IDs translate to names at
//! read time, never at write time: role names drift independently of the IDs
//! stored in sponsor records.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use roster_core::{Snowflake, Sponsor, SponsorKind};
use tracing::{instrument, warn};

use crate::dto::{RosterResponse, SponsorEntry};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Aggregation service
pub struct AggregationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AggregationService<'a> {
    /// Create a new AggregationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// The read-API entry point: guild checks, the per-guild cache, and the
    /// last-API-call stamp around `aggregate`.
    #[instrument(skip(self))]
    pub async fn roster(&self, guild_id: Snowflake) -> ServiceResult<Arc<RosterResponse>> {
        let config = self
            .ctx
            .guild_repo()
            .find(guild_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Guild", guild_id.to_string()))?;

        if !config.api_enabled {
            return Err(ServiceError::forbidden("API access is disabled for this guild"));
        }

        // Best-effort stamp; a failed write must not fail the read
        if let Err(e) = self.ctx.guild_repo().touch_api_call(guild_id).await {
            warn!(%guild_id, error = %e, "Failed to stamp last API call");
        }

        if let Some(cached) = self.ctx.roster_cache().get(guild_id) {
            return Ok(cached);
        }

        let roster = self.aggregate(guild_id).await?;
        Ok(self.ctx.roster_cache().insert(guild_id, roster))
    }

    /// Drop the cached roster so the next read re-aggregates (admin refresh)
    pub fn refresh(&self, guild_id: Snowflake) {
        self.ctx.roster_cache().invalidate(guild_id);
    }

    /// Derive the role-grouped roster from the three stores plus a live
    /// role-name lookup. A sponsor holding N resolvable roles appears in N
    /// groups; a bound person whose roles all fail to resolve contributes
    /// nothing.
    #[instrument(skip(self))]
    pub async fn aggregate(&self, guild_id: Snowflake) -> ServiceResult<RosterResponse> {
        let bindings = self.ctx.binding_repo().find_by_guild(guild_id).await?;
        let externals = self.ctx.external_repo().find_by_guild(guild_id).await?;

        let sponsors: HashMap<String, Sponsor> = self
            .ctx
            .sponsor_repo()
            .find_by_guild(guild_id)
            .await?
            .into_iter()
            .map(|sponsor| (sponsor.person.to_string(), sponsor))
            .collect();

        // Degrade instead of failing: with no name table, platform entries
        // cannot be grouped, but external sponsors still can.
        let role_names = match self.ctx.directory().role_names(guild_id).await {
            Ok(names) => names,
            Err(e) => {
                warn!(%guild_id, error = %e, "Role name lookup failed, serving externals only");
                HashMap::new()
            }
        };

        let now = Utc::now();
        let mut roster = RosterResponse::default();

        for binding in &bindings {
            let Some(sponsor) = sponsors.get(&binding.person.to_string()) else {
                // Binding outlived its sponsor record; nothing to group by
                continue;
            };

            let group_names = resolve_group_names(sponsor, &role_names);
            if group_names.is_empty() {
                continue;
            }

            let entry = SponsorEntry {
                vrchat_name: binding.current_name.clone(),
                display_name: sponsor
                    .display_name
                    .clone()
                    .unwrap_or_else(|| binding.current_name.clone()),
                avatar: sponsor.avatar.clone(),
                is_booster: sponsor.is_booster(),
                joined_at: Some(sponsor.joined_at),
                support_days: (now - sponsor.joined_at).num_days().max(0),
                is_external: false,
            };

            for name in group_names {
                roster.push(&name, entry.clone());
            }
        }

        for external in &externals {
            if external.role_names.is_empty() {
                continue;
            }

            let entry = SponsorEntry {
                vrchat_name: external.vrchat_name.clone(),
                display_name: external
                    .display_name
                    .clone()
                    .unwrap_or_else(|| external.vrchat_name.clone()),
                avatar: None,
                is_booster: false,
                joined_at: None,
                support_days: external.supported_days(now),
                is_external: true,
            };

            for name in &external.role_names {
                roster.push(name, entry.clone());
            }
        }

        Ok(roster)
    }
}

/// The role names a sponsor groups under: translated from IDs for
/// platform-linked records (unresolvable IDs drop out), stored names for
/// manual records.
fn resolve_group_names(
    sponsor: &Sponsor,
    role_names: &HashMap<Snowflake, String>,
) -> Vec<String> {
    match &sponsor.kind {
        SponsorKind::Platform { role_ids, .. } => role_ids
            .iter()
            .filter_map(|id| role_names.get(id).cloned())
            .collect(),
        SponsorKind::Manual { role_names, .. } => role_names.clone(),
    }
}
