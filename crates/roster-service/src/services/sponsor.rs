//! Sponsor service
//!
//! Admin-facing management of sponsor records, plus the single person-removal
//! path every caller shares (member leave, admin removal, guild cascade), so
//! the binding cascade cannot diverge between call sites.

use roster_core::{DomainError, PersonId, Snowflake, Sponsor};
use tracing::{info, instrument};

use crate::dto::SearchHit;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Outcome of a person removal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovalReport {
    pub sponsor_removed: bool,
    pub binding_removed: bool,
}

impl RemovalReport {
    /// Did anything get removed at all?
    pub fn any(&self) -> bool {
        self.sponsor_removed || self.binding_removed
    }
}

/// Sponsor service
pub struct SponsorService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SponsorService<'a> {
    /// Create a new SponsorService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Add a manually-entered sponsor. When no person ID is supplied, a
    /// synthetic one is generated; it never collides with platform IDs.
    #[instrument(skip(self, role_names, display_name, notes))]
    pub async fn add_manual(
        &self,
        guild_id: Snowflake,
        person: Option<PersonId>,
        role_names: Vec<String>,
        display_name: Option<String>,
        notes: Option<String>,
        added_by: Snowflake,
    ) -> ServiceResult<Sponsor> {
        let role_names = clean_role_names(role_names)?;
        let person = person.unwrap_or_else(PersonId::new_manual);

        let sponsor = Sponsor::manual(
            guild_id,
            person,
            role_names,
            display_name,
            notes,
            Some(added_by),
        );
        self.ctx.sponsor_repo().create(&sponsor).await?;

        info!(%guild_id, person = %sponsor.person, "Manual sponsor added");

        Ok(sponsor)
    }

    /// Look up one sponsor record
    #[instrument(skip(self))]
    pub async fn get(
        &self,
        guild_id: Snowflake,
        person: &PersonId,
    ) -> ServiceResult<Option<Sponsor>> {
        Ok(self.ctx.sponsor_repo().find(guild_id, person).await?)
    }

    /// Remove a person entirely: sponsor record and binding together. This is
    /// the one cascade path; member-leave, admin removal, and the guild
    /// cascade all come through here.
    #[instrument(skip(self))]
    pub async fn remove_person(
        &self,
        guild_id: Snowflake,
        person: &PersonId,
    ) -> ServiceResult<RemovalReport> {
        let sponsor_removed = self.ctx.sponsor_repo().delete(guild_id, person).await?;
        let binding_removed = self
            .ctx
            .binding_repo()
            .delete(guild_id, person)
            .await?
            .is_some();

        let report = RemovalReport {
            sponsor_removed,
            binding_removed,
        };
        if report.any() {
            info!(%guild_id, %person, ?report, "Person removed");
        }

        Ok(report)
    }

    /// Admin search: case-insensitive substring match over bound VRChat
    /// names, joined with the sponsor record behind each hit
    #[instrument(skip(self))]
    pub async fn search(&self, guild_id: Snowflake, query: &str) -> ServiceResult<Vec<SearchHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DomainError::EmptyName.into());
        }

        let bindings = self.ctx.binding_repo().search_by_name(guild_id, query).await?;

        let mut hits = Vec::with_capacity(bindings.len());
        for binding in bindings {
            let sponsor = self.ctx.sponsor_repo().find(guild_id, &binding.person).await?;
            hits.push(SearchHit { binding, sponsor });
        }

        Ok(hits)
    }
}

/// Trim role names, drop empties, reject an empty result
pub(crate) fn clean_role_names(role_names: Vec<String>) -> Result<Vec<String>, DomainError> {
    let cleaned: Vec<String> = role_names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    if cleaned.is_empty() {
        return Err(DomainError::EmptyRoleList);
    }
    Ok(cleaned)
}
