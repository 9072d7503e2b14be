//! PostgreSQL implementation of ExternalSponsorRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use roster_core::{
    DomainError, ExternalSponsor, ExternalSponsorRepository, PersonId, RepoResult, Snowflake,
};

use crate::mappers::external_from_model;
use crate::models::ExternalSponsorModel;

use super::error::{map_constraint_violation, map_db_error};

const EXTERNAL_COLUMNS: &str = r"guild_id, vrchat_name, linked_person_id, role_names,
    display_name, added_by, added_at, updated_at, notes";

/// Unique index guarding one external sponsor per linked platform account
const LINKED_PERSON_IDX: &str = "external_sponsors_linked_person_idx";

/// PostgreSQL implementation of ExternalSponsorRepository
#[derive(Clone)]
pub struct PgExternalSponsorRepository {
    pool: PgPool,
}

impl PgExternalSponsorRepository {
    /// Create a new PgExternalSponsorRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn conflict_for(sponsor: &ExternalSponsor) -> impl FnOnce(&str) -> DomainError + '_ {
    move |constraint: &str| match (&sponsor.linked_person, constraint) {
        (Some(person), LINKED_PERSON_IDX) => DomainError::ExternalLinkTaken(person.clone()),
        _ => DomainError::DuplicateExternalSponsor(sponsor.vrchat_name.clone()),
    }
}

#[async_trait]
impl ExternalSponsorRepository for PgExternalSponsorRepository {
    #[instrument(skip(self))]
    async fn find(
        &self,
        guild_id: Snowflake,
        vrchat_name: &str,
    ) -> RepoResult<Option<ExternalSponsor>> {
        let result = sqlx::query_as::<_, ExternalSponsorModel>(&format!(
            "SELECT {EXTERNAL_COLUMNS} FROM external_sponsors WHERE guild_id = $1 AND vrchat_name = $2"
        ))
        .bind(guild_id.into_inner())
        .bind(vrchat_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(external_from_model).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_guild(&self, guild_id: Snowflake) -> RepoResult<Vec<ExternalSponsor>> {
        let results = sqlx::query_as::<_, ExternalSponsorModel>(&format!(
            "SELECT {EXTERNAL_COLUMNS} FROM external_sponsors WHERE guild_id = $1 ORDER BY vrchat_name"
        ))
        .bind(guild_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(external_from_model).collect()
    }

    #[instrument(skip(self, sponsor))]
    async fn create(&self, sponsor: &ExternalSponsor) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO external_sponsors
                (guild_id, vrchat_name, linked_person_id, role_names, display_name,
                 added_by, added_at, updated_at, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(sponsor.guild_id.into_inner())
        .bind(&sponsor.vrchat_name)
        .bind(sponsor.linked_person.as_ref().map(PersonId::to_string))
        .bind(&sponsor.role_names)
        .bind(&sponsor.display_name)
        .bind(sponsor.added_by.into_inner())
        .bind(sponsor.added_at)
        .bind(sponsor.updated_at)
        .bind(&sponsor.notes)
        .execute(&self.pool)
        .await
        .map_err(|e| map_constraint_violation(e, conflict_for(sponsor)))?;

        Ok(())
    }

    #[instrument(skip(self, sponsor))]
    async fn update(&self, sponsor: &ExternalSponsor) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE external_sponsors
            SET linked_person_id = $3, role_names = $4, display_name = $5,
                notes = $6, updated_at = NOW()
            WHERE guild_id = $1 AND vrchat_name = $2
            ",
        )
        .bind(sponsor.guild_id.into_inner())
        .bind(&sponsor.vrchat_name)
        .bind(sponsor.linked_person.as_ref().map(PersonId::to_string))
        .bind(&sponsor.role_names)
        .bind(&sponsor.display_name)
        .bind(&sponsor.notes)
        .execute(&self.pool)
        .await
        .map_err(|e| map_constraint_violation(e, conflict_for(sponsor)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ExternalSponsorNotFound(
                sponsor.vrchat_name.clone(),
            ));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, guild_id: Snowflake, vrchat_name: &str) -> RepoResult<bool> {
        let result = sqlx::query(
            r"DELETE FROM external_sponsors WHERE guild_id = $1 AND vrchat_name = $2",
        )
        .bind(guild_id.into_inner())
        .bind(vrchat_name)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_by_guild(&self, guild_id: Snowflake) -> RepoResult<u64> {
        let result = sqlx::query(r"DELETE FROM external_sponsors WHERE guild_id = $1")
            .bind(guild_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
