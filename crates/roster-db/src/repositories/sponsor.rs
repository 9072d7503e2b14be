//! PostgreSQL implementation of SponsorRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgPool, Row};
use tracing::instrument;

use roster_core::{
    DomainError, PersonId, RepoResult, Snowflake, SnapshotUpsert, Sponsor, SponsorRepository,
    SyncCounts,
};

use crate::mappers::{sponsor_columns, sponsor_from_model, KIND_PLATFORM};
use crate::models::SponsorModel;

use super::error::{map_db_error, map_unique_violation};

const SPONSOR_COLUMNS: &str = r"guild_id, person_id, kind, role_ids, role_names, is_booster,
    display_name, avatar, notes, added_by, joined_at, updated_at";

/// Wire form of one member's snapshot for the bulk jsonb upsert
#[derive(Serialize)]
struct SnapshotRow<'a> {
    person_id: String,
    role_ids: Vec<i64>,
    is_booster: bool,
    display_name: Option<&'a str>,
    avatar: Option<&'a str>,
    joined_at: DateTime<Utc>,
}

impl<'a> From<&'a SnapshotUpsert> for SnapshotRow<'a> {
    fn from(entry: &'a SnapshotUpsert) -> Self {
        Self {
            person_id: entry.person.to_string(),
            role_ids: entry.snapshot.role_ids.iter().map(|id| id.into_inner()).collect(),
            is_booster: entry.snapshot.is_booster,
            display_name: entry.display_name.as_deref(),
            avatar: entry.avatar.as_deref(),
            joined_at: entry.joined_at,
        }
    }
}

/// PostgreSQL implementation of SponsorRepository
#[derive(Clone)]
pub struct PgSponsorRepository {
    pool: PgPool,
}

impl PgSponsorRepository {
    /// Create a new PgSponsorRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SponsorRepository for PgSponsorRepository {
    #[instrument(skip(self))]
    async fn find(&self, guild_id: Snowflake, person: &PersonId) -> RepoResult<Option<Sponsor>> {
        let result = sqlx::query_as::<_, SponsorModel>(&format!(
            "SELECT {SPONSOR_COLUMNS} FROM sponsors WHERE guild_id = $1 AND person_id = $2"
        ))
        .bind(guild_id.into_inner())
        .bind(person.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(sponsor_from_model).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_guild(&self, guild_id: Snowflake) -> RepoResult<Vec<Sponsor>> {
        let results = sqlx::query_as::<_, SponsorModel>(&format!(
            "SELECT {SPONSOR_COLUMNS} FROM sponsors WHERE guild_id = $1 ORDER BY joined_at"
        ))
        .bind(guild_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(sponsor_from_model).collect()
    }

    #[instrument(skip(self, sponsor))]
    async fn create(&self, sponsor: &Sponsor) -> RepoResult<()> {
        let cols = sponsor_columns(sponsor);

        sqlx::query(
            r"
            INSERT INTO sponsors
                (guild_id, person_id, kind, role_ids, role_names, is_booster,
                 display_name, avatar, notes, added_by, joined_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ",
        )
        .bind(sponsor.guild_id.into_inner())
        .bind(sponsor.person.to_string())
        .bind(cols.kind)
        .bind(&cols.role_ids)
        .bind(cols.role_names)
        .bind(cols.is_booster)
        .bind(&sponsor.display_name)
        .bind(&sponsor.avatar)
        .bind(cols.notes)
        .bind(cols.added_by)
        .bind(sponsor.joined_at)
        .bind(sponsor.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::DuplicateSponsor(sponsor.person.clone())))?;

        Ok(())
    }

    #[instrument(skip(self, sponsor))]
    async fn update(&self, sponsor: &Sponsor) -> RepoResult<()> {
        let cols = sponsor_columns(sponsor);

        let result = sqlx::query(
            r"
            UPDATE sponsors
            SET kind = $3, role_ids = $4, role_names = $5, is_booster = $6,
                display_name = $7, avatar = $8, notes = $9, added_by = $10, updated_at = NOW()
            WHERE guild_id = $1 AND person_id = $2
            ",
        )
        .bind(sponsor.guild_id.into_inner())
        .bind(sponsor.person.to_string())
        .bind(cols.kind)
        .bind(&cols.role_ids)
        .bind(cols.role_names)
        .bind(cols.is_booster)
        .bind(&sponsor.display_name)
        .bind(&sponsor.avatar)
        .bind(cols.notes)
        .bind(cols.added_by)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::SponsorNotFound(sponsor.person.clone()));
        }

        Ok(())
    }

    #[instrument(skip(self, entry))]
    async fn upsert_snapshot(&self, guild_id: Snowflake, entry: &SnapshotUpsert) -> RepoResult<()> {
        let role_ids: Vec<i64> = entry.snapshot.role_ids.iter().map(|id| id.into_inner()).collect();

        sqlx::query(
            r"
            INSERT INTO sponsors
                (guild_id, person_id, kind, role_ids, role_names, is_booster,
                 display_name, avatar, joined_at, updated_at)
            VALUES ($1, $2, 'platform', $3, '{}', $4, $5, $6, $7, NOW())
            ON CONFLICT (guild_id, person_id) DO UPDATE SET
                kind = EXCLUDED.kind,
                role_ids = EXCLUDED.role_ids,
                role_names = EXCLUDED.role_names,
                is_booster = EXCLUDED.is_booster,
                display_name = EXCLUDED.display_name,
                avatar = EXCLUDED.avatar,
                updated_at = NOW()
            ",
        )
        .bind(guild_id.into_inner())
        .bind(entry.person.to_string())
        .bind(&role_ids)
        .bind(entry.snapshot.is_booster)
        .bind(&entry.display_name)
        .bind(&entry.avatar)
        .bind(entry.joined_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    /// One round trip for the whole member set. `RETURNING (xmax = 0)` marks
    /// freshly inserted rows; conflicting rows are only updated (and only
    /// returned) when their state actually differs, which is what makes the
    /// modified count meaningful.
    #[instrument(skip(self, entries), fields(count = entries.len()))]
    async fn upsert_snapshots(
        &self,
        guild_id: Snowflake,
        entries: &[SnapshotUpsert],
    ) -> RepoResult<SyncCounts> {
        if entries.is_empty() {
            return Ok(SyncCounts::default());
        }

        let rows: Vec<SnapshotRow<'_>> = entries.iter().map(SnapshotRow::from).collect();
        let payload = serde_json::to_value(&rows)
            .map_err(|e| DomainError::DatabaseError(format!("snapshot encoding failed: {e}")))?;

        let returned = sqlx::query(
            r"
            INSERT INTO sponsors
                (guild_id, person_id, kind, role_ids, role_names, is_booster,
                 display_name, avatar, joined_at, updated_at)
            SELECT $1,
                   e->>'person_id',
                   'platform',
                   ARRAY(SELECT (jsonb_array_elements_text(e->'role_ids'))::bigint),
                   '{}',
                   (e->>'is_booster')::boolean,
                   e->>'display_name',
                   e->>'avatar',
                   (e->>'joined_at')::timestamptz,
                   NOW()
            FROM jsonb_array_elements($2::jsonb) AS e
            ON CONFLICT (guild_id, person_id) DO UPDATE SET
                kind = EXCLUDED.kind,
                role_ids = EXCLUDED.role_ids,
                role_names = EXCLUDED.role_names,
                is_booster = EXCLUDED.is_booster,
                display_name = EXCLUDED.display_name,
                avatar = EXCLUDED.avatar,
                updated_at = NOW()
            WHERE sponsors.kind IS DISTINCT FROM EXCLUDED.kind
               OR sponsors.role_ids IS DISTINCT FROM EXCLUDED.role_ids
               OR sponsors.is_booster IS DISTINCT FROM EXCLUDED.is_booster
               OR sponsors.display_name IS DISTINCT FROM EXCLUDED.display_name
               OR sponsors.avatar IS DISTINCT FROM EXCLUDED.avatar
            RETURNING (xmax = 0) AS inserted
            ",
        )
        .bind(guild_id.into_inner())
        .bind(payload)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let mut counts = SyncCounts::default();
        for row in returned {
            let inserted: bool = row.try_get("inserted").map_err(map_db_error)?;
            if inserted {
                counts.inserted += 1;
            } else {
                counts.modified += 1;
            }
        }

        Ok(counts)
    }

    #[instrument(skip(self, keep), fields(keep = keep.len()))]
    async fn retire_platform_except(
        &self,
        guild_id: Snowflake,
        keep: &[PersonId],
    ) -> RepoResult<u64> {
        let keep_ids: Vec<String> = keep.iter().map(PersonId::to_string).collect();

        let result = sqlx::query(
            r"
            DELETE FROM sponsors
            WHERE guild_id = $1 AND kind = $2 AND NOT (person_id = ANY($3))
            ",
        )
        .bind(guild_id.into_inner())
        .bind(KIND_PLATFORM)
        .bind(&keep_ids)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete(&self, guild_id: Snowflake, person: &PersonId) -> RepoResult<bool> {
        let result = sqlx::query(r"DELETE FROM sponsors WHERE guild_id = $1 AND person_id = $2")
            .bind(guild_id.into_inner())
            .bind(person.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_by_guild(&self, guild_id: Snowflake) -> RepoResult<u64> {
        let result = sqlx::query(r"DELETE FROM sponsors WHERE guild_id = $1")
            .bind(guild_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
