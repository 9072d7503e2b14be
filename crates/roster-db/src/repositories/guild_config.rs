//! PostgreSQL implementation of GuildConfigRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use roster_core::{DomainError, GuildConfig, GuildConfigRepository, RepoResult, Snowflake};

use crate::models::GuildConfigModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of GuildConfigRepository
#[derive(Clone)]
pub struct PgGuildConfigRepository {
    pool: PgPool,
}

impl PgGuildConfigRepository {
    /// Create a new PgGuildConfigRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GuildConfigRepository for PgGuildConfigRepository {
    #[instrument(skip(self))]
    async fn find(&self, guild_id: Snowflake) -> RepoResult<Option<GuildConfig>> {
        let result = sqlx::query_as::<_, GuildConfigModel>(
            r"
            SELECT guild_id, owner_id, api_enabled, managed_role_ids, notify_user_id,
                   joined_at, last_sync_at, last_api_call_at, sync_in_progress
            FROM guild_configs
            WHERE guild_id = $1
            ",
        )
        .bind(guild_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(GuildConfig::from))
    }

    #[instrument(skip(self, config))]
    async fn create(&self, config: &GuildConfig) -> RepoResult<()> {
        let role_ids: Vec<i64> = config.managed_role_ids.iter().map(|id| id.into_inner()).collect();

        sqlx::query(
            r"
            INSERT INTO guild_configs
                (guild_id, owner_id, api_enabled, managed_role_ids, notify_user_id,
                 joined_at, sync_in_progress)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE)
            ",
        )
        .bind(config.guild_id.into_inner())
        .bind(config.owner_id.into_inner())
        .bind(config.api_enabled)
        .bind(&role_ids)
        .bind(config.notify_user_id.map(Snowflake::into_inner))
        .bind(config.joined_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                DomainError::DatabaseError(format!("guild config {} already exists", config.guild_id))
            })
        })?;

        Ok(())
    }

    #[instrument(skip(self, config))]
    async fn update(&self, config: &GuildConfig) -> RepoResult<()> {
        let role_ids: Vec<i64> = config.managed_role_ids.iter().map(|id| id.into_inner()).collect();

        let result = sqlx::query(
            r"
            UPDATE guild_configs
            SET owner_id = $2, api_enabled = $3, managed_role_ids = $4, notify_user_id = $5
            WHERE guild_id = $1
            ",
        )
        .bind(config.guild_id.into_inner())
        .bind(config.owner_id.into_inner())
        .bind(config.api_enabled)
        .bind(&role_ids)
        .bind(config.notify_user_id.map(Snowflake::into_inner))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::GuildNotFound(config.guild_id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, guild_id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query(r"DELETE FROM guild_configs WHERE guild_id = $1")
            .bind(guild_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::GuildNotFound(guild_id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn try_begin_sync(&self, guild_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE guild_configs
            SET sync_in_progress = TRUE
            WHERE guild_id = $1 AND sync_in_progress = FALSE
            ",
        )
        .bind(guild_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        // Either a sync is running or the guild is unknown; tell them apart
        match self.find(guild_id).await? {
            Some(_) => Ok(false),
            None => Err(DomainError::GuildNotFound(guild_id)),
        }
    }

    #[instrument(skip(self))]
    async fn finish_sync(&self, guild_id: Snowflake, at: DateTime<Utc>) -> RepoResult<()> {
        sqlx::query(
            r"
            UPDATE guild_configs
            SET sync_in_progress = FALSE, last_sync_at = $2
            WHERE guild_id = $1
            ",
        )
        .bind(guild_id.into_inner())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn touch_api_call(&self, guild_id: Snowflake) -> RepoResult<()> {
        sqlx::query(
            r"
            UPDATE guild_configs
            SET last_api_call_at = NOW()
            WHERE guild_id = $1
            ",
        )
        .bind(guild_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgGuildConfigRepository>();
    }
}
