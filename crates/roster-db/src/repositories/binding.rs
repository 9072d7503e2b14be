//! PostgreSQL implementation of BindingRepository
//!
//! Bindings and their history live in two tables; a rename updates the
//! current row and appends the superseded name in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use roster_core::{
    Binding, BindingRepository, DomainError, NameChange, PersonId, RepoResult, Snowflake,
};

use crate::mappers::binding_from_model;
use crate::models::{BindingModel, NameChangeModel};

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of BindingRepository
#[derive(Clone)]
pub struct PgBindingRepository {
    pool: PgPool,
}

impl PgBindingRepository {
    /// Create a new PgBindingRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_history(
        &self,
        guild_id: i64,
        person_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<NameChangeModel>, DomainError> {
        let query = match limit {
            Some(_) => {
                r"
                SELECT previous_name, changed_at
                FROM binding_history
                WHERE guild_id = $1 AND person_id = $2
                ORDER BY changed_at DESC, id DESC
                LIMIT $3
                "
            }
            None => {
                r"
                SELECT previous_name, changed_at
                FROM binding_history
                WHERE guild_id = $1 AND person_id = $2
                ORDER BY changed_at DESC, id DESC
                "
            }
        };

        let mut q = sqlx::query_as::<_, NameChangeModel>(query)
            .bind(guild_id)
            .bind(person_id);
        if let Some(limit) = limit {
            q = q.bind(limit.clamp(1, 1000));
        }

        q.fetch_all(&self.pool).await.map_err(map_db_error)
    }
}

#[async_trait]
impl BindingRepository for PgBindingRepository {
    #[instrument(skip(self))]
    async fn find(&self, guild_id: Snowflake, person: &PersonId) -> RepoResult<Option<Binding>> {
        let result = sqlx::query_as::<_, BindingModel>(
            r"
            SELECT guild_id, person_id, vrchat_name, first_bound_at, updated_at
            FROM bindings
            WHERE guild_id = $1 AND person_id = $2
            ",
        )
        .bind(guild_id.into_inner())
        .bind(person.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        match result {
            Some(model) => {
                let history = self
                    .load_history(model.guild_id, &model.person_id, None)
                    .await?;
                Ok(Some(binding_from_model(model, history)?))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn find_by_guild(&self, guild_id: Snowflake) -> RepoResult<Vec<Binding>> {
        let results = sqlx::query_as::<_, BindingModel>(
            r"
            SELECT guild_id, person_id, vrchat_name, first_bound_at, updated_at
            FROM bindings
            WHERE guild_id = $1
            ORDER BY first_bound_at
            ",
        )
        .bind(guild_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results
            .into_iter()
            .map(|model| binding_from_model(model, Vec::new()))
            .collect()
    }

    #[instrument(skip(self))]
    async fn search_by_name(&self, guild_id: Snowflake, query: &str) -> RepoResult<Vec<Binding>> {
        let pattern = format!(
            "%{}%",
            query.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
        );

        let results = sqlx::query_as::<_, BindingModel>(
            r"
            SELECT guild_id, person_id, vrchat_name, first_bound_at, updated_at
            FROM bindings
            WHERE guild_id = $1 AND vrchat_name ILIKE $2
            ORDER BY vrchat_name
            ",
        )
        .bind(guild_id.into_inner())
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results
            .into_iter()
            .map(|model| binding_from_model(model, Vec::new()))
            .collect()
    }

    #[instrument(skip(self, binding))]
    async fn create(&self, binding: &Binding) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO bindings (guild_id, person_id, vrchat_name, first_bound_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(binding.guild_id.into_inner())
        .bind(binding.person.to_string())
        .bind(&binding.current_name)
        .bind(binding.first_bound_at)
        .bind(binding.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                DomainError::DatabaseError(format!("binding for {} already exists", binding.person))
            })
        })?;

        Ok(())
    }

    #[instrument(skip(self, change))]
    async fn rename(
        &self,
        guild_id: Snowflake,
        person: &PersonId,
        new_name: &str,
        change: &NameChange,
    ) -> RepoResult<()> {
        let person_id = person.to_string();
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let result = sqlx::query(
            r"
            UPDATE bindings
            SET vrchat_name = $3, updated_at = $4
            WHERE guild_id = $1 AND person_id = $2
            ",
        )
        .bind(guild_id.into_inner())
        .bind(&person_id)
        .bind(new_name)
        .bind(change.changed_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::BindingNotFound(person.clone()));
        }

        sqlx::query(
            r"
            INSERT INTO binding_history (guild_id, person_id, previous_name, changed_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(guild_id.into_inner())
        .bind(&person_id)
        .bind(&change.previous_name)
        .bind(change.changed_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn touch(
        &self,
        guild_id: Snowflake,
        person: &PersonId,
        at: DateTime<Utc>,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE bindings
            SET updated_at = $3
            WHERE guild_id = $1 AND person_id = $2
            ",
        )
        .bind(guild_id.into_inner())
        .bind(person.to_string())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::BindingNotFound(person.clone()));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn history(
        &self,
        guild_id: Snowflake,
        person: &PersonId,
        limit: i64,
    ) -> RepoResult<Vec<NameChange>> {
        let models = self
            .load_history(guild_id.into_inner(), &person.to_string(), Some(limit))
            .await?;

        Ok(models.into_iter().map(NameChange::from).collect())
    }

    #[instrument(skip(self))]
    async fn delete(
        &self,
        guild_id: Snowflake,
        person: &PersonId,
    ) -> RepoResult<Option<Binding>> {
        // Load the full record first so the caller can report on it
        let Some(binding) = self.find(guild_id, person).await? else {
            return Ok(None);
        };

        let person_id = person.to_string();
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(r"DELETE FROM binding_history WHERE guild_id = $1 AND person_id = $2")
            .bind(guild_id.into_inner())
            .bind(&person_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        sqlx::query(r"DELETE FROM bindings WHERE guild_id = $1 AND person_id = $2")
            .bind(guild_id.into_inner())
            .bind(&person_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(Some(binding))
    }

    #[instrument(skip(self))]
    async fn delete_by_guild(&self, guild_id: Snowflake) -> RepoResult<u64> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(r"DELETE FROM binding_history WHERE guild_id = $1")
            .bind(guild_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        let result = sqlx::query(r"DELETE FROM bindings WHERE guild_id = $1")
            .bind(guild_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgBindingRepository>();
    }
}
