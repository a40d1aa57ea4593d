use async_trait::async_trait;
use huddle_application::GroupRepository;
use huddle_core::{ActorId, AppError, AppResult};
use huddle_domain::{Group, GroupId};
use serde_json::json;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

/// PostgreSQL-backed group store keeping each aggregate as one JSONB document.
///
/// Saves overwrite the document without a version check, so concurrent
/// writers to one group are last-write-wins.
#[derive(Clone)]
pub struct PostgresGroupRepository {
    pool: PgPool,
}

impl PostgresGroupRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn decode_group(row: &sqlx::postgres::PgRow) -> AppResult<Group> {
    row.try_get::<Json<Group>, _>("document")
        .map(|document| document.0)
        .map_err(|error| AppError::Internal(format!("failed to decode group document: {error}")))
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn create_group(&self, group: Group) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO groups (id, owner_user_id, document)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(group.id().as_uuid())
        .bind(group.owner_user_id().as_str())
        .bind(Json(&group))
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create group: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::Validation(format!(
                "group '{}' already exists",
                group.id()
            )));
        }

        Ok(())
    }

    async fn find_group(&self, group_id: GroupId) -> AppResult<Option<Group>> {
        let row = sqlx::query(
            r#"
            SELECT document
            FROM groups
            WHERE id = $1
            "#,
        )
        .bind(group_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load group '{group_id}': {error}")))?;

        row.as_ref().map(decode_group).transpose()
    }

    async fn save_group(&self, group: Group) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE groups
            SET owner_user_id = $2,
                document = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(group.id().as_uuid())
        .bind(group.owner_user_id().as_str())
        .bind(Json(&group))
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to save group '{}': {error}", group.id()))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "group '{}' not found",
                group.id()
            )));
        }

        Ok(())
    }

    async fn delete_group(&self, group_id: GroupId) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM groups
            WHERE id = $1
            "#,
        )
        .bind(group_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to delete group '{group_id}': {error}"))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("group '{group_id}' not found")));
        }

        Ok(())
    }

    async fn list_groups_for_member(&self, user_id: &ActorId) -> AppResult<Vec<Group>> {
        let rows = sqlx::query(
            r#"
            SELECT document
            FROM groups
            WHERE document -> 'members' @> $1
            ORDER BY document ->> 'name', id
            "#,
        )
        .bind(Json(json!([{ "user_id": user_id.as_str() }])))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list groups for '{user_id}': {error}"))
        })?;

        rows.iter().map(decode_group).collect()
    }
}

#[cfg(test)]
mod tests;
