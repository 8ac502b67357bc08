//! Prayer request model.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Prayer record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Prayer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub description: String,

    /// Answered prayers stay on the board, visually de-emphasized.
    pub answered: bool,

    pub active: bool,
    pub created: i64,
    pub changed: i64,
}

impl Prayer {
    /// Find a prayer by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let prayer = sqlx::query_as::<_, Prayer>("SELECT * FROM prayer WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("failed to fetch prayer by id")?;

        Ok(prayer)
    }

    /// Mark a prayer as answered.
    pub async fn mark_answered(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("UPDATE prayer SET answered = TRUE, changed = $1 WHERE id = $2")
                .bind(chrono::Utc::now().timestamp())
                .bind(id)
                .execute(pool)
                .await
                .context("failed to mark prayer answered")?;

        Ok(result.rows_affected() > 0)
    }

    /// Soft-delete a prayer.
    pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("UPDATE prayer SET active = FALSE, changed = $1 WHERE id = $2")
            .bind(chrono::Utc::now().timestamp())
            .bind(id)
            .execute(pool)
            .await
            .context("failed to soft-delete prayer")?;

        Ok(result.rows_affected() > 0)
    }
}
