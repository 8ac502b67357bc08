//! Community group model.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Community group record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: String,

    /// Meeting cadence, free-form (e.g. "Weekly").
    pub frequency: Option<String>,

    pub meeting_time: Option<String>,
    pub location: Option<String>,
    pub is_online: bool,

    /// Private groups require leader approval; joins start as PENDING.
    pub is_private: bool,

    /// Maximum member count. NULL means unlimited.
    pub capacity: Option<i32>,

    pub category_id: Uuid,

    /// The group leader.
    pub created_by: Uuid,

    pub active: bool,
    pub created: i64,
    pub changed: i64,
}

impl Group {
    /// Find a group by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let group = sqlx::query_as::<_, Group>("SELECT * FROM community_group WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("failed to fetch group by id")?;

        Ok(group)
    }

    /// Count memberships that occupy capacity (APPROVED or ACTIVE).
    pub async fn member_count(pool: &PgPool, id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM group_membership
            WHERE group_id = $1 AND status IN ('APPROVED', 'ACTIVE')
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await
        .context("failed to count group members")?;

        Ok(count)
    }

    /// Soft-delete a group (moderation keeps the row).
    pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result =
            sqlx::query("UPDATE community_group SET active = FALSE, changed = $1 WHERE id = $2")
                .bind(now)
                .bind(id)
                .execute(pool)
                .await
                .context("failed to soft-delete group")?;

        Ok(result.rows_affected() > 0)
    }
}
