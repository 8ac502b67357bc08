//! Need model: requests for help posted by community members.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Need status values.
pub mod need_status {
    pub const ACTIVE: &str = "ACTIVE";
    pub const REMOVED: &str = "REMOVED";
}

/// Need record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Need {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub description: String,

    /// Note recorded when the need is fulfilled.
    pub response: Option<String>,

    pub fulfilled: bool,
    pub status: String,
    pub created: i64,
    pub changed: i64,
}

impl Need {
    /// Find a need by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let need = sqlx::query_as::<_, Need>("SELECT * FROM need WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("failed to fetch need by id")?;

        Ok(need)
    }

    /// Mark a need fulfilled, optionally recording how it was met.
    pub async fn fulfill(pool: &PgPool, id: Uuid, response: Option<&str>) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE need SET fulfilled = TRUE, response = $1, changed = $2 WHERE id = $3",
        )
        .bind(response)
        .bind(chrono::Utc::now().timestamp())
        .bind(id)
        .execute(pool)
        .await
        .context("failed to fulfill need")?;

        Ok(result.rows_affected() > 0)
    }

    /// Soft-delete a need.
    pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("UPDATE need SET status = 'REMOVED', changed = $1 WHERE id = $2")
                .bind(chrono::Utc::now().timestamp())
                .bind(id)
                .execute(pool)
                .await
                .context("failed to soft-delete need")?;

        Ok(result.rows_affected() > 0)
    }
}
