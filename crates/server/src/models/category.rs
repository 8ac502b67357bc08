//! Category model: filter facets for board listings.
//!
//! Each category carries a kind tag restricting it to one listing variant;
//! a listing's category must match the variant's kind.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Category record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,

    /// Display name, also the value of the `filter` query parameter.
    pub name: String,

    /// Listing variant tag: GROUP, SHARE, NEED, or PRAYER.
    pub kind: String,

    pub active: bool,
}

impl Category {
    /// List active categories of one kind, for the board filter menu.
    ///
    /// Independent of any currently applied filter so the menu does not
    /// shrink when a filter is active.
    pub async fn list_active(pool: &PgPool, kind: &str) -> Result<Vec<Self>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, kind, active FROM category WHERE kind = $1 AND active ORDER BY name",
        )
        .bind(kind)
        .fetch_all(pool)
        .await
        .context("failed to list categories")?;

        Ok(categories)
    }
}
