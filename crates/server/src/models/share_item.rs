//! Share item model: things offered to give away or lend out.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Which side of the sharing board an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareType {
    /// Given away permanently.
    Give,
    /// Lent out for a duration.
    Borrow,
}

impl ShareType {
    /// Database representation.
    pub fn as_str(self) -> &'static str {
        match self {
            ShareType::Give => "GIVE",
            ShareType::Borrow => "BORROW",
        }
    }

    /// Parse the `type` query parameter. Anything other than "give"
    /// (case-insensitive) is the borrow board.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some(p) if p.eq_ignore_ascii_case("give") => ShareType::Give,
            _ => ShareType::Borrow,
        }
    }
}

/// Share item status values.
pub mod item_status {
    pub const ACTIVE: &str = "ACTIVE";
    pub const PENDING: &str = "PENDING";
    pub const REMOVED: &str = "REMOVED";
}

/// Share item record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShareItem {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    pub description: String,
    pub location: Option<String>,

    /// GIVE or BORROW.
    pub share_type: String,

    /// Lending duration, free-form ("2 weeks"). NULL for give-away items.
    pub duration: Option<String>,

    /// Storage key of the main image, if any.
    pub image_key: Option<String>,

    pub claimed: bool,
    pub status: String,
    pub created: i64,
    pub changed: i64,
}

impl ShareItem {
    /// Find a share item by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let item = sqlx::query_as::<_, ShareItem>("SELECT * FROM share_item WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("failed to fetch share item by id")?;

        Ok(item)
    }

    /// Set the moderation status (ACTIVE, PENDING, REMOVED).
    pub async fn set_status(pool: &PgPool, id: Uuid, status: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE share_item SET status = $1, changed = $2 WHERE id = $3")
            .bind(status)
            .bind(chrono::Utc::now().timestamp())
            .bind(id)
            .execute(pool)
            .await
            .context("failed to update share item status")?;

        Ok(result.rows_affected() > 0)
    }

    /// Permanently delete a share item (owner removing their own post).
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM share_item WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete share item")?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn share_type_param_parsing() {
        assert_eq!(ShareType::from_param(Some("give")), ShareType::Give);
        assert_eq!(ShareType::from_param(Some("GIVE")), ShareType::Give);
        assert_eq!(ShareType::from_param(Some("borrow")), ShareType::Borrow);
        assert_eq!(ShareType::from_param(Some("garbage")), ShareType::Borrow);
        assert_eq!(ShareType::from_param(None), ShareType::Borrow);
    }

    #[test]
    fn share_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ShareType::Give).unwrap(),
            "\"give\""
        );
    }
}
