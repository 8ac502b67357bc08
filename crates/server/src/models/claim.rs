//! Share item claims.
//!
//! Claiming races are settled at the storage layer: the item's `claimed`
//! flag is flipped by a conditional update inside the same transaction
//! that inserts the claim row, so concurrent claimants get exactly one
//! winner and the flag never disagrees with the claim table.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Conditional update gating claim acquisition. The `claimed = FALSE`
/// predicate admits exactly one winner per item.
const ACQUIRE_ITEM_SQL: &str =
    "UPDATE share_item SET claimed = TRUE, changed = $1 WHERE id = $2 AND claimed = FALSE";

/// Share claim record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Claim {
    pub id: Uuid,
    pub item_id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub created: i64,
}

/// Result of an atomic claim attempt.
#[derive(Debug)]
pub enum ClaimOutcome {
    /// The item was unclaimed and now belongs to this user.
    Claimed(Claim),
    /// The item's claimed flag was already set when the update ran.
    AlreadyClaimed,
}

impl Claim {
    /// Find the claim linking a user to an item.
    pub async fn find(pool: &PgPool, user_id: Uuid, item_id: Uuid) -> Result<Option<Self>> {
        let claim = sqlx::query_as::<_, Claim>(
            "SELECT * FROM share_claim WHERE user_id = $1 AND item_id = $2",
        )
        .bind(user_id)
        .bind(item_id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch claim")?;

        Ok(claim)
    }

    /// Atomically claim an item for a user.
    ///
    /// The conditional flag update and the claim insert share one
    /// transaction: either the item flips to claimed and a claim row
    /// exists, or nothing changes.
    pub async fn acquire(pool: &PgPool, user_id: Uuid, item_id: Uuid) -> Result<ClaimOutcome> {
        let now = chrono::Utc::now().timestamp();

        let mut tx = pool
            .begin()
            .await
            .context("failed to begin claim transaction")?;

        let updated = sqlx::query(ACQUIRE_ITEM_SQL)
            .bind(now)
            .bind(item_id)
            .execute(&mut *tx)
            .await
            .context("failed to flag item claimed")?;

        if updated.rows_affected() == 0 {
            return Ok(ClaimOutcome::AlreadyClaimed);
        }

        let claim = sqlx::query_as::<_, Claim>(
            r#"
            INSERT INTO share_claim (id, item_id, user_id, status, created)
            VALUES ($1, $2, $3, 'APPROVED', $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(item_id)
        .bind(user_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .context("failed to create claim")?;

        tx.commit().await.context("failed to commit claim")?;

        Ok(ClaimOutcome::Claimed(claim))
    }

    /// Atomically release a user's claim on an item.
    ///
    /// Returns false, leaving the item untouched, when the user holds no
    /// claim.
    pub async fn release(pool: &PgPool, user_id: Uuid, item_id: Uuid) -> Result<bool> {
        let mut tx = pool
            .begin()
            .await
            .context("failed to begin unclaim transaction")?;

        let deleted = sqlx::query("DELETE FROM share_claim WHERE user_id = $1 AND item_id = $2")
            .bind(user_id)
            .bind(item_id)
            .execute(&mut *tx)
            .await
            .context("failed to delete claim")?;

        if deleted.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE share_item SET claimed = FALSE, changed = $1 WHERE id = $2")
            .bind(chrono::Utc::now().timestamp())
            .bind(item_id)
            .execute(&mut *tx)
            .await
            .context("failed to clear claimed flag")?;

        tx.commit().await.context("failed to commit unclaim")?;

        Ok(true)
    }
}
