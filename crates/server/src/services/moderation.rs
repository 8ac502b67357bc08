//! Moderation audit logging.
//!
//! Every privileged mutation (moderator delete, pending/removed flags) is
//! appended to the moderation_log table before the mutation runs.

use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

/// Fallback reason recorded when a moderator supplies none.
pub const DEFAULT_REASON: &str = "Moderation action";

/// Resolve the reason to record, falling back when the form sent nothing
/// or only whitespace.
fn effective_reason(reason: Option<&str>) -> &str {
    match reason {
        Some(r) if !r.trim().is_empty() => r,
        _ => DEFAULT_REASON,
    }
}

/// Moderation log record.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ModerationEntry {
    pub id: Uuid,
    pub moderator_id: Uuid,
    pub item_kind: String,
    pub item_id: Uuid,
    pub action: String,
    pub reason: String,
    pub created: i64,
}

/// Moderation logging service.
#[derive(Clone)]
pub struct ModerationService {
    pool: PgPool,
}

impl ModerationService {
    /// Create a new moderation service.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a moderation log entry.
    pub async fn log(
        &self,
        moderator_id: Uuid,
        item_kind: &str,
        item_id: Uuid,
        action: &str,
        reason: Option<&str>,
    ) -> Result<ModerationEntry> {
        let reason = effective_reason(reason);

        let entry = sqlx::query_as::<_, ModerationEntry>(
            r#"
            INSERT INTO moderation_log (id, moderator_id, item_kind, item_id, action, reason, created)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(moderator_id)
        .bind(item_kind)
        .bind(item_id)
        .bind(action)
        .bind(reason)
        .bind(chrono::Utc::now().timestamp())
        .fetch_one(&self.pool)
        .await
        .context("failed to write moderation log")?;

        debug!(
            action = %action,
            item_kind = %item_kind,
            item_id = %item_id,
            "moderation log entry created"
        );

        Ok(entry)
    }
}

impl std::fmt::Debug for ModerationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModerationService").finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_reason_gets_the_default() {
        assert_eq!(effective_reason(None), DEFAULT_REASON);
    }

    #[test]
    fn blank_reason_gets_the_default() {
        assert_eq!(effective_reason(Some("")), DEFAULT_REASON);
        assert_eq!(effective_reason(Some("   ")), DEFAULT_REASON);
        assert_eq!(effective_reason(Some("\t\n")), DEFAULT_REASON);
    }

    #[test]
    fn supplied_reason_is_kept() {
        assert_eq!(effective_reason(Some("spam")), "spam");
        assert_eq!(effective_reason(Some("  posted twice  ")), "  posted twice  ");
    }
}
