//! Group membership model.
//!
//! The (user_id, group_id) unique constraint is the guard against duplicate
//! concurrent joins; insert races surface as [`InsertOutcome::Duplicate`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Membership role values.
pub mod role {
    pub const LEADER: &str = "LEADER";
    pub const MEMBER: &str = "MEMBER";
}

/// Membership status values.
pub mod status {
    pub const PENDING: &str = "PENDING";
    pub const APPROVED: &str = "APPROVED";
    pub const ACTIVE: &str = "ACTIVE";
}

/// Group membership record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub status: String,
    pub created: i64,
}

/// Result of a constraint-checked insert.
#[derive(Debug)]
pub enum InsertOutcome {
    /// The row was created.
    Created(Membership),
    /// A row for this (user, group) already existed.
    Duplicate,
}

/// Postgres reports unique-constraint violations as SQLSTATE 23505.
fn is_unique_violation(code: Option<&str>) -> bool {
    code == Some("23505")
}

impl Membership {
    /// Whether this membership counts as joined (APPROVED or ACTIVE).
    pub fn is_joined(&self) -> bool {
        self.status == status::APPROVED || self.status == status::ACTIVE
    }

    /// Whether this membership is awaiting leader approval.
    pub fn is_pending(&self) -> bool {
        self.status == status::PENDING
    }

    /// Whether this member leads the group.
    pub fn is_leader(&self) -> bool {
        self.role == role::LEADER && self.is_joined()
    }

    /// Find the membership linking a user to a group.
    pub async fn find(pool: &PgPool, user_id: Uuid, group_id: Uuid) -> Result<Option<Self>> {
        let membership = sqlx::query_as::<_, Membership>(
            "SELECT * FROM group_membership WHERE user_id = $1 AND group_id = $2",
        )
        .bind(user_id)
        .bind(group_id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch membership")?;

        Ok(membership)
    }

    /// Fetch one user's memberships across a set of groups.
    ///
    /// Used to annotate a board page with the viewer's relationship to each
    /// listed group in a single query.
    pub async fn list_for_user_in(
        pool: &PgPool,
        user_id: Uuid,
        group_ids: &[Uuid],
    ) -> Result<Vec<Self>> {
        let memberships = sqlx::query_as::<_, Membership>(
            "SELECT * FROM group_membership WHERE user_id = $1 AND group_id = ANY($2)",
        )
        .bind(user_id)
        .bind(group_ids)
        .fetch_all(pool)
        .await
        .context("failed to fetch memberships for user")?;

        Ok(memberships)
    }

    /// Create a membership.
    ///
    /// A unique-constraint violation (a concurrent join won the race) is
    /// reported as [`InsertOutcome::Duplicate`], not as an error.
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        group_id: Uuid,
        role: &str,
        status: &str,
    ) -> Result<InsertOutcome> {
        let result = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO group_membership (id, group_id, user_id, role, status, created)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(group_id)
        .bind(user_id)
        .bind(role)
        .bind(status)
        .bind(chrono::Utc::now().timestamp())
        .fetch_one(pool)
        .await;

        match result {
            Ok(membership) => Ok(InsertOutcome::Created(membership)),
            Err(sqlx::Error::Database(db)) if is_unique_violation(db.code().as_deref()) => {
                Ok(InsertOutcome::Duplicate)
            }
            Err(e) => Err(e).context("failed to create membership"),
        }
    }

    /// Delete the membership linking a user to a group.
    pub async fn delete(pool: &PgPool, user_id: Uuid, group_id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM group_membership WHERE user_id = $1 AND group_id = $2")
                .bind(user_id)
                .bind(group_id)
                .execute(pool)
                .await
                .context("failed to delete membership")?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn membership(role: &str, status: &str) -> Membership {
        Membership {
            id: Uuid::nil(),
            group_id: Uuid::nil(),
            user_id: Uuid::nil(),
            role: role.to_string(),
            status: status.to_string(),
            created: 0,
        }
    }

    #[test]
    fn joined_statuses() {
        assert!(membership(role::MEMBER, status::APPROVED).is_joined());
        assert!(membership(role::MEMBER, status::ACTIVE).is_joined());
        assert!(!membership(role::MEMBER, status::PENDING).is_joined());
    }

    #[test]
    fn leader_requires_joined_status() {
        assert!(membership(role::LEADER, status::ACTIVE).is_leader());
        assert!(!membership(role::LEADER, status::PENDING).is_leader());
        assert!(!membership(role::MEMBER, status::ACTIVE).is_leader());
    }

    // Only the duplicate-key SQLSTATE maps to a duplicate; foreign-key
    // violations and missing codes stay errors.
    #[test]
    fn duplicate_detection_matches_only_unique_violations() {
        assert!(is_unique_violation(Some("23505")));
        assert!(!is_unique_violation(Some("23503")));
        assert!(!is_unique_violation(None));
    }
}
