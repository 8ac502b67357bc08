//! Role lookups for moderation authorization.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

/// Role names that grant moderation rights.
pub mod well_known {
    pub const ADMIN: &str = "admin";
    pub const MODERATOR: &str = "moderator";
}

/// Names of all roles assigned to a user.
pub async fn names_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<String>> {
    let names: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT r.name
        FROM role r
        JOIN user_role ur ON ur.role_id = r.id
        WHERE ur.user_id = $1
        ORDER BY r.name
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("failed to fetch roles for user")?;

    Ok(names)
}
