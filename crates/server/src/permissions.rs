//! Moderation authorization with DashMap-based role caching.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use dashmap::DashMap;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::role::{self, well_known};
use crate::models::User;

/// Permission service with fast DashMap-based role lookups.
#[derive(Clone)]
pub struct PermissionService {
    inner: Arc<PermissionServiceInner>,
}

struct PermissionServiceInner {
    /// Cache of user_id -> role names.
    role_cache: DashMap<Uuid, HashSet<String>>,

    /// Database pool for cache misses.
    pool: PgPool,
}

impl PermissionService {
    /// Create a new permission service.
    pub fn new(pool: PgPool) -> Self {
        Self {
            inner: Arc::new(PermissionServiceInner {
                role_cache: DashMap::new(),
                pool,
            }),
        }
    }

    /// Check whether a user may moderate listings.
    ///
    /// Admin users always may; otherwise the user must hold the `admin` or
    /// `moderator` role.
    pub async fn can_moderate(&self, user: &User) -> Result<bool> {
        if user.is_admin {
            return Ok(true);
        }

        let roles = self.roles_for(user.id).await?;
        Ok(roles.contains(well_known::ADMIN) || roles.contains(well_known::MODERATOR))
    }

    /// Role names for a user, cached per user id.
    async fn roles_for(&self, user_id: Uuid) -> Result<HashSet<String>> {
        if let Some(cached) = self.inner.role_cache.get(&user_id) {
            return Ok(cached.clone());
        }

        let roles: HashSet<String> = role::names_for_user(&self.inner.pool, user_id)
            .await?
            .into_iter()
            .collect();

        self.inner.role_cache.insert(user_id, roles.clone());

        Ok(roles)
    }
}

impl std::fmt::Debug for PermissionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionService").finish()
    }
}
