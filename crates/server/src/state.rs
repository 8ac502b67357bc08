//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::board::BoardService;
use crate::config::Config;
use crate::db;
use crate::permissions::PermissionService;
use crate::services::moderation::ModerationService;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL connection pool.
    db: PgPool,

    /// Application configuration.
    config: Config,

    /// Permission service for moderation checks.
    permissions: PermissionService,

    /// Board query service.
    boards: BoardService,

    /// Moderation audit logging.
    moderation: ModerationService,
}

impl AppState {
    /// Create new application state with database connections.
    pub async fn new(config: Config) -> Result<Self> {
        let db = db::create_pool(&config)
            .await
            .context("failed to create database pool")?;

        db::run_migrations(&db)
            .await
            .context("failed to run migrations")?;

        let permissions = PermissionService::new(db.clone());
        let boards = BoardService::new(db.clone());
        let moderation = ModerationService::new(db.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                db,
                config,
                permissions,
                boards,
                moderation,
            }),
        })
    }

    /// Get the database pool.
    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    /// Get the application configuration.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the permission service.
    pub fn permissions(&self) -> &PermissionService {
        &self.inner.permissions
    }

    /// Get the board query service.
    pub fn boards(&self) -> &BoardService {
        &self.inner.boards
    }

    /// Get the moderation logging service.
    pub fn moderation(&self) -> &ModerationService {
        &self.inner.moderation
    }

    /// Check if PostgreSQL is healthy.
    pub async fn postgres_healthy(&self) -> bool {
        db::check_health(&self.inner.db).await
    }
}
