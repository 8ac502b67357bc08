//! Board query execution.
//!
//! Runs one board request end to end: build the filter menu, resolve the
//! requested filter against it, run the count and page queries inside a
//! single transaction, and normalize the rows into a page envelope.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::debug;

use crate::models::Category;

use super::query_builder::BoardQueryBuilder;
use super::source::BoardSource;
use super::types::{BoardPage, BoardParams, CategoryFilter, Viewer};

/// Statement timeout applied to board queries.
const BOARD_STATEMENT_TIMEOUT: &str = "10s";

/// Executes board queries against Postgres.
#[derive(Clone)]
pub struct BoardService {
    pool: PgPool,
}

impl BoardService {
    /// Create a new board service.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run one board request.
    ///
    /// The filter menu always lists every active category of the board's
    /// kind, regardless of which filter is applied. A filter naming an
    /// unknown or inactive category degrades to the unfiltered board.
    pub async fn query(
        &self,
        params: &BoardParams,
        viewer: &Viewer,
        source: &dyn BoardSource,
    ) -> Result<BoardPage> {
        let categories = Category::list_active(&self.pool, source.kind().as_str()).await?;

        let active = params.filter.as_deref().and_then(|name| {
            categories.iter().find(|c| c.name == name)
        });
        let category_id = active.map(|c| c.id);
        let active_filter = active
            .map_or("all", |c| c.name.as_str())
            .to_string();

        let definition = source.definition();
        let builder = BoardQueryBuilder::new(&definition, category_id, params.sort);
        let count_sql = builder.build_count();
        let page_sql = builder.build(params.page);

        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin board transaction")?;

        sqlx::query(&format!(
            "SET LOCAL statement_timeout = '{BOARD_STATEMENT_TIMEOUT}'"
        ))
        .execute(&mut *tx)
        .await
        .context("failed to set statement timeout")?;

        let total: i64 = sqlx::query_scalar(&count_sql)
            .fetch_one(&mut *tx)
            .await
            .context("board count query failed")?;

        let rows: Vec<serde_json::Value> =
            sqlx::query_scalar(&format!("SELECT row_to_json(t) FROM ({page_sql}) t"))
                .fetch_all(&mut *tx)
                .await
                .context("board page query failed")?;

        tx.commit()
            .await
            .context("failed to commit board transaction")?;

        debug!(
            kind = source.kind().as_str(),
            page = params.page,
            total,
            returned = rows.len(),
            "board query executed"
        );

        let items = source.normalize(rows, viewer)?;
        let filters = categories
            .into_iter()
            .map(|c| CategoryFilter {
                id: c.id,
                name: c.name,
            })
            .collect();

        Ok(BoardPage::new(
            items,
            total.max(0) as u64,
            params.page,
            definition.page_size,
            filters,
            active_filter,
        ))
    }
}

impl std::fmt::Debug for BoardService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardService").finish()
    }
}
