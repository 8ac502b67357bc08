//! Board query builder using SeaQuery.
//!
//! Turns a board definition plus the request's resolved category and sort
//! direction into the page SELECT and its matching COUNT. Both queries share
//! the exact same predicate so totals never leak across filters.

use sea_query::{
    Alias, Asterisk, Expr, Order, PostgresQueryBuilder, Query, SelectStatement,
};
use uuid::Uuid;

use super::source::BoardDefinition;
use super::types::SortDirection;

/// Query builder for one board request.
pub struct BoardQueryBuilder<'a> {
    definition: &'a BoardDefinition,
    category_id: Option<Uuid>,
    sort: SortDirection,
}

impl<'a> BoardQueryBuilder<'a> {
    /// Create a new query builder.
    ///
    /// `category_id` is the already-resolved active filter; unknown filter
    /// names must be degraded to `None` by the caller.
    pub fn new(
        definition: &'a BoardDefinition,
        category_id: Option<Uuid>,
        sort: SortDirection,
    ) -> Self {
        Self {
            definition,
            category_id,
            sort,
        }
    }

    /// Build the main SELECT with ordering and pagination.
    ///
    /// Ordering is total: creation time in the requested direction, then id
    /// in the same direction as a tie-break, so a pagination walk never
    /// repeats or skips a row.
    pub fn build(&self, page: u32) -> String {
        let mut query = Query::select();

        for column in &self.definition.columns {
            query.column((
                Alias::new(self.definition.base_table),
                Alias::new(*column),
            ));
        }
        for (expr, alias) in &self.definition.exprs {
            query.expr_as(expr.clone(), Alias::new(*alias));
        }

        self.apply_from_where(&mut query);

        let order = match self.sort {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        };
        query.order_by(
            (
                Alias::new(self.definition.base_table),
                Alias::new("created"),
            ),
            order.clone(),
        );
        query.order_by(
            (Alias::new(self.definition.base_table), Alias::new("id")),
            order,
        );

        let per_page = self.definition.page_size as u64;
        query.limit(per_page);
        query.offset((page.saturating_sub(1) as u64) * per_page);

        query.to_string(PostgresQueryBuilder)
    }

    /// Build the COUNT query over the same predicate.
    pub fn build_count(&self) -> String {
        let mut query = Query::select();

        query.expr(Expr::col(Asterisk).count());
        self.apply_from_where(&mut query);

        query.to_string(PostgresQueryBuilder)
    }

    /// FROM, JOINs, and WHERE shared by page and count queries.
    fn apply_from_where(&self, query: &mut SelectStatement) {
        query.from(Alias::new(self.definition.base_table));

        for join in &self.definition.joins {
            query.join_as(
                sea_query::JoinType::InnerJoin,
                Alias::new(join.table),
                Alias::new(join.alias),
                Expr::col((
                    Alias::new(self.definition.base_table),
                    Alias::new(join.on_local),
                ))
                .equals((Alias::new(join.alias), Alias::new(join.on_foreign))),
            );
        }

        for condition in &self.definition.conditions {
            query.and_where(condition.clone());
        }

        if let Some(category_id) = self.category_id {
            query.and_where(
                Expr::col((
                    Alias::new(self.definition.base_table),
                    Alias::new("category_id"),
                ))
                .eq(category_id),
            );
        }
    }
}
