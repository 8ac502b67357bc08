//! Board sources.
//!
//! Each listing variant plugs into the board pipeline through a
//! [`BoardSource`]: it declares the SQL shape of its board (base table,
//! joins, visibility predicate, projected columns) and knows how to
//! normalize raw rows into display cards.

use anyhow::{Context, Result};
use sea_query::{Alias, Expr, SimpleExpr};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::membership;
use crate::models::need::need_status;
use crate::models::share_item::item_status;
use crate::models::ShareType;

use super::types::{
    AuthorInfo, BoardKind, ListingCard, ListingDetails, Viewer, DEFAULT_PAGE_SIZE,
};

/// An inner join declared by a board definition.
#[derive(Debug, Clone)]
pub struct BoardJoin {
    pub table: &'static str,
    pub alias: &'static str,
    /// Column on the base table.
    pub on_local: &'static str,
    /// Column on the joined table.
    pub on_foreign: &'static str,
}

/// The SQL shape of one board.
pub struct BoardDefinition {
    pub kind: BoardKind,
    pub base_table: &'static str,

    /// Plain columns selected off the base table.
    pub columns: Vec<&'static str>,

    /// Computed expressions with their output aliases.
    pub exprs: Vec<(SimpleExpr, &'static str)>,

    pub joins: Vec<BoardJoin>,

    /// Visibility predicate, ANDed together.
    pub conditions: Vec<SimpleExpr>,

    pub page_size: u32,
}

/// One listing variant's contribution to the board pipeline.
pub trait BoardSource: Send + Sync {
    fn kind(&self) -> BoardKind;

    /// The SQL shape of this board.
    fn definition(&self) -> BoardDefinition;

    /// Turn raw JSON rows into display cards for this viewer.
    fn normalize(&self, rows: Vec<serde_json::Value>, viewer: &Viewer) -> Result<Vec<ListingCard>>;
}

fn base_col(table: &'static str, column: &'static str) -> Expr {
    Expr::col((Alias::new(table), Alias::new(column)))
}

/// Joins shared by every board: the author and the category.
fn standard_joins(author_fk: &'static str) -> Vec<BoardJoin> {
    vec![
        BoardJoin {
            table: "users",
            alias: "u",
            on_local: author_fk,
            on_foreign: "id",
        },
        BoardJoin {
            table: "category",
            alias: "c",
            on_local: "category_id",
            on_foreign: "id",
        },
    ]
}

/// Author and category projections shared by every board.
fn standard_exprs() -> Vec<(SimpleExpr, &'static str)> {
    vec![
        (base_col("u", "id").into(), "author_id"),
        (base_col("u", "name").into(), "author_name"),
        (base_col("u", "username").into(), "author_username"),
        (base_col("u", "avatar_key").into(), "author_avatar"),
        (base_col("c", "name").into(), "category"),
    ]
}

/// Category predicate shared by every board: the joined category must carry
/// this board's kind and still be active.
fn category_conditions(kind: BoardKind) -> Vec<SimpleExpr> {
    vec![
        base_col("c", "kind").eq(kind.as_str()),
        base_col("c", "active").eq(true),
    ]
}

/// Author fields as they come off a board row.
#[derive(Debug, Deserialize)]
struct AuthorRow {
    author_id: Uuid,
    author_name: String,
    author_username: String,
    author_avatar: Option<String>,
}

impl From<AuthorRow> for AuthorInfo {
    fn from(row: AuthorRow) -> Self {
        Self {
            id: row.author_id,
            name: row.author_name,
            username: row.author_username,
            avatar_key: row.author_avatar,
        }
    }
}

/// The community groups board.
pub struct GroupBoard;

#[derive(Debug, Deserialize)]
struct GroupRow {
    id: Uuid,
    name: String,
    description: String,
    frequency: Option<String>,
    meeting_time: Option<String>,
    location: Option<String>,
    is_online: bool,
    is_private: bool,
    capacity: Option<i32>,
    created: i64,
    category: String,
    member_count: i64,
    #[serde(flatten)]
    author: AuthorRow,
}

impl BoardSource for GroupBoard {
    fn kind(&self) -> BoardKind {
        BoardKind::Group
    }

    fn definition(&self) -> BoardDefinition {
        let member_count = Expr::cust(format!(
            "(SELECT COUNT(*) FROM group_membership gm \
             WHERE gm.group_id = \"community_group\".\"id\" \
             AND gm.status IN ('{}', '{}'))",
            membership::status::APPROVED,
            membership::status::ACTIVE,
        ));

        let mut exprs = standard_exprs();
        exprs.push((member_count, "member_count"));

        BoardDefinition {
            kind: BoardKind::Group,
            base_table: "community_group",
            columns: vec![
                "id",
                "name",
                "description",
                "frequency",
                "meeting_time",
                "location",
                "is_online",
                "is_private",
                "capacity",
                "created",
            ],
            exprs,
            joins: standard_joins("created_by"),
            conditions: {
                let mut conditions = vec![base_col("community_group", "active").eq(true)];
                conditions.extend(category_conditions(BoardKind::Group));
                conditions
            },
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    fn normalize(&self, rows: Vec<serde_json::Value>, viewer: &Viewer) -> Result<Vec<ListingCard>> {
        rows.into_iter()
            .map(|row| {
                let row: GroupRow =
                    serde_json::from_value(row).context("malformed group board row")?;

                let has_capacity = row
                    .capacity
                    .is_none_or(|cap| row.member_count < i64::from(cap));

                Ok(ListingCard {
                    id: row.id,
                    author: row.author.into(),
                    category: row.category,
                    created: row.created,
                    can_moderate: viewer.can_moderate,
                    details: ListingDetails::Group {
                        name: row.name,
                        description: row.description,
                        frequency: row.frequency,
                        meeting_time: row.meeting_time,
                        location: row.location,
                        is_online: row.is_online,
                        is_private: row.is_private,
                        capacity: row.capacity,
                        member_count: row.member_count,
                        has_capacity,
                        // Membership flags need a second query against the
                        // viewer's memberships; the route fills them in.
                        is_member: false,
                        is_leader: false,
                        is_pending: false,
                    },
                })
            })
            .collect()
    }
}

/// The sharing board, split into give and borrow halves by `share_type`.
pub struct ShareBoard {
    pub share_type: ShareType,
}

#[derive(Debug, Deserialize)]
struct ShareRow {
    id: Uuid,
    title: String,
    description: String,
    location: Option<String>,
    share_type: String,
    duration: Option<String>,
    image_key: Option<String>,
    claimed: bool,
    created: i64,
    category: String,
    #[serde(flatten)]
    author: AuthorRow,
}

impl BoardSource for ShareBoard {
    fn kind(&self) -> BoardKind {
        BoardKind::Share
    }

    fn definition(&self) -> BoardDefinition {
        let mut conditions = vec![
            base_col("share_item", "status").eq(item_status::ACTIVE),
            base_col("share_item", "claimed").eq(false),
            base_col("share_item", "share_type").eq(self.share_type.as_str()),
        ];
        conditions.extend(category_conditions(BoardKind::Share));

        BoardDefinition {
            kind: BoardKind::Share,
            base_table: "share_item",
            columns: vec![
                "id",
                "title",
                "description",
                "location",
                "share_type",
                "duration",
                "image_key",
                "claimed",
                "created",
            ],
            exprs: standard_exprs(),
            joins: standard_joins("owner_id"),
            conditions,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    fn normalize(&self, rows: Vec<serde_json::Value>, viewer: &Viewer) -> Result<Vec<ListingCard>> {
        rows.into_iter()
            .map(|row| {
                let row: ShareRow =
                    serde_json::from_value(row).context("malformed share board row")?;

                Ok(ListingCard {
                    id: row.id,
                    author: row.author.into(),
                    category: row.category,
                    created: row.created,
                    can_moderate: viewer.can_moderate,
                    details: ListingDetails::Share {
                        title: row.title,
                        description: row.description,
                        location: row.location,
                        share_type: ShareType::from_param(Some(&row.share_type)),
                        duration: row.duration,
                        image_key: row.image_key,
                        claimed: row.claimed,
                    },
                })
            })
            .collect()
    }
}

/// The needs board. With an `owner` set it becomes one user's profile view,
/// which also shows fulfilled needs.
pub struct NeedBoard {
    pub owner: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
struct NeedRow {
    id: Uuid,
    description: String,
    response: Option<String>,
    fulfilled: bool,
    created: i64,
    category: String,
    #[serde(flatten)]
    author: AuthorRow,
}

impl BoardSource for NeedBoard {
    fn kind(&self) -> BoardKind {
        BoardKind::Need
    }

    fn definition(&self) -> BoardDefinition {
        let mut conditions = vec![base_col("need", "status").eq(need_status::ACTIVE)];
        if let Some(owner) = self.owner {
            conditions.push(base_col("need", "user_id").eq(owner));
        } else {
            conditions.push(base_col("need", "fulfilled").eq(false));
        }
        conditions.extend(category_conditions(BoardKind::Need));

        BoardDefinition {
            kind: BoardKind::Need,
            base_table: "need",
            columns: vec!["id", "description", "response", "fulfilled", "created"],
            exprs: standard_exprs(),
            joins: standard_joins("user_id"),
            conditions,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    fn normalize(&self, rows: Vec<serde_json::Value>, viewer: &Viewer) -> Result<Vec<ListingCard>> {
        rows.into_iter()
            .map(|row| {
                let row: NeedRow =
                    serde_json::from_value(row).context("malformed need board row")?;

                Ok(ListingCard {
                    id: row.id,
                    author: row.author.into(),
                    category: row.category,
                    created: row.created,
                    can_moderate: viewer.can_moderate,
                    details: ListingDetails::Need {
                        description: row.description,
                        fulfilled: row.fulfilled,
                        response: row.response,
                    },
                })
            })
            .collect()
    }
}

/// The prayer requests board.
pub struct PrayerBoard;

#[derive(Debug, Deserialize)]
struct PrayerRow {
    id: Uuid,
    description: String,
    answered: bool,
    created: i64,
    category: String,
    #[serde(flatten)]
    author: AuthorRow,
}

impl BoardSource for PrayerBoard {
    fn kind(&self) -> BoardKind {
        BoardKind::Prayer
    }

    fn definition(&self) -> BoardDefinition {
        let mut conditions = vec![base_col("prayer", "active").eq(true)];
        conditions.extend(category_conditions(BoardKind::Prayer));

        BoardDefinition {
            kind: BoardKind::Prayer,
            base_table: "prayer",
            columns: vec!["id", "description", "answered", "created"],
            exprs: standard_exprs(),
            joins: standard_joins("user_id"),
            conditions,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    fn normalize(&self, rows: Vec<serde_json::Value>, viewer: &Viewer) -> Result<Vec<ListingCard>> {
        rows.into_iter()
            .map(|row| {
                let row: PrayerRow =
                    serde_json::from_value(row).context("malformed prayer board row")?;

                Ok(ListingCard {
                    id: row.id,
                    author: row.author.into(),
                    category: row.category,
                    created: row.created,
                    can_moderate: viewer.can_moderate,
                    details: ListingDetails::Prayer {
                        description: row.description,
                        answered: row.answered,
                    },
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn author_fields() -> serde_json::Value {
        json!({
            "author_id": Uuid::now_v7(),
            "author_name": "Dana",
            "author_username": "dana",
            "author_avatar": null,
        })
    }

    fn merge(base: serde_json::Value, extra: serde_json::Value) -> serde_json::Value {
        let mut base = base;
        if let (Some(obj), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                obj.insert(k.clone(), v.clone());
            }
        }
        base
    }

    fn group_row(capacity: Option<i32>, member_count: i64) -> serde_json::Value {
        merge(
            author_fields(),
            json!({
                "id": Uuid::now_v7(),
                "name": "Hikers",
                "description": "Weekly hikes",
                "frequency": "weekly",
                "meeting_time": null,
                "location": "Trailhead",
                "is_online": false,
                "is_private": false,
                "capacity": capacity,
                "created": 1_700_000_000,
                "category": "Outdoors",
                "member_count": member_count,
            }),
        )
    }

    #[test]
    fn group_capacity_null_means_unbounded() {
        let cards = GroupBoard
            .normalize(vec![group_row(None, 500)], &Viewer::anonymous())
            .unwrap();

        match &cards[0].details {
            ListingDetails::Group { has_capacity, .. } => assert!(has_capacity),
            other => panic!("unexpected details: {other:?}"),
        }
    }

    #[test]
    fn group_full_when_members_reach_capacity() {
        let cards = GroupBoard
            .normalize(vec![group_row(Some(10), 10)], &Viewer::anonymous())
            .unwrap();

        match &cards[0].details {
            ListingDetails::Group { has_capacity, .. } => assert!(!has_capacity),
            other => panic!("unexpected details: {other:?}"),
        }
    }

    #[test]
    fn membership_flags_default_false() {
        let cards = GroupBoard
            .normalize(vec![group_row(Some(10), 3)], &Viewer::anonymous())
            .unwrap();

        match &cards[0].details {
            ListingDetails::Group {
                is_member,
                is_leader,
                is_pending,
                ..
            } => {
                assert!(!is_member && !is_leader && !is_pending);
            }
            other => panic!("unexpected details: {other:?}"),
        }
    }

    #[test]
    fn share_board_filters_by_type_and_visibility() {
        let give = ShareBoard {
            share_type: ShareType::Give,
        };
        let definition = give.definition();

        assert_eq!(definition.base_table, "share_item");
        // status, claimed, share_type, category kind, category active
        assert_eq!(definition.conditions.len(), 5);
    }

    #[test]
    fn need_profile_board_scopes_to_owner() {
        let owner = Uuid::now_v7();
        let profile = NeedBoard { owner: Some(owner) };
        let public = NeedBoard { owner: None };

        // Both carry status + category conditions plus either the owner
        // restriction or the unfulfilled restriction.
        assert_eq!(profile.definition().conditions.len(), 4);
        assert_eq!(public.definition().conditions.len(), 4);
    }

    #[test]
    fn prayer_rows_normalize() {
        let row = merge(
            author_fields(),
            json!({
                "id": Uuid::now_v7(),
                "description": "for rain",
                "answered": true,
                "created": 1_700_000_000,
                "category": "Weather",
            }),
        );

        let cards = PrayerBoard.normalize(vec![row], &Viewer::anonymous()).unwrap();
        assert_eq!(cards.len(), 1);
        match &cards[0].details {
            ListingDetails::Prayer { answered, .. } => assert!(answered),
            other => panic!("unexpected details: {other:?}"),
        }
    }
}
