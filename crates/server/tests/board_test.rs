#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Board query engine integration tests.
//!
//! DB-free tests for parameter normalization, SQL generation, row
//! normalization, and the page envelope.

use kindred_server::board::{
    BoardKind, BoardPage, BoardParams, BoardQueryBuilder, BoardSource, GroupBoard, ListingDetails,
    NeedBoard, PrayerBoard, RawBoardParams, ShareBoard, SortDirection, Viewer, DEFAULT_PAGE_SIZE,
};
use kindred_server::models::ShareType;
use kindred_test_utils::{assert as json_assert, group_row, need_row, prayer_row, share_row};
use serde_json::json;
use uuid::Uuid;

fn raw(page: Option<&str>, filter: Option<&str>, sort: Option<&str>) -> RawBoardParams {
    RawBoardParams {
        page: page.map(str::to_string),
        filter: filter.map(str::to_string),
        sort: sort.map(str::to_string),
    }
}

// -------------------------------------------------------------------------
// Parameter normalization
// -------------------------------------------------------------------------

#[test]
fn malformed_page_normalizes_to_one() {
    for page in [Some("0"), Some("-3"), Some("banana"), Some(""), None] {
        let params = BoardParams::from_raw(&raw(page, None, None));
        assert_eq!(params.page, 1, "page param {page:?}");
    }
}

#[test]
fn filter_and_sort_normalize() {
    let params = BoardParams::from_raw(&raw(Some("2"), Some("all"), Some("ASC")));
    assert_eq!(params.page, 2);
    assert_eq!(params.filter, None);
    assert_eq!(params.sort, SortDirection::Asc);

    let params = BoardParams::from_raw(&raw(None, Some("Meals"), Some("anything")));
    assert_eq!(params.filter.as_deref(), Some("Meals"));
    assert_eq!(params.sort, SortDirection::Desc);
}

// -------------------------------------------------------------------------
// SQL generation
// -------------------------------------------------------------------------

#[test]
fn page_sql_paginates_and_orders() {
    let definition = GroupBoard.definition();
    let builder = BoardQueryBuilder::new(&definition, None, SortDirection::Desc);

    let sql = builder.build(2);
    json_assert::contains(&sql, &format!("LIMIT {DEFAULT_PAGE_SIZE}"));
    json_assert::contains(&sql, &format!("OFFSET {DEFAULT_PAGE_SIZE}"));
    json_assert::contains(
        &sql,
        r#"ORDER BY "community_group"."created" DESC, "community_group"."id" DESC"#,
    );
}

#[test]
fn count_and_page_share_the_category_predicate() {
    let category_id = Uuid::now_v7();
    let definition = ShareBoard {
        share_type: ShareType::Give,
    }
    .definition();
    let builder = BoardQueryBuilder::new(&definition, Some(category_id), SortDirection::Desc);

    let needle = format!("'{category_id}'");
    json_assert::contains(&builder.build(1), &needle);
    json_assert::contains(&builder.build_count(), &needle);
}

#[test]
fn share_board_restricts_type_and_claims() {
    let definition = ShareBoard {
        share_type: ShareType::Give,
    }
    .definition();
    let sql = BoardQueryBuilder::new(&definition, None, SortDirection::Desc).build(1);

    json_assert::contains(&sql, "'GIVE'");
    json_assert::contains(&sql, r#""share_item"."claimed" = FALSE"#);
    json_assert::contains(&sql, r#""share_item"."status" = 'ACTIVE'"#);
}

#[test]
fn need_profile_board_scopes_to_owner() {
    let owner = Uuid::now_v7();
    let definition = NeedBoard { owner: Some(owner) }.definition();
    let sql = BoardQueryBuilder::new(&definition, None, SortDirection::Desc).build(1);

    json_assert::contains(&sql, &format!("'{owner}'"));
    // The profile variant shows fulfilled needs too.
    json_assert::not_contains(&sql, r#""need"."fulfilled" = FALSE"#);

    let definition = NeedBoard { owner: None }.definition();
    let sql = BoardQueryBuilder::new(&definition, None, SortDirection::Desc).build(1);
    json_assert::contains(&sql, r#""need"."fulfilled" = FALSE"#);
}

#[test]
fn prayer_board_keeps_answered_prayers() {
    let definition = PrayerBoard.definition();
    let builder = BoardQueryBuilder::new(&definition, None, SortDirection::Desc);

    json_assert::contains(&builder.build(1), r#""prayer"."active" = TRUE"#);
    // No predicate on the answered flag; answered prayers stay listed.
    json_assert::not_contains(&builder.build_count(), "answered");
}

#[test]
fn every_board_joins_author_and_category() {
    let sources: Vec<Box<dyn BoardSource>> = vec![
        Box::new(GroupBoard),
        Box::new(ShareBoard {
            share_type: ShareType::Borrow,
        }),
        Box::new(NeedBoard { owner: None }),
        Box::new(PrayerBoard),
    ];

    for source in sources {
        let definition = source.definition();
        let sql = BoardQueryBuilder::new(&definition, None, SortDirection::Desc).build(1);
        json_assert::contains(&sql, r#"INNER JOIN "users" AS "u""#);
        json_assert::contains(&sql, r#"INNER JOIN "category" AS "c""#);
        json_assert::contains(&sql, &format!("'{}'", definition.kind.as_str()));
    }
}

// -------------------------------------------------------------------------
// Row normalization
// -------------------------------------------------------------------------

#[test]
fn group_rows_normalize_with_capacity_flag() {
    let rows = vec![
        group_row("Hikers")
            .with_field("capacity", json!(10))
            .with_field("member_count", json!(10))
            .build(),
        group_row("Readers").build(),
    ];

    let cards = GroupBoard.normalize(rows, &Viewer::anonymous()).unwrap();
    assert_eq!(cards.len(), 2);

    match &cards[0].details {
        ListingDetails::Group {
            has_capacity,
            member_count,
            ..
        } => {
            assert!(!has_capacity);
            assert_eq!(*member_count, 10);
        }
        other => panic!("unexpected details: {other:?}"),
    }

    match &cards[1].details {
        ListingDetails::Group { has_capacity, .. } => assert!(has_capacity),
        other => panic!("unexpected details: {other:?}"),
    }
}

#[test]
fn cards_carry_viewer_moderation_flag() {
    let viewer = Viewer {
        user: None,
        can_moderate: true,
    };

    let cards = PrayerBoard
        .normalize(vec![prayer_row("for rain").build()], &viewer)
        .unwrap();

    assert!(cards[0].can_moderate);
}

#[test]
fn cards_serialize_with_kind_tag() {
    let author = Uuid::now_v7();
    let cards = ShareBoard {
        share_type: ShareType::Borrow,
    }
    .normalize(
        vec![
            share_row("Ladder")
                .with_author(author, "Dana", "dana")
                .build(),
        ],
        &Viewer::anonymous(),
    )
    .unwrap();

    let value = serde_json::to_value(&cards[0]).unwrap();
    assert_eq!(value["kind"], "share");
    assert_eq!(value["title"], "Ladder");
    assert_eq!(value["share_type"], "borrow");
    assert_eq!(value["author"]["username"], "dana");
    json_assert::has_key(&value, "category");
}

#[test]
fn need_rows_normalize() {
    let cards = NeedBoard { owner: None }
        .normalize(
            vec![
                need_row("yard help")
                    .with_field("fulfilled", json!(true))
                    .with_field("response", json!("neighbor mowed it"))
                    .build(),
            ],
            &Viewer::anonymous(),
        )
        .unwrap();

    match &cards[0].details {
        ListingDetails::Need {
            fulfilled,
            response,
            ..
        } => {
            assert!(fulfilled);
            assert_eq!(response.as_deref(), Some("neighbor mowed it"));
        }
        other => panic!("unexpected details: {other:?}"),
    }
}

#[test]
fn malformed_rows_are_an_error() {
    let result = GroupBoard.normalize(vec![json!({ "id": "not-a-uuid" })], &Viewer::anonymous());
    assert!(result.is_err());
}

// -------------------------------------------------------------------------
// Page envelope
// -------------------------------------------------------------------------

#[test]
fn envelope_paging_math() {
    // 25 rows at 12 per page: pages 1 and 2 have more, page 3 is last.
    for (page, expected) in [(1, true), (2, true), (3, false)] {
        let envelope = BoardPage::new(
            Vec::new(),
            25,
            page,
            DEFAULT_PAGE_SIZE,
            Vec::new(),
            "all".to_string(),
        );
        assert_eq!(envelope.has_next_page, expected, "page {page}");
    }
}

#[test]
fn board_kinds_are_stable() {
    assert_eq!(BoardKind::Group.as_str(), "GROUP");
    assert_eq!(BoardKind::Share.as_str(), "SHARE");
    assert_eq!(BoardKind::Need.as_str(), "NEED");
    assert_eq!(BoardKind::Prayer.as_str(), "PRAYER");
}
