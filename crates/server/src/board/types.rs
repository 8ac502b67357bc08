//! Board query engine types.
//!
//! A board is a filterable, paginated listing page for one content variant.
//! These types cover both sides of the contract: the normalized request
//! parameters going in, and the page envelope coming back.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ShareType, User};

/// Default number of listings per board page.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Listing variant tag. Doubles as the category kind restricting which
/// filter facets apply to a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BoardKind {
    Group,
    Share,
    Need,
    Prayer,
}

impl BoardKind {
    /// Database representation (category.kind, moderation_log.item_kind).
    pub fn as_str(self) -> &'static str {
        match self {
            BoardKind::Group => "GROUP",
            BoardKind::Share => "SHARE",
            BoardKind::Need => "NEED",
            BoardKind::Prayer => "PRAYER",
        }
    }
}

/// Sort direction over creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Raw query parameters as they arrive on the URL.
///
/// Kept stringly-typed so malformed values normalize instead of failing
/// extraction; see [`BoardParams::from_raw`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBoardParams {
    pub page: Option<String>,
    pub filter: Option<String>,
    pub sort: Option<String>,
}

/// Normalized board request parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardParams {
    /// 1-indexed page number.
    pub page: u32,

    /// Requested category name. None means unrestricted.
    pub filter: Option<String>,

    pub sort: SortDirection,
}

impl BoardParams {
    /// Normalize raw URL parameters.
    ///
    /// - non-numeric or non-positive `page` becomes 1;
    /// - absent, empty, or `all` filter becomes None;
    /// - anything other than `asc` sorts descending.
    pub fn from_raw(raw: &RawBoardParams) -> Self {
        let page = raw
            .page
            .as_deref()
            .and_then(|p| p.parse::<i64>().ok())
            .filter(|p| *p > 0)
            .map_or(1, |p| p.min(u32::MAX as i64) as u32);

        let filter = raw
            .filter
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty() && !f.eq_ignore_ascii_case("all"))
            .map(str::to_string);

        let sort = match raw.sort.as_deref() {
            Some(s) if s.eq_ignore_ascii_case("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        };

        Self { page, filter, sort }
    }
}

/// The requesting user, resolved once per request and threaded explicitly.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub user: Option<User>,
    pub can_moderate: bool,
}

impl Viewer {
    /// An unauthenticated viewer.
    pub fn anonymous() -> Self {
        Self {
            user: None,
            can_moderate: false,
        }
    }

    /// The viewer's user id, if logged in.
    pub fn user_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.id)
    }
}

/// One entry in the board's category filter menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryFilter {
    pub id: Uuid,
    pub name: String,
}

/// Listing author shown on a card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorInfo {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub avatar_key: Option<String>,
}

/// Variant-specific card fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ListingDetails {
    Group {
        name: String,
        description: String,
        frequency: Option<String>,
        meeting_time: Option<String>,
        location: Option<String>,
        is_online: bool,
        is_private: bool,
        capacity: Option<i32>,
        member_count: i64,
        has_capacity: bool,
        is_member: bool,
        is_leader: bool,
        is_pending: bool,
    },
    Share {
        title: String,
        description: String,
        location: Option<String>,
        share_type: ShareType,
        duration: Option<String>,
        image_key: Option<String>,
        claimed: bool,
    },
    Need {
        description: String,
        fulfilled: bool,
        response: Option<String>,
    },
    Prayer {
        description: String,
        answered: bool,
    },
}

/// The common display shape every board row normalizes into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingCard {
    pub id: Uuid,
    pub author: AuthorInfo,

    /// Category display name.
    pub category: String,

    /// Unix timestamp when posted.
    pub created: i64,

    /// Whether the viewer may moderate this listing.
    pub can_moderate: bool,

    #[serde(flatten)]
    pub details: ListingDetails,
}

/// Result envelope for one board page.
#[derive(Debug, Clone, Serialize)]
pub struct BoardPage {
    pub items: Vec<ListingCard>,

    /// Total count matching the combined predicate (before paging).
    pub total: u64,

    /// Current page number (1-indexed).
    pub page: u32,

    pub per_page: u32,

    pub has_next_page: bool,

    /// Filter menu for this board kind, independent of the active filter.
    pub filters: Vec<CategoryFilter>,

    /// Name of the applied filter, or "all".
    pub active_filter: String,
}

impl BoardPage {
    /// Create an envelope with paging calculations.
    pub fn new(
        items: Vec<ListingCard>,
        total: u64,
        page: u32,
        per_page: u32,
        filters: Vec<CategoryFilter>,
        active_filter: String,
    ) -> Self {
        let has_next_page = (page as u64) * (per_page as u64) < total;

        Self {
            items,
            total,
            page,
            per_page,
            has_next_page,
            filters,
            active_filter,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn raw(page: Option<&str>, filter: Option<&str>, sort: Option<&str>) -> RawBoardParams {
        RawBoardParams {
            page: page.map(str::to_string),
            filter: filter.map(str::to_string),
            sort: sort.map(str::to_string),
        }
    }

    #[test]
    fn page_defaults_to_one() {
        assert_eq!(BoardParams::from_raw(&raw(None, None, None)).page, 1);
        assert_eq!(BoardParams::from_raw(&raw(Some("0"), None, None)).page, 1);
        assert_eq!(BoardParams::from_raw(&raw(Some("-3"), None, None)).page, 1);
        assert_eq!(
            BoardParams::from_raw(&raw(Some("banana"), None, None)).page,
            1
        );
        assert_eq!(BoardParams::from_raw(&raw(Some("7"), None, None)).page, 7);
    }

    #[test]
    fn filter_all_means_unrestricted() {
        assert_eq!(BoardParams::from_raw(&raw(None, None, None)).filter, None);
        assert_eq!(
            BoardParams::from_raw(&raw(None, Some("all"), None)).filter,
            None
        );
        assert_eq!(
            BoardParams::from_raw(&raw(None, Some(""), None)).filter,
            None
        );
        assert_eq!(
            BoardParams::from_raw(&raw(None, Some("Meals"), None)).filter,
            Some("Meals".to_string())
        );
    }

    #[test]
    fn sort_defaults_to_desc() {
        assert_eq!(
            BoardParams::from_raw(&raw(None, None, None)).sort,
            SortDirection::Desc
        );
        assert_eq!(
            BoardParams::from_raw(&raw(None, None, Some("asc"))).sort,
            SortDirection::Asc
        );
        assert_eq!(
            BoardParams::from_raw(&raw(None, None, Some("sideways"))).sort,
            SortDirection::Desc
        );
    }

    #[test]
    fn has_next_page_tracks_total() {
        let page = BoardPage::new(Vec::new(), 25, 2, 12, Vec::new(), "all".to_string());
        assert!(page.has_next_page);

        let page = BoardPage::new(Vec::new(), 24, 2, 12, Vec::new(), "all".to_string());
        assert!(!page.has_next_page);

        let page = BoardPage::new(Vec::new(), 5, 1, 12, Vec::new(), "all".to_string());
        assert!(!page.has_next_page);
    }

    #[test]
    fn listing_details_tagged_serialization() {
        let details = ListingDetails::Prayer {
            description: "for rain".to_string(),
            answered: false,
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["kind"], "prayer");
        assert_eq!(json["answered"], false);
    }

    #[test]
    fn board_kind_tags() {
        assert_eq!(BoardKind::Group.as_str(), "GROUP");
        assert_eq!(BoardKind::Share.as_str(), "SHARE");
        assert_eq!(BoardKind::Need.as_str(), "NEED");
        assert_eq!(BoardKind::Prayer.as_str(), "PRAYER");
    }
}
