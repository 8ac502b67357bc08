//! Board query engine.
//!
//! Boards are the paginated, filterable listing pages at the center of the
//! application. The pipeline is split into composable pieces: request
//! normalization and display types ([`types`]), per-variant SQL shapes
//! ([`source`]), SQL generation ([`query_builder`]), and execution
//! ([`service`]).

pub mod query_builder;
pub mod service;
pub mod source;
pub mod types;

pub use query_builder::BoardQueryBuilder;
pub use service::BoardService;
pub use source::{BoardDefinition, BoardJoin, BoardSource, GroupBoard, NeedBoard, PrayerBoard, ShareBoard};
pub use types::{
    AuthorInfo, BoardKind, BoardPage, BoardParams, CategoryFilter, ListingCard, ListingDetails,
    RawBoardParams, SortDirection, Viewer, DEFAULT_PAGE_SIZE,
};
