//! Database models.

pub mod category;
pub mod claim;
pub mod group;
pub mod membership;
pub mod need;
pub mod prayer;
pub mod role;
pub mod share_item;
pub mod user;

pub use category::Category;
pub use claim::{Claim, ClaimOutcome};
pub use group::Group;
pub use membership::{InsertOutcome, Membership};
pub use need::Need;
pub use prayer::Prayer;
pub use share_item::{ShareItem, ShareType};
pub use user::User;
