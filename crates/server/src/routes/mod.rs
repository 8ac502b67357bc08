//! HTTP route modules.

pub mod auth;
pub mod groups;
pub mod health;
pub mod helpers;
pub mod needs;
pub mod prayers;
pub mod share;
