//! Kindred community platform server.
//!
//! HTTP server, board query engine, and moderation services for a
//! neighborhood community site: groups to join, items to share, needs to
//! meet, and prayer requests to lift up.

pub mod board;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod permissions;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
