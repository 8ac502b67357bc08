//! Application services.

pub mod moderation;
