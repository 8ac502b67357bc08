//! Shared route helpers.

use axum::response::{IntoResponse, Redirect, Response};
use serde::Serialize;
use tower_sessions::Session;
use uuid::Uuid;

use crate::board::Viewer;
use crate::error::AppResult;
use crate::models::User;
use crate::state::AppState;

/// Session key for the authenticated user ID.
pub const SESSION_USER_ID: &str = "user_id";

/// Load the session's user, if any.
///
/// A stale session pointing at a deleted or blocked account reads as
/// anonymous.
pub async fn current_user(state: &AppState, session: &Session) -> Option<User> {
    let user_id: Option<Uuid> = session.get(SESSION_USER_ID).await.ok().flatten();

    if let Some(id) = user_id {
        if let Ok(Some(user)) = User::find_by_id(state.db(), id).await {
            if user.is_active() {
                return Some(user);
            }
        }
    }

    None
}

/// Require an authenticated user, or redirect to login.
pub async fn require_login(state: &AppState, session: &Session) -> Result<User, Response> {
    match current_user(state, session).await {
        Some(user) => Ok(user),
        None => Err(Redirect::to("/login").into_response()),
    }
}

/// Build the viewer context for a request, resolving moderation rights once.
pub async fn viewer_for(state: &AppState, user: Option<User>) -> AppResult<Viewer> {
    let can_moderate = match &user {
        Some(user) => state.permissions().can_moderate(user).await?,
        None => false,
    };

    Ok(Viewer { user, can_moderate })
}

/// Success envelope returned by action endpoints.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Entity status carried back to the caller (e.g. a membership status).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ActionResponse {
    /// A bare success.
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
            status: None,
        }
    }

    /// A success with a user-facing message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            status: None,
        }
    }

    /// Attach an entity status to the envelope.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn action_response_omits_empty_fields() {
        let json = serde_json::to_value(ActionResponse::ok()).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true }));
    }

    #[test]
    fn action_response_carries_status() {
        let json = serde_json::to_value(
            ActionResponse::message("You are already a member of this group.")
                .with_status("ACTIVE"),
        )
        .unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["status"], "ACTIVE");
    }
}
