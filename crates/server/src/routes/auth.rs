//! Authentication routes (login, logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::info;

use crate::error::ErrorBody;
use crate::models::User;
use crate::routes::helpers::SESSION_USER_ID;
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
}

/// Login handler.
///
/// POST /login (form data)
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<ErrorBody>)> {
    let invalid = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody {
                error: "Invalid username or password".to_string(),
            }),
        )
    };

    let user = User::find_by_username(state.db(), &form.username)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to look up user during login");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "Internal server error".to_string(),
                }),
            )
        })?;

    let Some(user) = user else {
        return Err(invalid());
    };

    if !user.is_active() || !user.verify_password(&form.password) {
        return Err(invalid());
    }

    session
        .insert(SESSION_USER_ID, user.id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to write session");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "Internal server error".to_string(),
                }),
            )
        })?;

    info!(username = %user.username, "user logged in");

    Ok(Json(LoginResponse {
        success: true,
        message: "Logged in".to_string(),
    }))
}

/// Logout handler.
///
/// POST /logout
async fn logout(session: Session) -> Json<LoginResponse> {
    // A failed flush just leaves the session to expire on its own.
    if let Err(e) = session.flush().await {
        tracing::warn!(error = %e, "failed to flush session on logout");
    }

    Json(LoginResponse {
        success: true,
        message: "Logged out".to_string(),
    })
}

/// Create the authentication router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}
