//! Needs board, profile-scoped needs, and fulfillment actions.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use tower_sessions::Session;
use uuid::Uuid;

use crate::board::{BoardKind, BoardPage, BoardParams, NeedBoard, RawBoardParams};
use crate::error::{AppError, AppResult};
use crate::models::{Need, User};
use crate::routes::helpers::{require_login, viewer_for, ActionResponse};
use crate::state::AppState;

/// Need action form body.
#[derive(Debug, Deserialize)]
pub struct NeedActionForm {
    #[serde(rename = "_action")]
    pub action: String,

    #[serde(rename = "needId")]
    pub need_id: Uuid,

    /// Note recorded with `fulfill`.
    pub response: Option<String>,

    #[serde(rename = "moderatorAction")]
    pub moderator_action: Option<String>,

    pub reason: Option<String>,
}

impl NeedActionForm {
    fn is_moderator_action(&self) -> bool {
        self.moderator_action.as_deref() == Some("1")
    }
}

async fn run_board(
    state: &AppState,
    session: &Session,
    raw: RawBoardParams,
    owner: Option<Uuid>,
) -> Result<Json<BoardPage>, Response> {
    let user = require_login(state, session).await?;
    let viewer = viewer_for(state, Some(user))
        .await
        .map_err(IntoResponse::into_response)?;

    let params = BoardParams::from_raw(&raw);
    let source = NeedBoard { owner };

    let page = state
        .boards()
        .query(&params, &viewer, &source)
        .await
        .map_err(|e| AppError::Internal(e).into_response())?;

    Ok(Json(page))
}

/// Needs board handler.
///
/// GET /needs
async fn list_needs(
    State(state): State<AppState>,
    session: Session,
    Query(raw): Query<RawBoardParams>,
) -> Result<Json<BoardPage>, Response> {
    run_board(&state, &session, raw, None).await
}

/// Profile needs handler: one user's needs, fulfilled ones included.
///
/// GET /users/{username}/needs
async fn list_user_needs(
    State(state): State<AppState>,
    session: Session,
    Path(username): Path<String>,
    Query(raw): Query<RawBoardParams>,
) -> Result<Json<BoardPage>, Response> {
    let profile = User::find_by_username(state.db(), &username)
        .await
        .map_err(|e| AppError::Internal(e).into_response())?
        .ok_or_else(|| {
            AppError::NotFound("User not found".to_string()).into_response()
        })?;

    run_board(&state, &session, raw, Some(profile.id)).await
}

/// Need action handler.
///
/// POST /needs — `_action` is `fulfill` or `delete`.
async fn need_action(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<NeedActionForm>,
) -> Result<Response, Response> {
    let user = require_login(&state, &session).await?;

    let result = match form.action.as_str() {
        "fulfill" => fulfill_need(&state, &user, &form).await,
        "delete" => delete_need(&state, &user, &form).await,
        other => Err(AppError::BadRequest(format!("Unknown action: {other}"))),
    };

    match result {
        Ok(response) => Ok(Json(response).into_response()),
        Err(e) => Err(e.into_response()),
    }
}

async fn fulfill_need(
    state: &AppState,
    user: &User,
    form: &NeedActionForm,
) -> AppResult<ActionResponse> {
    let need = Need::find_by_id(state.db(), form.need_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Need not found".to_string()))?;

    if need.user_id != user.id {
        return Err(AppError::Forbidden(
            "Only the poster may mark a need fulfilled".to_string(),
        ));
    }

    Need::fulfill(state.db(), need.id, form.response.as_deref()).await?;

    Ok(ActionResponse::message("The need has been marked fulfilled."))
}

async fn delete_need(
    state: &AppState,
    user: &User,
    form: &NeedActionForm,
) -> AppResult<ActionResponse> {
    let need = Need::find_by_id(state.db(), form.need_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Need not found".to_string()))?;

    let is_owner = need.user_id == user.id;
    let can_moderate = state.permissions().can_moderate(user).await?;

    if !is_owner && !can_moderate {
        return Err(AppError::Forbidden(
            "You may not delete this need".to_string(),
        ));
    }

    if form.is_moderator_action() && can_moderate {
        state
            .moderation()
            .log(
                user.id,
                BoardKind::Need.as_str(),
                need.id,
                "DELETE",
                form.reason.as_deref(),
            )
            .await?;
    }

    Need::soft_delete(state.db(), need.id).await?;

    Ok(ActionResponse::message("The need has been deleted."))
}

/// Create the needs router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/needs", get(list_needs))
        .route("/needs", post(need_action))
        .route("/users/{username}/needs", get(list_user_needs))
}
