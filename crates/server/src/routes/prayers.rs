//! Prayer requests board and actions.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use tower_sessions::Session;
use uuid::Uuid;

use crate::board::{BoardKind, BoardPage, BoardParams, PrayerBoard, RawBoardParams};
use crate::error::{AppError, AppResult};
use crate::models::{Prayer, User};
use crate::routes::helpers::{require_login, viewer_for, ActionResponse};
use crate::state::AppState;

/// Prayer action form body.
#[derive(Debug, Deserialize)]
pub struct PrayerActionForm {
    #[serde(rename = "_action")]
    pub action: String,

    #[serde(rename = "prayerId")]
    pub prayer_id: Uuid,

    #[serde(rename = "moderatorAction")]
    pub moderator_action: Option<String>,

    pub reason: Option<String>,
}

impl PrayerActionForm {
    fn is_moderator_action(&self) -> bool {
        self.moderator_action.as_deref() == Some("1")
    }
}

/// Prayer board handler. Answered prayers remain listed.
///
/// GET /prayers
async fn list_prayers(
    State(state): State<AppState>,
    session: Session,
    Query(raw): Query<RawBoardParams>,
) -> Result<Json<BoardPage>, Response> {
    let user = require_login(&state, &session).await?;
    let viewer = viewer_for(&state, Some(user))
        .await
        .map_err(IntoResponse::into_response)?;

    let params = BoardParams::from_raw(&raw);

    let page = state
        .boards()
        .query(&params, &viewer, &PrayerBoard)
        .await
        .map_err(|e| AppError::Internal(e).into_response())?;

    Ok(Json(page))
}

/// Prayer action handler.
///
/// POST /prayers — `_action` is `mark-answered` or `delete`.
async fn prayer_action(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PrayerActionForm>,
) -> Result<Response, Response> {
    let user = require_login(&state, &session).await?;

    let result = match form.action.as_str() {
        "mark-answered" => mark_answered(&state, &user, form.prayer_id).await,
        "delete" => delete_prayer(&state, &user, &form).await,
        other => Err(AppError::BadRequest(format!("Unknown action: {other}"))),
    };

    match result {
        Ok(response) => Ok(Json(response).into_response()),
        Err(e) => Err(e.into_response()),
    }
}

async fn mark_answered(state: &AppState, user: &User, prayer_id: Uuid) -> AppResult<ActionResponse> {
    let prayer = Prayer::find_by_id(state.db(), prayer_id)
        .await?
        .filter(|p| p.active)
        .ok_or_else(|| AppError::NotFound("Prayer not found".to_string()))?;

    if prayer.user_id != user.id {
        return Err(AppError::Forbidden(
            "Only the poster may mark a prayer answered".to_string(),
        ));
    }

    Prayer::mark_answered(state.db(), prayer.id).await?;

    Ok(ActionResponse::message(
        "The prayer has been marked answered.",
    ))
}

async fn delete_prayer(
    state: &AppState,
    user: &User,
    form: &PrayerActionForm,
) -> AppResult<ActionResponse> {
    let prayer = Prayer::find_by_id(state.db(), form.prayer_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Prayer not found".to_string()))?;

    let is_owner = prayer.user_id == user.id;
    let can_moderate = state.permissions().can_moderate(user).await?;

    if !is_owner && !can_moderate {
        return Err(AppError::Forbidden(
            "You may not delete this prayer".to_string(),
        ));
    }

    if form.is_moderator_action() && can_moderate {
        state
            .moderation()
            .log(
                user.id,
                BoardKind::Prayer.as_str(),
                prayer.id,
                "DELETE",
                form.reason.as_deref(),
            )
            .await?;
    }

    Prayer::soft_delete(state.db(), prayer.id).await?;

    Ok(ActionResponse::message("The prayer has been deleted."))
}

/// Create the prayers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/prayers", get(list_prayers))
        .route("/prayers", post(prayer_action))
}
