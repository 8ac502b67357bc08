//! Sharing board (give and borrow) and claim actions.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use tower_sessions::Session;
use uuid::Uuid;

use crate::board::{BoardKind, BoardPage, BoardParams, RawBoardParams, ShareBoard};
use crate::error::{AppError, AppResult};
use crate::models::share_item::item_status;
use crate::models::{Claim, ClaimOutcome, ShareItem, ShareType, User};
use crate::routes::helpers::{require_login, viewer_for, ActionResponse};
use crate::state::AppState;

/// Share board query parameters: the board parameters plus the `type`
/// selector splitting the board into give and borrow halves.
#[derive(Debug, Deserialize)]
pub struct ShareBoardQuery {
    #[serde(rename = "type")]
    pub share_type: Option<String>,
    pub page: Option<String>,
    pub filter: Option<String>,
    pub sort: Option<String>,
}

/// Share action form body.
#[derive(Debug, Deserialize)]
pub struct ShareActionForm {
    #[serde(rename = "_action")]
    pub action: String,

    #[serde(rename = "itemId")]
    pub item_id: Uuid,

    #[serde(rename = "moderatorAction")]
    pub moderator_action: Option<String>,

    pub reason: Option<String>,
}

impl ShareActionForm {
    fn is_moderator_action(&self) -> bool {
        self.moderator_action.as_deref() == Some("1")
    }
}

/// Share board handler.
///
/// GET /share?type=give|borrow
async fn list_share(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ShareBoardQuery>,
) -> Result<Json<BoardPage>, Response> {
    let user = require_login(&state, &session).await?;
    let viewer = viewer_for(&state, Some(user))
        .await
        .map_err(IntoResponse::into_response)?;

    let params = BoardParams::from_raw(&RawBoardParams {
        page: query.page,
        filter: query.filter,
        sort: query.sort,
    });
    let source = ShareBoard {
        share_type: ShareType::from_param(query.share_type.as_deref()),
    };

    let page = state
        .boards()
        .query(&params, &viewer, &source)
        .await
        .map_err(|e| AppError::Internal(e).into_response())?;

    Ok(Json(page))
}

/// Share action handler.
///
/// POST /share — `_action` is one of `claim`, `unclaim`, `pending`,
/// `removed`, `delete`.
async fn share_action(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ShareActionForm>,
) -> Result<Response, Response> {
    let user = require_login(&state, &session).await?;

    let result = match form.action.as_str() {
        "claim" => claim_item(&state, &user, form.item_id).await,
        "unclaim" => unclaim_item(&state, &user, form.item_id).await,
        "pending" => set_item_status(&state, &user, &form, item_status::PENDING).await,
        "removed" => set_item_status(&state, &user, &form, item_status::REMOVED).await,
        "delete" => delete_item(&state, &user, &form).await,
        other => Err(AppError::BadRequest(format!("Unknown action: {other}"))),
    };

    match result {
        Ok(response) => Ok(Json(response).into_response()),
        Err(e) => Err(e.into_response()),
    }
}

async fn claim_item(state: &AppState, user: &User, item_id: Uuid) -> AppResult<ActionResponse> {
    let item = ShareItem::find_by_id(state.db(), item_id)
        .await?
        .filter(|i| i.status == item_status::ACTIVE)
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

    // Own claim first: re-claiming is idempotent even when the item shows
    // as claimed.
    if Claim::find(state.db(), user.id, item.id).await?.is_some() {
        return Ok(ActionResponse::message(
            "You have already claimed this item.",
        ));
    }

    match Claim::acquire(state.db(), user.id, item.id).await? {
        ClaimOutcome::Claimed(_) => Ok(ActionResponse::message("You have claimed this item.")),
        ClaimOutcome::AlreadyClaimed => {
            // Lost the race. A double submit from the same user still
            // reads as idempotent.
            if Claim::find(state.db(), user.id, item.id).await?.is_some() {
                Ok(ActionResponse::message("You have already claimed this item."))
            } else {
                Err(AppError::BadRequest(
                    "Item has already been claimed".to_string(),
                ))
            }
        }
    }
}

async fn unclaim_item(state: &AppState, user: &User, item_id: Uuid) -> AppResult<ActionResponse> {
    let released = Claim::release(state.db(), user.id, item_id).await?;

    if !released {
        return Err(AppError::NotFound(
            "You have not claimed this item".to_string(),
        ));
    }

    Ok(ActionResponse::message("You have unclaimed this item."))
}

async fn set_item_status(
    state: &AppState,
    user: &User,
    form: &ShareActionForm,
    new_status: &str,
) -> AppResult<ActionResponse> {
    if !state.permissions().can_moderate(user).await? {
        return Err(AppError::Forbidden(
            "Moderator access required".to_string(),
        ));
    }

    let item = ShareItem::find_by_id(state.db(), form.item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

    state
        .moderation()
        .log(
            user.id,
            BoardKind::Share.as_str(),
            item.id,
            new_status,
            form.reason.as_deref(),
        )
        .await?;

    ShareItem::set_status(state.db(), item.id, new_status).await?;

    Ok(ActionResponse::message("Item status updated."))
}

async fn delete_item(
    state: &AppState,
    user: &User,
    form: &ShareActionForm,
) -> AppResult<ActionResponse> {
    let item = ShareItem::find_by_id(state.db(), form.item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

    let is_owner = item.owner_id == user.id;
    let can_moderate = state.permissions().can_moderate(user).await?;

    if !is_owner && !can_moderate {
        return Err(AppError::Forbidden(
            "You may not delete this item".to_string(),
        ));
    }

    if form.is_moderator_action() && can_moderate {
        state
            .moderation()
            .log(
                user.id,
                BoardKind::Share.as_str(),
                item.id,
                "DELETE",
                form.reason.as_deref(),
            )
            .await?;
    }

    ShareItem::delete(state.db(), item.id).await?;

    Ok(ActionResponse::message("The item has been deleted."))
}

/// Create the share router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/share", get(list_share))
        .route("/share", post(share_action))
}
