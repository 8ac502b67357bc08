//! Community groups board and membership actions.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use tower_sessions::Session;
use uuid::Uuid;

use crate::board::{
    BoardKind, BoardPage, BoardParams, GroupBoard, ListingDetails, RawBoardParams,
};
use crate::error::{AppError, AppResult};
use crate::models::membership::{role, status};
use crate::models::{Group, InsertOutcome, Membership, User};
use crate::routes::helpers::{current_user, require_login, viewer_for, ActionResponse};
use crate::state::AppState;

/// Group action form body.
#[derive(Debug, Deserialize)]
pub struct GroupActionForm {
    #[serde(rename = "_action")]
    pub action: String,

    #[serde(rename = "groupId")]
    pub group_id: Uuid,

    #[serde(rename = "moderatorAction")]
    pub moderator_action: Option<String>,

    pub reason: Option<String>,
}

impl GroupActionForm {
    fn is_moderator_action(&self) -> bool {
        self.moderator_action.as_deref() == Some("1")
    }
}

/// What a join request should do, given the group's current state.
#[derive(Debug, PartialEq, Eq)]
enum JoinDecision {
    /// Reject: the group has no open spots.
    AtCapacity,
    /// Idempotent success: a membership row already exists.
    Existing {
        status: String,
        message: &'static str,
    },
    /// Create a new MEMBER row with this status.
    Create {
        status: &'static str,
        message: &'static str,
    },
}

/// Decide the outcome of a join request.
///
/// Capacity is checked before the existing membership, so a full group
/// rejects every join attempt uniformly.
fn decide_join(group: &Group, member_count: i64, existing: Option<&Membership>) -> JoinDecision {
    if let Some(capacity) = group.capacity {
        if member_count >= i64::from(capacity) {
            return JoinDecision::AtCapacity;
        }
    }

    if let Some(membership) = existing {
        let message = if membership.is_pending() {
            "Your request to join is already pending approval."
        } else if membership.is_joined() {
            "You are already a member of this group."
        } else {
            "Your membership status is being reviewed."
        };

        return JoinDecision::Existing {
            status: membership.status.clone(),
            message,
        };
    }

    if group.is_private {
        JoinDecision::Create {
            status: status::PENDING,
            message: "Your request to join has been submitted.",
        }
    } else {
        JoinDecision::Create {
            status: status::APPROVED,
            message: "You have joined the group.",
        }
    }
}

/// Groups board handler.
///
/// GET /groups — anonymous viewers see the board without membership flags.
async fn list_groups(
    State(state): State<AppState>,
    session: Session,
    Query(raw): Query<RawBoardParams>,
) -> AppResult<Json<BoardPage>> {
    let user = current_user(&state, &session).await;
    let viewer = viewer_for(&state, user).await?;
    let params = BoardParams::from_raw(&raw);

    let mut page = state.boards().query(&params, &viewer, &GroupBoard).await?;

    if let Some(user_id) = viewer.user_id() {
        annotate_memberships(&state, user_id, &mut page).await?;
    }

    Ok(Json(page))
}

/// Fill in the viewer's membership flags with a single ANY($ids) fetch.
async fn annotate_memberships(
    state: &AppState,
    user_id: Uuid,
    page: &mut BoardPage,
) -> AppResult<()> {
    let group_ids: Vec<Uuid> = page.items.iter().map(|card| card.id).collect();
    if group_ids.is_empty() {
        return Ok(());
    }

    let memberships: HashMap<Uuid, Membership> =
        Membership::list_for_user_in(state.db(), user_id, &group_ids)
            .await?
            .into_iter()
            .map(|m| (m.group_id, m))
            .collect();

    for card in &mut page.items {
        if let ListingDetails::Group {
            is_member,
            is_leader,
            is_pending,
            ..
        } = &mut card.details
        {
            if let Some(membership) = memberships.get(&card.id) {
                *is_member = membership.is_joined();
                *is_leader = membership.is_leader();
                *is_pending = membership.is_pending();
            }
        }
    }

    Ok(())
}

/// Group action handler.
///
/// POST /groups — `_action` is one of `join`, `leave`, `delete`.
async fn group_action(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<GroupActionForm>,
) -> Result<Response, Response> {
    let user = require_login(&state, &session).await?;

    let result = match form.action.as_str() {
        "join" => join_group(&state, &user, form.group_id).await,
        "leave" => leave_group(&state, &user, form.group_id).await,
        "delete" => delete_group(&state, &user, &form).await,
        other => Err(AppError::BadRequest(format!("Unknown action: {other}"))),
    };

    match result {
        Ok(response) => Ok(Json(response).into_response()),
        Err(e) => Err(e.into_response()),
    }
}

async fn join_group(state: &AppState, user: &User, group_id: Uuid) -> AppResult<ActionResponse> {
    let group = Group::find_by_id(state.db(), group_id)
        .await?
        .filter(|g| g.active)
        .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;

    let member_count = Group::member_count(state.db(), group.id).await?;
    let existing = Membership::find(state.db(), user.id, group.id).await?;

    match decide_join(&group, member_count, existing.as_ref()) {
        JoinDecision::AtCapacity => {
            Err(AppError::BadRequest("Group is at capacity".to_string()))
        }
        JoinDecision::Existing { status, message } => {
            Ok(ActionResponse::message(message).with_status(status))
        }
        JoinDecision::Create { status, message } => {
            match Membership::create(state.db(), user.id, group.id, role::MEMBER, status).await? {
                InsertOutcome::Created(membership) => {
                    Ok(ActionResponse::message(message).with_status(membership.status))
                }
                // A concurrent join won the race; report the row it created.
                InsertOutcome::Duplicate => {
                    let membership = Membership::find(state.db(), user.id, group.id)
                        .await?
                        .ok_or_else(|| {
                            AppError::Internal(anyhow::anyhow!(
                                "membership vanished after duplicate insert"
                            ))
                        })?;

                    Ok(
                        ActionResponse::message("You are already a member of this group.")
                            .with_status(membership.status),
                    )
                }
            }
        }
    }
}

async fn leave_group(state: &AppState, user: &User, group_id: Uuid) -> AppResult<ActionResponse> {
    let deleted = Membership::delete(state.db(), user.id, group_id).await?;

    if !deleted {
        return Err(AppError::NotFound(
            "You are not a member of this group".to_string(),
        ));
    }

    Ok(ActionResponse::message("You have left the group."))
}

async fn delete_group(
    state: &AppState,
    user: &User,
    form: &GroupActionForm,
) -> AppResult<ActionResponse> {
    let group = Group::find_by_id(state.db(), form.group_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;

    let is_owner = group.created_by == user.id;
    let can_moderate = state.permissions().can_moderate(user).await?;

    if !is_owner && !can_moderate {
        return Err(AppError::Forbidden(
            "You may not delete this group".to_string(),
        ));
    }

    if form.is_moderator_action() && can_moderate {
        state
            .moderation()
            .log(
                user.id,
                BoardKind::Group.as_str(),
                group.id,
                "DELETE",
                form.reason.as_deref(),
            )
            .await?;
    }

    Group::soft_delete(state.db(), group.id).await?;

    Ok(ActionResponse::message("The group has been deleted."))
}

/// Create the groups router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/groups", get(list_groups))
        .route("/groups", post(group_action))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn group(is_private: bool, capacity: Option<i32>) -> Group {
        Group {
            id: Uuid::now_v7(),
            name: "Hikers".to_string(),
            description: "Weekly hikes".to_string(),
            frequency: None,
            meeting_time: None,
            location: None,
            is_online: false,
            is_private,
            capacity,
            category_id: Uuid::nil(),
            created_by: Uuid::nil(),
            active: true,
            created: 0,
            changed: 0,
        }
    }

    fn membership(status: &str) -> Membership {
        Membership {
            id: Uuid::nil(),
            group_id: Uuid::nil(),
            user_id: Uuid::nil(),
            role: role::MEMBER.to_string(),
            status: status.to_string(),
            created: 0,
        }
    }

    #[test]
    fn full_group_rejects_joins() {
        let decision = decide_join(&group(true, Some(2)), 2, None);
        assert_eq!(decision, JoinDecision::AtCapacity);
    }

    #[test]
    fn capacity_checked_before_existing_membership() {
        let existing = membership(status::ACTIVE);
        let decision = decide_join(&group(false, Some(3)), 3, Some(&existing));
        assert_eq!(decision, JoinDecision::AtCapacity);
    }

    #[test]
    fn unlimited_capacity_never_fills() {
        let decision = decide_join(&group(false, None), 10_000, None);
        assert_eq!(
            decision,
            JoinDecision::Create {
                status: status::APPROVED,
                message: "You have joined the group.",
            }
        );
    }

    #[test]
    fn private_group_joins_start_pending() {
        let decision = decide_join(&group(true, Some(10)), 3, None);
        assert_eq!(
            decision,
            JoinDecision::Create {
                status: status::PENDING,
                message: "Your request to join has been submitted.",
            }
        );
    }

    #[test]
    fn existing_membership_is_idempotent_success() {
        let existing = membership(status::ACTIVE);
        let decision = decide_join(&group(false, Some(10)), 3, Some(&existing));
        assert_eq!(
            decision,
            JoinDecision::Existing {
                status: status::ACTIVE.to_string(),
                message: "You are already a member of this group.",
            }
        );

        let pending = membership(status::PENDING);
        let decision = decide_join(&group(true, Some(10)), 3, Some(&pending));
        assert_eq!(
            decision,
            JoinDecision::Existing {
                status: status::PENDING.to_string(),
                message: "Your request to join is already pending approval.",
            }
        );
    }
}
