use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use super::super::dto::{
    AnswerQuery, GiveInvitationReq, InviteResponse, MessageResponse, RevokeQuery,
};
use super::super::extract::CurrentUser;
use super::super::{ApiResult, AppState};
use crate::domain::error::DomainError;
use crate::domain::model::InvitationKind;
use crate::domain::service::{GiveInvitation, InvitationOutcome};

pub async fn give_invitation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<GiveInvitationReq>,
) -> ApiResult<Json<InviteResponse>> {
    let kind: InvitationKind = req
        .kind
        .parse()
        .map_err(|e| DomainError::invalid_argument(format!("{e}")))?;

    // The authenticated caller is always the initiator, whatever the body
    // claims.
    let outcome = state.service.give_invitation(GiveInvitation {
        kind,
        start_user: user.id,
        end_user: req.end_user,
        event_id: req.event_id,
    })?;

    let message = match (kind, &outcome) {
        (InvitationKind::Event, InvitationOutcome::Created(_)) => "User invited successfully",
        (InvitationKind::Friend, InvitationOutcome::Created(_)) => {
            "Friend request sent successfully"
        }
        (InvitationKind::Request, InvitationOutcome::Created(_)) => {
            "Request to join sent successfully"
        }
        (_, InvitationOutcome::AlreadyPending(_)) => "Invitation already pending",
    };
    Ok(Json(InviteResponse {
        message: message.to_owned(),
        invite_id: outcome.invite_id(),
    }))
}

pub async fn answer_invitation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(invite_id): Path<Uuid>,
    Query(query): Query<AnswerQuery>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .service
        .respond_to_invitation(invite_id, query.answer, &user, query.event_id)?;
    let message = if query.answer {
        "Invitation accepted successfully"
    } else {
        "Invitation declined successfully"
    };
    Ok(Json(MessageResponse::new(message)))
}

pub async fn revoke_invitation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(invitation_id): Path<Uuid>,
    Query(query): Query<RevokeQuery>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .service
        .revoke_invitation(invitation_id, query.user_id, user.id)?;
    Ok(Json(MessageResponse::new(
        "Invitation revoked successfully",
    )))
}
