use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use super::super::dto::{
    AdminQuery, ApproveRequestQuery, CreateEventReq, EventCreatedResponse, EventDetailQuery,
    EventDto, EventsQuery, JoinResponse, MessageResponse, OwnershipQuery, RemoveAdminQuery,
    StatusQuery, UpdateEventReq,
};
use super::super::extract::CurrentUser;
use super::super::{ApiResult, AppState};
use crate::domain::service::JoinOutcome;

pub async fn register_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateEventReq>,
) -> ApiResult<Json<EventCreatedResponse>> {
    let id_event = state.service.create_event(&user, req.into())?;
    Ok(Json(EventCreatedResponse {
        message: "Event created successfully".to_owned(),
        id_event,
    }))
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> ApiResult<Json<Vec<EventDto>>> {
    let events = state.service.list_events(&query.into())?;
    Ok(Json(events.into_iter().map(EventDto::from).collect()))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Query(query): Query<EventDetailQuery>,
) -> ApiResult<Json<EventDto>> {
    let (event, weather) = state
        .service
        .event_with_forecast(event_id, query.forecast_days)
        .await?;
    Ok(Json(EventDto::from(event).with_weather(weather)))
}

pub async fn update_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(event_id): Path<Uuid>,
    Json(req): Json<UpdateEventReq>,
) -> ApiResult<Json<MessageResponse>> {
    state.service.update_event(event_id, user.id, req.into())?;
    Ok(Json(MessageResponse::new("Event updated successfully!")))
}

pub async fn delete_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(event_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.service.delete_event(event_id, user.id)?;
    Ok(Json(MessageResponse::new("Event deleted successfully!")))
}

pub async fn join_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(event_id): Path<Uuid>,
) -> ApiResult<Json<JoinResponse>> {
    let response = match state.service.join_event(event_id, &user)? {
        JoinOutcome::Joined => JoinResponse {
            message: "Joined event successfully".to_owned(),
            request_id: None,
        },
        JoinOutcome::AlreadyParticipant => JoinResponse {
            message: "Already a participant".to_owned(),
            request_id: None,
        },
        JoinOutcome::Requested(id) => JoinResponse {
            message: "Request to join sent successfully".to_owned(),
            request_id: Some(id),
        },
        JoinOutcome::AlreadyRequested(id) => JoinResponse {
            message: "Request to join already pending".to_owned(),
            request_id: Some(id),
        },
    };
    Ok(Json(response))
}

pub async fn leave_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(event_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.service.leave_event(event_id, user.id)?;
    Ok(Json(MessageResponse::new("Event left successfully")))
}

pub async fn add_admin(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(event_id): Path<Uuid>,
    Query(query): Query<AdminQuery>,
) -> ApiResult<Json<MessageResponse>> {
    state.service.add_admin(event_id, &query.username, user.id)?;
    Ok(Json(MessageResponse::new(
        "Admin added successfully to event",
    )))
}

pub async fn remove_admin(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(event_id): Path<Uuid>,
    Query(query): Query<RemoveAdminQuery>,
) -> ApiResult<Json<MessageResponse>> {
    state.service.remove_admin(event_id, query.admin_id, user.id)?;
    Ok(Json(MessageResponse::new(
        "Admin removed successfully from event",
    )))
}

pub async fn transfer_ownership(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(event_id): Path<Uuid>,
    Query(query): Query<OwnershipQuery>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .service
        .transfer_ownership(event_id, &query.username, user.id)?;
    Ok(Json(MessageResponse::new(
        "Ownership transferred successfully",
    )))
}

pub async fn change_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(event_id): Path<Uuid>,
    Query(query): Query<StatusQuery>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .service
        .change_visibility(event_id, user.id, query.public)?;
    Ok(Json(MessageResponse::new(
        "Event status changed successfully",
    )))
}

/// Answer a pending join request on the event. Shortcut for the generic
/// invitation answer with `event_id` set.
pub async fn approve_request(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(event_id): Path<Uuid>,
    Query(query): Query<ApproveRequestQuery>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .service
        .respond_to_invitation(query.request_id, query.approve, &user, Some(event_id))?;
    let message = if query.approve {
        "Request approved successfully"
    } else {
        "Request declined successfully"
    };
    Ok(Json(MessageResponse::new(message)))
}
