use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use super::super::dto::{MessageResponse, NotificationDto, NotifyQuery};
use super::super::extract::CurrentUser;
use super::super::{ApiResult, AppState};

/// Administrative notify call; unauthenticated, as in the original
/// deployment where it sits behind an internal gateway.
pub async fn notify_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<NotifyQuery>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .service
        .notify_user(user_id, query.notification_type, &query.content, None)?;
    Ok(Json(MessageResponse::new("User notified successfully!")))
}

pub async fn list_notifications(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<NotificationDto>>> {
    let notifications = state.service.list_notifications(user.id)?;
    Ok(Json(
        notifications.into_iter().map(NotificationDto::from).collect(),
    ))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(notification_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.service.delete_notification(user.id, notification_id)?;
    Ok(Json(MessageResponse::new(
        "Notification deleted successfully",
    )))
}
