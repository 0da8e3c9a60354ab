use axum::Json;
use axum::extract::{Path, Query, State};
use tracing::info;
use uuid::Uuid;

use super::super::dto::{
    FriendQuery, LoginReq, MeDto, MessageResponse, RegisterUserReq, RegisteredResponse,
    TokenResponse, UpdateAccountReq, UserProfileDto, UserSummaryDto,
};
use super::super::extract::CurrentUser;
use super::super::{ApiResult, AppState};

pub async fn register_user(
    State(state): State<AppState>,
    Json(req): Json<RegisterUserReq>,
) -> ApiResult<Json<RegisteredResponse>> {
    let uid = state
        .service
        .register_user(&req.username, &req.email, &req.password)?;
    Ok(Json(RegisteredResponse {
        message: "User created successfully".to_owned(),
        uid,
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginReq>,
) -> ApiResult<Json<TokenResponse>> {
    let user = state.service.authenticate(&req.username, &req.password)?;
    let access_token = state.tokens.issue(user.id, user.token_version)?;
    info!(user_id = %user.id, "token issued");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_owned(),
    }))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<MeDto> {
    Json(MeDto::from(user))
}

pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<MessageResponse>> {
    state.service.logout(user.id)?;
    Ok(Json(MessageResponse::new("User logged out successfully")))
}

pub async fn update_account(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<UpdateAccountReq>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .service
        .update_account(user.id, &req.username, &req.email, req.password.as_deref())?;
    Ok(Json(MessageResponse::new("User updated successfully")))
}

pub async fn delete_account(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<MessageResponse>> {
    state.service.delete_account(user.id)?;
    Ok(Json(MessageResponse::new("Account successfully deleted")))
}

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserSummaryDto>>> {
    let users = state.service.list_users()?;
    Ok(Json(users.into_iter().map(UserSummaryDto::from).collect()))
}

pub async fn get_user_by_name(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<UserProfileDto>> {
    let user = state.service.get_user_by_name(&username)?;
    Ok(Json(UserProfileDto::from(user)))
}

pub async fn get_user_by_id(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<UserProfileDto>> {
    let user = state.service.get_user(user_id)?;
    Ok(Json(UserProfileDto::from(user)))
}

pub async fn remove_friend(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<FriendQuery>,
) -> ApiResult<Json<MessageResponse>> {
    state.service.remove_friend(user.id, query.friend_id)?;
    Ok(Json(MessageResponse::new(
        "Friendship updated successfully",
    )))
}
