// src/handlers/user_handler.rs
use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use std::sync::Arc;

use crate::{
    errors::DispatchResult,
    handlers::bearer_token,
    models::{
        ClientRegistration, CommandReceipt, CreateUserRequest, DriverRegistration,
        LoginRequest, LoginResponse, SetStatusRequest, UpdateUserRequest, UserResponse,
    },
    services::user_service::UserOperations,
    state::AppState,
};

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> DispatchResult<Json<LoginResponse>> {
    state.user_service.login(req).await.map(Json)
}

pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Json<CommandReceipt> {
    if let Ok(token) = bearer_token(&headers) {
        state.user_service.logout(&token).await;
    }
    Json(CommandReceipt::done())
}

pub async fn register_client(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClientRegistration>,
) -> DispatchResult<Json<CommandReceipt>> {
    state.user_service.register_client(req).await.map(Json)
}

pub async fn register_driver(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DriverRegistration>,
) -> DispatchResult<Json<CommandReceipt>> {
    state.user_service.register_driver(req).await.map(Json)
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateUserRequest>,
) -> DispatchResult<Json<CommandReceipt>> {
    let token = bearer_token(&headers)?;
    state.user_service.create_user(&token, req).await.map(Json)
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> DispatchResult<Json<CommandReceipt>> {
    let token = bearer_token(&headers)?;
    state
        .user_service
        .update_user(&token, &user_id, req)
        .await
        .map(Json)
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> DispatchResult<Json<CommandReceipt>> {
    let token = bearer_token(&headers)?;
    state
        .user_service
        .delete_user(&token, &user_id)
        .await
        .map(Json)
}

pub async fn set_user_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> DispatchResult<Json<CommandReceipt>> {
    let token = bearer_token(&headers)?;
    state
        .user_service
        .set_user_status(&token, &user_id, req.status)
        .await
        .map(Json)
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> DispatchResult<Json<UserResponse>> {
    let token = bearer_token(&headers)?;
    state.user_service.get_user(&token, &user_id).await.map(Json)
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> DispatchResult<Json<Vec<UserResponse>>> {
    let token = bearer_token(&headers)?;
    state.user_service.list_users(&token).await.map(Json)
}
