// src/handlers/driver_handler.rs
use axum::{Json, extract::State, http::HeaderMap};
use std::sync::Arc;

use crate::{
    errors::DispatchResult,
    handlers::bearer_token,
    models::{AvailabilityUpdate, UserResponse},
    services::driver_service::DriverOperations,
    state::AppState,
};

pub async fn set_availability(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<AvailabilityUpdate>,
) -> DispatchResult<Json<UserResponse>> {
    let token = bearer_token(&headers)?;
    state
        .driver_service
        .set_availability(&token, req)
        .await
        .map(Json)
}

pub async fn available_drivers(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> DispatchResult<Json<Vec<UserResponse>>> {
    let token = bearer_token(&headers)?;
    state
        .driver_service
        .available_drivers(&token)
        .await
        .map(Json)
}
