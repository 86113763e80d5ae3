// src/handlers/settings_handler.rs
use axum::{Json, extract::State, http::HeaderMap};
use std::sync::Arc;

use crate::{
    errors::DispatchResult,
    handlers::bearer_token,
    models::{AppSettings, Role, SettingsUpdate},
    services::{settings_service::SettingsOperations, store_service::StateSnapshot},
    state::AppState,
};

pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> DispatchResult<Json<AppSettings>> {
    let token = bearer_token(&headers)?;
    state.settings_service.get_settings(&token).await.map(Json)
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<SettingsUpdate>,
) -> DispatchResult<Json<AppSettings>> {
    let token = bearer_token(&headers)?;
    state
        .settings_service
        .update_settings(&token, req)
        .await
        .map(Json)
}

/// The versioned state document, as the host would persist it.
pub async fn export_snapshot(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> DispatchResult<Json<StateSnapshot>> {
    let token = bearer_token(&headers)?;
    state
        .user_service
        .require_role(&token, &[Role::Manager, Role::Admin])
        .await?;
    Ok(Json(state.store.snapshot().await))
}
