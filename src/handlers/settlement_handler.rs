// src/handlers/settlement_handler.rs
use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use std::sync::Arc;

use crate::{
    errors::DispatchResult,
    handlers::bearer_token,
    models::{CommandReceipt, RejectSettlementRequest, Settlement, SettlementRequest},
    services::settlement_service::SettlementOperations,
    state::AppState,
};

pub async fn request_settlement(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<SettlementRequest>,
) -> DispatchResult<Json<CommandReceipt>> {
    let token = bearer_token(&headers)?;
    state
        .settlement_service
        .request_settlement(&token, req)
        .await
        .map(Json)
}

pub async fn approve_settlement(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(settlement_id): Path<String>,
) -> DispatchResult<Json<Settlement>> {
    let token = bearer_token(&headers)?;
    state
        .settlement_service
        .approve_settlement(&token, &settlement_id)
        .await
        .map(Json)
}

pub async fn reject_settlement(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(settlement_id): Path<String>,
    Json(req): Json<RejectSettlementRequest>,
) -> DispatchResult<Json<Settlement>> {
    let token = bearer_token(&headers)?;
    state
        .settlement_service
        .reject_settlement(&token, &settlement_id, req)
        .await
        .map(Json)
}

pub async fn list_settlements(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> DispatchResult<Json<Vec<Settlement>>> {
    let token = bearer_token(&headers)?;
    state
        .settlement_service
        .list_settlements(&token)
        .await
        .map(Json)
}
