// src/handlers/complaint_handler.rs
use axum::{Json, extract::State, http::HeaderMap};
use std::sync::Arc;

use crate::{
    errors::DispatchResult,
    handlers::bearer_token,
    models::{CommandReceipt, Complaint, FileComplaintRequest},
    services::complaint_service::ComplaintOperations,
    state::AppState,
};

pub async fn file_complaint(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<FileComplaintRequest>,
) -> DispatchResult<Json<CommandReceipt>> {
    let token = bearer_token(&headers)?;
    state
        .complaint_service
        .file_complaint(&token, req)
        .await
        .map(Json)
}

pub async fn list_complaints(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> DispatchResult<Json<Vec<Complaint>>> {
    let token = bearer_token(&headers)?;
    state
        .complaint_service
        .list_complaints(&token)
        .await
        .map(Json)
}
