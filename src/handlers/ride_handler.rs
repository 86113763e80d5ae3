// src/handlers/ride_handler.rs
use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use std::sync::Arc;

use crate::{
    errors::DispatchResult,
    handlers::bearer_token,
    models::{AcceptRideRequest, CommandReceipt, Ride, RideRequest},
    services::ride_service::RideOperations,
    state::AppState,
};

pub async fn request_ride(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<RideRequest>,
) -> DispatchResult<Json<CommandReceipt>> {
    let token = bearer_token(&headers)?;
    state.ride_service.request_ride(&token, req).await.map(Json)
}

pub async fn accept_ride(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(ride_id): Path<String>,
    Json(req): Json<AcceptRideRequest>,
) -> DispatchResult<Json<Ride>> {
    let token = bearer_token(&headers)?;
    state
        .ride_service
        .accept_ride(&token, &ride_id, req.location)
        .await
        .map(Json)
}

pub async fn reject_ride(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(ride_id): Path<String>,
) -> DispatchResult<Json<Ride>> {
    let token = bearer_token(&headers)?;
    state
        .ride_service
        .reject_ride(&token, &ride_id)
        .await
        .map(Json)
}

pub async fn complete_ride(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(ride_id): Path<String>,
) -> DispatchResult<Json<Ride>> {
    let token = bearer_token(&headers)?;
    state
        .ride_service
        .complete_ride(&token, &ride_id)
        .await
        .map(Json)
}

pub async fn get_ride(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(ride_id): Path<String>,
) -> DispatchResult<Json<Ride>> {
    let token = bearer_token(&headers)?;
    state.ride_service.get_ride(&token, &ride_id).await.map(Json)
}

pub async fn list_rides(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> DispatchResult<Json<Vec<Ride>>> {
    let token = bearer_token(&headers)?;
    state.ride_service.list_rides(&token).await.map(Json)
}
