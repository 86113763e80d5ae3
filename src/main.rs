use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use paltaxi_dispatch::{
    handlers::{
        complaint_handler, driver_handler, ride_handler, settings_handler,
        settlement_handler, user_handler,
    },
    state::{AppConfig, AppState},
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    let bind_addr = config.bind_addr.clone();
    let app_state = Arc::new(AppState::new(config).await);

    let app = Router::new()
        // auth & registration
        .route("/auth/login", post(user_handler::login))
        .route("/auth/logout", post(user_handler::logout))
        .route("/register/client", post(user_handler::register_client))
        .route("/register/driver", post(user_handler::register_driver))
        // account administration
        .route(
            "/users",
            get(user_handler::list_users).post(user_handler::create_user),
        )
        .route(
            "/users/:id",
            get(user_handler::get_user)
                .patch(user_handler::update_user)
                .delete(user_handler::delete_user),
        )
        .route("/users/:id/status", put(user_handler::set_user_status))
        // driver presence
        .route("/drivers/availability", post(driver_handler::set_availability))
        .route("/drivers/available", get(driver_handler::available_drivers))
        // ride lifecycle
        .route(
            "/rides",
            get(ride_handler::list_rides).post(ride_handler::request_ride),
        )
        .route("/rides/:id", get(ride_handler::get_ride))
        .route("/rides/:id/accept", post(ride_handler::accept_ride))
        .route("/rides/:id/reject", post(ride_handler::reject_ride))
        .route("/rides/:id/complete", post(ride_handler::complete_ride))
        // complaints
        .route(
            "/complaints",
            get(complaint_handler::list_complaints).post(complaint_handler::file_complaint),
        )
        // settlements
        .route(
            "/settlements",
            get(settlement_handler::list_settlements)
                .post(settlement_handler::request_settlement),
        )
        .route(
            "/settlements/:id/approve",
            post(settlement_handler::approve_settlement),
        )
        .route(
            "/settlements/:id/reject",
            post(settlement_handler::reject_settlement),
        )
        // settings & host storage
        .route(
            "/settings",
            get(settings_handler::get_settings).put(settings_handler::update_settings),
        )
        .route("/snapshot", get(settings_handler::export_snapshot))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    tracing::info!("Dispatch engine listening on {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
