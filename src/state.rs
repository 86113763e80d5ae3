// src/state.rs
use std::path::PathBuf;
use std::sync::Arc;

use crate::services::{
    complaint_service::ComplaintService, driver_service::DriverService,
    ride_service::RideService, settings_service::SettingsService,
    settlement_service::SettlementService, store_service::StoreService,
    user_service::UserService,
};

pub struct AppState {
    pub store: Arc<StoreService>,
    pub user_service: Arc<UserService>,
    pub driver_service: Arc<DriverService>,
    pub ride_service: Arc<RideService>,
    pub complaint_service: Arc<ComplaintService>,
    pub settlement_service: Arc<SettlementService>,
    pub settings_service: Arc<SettingsService>,
    pub config: AppConfig,
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Where the host wants the state document written; None keeps the
    /// engine purely in memory.
    pub snapshot_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("PALTAXI_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            snapshot_path: std::env::var("PALTAXI_SNAPSHOT_PATH")
                .ok()
                .map(PathBuf::from),
        }
    }
}

impl AppState {
    pub async fn new(config: AppConfig) -> Self {
        let store = Arc::new(StoreService::open(config.snapshot_path.clone()).await);
        let user_service = Arc::new(UserService::new(store.clone()));
        let driver_service = Arc::new(DriverService::new(store.clone(), user_service.clone()));
        let ride_service = Arc::new(RideService::new(store.clone(), user_service.clone()));
        let complaint_service =
            Arc::new(ComplaintService::new(store.clone(), user_service.clone()));
        let settlement_service =
            Arc::new(SettlementService::new(store.clone(), user_service.clone()));
        let settings_service =
            Arc::new(SettingsService::new(store.clone(), user_service.clone()));

        Self {
            store,
            user_service,
            driver_service,
            ride_service,
            complaint_service,
            settlement_service,
            settings_service,
            config,
        }
    }

    /// In-memory engine with no snapshot file; used by tests and embedders
    /// that manage persistence themselves.
    pub async fn in_memory() -> Self {
        Self::new(AppConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            snapshot_path: None,
        })
        .await
    }
}
