// src/services/settings_service.rs
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing;

use crate::{
    errors::DispatchResult,
    models::{AppSettings, Role, SettingsUpdate},
    services::{automation, store_service::StoreService, user_service::UserService},
};

#[async_trait]
pub trait SettingsOperations: Send + Sync {
    /// Any authenticated caller may read the settings: the client UI shows
    /// tariffs, drivers need the payment instructions.
    async fn get_settings(&self, token: &str) -> DispatchResult<AppSettings>;
    async fn update_settings(
        &self,
        token: &str,
        update: SettingsUpdate,
    ) -> DispatchResult<AppSettings>;
}

pub struct SettingsService {
    store: Arc<StoreService>,
    users: Arc<UserService>,
}

impl SettingsService {
    pub fn new(store: Arc<StoreService>, users: Arc<UserService>) -> Self {
        Self { store, users }
    }
}

#[async_trait]
impl SettingsOperations for SettingsService {
    async fn get_settings(&self, token: &str) -> DispatchResult<AppSettings> {
        self.users.authenticate(token).await?;
        Ok(self.store.read(|state| state.settings.clone()).await)
    }

    async fn update_settings(
        &self,
        token: &str,
        update: SettingsUpdate,
    ) -> DispatchResult<AppSettings> {
        self.users
            .require_role(token, &[Role::Manager, Role::Admin])
            .await?;

        Ok(self
            .store
            .update(|state| {
                state.settings.apply(update);
                tracing::info!(
                    "Settings updated (tariff {}, threshold {})",
                    state.settings.tariff_per_km,
                    state.settings.reputation_threshold
                );
                // A tighter threshold or shorter period may expel someone
                // right away.
                automation::sweep(state, Utc::now());
                state.settings.clone()
            })
            .await)
    }
}
