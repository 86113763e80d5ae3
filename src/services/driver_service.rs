// src/services/driver_service.rs
use async_trait::async_trait;
use std::sync::Arc;
use tracing;

use crate::{
    errors::{DispatchError, DispatchResult},
    models::{AvailabilityUpdate, Role, UserResponse, UserStatus},
    services::{store_service::StoreService, user_service::UserService},
};

#[async_trait]
pub trait DriverOperations: Send + Sync {
    /// Driver toggles whether they take rides, optionally reporting where
    /// they are.
    async fn set_availability(
        &self,
        token: &str,
        update: AvailabilityUpdate,
    ) -> DispatchResult<UserResponse>;
    /// Active drivers currently taking rides, for the client's
    /// preferred-driver picker.
    async fn available_drivers(&self, token: &str) -> DispatchResult<Vec<UserResponse>>;
}

pub struct DriverService {
    store: Arc<StoreService>,
    users: Arc<UserService>,
}

impl DriverService {
    pub fn new(store: Arc<StoreService>, users: Arc<UserService>) -> Self {
        Self { store, users }
    }
}

#[async_trait]
impl DriverOperations for DriverService {
    async fn set_availability(
        &self,
        token: &str,
        update: AvailabilityUpdate,
    ) -> DispatchResult<UserResponse> {
        let me = self.users.require_role(token, &[Role::Driver]).await?;

        tracing::debug!(
            "Driver {} set availability to {}",
            me.id(),
            update.available
        );

        self.store
            .update(|state| {
                let user = state
                    .user_mut(me.id())
                    .ok_or_else(|| DispatchError::user_not_found(me.id()))?;
                let driver = user
                    .as_driver_mut()
                    .ok_or_else(|| DispatchError::unauthorized("not a driver account"))?;

                driver.available = update.available;
                if let Some(location) = update.location {
                    driver.location = Some(location);
                }
                Ok(UserResponse::from(&*user))
            })
            .await
    }

    async fn available_drivers(&self, token: &str) -> DispatchResult<Vec<UserResponse>> {
        self.users.authenticate(token).await?;

        Ok(self
            .store
            .read(|state| {
                state
                    .users
                    .iter()
                    .filter(|u| {
                        u.as_driver().is_some_and(|d| {
                            d.available && d.base.status == UserStatus::Active
                        })
                    })
                    .map(UserResponse::from)
                    .collect()
            })
            .await)
    }
}
