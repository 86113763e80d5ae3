// src/services/ride_service.rs
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing;

use crate::{
    errors::{DispatchError, DispatchResult},
    models::{CommandReceipt, GeoPoint, Ride, RideRequest, RideStatus, Role, UserStatus},
    services::{automation, store_service::StoreService, user_service::UserService},
    utils::{
        geo::{self, DEFAULT_SPEED_KMH},
        id_generator::{IdGenerator, IdType},
        money,
    },
};

#[async_trait]
pub trait RideOperations: Send + Sync {
    async fn request_ride(&self, token: &str, req: RideRequest) -> DispatchResult<CommandReceipt>;
    async fn accept_ride(
        &self,
        token: &str,
        ride_id: &str,
        location: Option<GeoPoint>,
    ) -> DispatchResult<Ride>;
    async fn reject_ride(&self, token: &str, ride_id: &str) -> DispatchResult<Ride>;
    async fn complete_ride(&self, token: &str, ride_id: &str) -> DispatchResult<Ride>;
    async fn get_ride(&self, token: &str, ride_id: &str) -> DispatchResult<Ride>;
    async fn list_rides(&self, token: &str) -> DispatchResult<Vec<Ride>>;
}

pub struct RideService {
    store: Arc<StoreService>,
    users: Arc<UserService>,
}

impl RideService {
    pub fn new(store: Arc<StoreService>, users: Arc<UserService>) -> Self {
        Self { store, users }
    }
}

#[async_trait]
impl RideOperations for RideService {
    async fn request_ride(&self, token: &str, req: RideRequest) -> DispatchResult<CommandReceipt> {
        let me = self.users.require_role(token, &[Role::Client]).await?;

        let receipt = self
            .store
            .update(|state| {
                // Priced at request time; later tariff changes never touch it.
                let distance_km = money::round2(geo::haversine_km(
                    req.pickup_point,
                    req.destination_point,
                ));
                let price = money::ride_price(distance_km, state.settings.tariff_per_km);
                let eta_min = geo::estimate_eta_min(distance_km, DEFAULT_SPEED_KMH);

                let ride = Ride {
                    id: IdGenerator::generate(IdType::Ride),
                    client_id: me.id().to_string(),
                    driver_id: None,
                    preferred_driver_id: req.preferred_driver_id.clone(),
                    status: RideStatus::Pending,
                    pickup_address: req.pickup_address.clone(),
                    pickup_point: req.pickup_point,
                    destination_address: req.destination_address.clone(),
                    destination_point: req.destination_point,
                    distance_km,
                    price,
                    eta_min,
                    has_route_changes: req.has_route_changes,
                    created_at: Utc::now(),
                    accepted_at: None,
                    completed_at: None,
                };

                let id = ride.id.clone();
                tracing::info!(
                    "Ride requested: {} ({} km, {})",
                    id,
                    distance_km,
                    money::format_currency(price)
                );
                state.rides.insert(0, ride);
                CommandReceipt::created(id)
            })
            .await;

        Ok(receipt)
    }

    async fn accept_ride(
        &self,
        token: &str,
        ride_id: &str,
        location: Option<GeoPoint>,
    ) -> DispatchResult<Ride> {
        let me = self.users.require_role(token, &[Role::Driver]).await?;

        // The whole check-and-set runs under one store update: two drivers
        // racing for the same ride serialize here, and the loser gets a
        // Conflict instead of a silent no-op.
        self.store
            .update(|state| {
                let driver_ok = state
                    .user(me.id())
                    .and_then(|u| u.as_driver())
                    .is_some_and(|d| d.base.status == UserStatus::Active && d.available);
                if !driver_ok {
                    return Err(DispatchError::DriverNotAvailable);
                }

                let ride = state
                    .ride_mut(ride_id)
                    .ok_or_else(|| DispatchError::ride_not_found(ride_id))?;
                if ride.status != RideStatus::Pending {
                    return Err(DispatchError::RideNotPending);
                }
                if ride
                    .preferred_driver_id
                    .as_deref()
                    .is_some_and(|preferred| preferred != me.id())
                {
                    return Err(DispatchError::conflict(
                        "ride is reserved for another driver",
                    ));
                }

                ride.status = RideStatus::Accepted;
                ride.driver_id = Some(me.id().to_string());
                ride.accepted_at = Some(Utc::now());
                let accepted = ride.clone();

                // One active ride at a time.
                if let Some(driver) = state
                    .user_mut(me.id())
                    .and_then(|u| u.as_driver_mut())
                {
                    driver.available = false;
                    if let Some(location) = location {
                        driver.location = Some(location);
                    }
                }

                tracing::info!("Ride {} accepted by driver {}", ride_id, me.id());
                Ok(accepted)
            })
            .await
    }

    async fn reject_ride(&self, token: &str, ride_id: &str) -> DispatchResult<Ride> {
        self.users.require_role(token, &[Role::Driver]).await?;

        self.store
            .update(|state| {
                let ride = state
                    .ride_mut(ride_id)
                    .ok_or_else(|| DispatchError::ride_not_found(ride_id))?;
                if ride.status != RideStatus::Pending {
                    return Err(DispatchError::RideNotPending);
                }
                ride.status = RideStatus::Rejected;
                tracing::info!("Ride rejected: {}", ride_id);
                Ok(ride.clone())
            })
            .await
    }

    async fn complete_ride(&self, token: &str, ride_id: &str) -> DispatchResult<Ride> {
        let me = self.users.require_role(token, &[Role::Driver]).await?;

        self.store
            .update(|state| {
                let commission_percent = state.settings.commission_percent;

                let ride = state
                    .ride_mut(ride_id)
                    .ok_or_else(|| DispatchError::ride_not_found(ride_id))?;
                if ride.driver_id.as_deref() != Some(me.id()) {
                    return Err(DispatchError::NotAssignedDriver);
                }
                if ride.status != RideStatus::Accepted {
                    return Err(DispatchError::RideNotAccepted);
                }

                ride.status = RideStatus::Completed;
                ride.completed_at = Some(Utc::now());
                let completed = ride.clone();

                // Agency keeps its cut; the rest becomes driver debt to
                // settle later.
                let commission = completed.price * commission_percent / 100.0;
                let net = completed.price - commission;
                if let Some(driver) = state
                    .user_mut(me.id())
                    .and_then(|u| u.as_driver_mut())
                {
                    driver.earnings_since_last_settlement =
                        money::round2(driver.earnings_since_last_settlement + net);
                    tracing::info!(
                        "Ride {} completed; driver {} credited {}",
                        ride_id,
                        me.id(),
                        money::format_currency(net)
                    );
                }

                automation::sweep(state, Utc::now());
                Ok(completed)
            })
            .await
    }

    async fn get_ride(&self, token: &str, ride_id: &str) -> DispatchResult<Ride> {
        self.users.authenticate(token).await?;

        self.store
            .read(|state| state.ride(ride_id).cloned())
            .await
            .ok_or_else(|| DispatchError::ride_not_found(ride_id))
    }

    /// Role-gated visibility: clients see their rides, drivers see the open
    /// board plus their own assignments, staff see everything.
    async fn list_rides(&self, token: &str) -> DispatchResult<Vec<Ride>> {
        let me = self.users.authenticate(token).await?;

        Ok(self
            .store
            .read(|state| {
                state
                    .rides
                    .iter()
                    .filter(|ride| match me.role() {
                        Role::Admin | Role::Manager => true,
                        Role::Client => ride.client_id == me.id(),
                        Role::Driver => {
                            let open = ride.status == RideStatus::Pending
                                && ride
                                    .preferred_driver_id
                                    .as_deref()
                                    .is_none_or(|p| p == me.id());
                            open || ride.driver_id.as_deref() == Some(me.id())
                        }
                    })
                    .cloned()
                    .collect()
            })
            .await)
    }
}
