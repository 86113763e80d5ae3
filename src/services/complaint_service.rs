// src/services/complaint_service.rs
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing;

use crate::{
    errors::{DispatchError, DispatchResult},
    models::{CommandReceipt, Complaint, FileComplaintRequest, RideStatus, Role, UserStatus},
    services::{store_service::StoreService, user_service::UserService},
    utils::id_generator::{IdGenerator, IdType},
};

/// Each complaint knocks this many points off the driver's current score.
const COMPLAINT_PENALTY: u8 = 8;

#[async_trait]
pub trait ComplaintOperations: Send + Sync {
    async fn file_complaint(
        &self,
        token: &str,
        req: FileComplaintRequest,
    ) -> DispatchResult<CommandReceipt>;
    async fn list_complaints(&self, token: &str) -> DispatchResult<Vec<Complaint>>;
}

pub struct ComplaintService {
    store: Arc<StoreService>,
    users: Arc<UserService>,
}

impl ComplaintService {
    pub fn new(store: Arc<StoreService>, users: Arc<UserService>) -> Self {
        Self { store, users }
    }
}

#[async_trait]
impl ComplaintOperations for ComplaintService {
    async fn file_complaint(
        &self,
        token: &str,
        req: FileComplaintRequest,
    ) -> DispatchResult<CommandReceipt> {
        let me = self.users.require_role(token, &[Role::Client]).await?;

        if !IdGenerator::validate(&req.ride_id, Some(IdType::Ride)) {
            tracing::warn!("Invalid ride ID format: {}", req.ride_id);
            return Err(DispatchError::ride_not_found(&req.ride_id));
        }

        self.store
            .update(|state| {
                let threshold = state.settings.reputation_threshold;

                let ride = state
                    .ride(&req.ride_id)
                    .ok_or_else(|| DispatchError::ride_not_found(&req.ride_id))?;
                if ride.client_id != me.id() {
                    return Err(DispatchError::unauthorized(
                        "only the client who took the ride can complain about it",
                    ));
                }
                if ride.status != RideStatus::Completed {
                    return Err(DispatchError::conflict(
                        "complaints apply to completed rides only",
                    ));
                }
                let driver_id = ride
                    .driver_id
                    .clone()
                    .ok_or_else(|| DispatchError::conflict("ride has no assigned driver"))?;

                let complaint = Complaint {
                    id: IdGenerator::generate(IdType::Complaint),
                    ride_id: req.ride_id.clone(),
                    client_id: me.id().to_string(),
                    driver_id: driver_id.clone(),
                    message: req.message.clone(),
                    created_at: Utc::now(),
                };
                let id = complaint.id.clone();
                state.complaints.insert(0, complaint);

                // Flat penalty against the current score, not a recompute
                // from history: clamping would otherwise drift.
                if let Some(driver) = state
                    .user_mut(&driver_id)
                    .and_then(|u| u.as_driver_mut())
                {
                    driver.complaints_count += 1;
                    driver.reputation =
                        driver.reputation.saturating_sub(COMPLAINT_PENALTY).min(100);

                    tracing::info!(
                        "Complaint {} filed against driver {} (reputation now {})",
                        id,
                        driver_id,
                        driver.reputation
                    );

                    // Falling under the threshold expels right here, in the
                    // same snapshot as the complaint.
                    if driver.reputation < threshold {
                        driver.base.status = UserStatus::Expelled;
                        driver.available = false;
                        tracing::info!("Driver {} expelled by reputation", driver_id);
                    }
                }

                Ok(CommandReceipt::created(id))
            })
            .await
    }

    /// Staff see the whole log, clients what they filed, drivers what was
    /// filed against them.
    async fn list_complaints(&self, token: &str) -> DispatchResult<Vec<Complaint>> {
        let me = self.users.authenticate(token).await?;

        Ok(self
            .store
            .read(|state| {
                state
                    .complaints
                    .iter()
                    .filter(|c| match me.role() {
                        Role::Admin | Role::Manager => true,
                        Role::Client => c.client_id == me.id(),
                        Role::Driver => c.driver_id == me.id(),
                    })
                    .cloned()
                    .collect()
            })
            .await)
    }
}
