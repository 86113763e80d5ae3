// src/services/settlement_service.rs
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing;

use crate::{
    errors::{DispatchError, DispatchResult},
    models::{
        CommandReceipt, RejectSettlementRequest, Role, Settlement, SettlementRequest,
        SettlementStatus,
    },
    services::{automation, store_service::StoreService, user_service::UserService},
    utils::{
        id_generator::{IdGenerator, IdType},
        money,
    },
};

#[async_trait]
pub trait SettlementOperations: Send + Sync {
    async fn request_settlement(
        &self,
        token: &str,
        req: SettlementRequest,
    ) -> DispatchResult<CommandReceipt>;
    async fn approve_settlement(&self, token: &str, settlement_id: &str)
    -> DispatchResult<Settlement>;
    async fn reject_settlement(
        &self,
        token: &str,
        settlement_id: &str,
        req: RejectSettlementRequest,
    ) -> DispatchResult<Settlement>;
    async fn list_settlements(&self, token: &str) -> DispatchResult<Vec<Settlement>>;
}

pub struct SettlementService {
    store: Arc<StoreService>,
    users: Arc<UserService>,
}

impl SettlementService {
    pub fn new(store: Arc<StoreService>, users: Arc<UserService>) -> Self {
        Self { store, users }
    }
}

#[async_trait]
impl SettlementOperations for SettlementService {
    async fn request_settlement(
        &self,
        token: &str,
        req: SettlementRequest,
    ) -> DispatchResult<CommandReceipt> {
        let me = self.users.require_role(token, &[Role::Driver]).await?;

        if req.evidence_url.trim().is_empty() {
            return Err(DispatchError::MissingEvidence);
        }

        self.store
            .update(|state| {
                let driver = state
                    .user(me.id())
                    .and_then(|u| u.as_driver())
                    .ok_or_else(|| DispatchError::user_not_found(me.id()))?;

                let due = req
                    .amount
                    .unwrap_or(driver.earnings_since_last_settlement);
                if due <= 0.0 {
                    return Err(DispatchError::NoBalance);
                }

                let settlement = Settlement {
                    id: IdGenerator::generate(IdType::Settlement),
                    driver_id: me.id().to_string(),
                    amount: money::round2(due),
                    status: SettlementStatus::Pending,
                    evidence_url: Some(req.evidence_url.clone()),
                    created_at: Utc::now(),
                    reviewed_at: None,
                    reviewer_id: None,
                    rejection_reason: None,
                };
                let id = settlement.id.clone();

                tracing::info!(
                    "Settlement {} requested by driver {} for {}",
                    id,
                    me.id(),
                    money::format_currency(settlement.amount)
                );
                state.settlements.insert(0, settlement);
                Ok(CommandReceipt::created(id))
            })
            .await
    }

    async fn approve_settlement(
        &self,
        token: &str,
        settlement_id: &str,
    ) -> DispatchResult<Settlement> {
        let me = self
            .users
            .require_role(token, &[Role::Manager, Role::Admin])
            .await?;

        if !IdGenerator::validate(settlement_id, Some(IdType::Settlement)) {
            tracing::warn!("Invalid settlement ID format: {}", settlement_id);
            return Err(DispatchError::settlement_not_found(settlement_id));
        }

        self.store
            .update(|state| {
                let now = Utc::now();

                let settlement = state
                    .settlement_mut(settlement_id)
                    .ok_or_else(|| DispatchError::settlement_not_found(settlement_id))?;
                if settlement.status != SettlementStatus::Pending {
                    return Err(DispatchError::SettlementAlreadyReviewed);
                }

                settlement.status = SettlementStatus::Approved;
                settlement.reviewed_at = Some(now);
                settlement.reviewer_id = Some(me.id().to_string());
                let approved = settlement.clone();

                // The cut: debt cleared, aging clock restarted. Reputation
                // is not restored; only the aging condition goes away.
                if let Some(driver) = state
                    .user_mut(&approved.driver_id)
                    .and_then(|u| u.as_driver_mut())
                {
                    driver.earnings_since_last_settlement = 0.0;
                    driver.last_settlement_at = now;
                }

                tracing::info!(
                    "Settlement {} approved by {} for driver {}",
                    settlement_id,
                    me.id(),
                    approved.driver_id
                );

                automation::sweep(state, now);
                Ok(approved)
            })
            .await
    }

    async fn reject_settlement(
        &self,
        token: &str,
        settlement_id: &str,
        req: RejectSettlementRequest,
    ) -> DispatchResult<Settlement> {
        let me = self
            .users
            .require_role(token, &[Role::Manager, Role::Admin])
            .await?;

        self.store
            .update(|state| {
                let settlement = state
                    .settlement_mut(settlement_id)
                    .ok_or_else(|| DispatchError::settlement_not_found(settlement_id))?;
                if settlement.status != SettlementStatus::Pending {
                    return Err(DispatchError::SettlementAlreadyReviewed);
                }

                // Balance and aging clock stay as they are: the driver
                // still owes the money.
                settlement.status = SettlementStatus::Rejected;
                settlement.reviewed_at = Some(Utc::now());
                settlement.reviewer_id = Some(me.id().to_string());
                settlement.rejection_reason = req.reason.clone();

                tracing::info!("Settlement {} rejected by {}", settlement_id, me.id());
                Ok(settlement.clone())
            })
            .await
    }

    async fn list_settlements(&self, token: &str) -> DispatchResult<Vec<Settlement>> {
        let me = self.users.authenticate(token).await?;

        Ok(self
            .store
            .read(|state| {
                state
                    .settlements
                    .iter()
                    .filter(|s| match me.role() {
                        Role::Admin | Role::Manager => true,
                        _ => s.driver_id == me.id(),
                    })
                    .cloned()
                    .collect()
            })
            .await)
    }
}
