// src/services/automation.rs
use chrono::{DateTime, Utc};
use tracing;

use crate::models::UserStatus;
use crate::services::store_service::StoreState;

/// Post-mutation consistency pass. Runs inside the store update that
/// triggered it (commission credit, settlement approval, settings change),
/// so expulsions land in the same atomic snapshot replace.
///
/// For every driver:
///  (a) unpaid balance aged past the settlement period -> expelled;
///  (b) otherwise, reputation already under the threshold -> expelled.
/// Never reinstates anyone; reinstatement is an explicit manager action.
/// Idempotent: a second pass with no intervening mutation changes nothing.
pub fn sweep(state: &mut StoreState, now: DateTime<Utc>) -> usize {
    let period_days = state.settings.settlement_period_days;
    let threshold = state.settings.reputation_threshold;
    let mut expelled = 0;

    for user in &mut state.users {
        let Some(driver) = user.as_driver_mut() else {
            continue;
        };

        let days_since_settlement = (now - driver.last_settlement_at).num_days();
        if driver.earnings_since_last_settlement > 0.0 && days_since_settlement >= period_days
        {
            if driver.base.status != UserStatus::Expelled {
                tracing::info!(
                    "Expelling driver {} ({} days of unpaid balance)",
                    driver.base.id,
                    days_since_settlement
                );
                expelled += 1;
            }
            driver.base.status = UserStatus::Expelled;
            driver.available = false;
            continue;
        }

        if driver.reputation < threshold && driver.base.status != UserStatus::Expelled {
            tracing::info!(
                "Expelling driver {} (reputation {} below threshold {})",
                driver.base.id,
                driver.reputation,
                threshold
            );
            driver.base.status = UserStatus::Expelled;
            driver.available = false;
            expelled += 1;
        }
    }

    expelled
}
