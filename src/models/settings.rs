// src/models/settings.rs
use serde::{Deserialize, Serialize};

/// Payment instructions shown to drivers when they owe a settlement.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PaymentSettings {
    #[serde(default = "defaults::beneficiary_name")]
    pub beneficiary_name: String,
    #[serde(default = "defaults::card_number")]
    pub card_number: String,
    #[serde(default = "defaults::payment_phone")]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            beneficiary_name: defaults::beneficiary_name(),
            card_number: defaults::card_number(),
            phone: defaults::payment_phone(),
            bank_name: Some("Banco Ejemplo".to_string()),
            instructions: Some(
                "Include your username as the transfer reference.".to_string(),
            ),
        }
    }
}

/// Global configuration, mutable by manager/admin only. Commission and
/// settlement period are fixed by product rule (10% / 15 days) but stored
/// as plain fields like everything else.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppSettings {
    #[serde(default = "defaults::tariff_per_km")]
    pub tariff_per_km: f64,
    /// Reputation below this expels the driver (0-100).
    #[serde(default = "defaults::reputation_threshold")]
    pub reputation_threshold: u8,
    #[serde(default = "defaults::commission_percent")]
    pub commission_percent: f64,
    #[serde(default = "defaults::settlement_period_days")]
    pub settlement_period_days: i64,
    #[serde(default)]
    pub payment: PaymentSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            tariff_per_km: defaults::tariff_per_km(),
            reputation_threshold: defaults::reputation_threshold(),
            commission_percent: defaults::commission_percent(),
            settlement_period_days: defaults::settlement_period_days(),
            payment: PaymentSettings::default(),
        }
    }
}

/// Shallow merge: only the provided fields change; `payment` replaces as a
/// whole object (the settings form submits it complete).
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub tariff_per_km: Option<f64>,
    pub reputation_threshold: Option<u8>,
    pub commission_percent: Option<f64>,
    pub settlement_period_days: Option<i64>,
    pub payment: Option<PaymentSettings>,
}

impl AppSettings {
    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(tariff) = update.tariff_per_km {
            self.tariff_per_km = tariff;
        }
        if let Some(threshold) = update.reputation_threshold {
            self.reputation_threshold = threshold.min(100);
        }
        if let Some(commission) = update.commission_percent {
            self.commission_percent = commission;
        }
        if let Some(days) = update.settlement_period_days {
            self.settlement_period_days = days;
        }
        if let Some(payment) = update.payment {
            self.payment = payment;
        }
    }
}

mod defaults {
    pub fn tariff_per_km() -> f64 {
        60.0 // CUP per km
    }

    pub fn reputation_threshold() -> u8 {
        50
    }

    pub fn commission_percent() -> f64 {
        10.0
    }

    pub fn settlement_period_days() -> i64 {
        15
    }

    pub fn beneficiary_name() -> String {
        "Pal Taxi Agencia".to_string()
    }

    pub fn card_number() -> String {
        "0000 0000 0000 0000".to_string()
    }

    pub fn payment_phone() -> String {
        "+53 50000000".to_string()
    }
}
