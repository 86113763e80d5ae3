// src/models/settlement.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    Pending,
    Approved,
    Rejected,
}

/// A driver's request to clear accumulated commission debt, backed by
/// off-platform payment evidence a manager verifies by hand.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settlement {
    pub id: String,
    pub driver_id: String,
    pub amount: f64,
    pub status: SettlementStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

// Request Models

#[derive(Debug, Serialize, Deserialize)]
pub struct SettlementRequest {
    /// Proof-of-payment reference (opaque URL or data reference).
    pub evidence_url: String,
    /// Defaults to the driver's full outstanding balance.
    pub amount: Option<f64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RejectSettlementRequest {
    pub reason: Option<String>,
}
