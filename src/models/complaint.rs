// src/models/complaint.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client complaint about a completed ride. Append-only; never edited.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Complaint {
    pub id: String,
    pub ride_id: String,
    pub client_id: String,
    pub driver_id: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileComplaintRequest {
    pub ride_id: String,
    pub message: String,
}
