// src/models/ride.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::GeoPoint;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RideStatus {
    Pending,   // Requested, waiting for a driver
    Accepted,  // A driver took it
    Rejected,  // Turned down while still pending
    Completed, // Driver finished the trip
    Cancelled, // Reserved for a future external cancellation flow
}

impl RideStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RideStatus::Rejected | RideStatus::Completed | RideStatus::Cancelled
        )
    }
}

/// A ride request and its lifecycle. Never deleted: the list is the audit
/// trail. Price, distance and ETA are fixed at request time.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Ride {
    pub id: String,
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<String>,
    /// Driver the client asked for. Advisory: that driver still has to accept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_driver_id: Option<String>,
    pub status: RideStatus,
    pub pickup_address: String,
    pub pickup_point: GeoPoint,
    pub destination_address: String,
    pub destination_point: GeoPoint,
    pub distance_km: f64,
    pub price: f64,
    pub eta_min: u32,
    /// Client flagged stops or detours along the way.
    pub has_route_changes: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

// Request Models

#[derive(Debug, Serialize, Deserialize)]
pub struct RideRequest {
    pub pickup_address: String,
    pub pickup_point: GeoPoint,
    pub destination_address: String,
    pub destination_point: GeoPoint,
    pub has_route_changes: bool,
    pub preferred_driver_id: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AcceptRideRequest {
    /// Where the driver was when accepting, recorded on their profile.
    pub location: Option<GeoPoint>,
}
