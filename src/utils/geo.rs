// src/utils/geo.rs
use crate::models::GeoPoint;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Assumed average urban speed used for ETAs.
pub const DEFAULT_SPEED_KMH: f64 = 35.0;

/// Great-circle distance in kilometers between two coordinates (haversine).
/// Inputs are decimal degrees; out-of-range values still produce a number.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lng - a.lng).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let sin_d_lat = (d_lat / 2.0).sin();
    let sin_d_lon = (d_lon / 2.0).sin();
    let h = sin_d_lat * sin_d_lat + lat1.cos() * lat2.cos() * sin_d_lon * sin_d_lon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// ETA in whole minutes for a distance at the given average speed.
/// A non-positive speed yields 0 rather than a division blowup.
pub fn estimate_eta_min(distance_km: f64, speed_kmh: f64) -> u32 {
    if speed_kmh <= 0.0 {
        return 0;
    }
    (distance_km / speed_kmh * 60.0).round() as u32
}
