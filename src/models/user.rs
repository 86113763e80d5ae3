// src/models/user.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::GeoPoint;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,   // Platform administrator
    Manager, // Agency manager ("gestor"): reviews settlements, manages accounts
    Driver,
    Client,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Pending,  // Registered, waiting for manager approval
    Active,
    Expelled, // Removed from the platform by rule or by a manager
}

/// Identity fields shared by every role.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserBase {
    pub id: String,
    pub username: String,
    // Stored and compared in plaintext; hardening is out of scope here.
    pub password: String,
    pub full_name: String,
    pub phone: String,
    pub national_id: String,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VehicleInfo {
    /// Air conditioning available.
    pub ac: bool,
    /// Seat capacity, driver included.
    pub capacity: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_license_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circulation_card_url: Option<String>,
}

impl Default for VehicleInfo {
    fn default() -> Self {
        Self {
            ac: true,
            capacity: 4,
            vehicle_photo_url: None,
            driver_license_url: None,
            circulation_card_url: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminUser {
    #[serde(flatten)]
    pub base: UserBase,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ManagerUser {
    #[serde(flatten)]
    pub base: UserBase,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClientUser {
    #[serde(flatten)]
    pub base: UserBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_card_front_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_card_back_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DriverUser {
    #[serde(flatten)]
    pub base: UserBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_card_front_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_card_back_url: Option<String>,
    pub vehicle: VehicleInfo,
    /// Willing to take rides right now.
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    /// 0-100, complaints subtract from it.
    pub reputation: u8,
    /// Commission debt accumulated since the last approved settlement.
    pub earnings_since_last_settlement: f64,
    pub last_settlement_at: DateTime<Utc>,
    pub complaints_count: u32,
}

/// Role-tagged user record. One variant per role, shared base embedded.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum User {
    Admin(AdminUser),
    Manager(ManagerUser),
    Driver(DriverUser),
    Client(ClientUser),
}

impl User {
    pub fn base(&self) -> &UserBase {
        match self {
            User::Admin(u) => &u.base,
            User::Manager(u) => &u.base,
            User::Driver(u) => &u.base,
            User::Client(u) => &u.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut UserBase {
        match self {
            User::Admin(u) => &mut u.base,
            User::Manager(u) => &mut u.base,
            User::Driver(u) => &mut u.base,
            User::Client(u) => &mut u.base,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            User::Admin(_) => Role::Admin,
            User::Manager(_) => Role::Manager,
            User::Driver(_) => Role::Driver,
            User::Client(_) => Role::Client,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    pub fn username(&self) -> &str {
        &self.base().username
    }

    pub fn status(&self) -> UserStatus {
        self.base().status
    }

    pub fn as_driver(&self) -> Option<&DriverUser> {
        match self {
            User::Driver(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_driver_mut(&mut self) -> Option<&mut DriverUser> {
        match self {
            User::Driver(d) => Some(d),
            _ => None,
        }
    }
}

// Request/Response Models

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Optional role filter: the login form knows which portal it serves.
    pub role: Option<Role>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClientRegistration {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub phone: String,
    pub national_id: String,
    pub id_card_front_url: Option<String>,
    pub id_card_back_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DriverRegistration {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub phone: String,
    pub national_id: String,
    pub vehicle: VehicleInfo,
    pub id_card_front_url: Option<String>,
    pub id_card_back_url: Option<String>,
}

/// Manager/admin account creation. Driver-specific defaults are filled by
/// the engine; only the vehicle descriptor can be supplied up front.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub role: Role,
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub phone: String,
    pub national_id: String,
    pub status: Option<UserStatus>,
    pub vehicle: Option<VehicleInfo>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub status: Option<UserStatus>,
    pub vehicle: Option<VehicleInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetStatusRequest {
    pub status: UserStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityUpdate {
    pub available: bool,
    pub location: Option<GeoPoint>,
}

/// Driver-only fields exposed to the presentation layer.
#[derive(Debug, Serialize, Deserialize)]
pub struct DriverProfile {
    pub vehicle: VehicleInfo,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    pub reputation: u8,
    pub earnings_since_last_settlement: f64,
    pub last_settlement_at: DateTime<Utc>,
    pub complaints_count: u32,
}

/// User as rendered to callers: never carries the password.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub full_name: String,
    pub phone: String,
    pub national_id: String,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<DriverProfile>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        let base = user.base();
        Self {
            id: base.id.clone(),
            username: base.username.clone(),
            role: user.role(),
            full_name: base.full_name.clone(),
            phone: base.phone.clone(),
            national_id: base.national_id.clone(),
            status: base.status,
            created_at: base.created_at,
            driver: user.as_driver().map(|d| DriverProfile {
                vehicle: d.vehicle.clone(),
                available: d.available,
                location: d.location,
                reputation: d.reputation,
                earnings_since_last_settlement: d.earnings_since_last_settlement,
                last_settlement_at: d.last_settlement_at,
                complaints_count: d.complaints_count,
            }),
        }
    }
}
