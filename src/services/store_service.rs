// src/services/store_service.rs
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing;

use crate::models::{
    AdminUser, AppSettings, Complaint, ManagerUser, Ride, Settlement, User, UserBase,
    UserStatus,
};

pub const SEED_ADMIN_ID: &str = "u_admin";
pub const SEED_MANAGER_ID: &str = "u_gestor";

const SNAPSHOT_VERSION: u32 = 1;

/// All engine-owned collections plus the global settings. Commands mutate
/// this through `StoreService::update` only.
#[derive(Debug, Clone)]
pub struct StoreState {
    pub users: Vec<User>,
    pub rides: Vec<Ride>,
    pub complaints: Vec<Complaint>,
    pub settlements: Vec<Settlement>,
    pub settings: AppSettings,
}

impl StoreState {
    pub fn seeded() -> Self {
        Self {
            users: seed_users(),
            rides: Vec::new(),
            complaints: Vec::new(),
            settlements: Vec::new(),
            settings: AppSettings::default(),
        }
    }

    pub fn user(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id() == user_id)
    }

    pub fn user_mut(&mut self, user_id: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id() == user_id)
    }

    pub fn username_taken(&self, username: &str) -> bool {
        self.users.iter().any(|u| u.username() == username)
    }

    pub fn ride(&self, ride_id: &str) -> Option<&Ride> {
        self.rides.iter().find(|r| r.id == ride_id)
    }

    pub fn ride_mut(&mut self, ride_id: &str) -> Option<&mut Ride> {
        self.rides.iter_mut().find(|r| r.id == ride_id)
    }

    pub fn settlement(&self, settlement_id: &str) -> Option<&Settlement> {
        self.settlements.iter().find(|s| s.id == settlement_id)
    }

    pub fn settlement_mut(&mut self, settlement_id: &str) -> Option<&mut Settlement> {
        self.settlements.iter_mut().find(|s| s.id == settlement_id)
    }
}

/// The two accounts the platform ships with. They can never be deleted.
fn seed_users() -> Vec<User> {
    let now = Utc::now();
    let admin = User::Admin(AdminUser {
        base: UserBase {
            id: SEED_ADMIN_ID.to_string(),
            username: "admin".to_string(),
            password: "admin".to_string(),
            full_name: "Pal Taxi Administrator".to_string(),
            phone: "00000000".to_string(),
            national_id: "N/A".to_string(),
            status: UserStatus::Active,
            created_at: now,
        },
    });
    let manager = User::Manager(ManagerUser {
        base: UserBase {
            id: SEED_MANAGER_ID.to_string(),
            username: "gestor".to_string(),
            password: "gestor".to_string(),
            full_name: "General Manager".to_string(),
            phone: "00000001".to_string(),
            national_id: "N/A".to_string(),
            status: UserStatus::Active,
            created_at: now,
        },
    });
    vec![admin, manager]
}

/// Versioned document the host persists and hands back on startup.
/// Every field defaults so partially-written or older documents load.
#[derive(Debug, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub rides: Vec<Ride>,
    #[serde(default)]
    pub complaints: Vec<Complaint>,
    #[serde(default)]
    pub settlements: Vec<Settlement>,
    #[serde(default)]
    pub settings: Option<AppSettings>,
    /// Legacy single-session field; accepted and ignored (the engine keeps
    /// a token-based session registry instead).
    #[serde(default)]
    pub current_user: Option<User>,
}

impl StateSnapshot {
    pub fn from_state(state: &StoreState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            users: state.users.clone(),
            rides: state.rides.clone(),
            complaints: state.complaints.clone(),
            settlements: state.settlements.clone(),
            settings: Some(state.settings.clone()),
            current_user: None,
        }
    }

    /// Normalize into a usable state: the four collections always exist and
    /// the seed accounts come back whenever the user list is missing.
    pub fn migrate(self) -> StoreState {
        let users = if self.users.is_empty() {
            seed_users()
        } else {
            self.users
        };
        StoreState {
            users,
            rides: self.rides,
            complaints: self.complaints,
            settlements: self.settlements,
            settings: self.settings.unwrap_or_default(),
        }
    }
}

/// Owns the single shared state. Every command reads the latest snapshot,
/// computes the next one and replaces it atomically under the write lock;
/// commands are effectively serialized.
pub struct StoreService {
    state: RwLock<StoreState>,
    snapshot_path: Option<PathBuf>,
}

impl StoreService {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::seeded()),
            snapshot_path: None,
        }
    }

    /// Open a store backed by a snapshot file. A missing or unreadable file
    /// falls back to the seeded state; persistence failures later on are
    /// logged, never fatal (durability is the host's concern).
    pub async fn open(snapshot_path: Option<PathBuf>) -> Self {
        let state = match &snapshot_path {
            Some(path) => match tokio::fs::read(path).await {
                Ok(bytes) => match serde_json::from_slice::<StateSnapshot>(&bytes) {
                    Ok(snapshot) => {
                        tracing::info!("Loaded store snapshot from {}", path.display());
                        snapshot.migrate()
                    }
                    Err(err) => {
                        tracing::warn!("Snapshot at {} is unreadable: {}", path.display(), err);
                        StoreState::seeded()
                    }
                },
                Err(_) => {
                    tracing::info!("No snapshot at {}, starting fresh", path.display());
                    StoreState::seeded()
                }
            },
            None => StoreState::seeded(),
        };

        Self {
            state: RwLock::new(state),
            snapshot_path,
        }
    }

    pub async fn read<R>(&self, f: impl FnOnce(&StoreState) -> R) -> R {
        let state = self.state.read().await;
        f(&state)
    }

    /// Apply one atomic mutation, then persist the resulting snapshot
    /// best-effort. The closure runs under the write lock: whatever it
    /// reads is the latest state, whatever it writes is one replace.
    pub async fn update<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let (out, snapshot) = {
            let mut state = self.state.write().await;
            let out = f(&mut state);
            let snapshot = self
                .snapshot_path
                .is_some()
                .then(|| StateSnapshot::from_state(&state));
            (out, snapshot)
        };

        if let (Some(path), Some(snapshot)) = (&self.snapshot_path, snapshot) {
            match serde_json::to_vec_pretty(&snapshot) {
                Ok(bytes) => {
                    if let Err(err) = tokio::fs::write(path, bytes).await {
                        tracing::warn!("Failed to persist snapshot: {}", err);
                    }
                }
                Err(err) => tracing::warn!("Failed to serialize snapshot: {}", err),
            }
        }

        out
    }

    /// Point-in-time copy for the host to store or display.
    pub async fn snapshot(&self) -> StateSnapshot {
        self.read(StateSnapshot::from_state).await
    }
}

impl Default for StoreService {
    fn default() -> Self {
        Self::new()
    }
}
