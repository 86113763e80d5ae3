// src/models/mod.rs
pub mod complaint;
pub mod ride;
pub mod settings;
pub mod settlement;
pub mod user;

pub use complaint::*;
pub use ride::*;
pub use settings::*;
pub use settlement::*;
pub use user::*;

use serde::{Deserialize, Serialize};

/// Decimal-degree coordinate pair. No range validation on purpose:
/// garbage in produces a numeric distance, never an error.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Uniform result body for mutating commands.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandReceipt {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CommandReceipt {
    pub fn created(id: impl Into<String>) -> Self {
        Self {
            ok: true,
            id: Some(id.into()),
            message: None,
        }
    }

    pub fn done() -> Self {
        Self {
            ok: true,
            id: None,
            message: None,
        }
    }
}
