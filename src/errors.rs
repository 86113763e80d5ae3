// src/errors.rs
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// Main error type for the dispatch engine. Every public command validates
/// its own preconditions and returns one of these; nothing here is fatal to
/// the process.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchError {
    // Role / session errors
    Unauthorized(String),

    // Missing references
    NotFound(String),
    UserNotFound(String),
    RideNotFound(String),
    SettlementNotFound(String),

    // State conflicts
    Conflict(String),
    DuplicateUsername(String),
    RideNotPending,
    RideNotAccepted,
    NotAssignedDriver,
    DriverNotAvailable,
    SettlementAlreadyReviewed,
    SeedAccountProtected,
    SelfDeletion,

    // Input validation
    InvalidInput(String),
    NoBalance,
    MissingEvidence,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),

            DispatchError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DispatchError::UserNotFound(id) => write!(f, "User not found: {}", id),
            DispatchError::RideNotFound(id) => write!(f, "Ride not found: {}", id),
            DispatchError::SettlementNotFound(id) => {
                write!(f, "Settlement not found: {}", id)
            }

            DispatchError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            DispatchError::DuplicateUsername(name) => {
                write!(f, "Username already exists: {}", name)
            }
            DispatchError::RideNotPending => write!(f, "Ride is no longer pending"),
            DispatchError::RideNotAccepted => write!(f, "Ride is not in accepted state"),
            DispatchError::NotAssignedDriver => {
                write!(f, "Ride is assigned to another driver")
            }
            DispatchError::DriverNotAvailable => write!(f, "Driver is not available"),
            DispatchError::SettlementAlreadyReviewed => {
                write!(f, "Settlement was already reviewed")
            }
            DispatchError::SeedAccountProtected => {
                write!(f, "This account cannot be deleted")
            }
            DispatchError::SelfDeletion => write!(f, "You cannot delete your own account"),

            DispatchError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            DispatchError::NoBalance => write!(f, "No outstanding balance to settle"),
            DispatchError::MissingEvidence => {
                write!(f, "Payment evidence is required")
            }
        }
    }
}

impl std::error::Error for DispatchError {}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            DispatchError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),

            DispatchError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            DispatchError::UserNotFound(_) => (StatusCode::NOT_FOUND, "user_not_found"),
            DispatchError::RideNotFound(_) => (StatusCode::NOT_FOUND, "ride_not_found"),
            DispatchError::SettlementNotFound(_) => {
                (StatusCode::NOT_FOUND, "settlement_not_found")
            }

            DispatchError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            DispatchError::DuplicateUsername(_) => {
                (StatusCode::CONFLICT, "duplicate_username")
            }
            DispatchError::RideNotPending => (StatusCode::CONFLICT, "ride_not_pending"),
            DispatchError::RideNotAccepted => (StatusCode::CONFLICT, "ride_not_accepted"),
            DispatchError::NotAssignedDriver => {
                (StatusCode::CONFLICT, "not_assigned_driver")
            }
            DispatchError::DriverNotAvailable => {
                (StatusCode::CONFLICT, "driver_not_available")
            }
            DispatchError::SettlementAlreadyReviewed => {
                (StatusCode::CONFLICT, "settlement_already_reviewed")
            }
            DispatchError::SeedAccountProtected => {
                (StatusCode::CONFLICT, "seed_account_protected")
            }
            DispatchError::SelfDeletion => (StatusCode::CONFLICT, "self_deletion"),

            DispatchError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            DispatchError::NoBalance => (StatusCode::BAD_REQUEST, "no_balance"),
            DispatchError::MissingEvidence => {
                (StatusCode::BAD_REQUEST, "missing_evidence")
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}

// Convenience type alias for Results
pub type DispatchResult<T> = Result<T, DispatchError>;

// Helper functions for creating common errors
impl DispatchError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        DispatchError::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        DispatchError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        DispatchError::Conflict(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        DispatchError::InvalidInput(msg.into())
    }

    pub fn user_not_found(id: impl Into<String>) -> Self {
        DispatchError::UserNotFound(id.into())
    }

    pub fn ride_not_found(id: impl Into<String>) -> Self {
        DispatchError::RideNotFound(id.into())
    }

    pub fn settlement_not_found(id: impl Into<String>) -> Self {
        DispatchError::SettlementNotFound(id.into())
    }
}
