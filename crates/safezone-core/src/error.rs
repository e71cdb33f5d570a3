//! Core error types for safezone-core.
//!
//! Every failure the trigger flow can hit is terminal to the operation that
//! produced it. None are retried; all of them can be rendered as a
//! user-facing [`Notice`].

use std::path::PathBuf;
use thiserror::Error;

use crate::platform::Notice;

/// Core error type for safezone-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Trigger cycle errors
    #[error(transparent)]
    Trigger(#[from] TriggerError),

    /// Location acquisition errors
    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    /// Contact storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Detector bridge errors
    #[error("Detector error: {0}")]
    Detector(#[from] DetectorError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which precondition blocked a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreconditionKind {
    MissingLocation,
    MissingContact,
}

/// Failures of `trigger()` and of the escalation at the end of a countdown.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TriggerError {
    /// Location or contact missing; nothing was sent.
    #[error("trigger precondition failed: {0:?}")]
    Precondition(PreconditionKind),

    /// A cycle is already sending or counting down.
    #[error("an emergency cycle is already in progress")]
    AlreadyInProgress,

    /// The messaging transport is absent on this device.
    #[error("messaging transport is not available")]
    ChannelUnavailable,

    /// The transport was available but the send failed.
    #[error("failed to send alert message: {0}")]
    SendFailure(String),

    /// The call request could not be opened.
    #[error("failed to place emergency call: {0}")]
    EscalationFailure(String),
}

impl TriggerError {
    /// The blocking notice shown to the user for this failure.
    pub fn notice(&self) -> Notice {
        match self {
            TriggerError::Precondition(PreconditionKind::MissingLocation) => {
                Notice::new("Error", "Location not available.")
            }
            TriggerError::Precondition(PreconditionKind::MissingContact) => {
                Notice::new("Missing Contact", "Please set your emergency contact.")
            }
            TriggerError::AlreadyInProgress => Notice::new(
                "Already Triggered",
                "An emergency alert is already in progress.",
            ),
            TriggerError::ChannelUnavailable => {
                Notice::new("SMS Not Available", "Your device does not support SMS.")
            }
            TriggerError::SendFailure(_) => {
                Notice::new("Error", "An error occurred while sending the SMS.")
            }
            TriggerError::EscalationFailure(_) => {
                Notice::new("Error", "Calling not supported on this device.")
            }
        }
    }
}

/// Location-provider errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    /// The user declined the location permission prompt
    #[error("location permission denied")]
    PermissionDenied,

    /// Position fetch failed
    #[error("current position unavailable: {0}")]
    Unavailable(String),
}

impl LocationError {
    pub fn notice(&self) -> Notice {
        match self {
            LocationError::PermissionDenied => {
                Notice::new("Permission Denied", "Location permission is required.")
            }
            LocationError::Unavailable(_) => Notice::new("Error", "Location not available."),
        }
    }
}

/// Contact-store errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the store
    #[error("Failed to open contact store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Store is locked by another process
    #[error("Contact store is locked")]
    Locked,

    /// Rejected input
    #[error("Invalid contact: {0}")]
    InvalidContact(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Detector-bridge errors seen by the sandbox side.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectorError {
    /// The host closed the bridge
    #[error("detector bridge is closed")]
    Closed,

    /// The bounded channel is full
    #[error("detector bridge is full, payload dropped")]
    Full,
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseBusy
                    || e.code == rusqlite::ErrorCode::DatabaseLocked
                {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
