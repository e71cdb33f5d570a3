use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LocationError;

/// A single position fix in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Rounded text for on-screen display. Never used in the alert message.
    pub fn display(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Geolocation provider: a permission gate plus a one-shot position fetch.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn request_permission(&self) -> PermissionStatus;

    async fn current_position(&self) -> Result<Coordinate, LocationError>;
}

/// Provider that always reports the same coordinate.
///
/// Hosts without a GPS (the CLI) supply the position on the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation {
    coordinate: Coordinate,
}

impl FixedLocation {
    pub fn new(coordinate: Coordinate) -> Self {
        Self { coordinate }
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        Ok(self.coordinate)
    }
}
