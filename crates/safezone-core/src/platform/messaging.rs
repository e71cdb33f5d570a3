use async_trait::async_trait;
use thiserror::Error;

use super::location::Coordinate;

const MAPS_BASE: &str = "https://maps.google.com/?q=";

/// Failure reported by a messaging transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ChannelError(pub String);

/// Outbound text-message transport.
#[async_trait]
pub trait AlertChannel: Send + Sync {
    /// Whether the device can send messages at all.
    async fn is_available(&self) -> bool;

    async fn send(&self, recipients: &[String], body: &str) -> Result<(), ChannelError>;
}

/// Build the alert body with a map link at full coordinate precision.
pub fn compose_alert_message(coordinate: &Coordinate) -> String {
    format!(
        "🚨 Emergency! My current location is: {MAPS_BASE}{},{}",
        coordinate.latitude, coordinate.longitude
    )
}
