use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::detector::DetectorEvent;
use crate::platform::Coordinate;
use crate::trigger::TriggerPhase;

/// Every state change of the trigger flow produces an Event.
/// Hosts print or render them; tests assert on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    LocationAcquired {
        coordinate: Coordinate,
        at: DateTime<Utc>,
    },
    ContactSaved {
        at: DateTime<Utc>,
    },
    /// The alert message was handed to the transport.
    AlertSent {
        cycle_id: Uuid,
        recipient: String,
        body: String,
        at: DateTime<Utc>,
    },
    CountdownStarted {
        cycle_id: Uuid,
        units: u32,
        at: DateTime<Utc>,
    },
    CountdownTicked {
        cycle_id: Uuid,
        remaining_units: u32,
        at: DateTime<Utc>,
    },
    CountdownCancelled {
        cycle_id: Uuid,
        remaining_units: u32,
        at: DateTime<Utc>,
    },
    /// Countdown expired and the call request was opened.
    EscalationStarted {
        cycle_id: Uuid,
        uri: String,
        at: DateTime<Utc>,
    },
    /// Countdown expired but the call could not be opened. The cycle is over.
    EscalationFailed {
        cycle_id: Uuid,
        reason: String,
        at: DateTime<Utc>,
    },
    DetectorMatched {
        event: DetectorEvent,
        at: DateTime<Utc>,
    },
    DetectorIgnored {
        event: DetectorEvent,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: TriggerPhase,
        active: bool,
        remaining_units: u32,
        contact_set: bool,
        location: Option<Coordinate>,
        countdown_text: Option<String>,
        at: DateTime<Utc>,
    },
}
