mod controller;
mod countdown;
mod session;

pub use controller::{Collaborators, DetectorOutcome, EmergencyController};
pub use countdown::{Countdown, TickOutcome, Ticker};
pub use session::{Session, SessionCommand};

use serde::{Deserialize, Serialize};

/// Where the controller is in a trigger cycle.
///
/// ```text
/// Idle -> Sending -> Counting -> (Calling | Cancelled) -> Idle
///           |
///           +-> Idle   (send failed or transport unavailable)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerPhase {
    Idle,
    /// Waiting on the alert channel.
    Sending,
    Counting,
    /// Countdown expired; the call request is being opened.
    Calling,
    Cancelled,
}

impl TriggerPhase {
    /// A cycle is underway and a new trigger must be rejected.
    pub fn in_progress(self) -> bool {
        matches!(self, TriggerPhase::Sending | TriggerPhase::Counting)
    }
}
