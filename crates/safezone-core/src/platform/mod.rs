//! Contracts for the device services the trigger flow depends on.
//!
//! Each collaborator is a narrow trait so hosts can plug in real platform
//! adapters, console stand-ins, or recording doubles in tests. All of them
//! are shared with the controller as `Arc<dyn _>`.

pub mod location;
pub mod messaging;
pub mod telephony;

pub use location::{Coordinate, FixedLocation, LocationProvider, PermissionStatus};
pub use messaging::{compose_alert_message, AlertChannel, ChannelError};
pub use telephony::{tel_uri, CallEscalator, DialError, SystemDialer};

use serde::{Deserialize, Serialize};

/// A blocking, user-visible message (title + body).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Presentation-layer sink for notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Notifier that only logs. Useful for headless hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: &Notice) {
        tracing::info!(title = %notice.title, body = %notice.body, "notice");
    }
}
