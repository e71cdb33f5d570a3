//! Terminal stand-ins for the device services the CLI has no access to.

use async_trait::async_trait;
use safezone_core::platform::{AlertChannel, CallEscalator, ChannelError, DialError};
use safezone_core::{Notice, Notifier};
use url::Url;

/// Prints notices to stderr, where a phone would show a dialog.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) {
        eprintln!("[{}] {}", notice.title, notice.body);
    }
}

/// "Sends" the alert by printing it. Always available.
pub struct ConsoleAlertChannel;

#[async_trait]
impl AlertChannel for ConsoleAlertChannel {
    async fn is_available(&self) -> bool {
        true
    }

    async fn send(&self, recipients: &[String], body: &str) -> Result<(), ChannelError> {
        eprintln!("--- SMS to {} ---\n{body}\n---", recipients.join(", "));
        Ok(())
    }
}

/// Prints the call instead of dialing (`--dry-run`).
pub struct ConsoleDialer;

#[async_trait]
impl CallEscalator for ConsoleDialer {
    async fn can_open(&self, uri: &Url) -> bool {
        uri.scheme() == "tel"
    }

    async fn open(&self, uri: &Url) -> Result<(), DialError> {
        eprintln!("dialing {uri}");
        Ok(())
    }
}
