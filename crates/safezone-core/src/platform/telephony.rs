use async_trait::async_trait;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DialError {
    #[error("invalid phone number '{0}'")]
    InvalidNumber(String),

    #[error("no handler for {0}")]
    Unsupported(String),

    #[error("failed to open {uri}: {message}")]
    OpenFailed { uri: String, message: String },
}

/// Voice-call launcher. Only the controller may call this.
#[async_trait]
pub trait CallEscalator: Send + Sync {
    async fn can_open(&self, uri: &Url) -> bool;

    async fn open(&self, uri: &Url) -> Result<(), DialError>;
}

/// `tel:<number>` for the given contact.
pub fn tel_uri(number: &str) -> Result<Url, DialError> {
    let number = number.trim();
    if number.is_empty() {
        return Err(DialError::InvalidNumber(number.to_string()));
    }
    Url::parse(&format!("tel:{number}")).map_err(|_| DialError::InvalidNumber(number.to_string()))
}

/// Hands `tel:` URIs to the operating system's registered handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDialer;

#[async_trait]
impl CallEscalator for SystemDialer {
    async fn can_open(&self, uri: &Url) -> bool {
        uri.scheme() == "tel"
    }

    async fn open(&self, uri: &Url) -> Result<(), DialError> {
        let target = uri.to_string();
        let result = tokio::task::spawn_blocking({
            let target = target.clone();
            move || open::that(&target)
        })
        .await;

        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(DialError::OpenFailed {
                uri: target,
                message: e.to_string(),
            }),
            Err(e) => Err(DialError::OpenFailed {
                uri: target,
                message: e.to_string(),
            }),
        }
    }
}
