//! One-way channel from the detector sandbox to the host.
//!
//! The sandbox holds a [`DetectorSink`] and posts raw text payloads; the host
//! holds the [`DetectorBridge`] and receives them, parsed, in post order. The
//! host cannot send anything back. It can only close the bridge.

use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};
use tokio::task::JoinHandle;

use super::event::DetectorEvent;
use crate::error::DetectorError;

/// Create a bounded sink/bridge pair.
pub fn bridge(capacity: usize) -> (DetectorSink, DetectorBridge) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        DetectorSink { tx },
        DetectorBridge {
            rx,
            tasks: Vec::new(),
            closed: false,
        },
    )
}

/// Sandbox end of the bridge.
#[derive(Debug, Clone)]
pub struct DetectorSink {
    tx: Sender<String>,
}

impl DetectorSink {
    /// Post without suspending. A full channel drops the payload.
    pub fn post(&self, payload: impl Into<String>) -> Result<(), DetectorError> {
        self.tx.try_send(payload.into()).map_err(|e| match e {
            TrySendError::Full(_) => DetectorError::Full,
            TrySendError::Closed(_) => DetectorError::Closed,
        })
    }

    /// Post, waiting for room in the channel.
    pub async fn post_async(&self, payload: impl Into<String>) -> Result<(), DetectorError> {
        self.tx
            .send(payload.into())
            .await
            .map_err(|_| DetectorError::Closed)
    }

    /// Post from a non-async thread (stdin readers and the like).
    pub fn post_blocking(&self, payload: impl Into<String>) -> Result<(), DetectorError> {
        self.tx
            .blocking_send(payload.into())
            .map_err(|_| DetectorError::Closed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Host end of the bridge.
#[derive(Debug)]
pub struct DetectorBridge {
    rx: Receiver<String>,
    tasks: Vec<JoinHandle<()>>,
    closed: bool,
}

impl DetectorBridge {
    /// Next event, or `None` once closed or once every sink is gone.
    pub async fn recv(&mut self) -> Option<DetectorEvent> {
        if self.closed {
            return None;
        }
        let raw = self.rx.recv().await?;
        tracing::debug!(payload = %raw, "detector payload");
        Some(DetectorEvent::parse(&raw))
    }

    /// Non-suspending variant of [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Option<DetectorEvent> {
        if self.closed {
            return None;
        }
        self.rx.try_recv().ok().map(|raw| DetectorEvent::parse(&raw))
    }

    /// Tie a sandbox task's lifetime to this bridge.
    pub fn attach(&mut self, task: JoinHandle<()>) {
        if self.closed {
            task.abort();
        } else {
            self.tasks.push(task);
        }
    }

    /// Stop the sandbox and discard anything not yet delivered. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.rx.close();
        for task in self.tasks.drain(..) {
            task.abort();
        }
        while self.rx.try_recv().is_ok() {}
        tracing::info!("detector bridge closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for DetectorBridge {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}
