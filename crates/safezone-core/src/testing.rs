//! Recording doubles of the platform contracts.
//!
//! Used by this crate's tests, its integration tests and host crates' tests.
//! Every double records what it was asked to do and can be scripted to fail.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use url::Url;

use crate::error::{LocationError, StorageError};
use crate::platform::{
    AlertChannel, CallEscalator, ChannelError, Coordinate, DialError, LocationProvider, Notice,
    Notifier, PermissionStatus,
};
use crate::storage::{Config, ContactStore, CONTACT_KEY};
use crate::trigger::{Collaborators, EmergencyController};

/// San Francisco, the coordinate every harness starts with.
pub const DEFAULT_COORDINATE: Coordinate = Coordinate {
    latitude: 37.7749,
    longitude: -122.4194,
};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct RecordingLocation {
    denied: AtomicBool,
    coordinate: Mutex<Option<Coordinate>>,
}

impl RecordingLocation {
    pub fn new(coordinate: Option<Coordinate>) -> Self {
        Self {
            denied: AtomicBool::new(false),
            coordinate: Mutex::new(coordinate),
        }
    }

    pub fn deny(&self) {
        self.denied.store(true, Ordering::SeqCst);
    }

    pub fn set_coordinate(&self, coordinate: Option<Coordinate>) {
        *lock(&self.coordinate) = coordinate;
    }
}

#[async_trait]
impl LocationProvider for RecordingLocation {
    async fn request_permission(&self) -> PermissionStatus {
        if self.denied.load(Ordering::SeqCst) {
            PermissionStatus::Denied
        } else {
            PermissionStatus::Granted
        }
    }

    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        lock(&self.coordinate).ok_or_else(|| LocationError::Unavailable("no fix".into()))
    }
}

pub struct RecordingAlerts {
    available: AtomicBool,
    failure: Mutex<Option<String>>,
    checks: AtomicUsize,
    sent: Mutex<Vec<(Vec<String>, String)>>,
}

impl Default for RecordingAlerts {
    fn default() -> Self {
        Self {
            available: AtomicBool::new(true),
            failure: Mutex::new(None),
            checks: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingAlerts {
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn fail_sends(&self, reason: &str) {
        *lock(&self.failure) = Some(reason.to_string());
    }

    pub fn availability_checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    /// `(recipients, body)` for every successful send.
    pub fn sent(&self) -> Vec<(Vec<String>, String)> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl AlertChannel for RecordingAlerts {
    async fn is_available(&self) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.available.load(Ordering::SeqCst)
    }

    async fn send(&self, recipients: &[String], body: &str) -> Result<(), ChannelError> {
        if let Some(reason) = lock(&self.failure).clone() {
            return Err(ChannelError(reason));
        }
        lock(&self.sent).push((recipients.to_vec(), body.to_string()));
        Ok(())
    }
}

pub struct RecordingDialer {
    supported: AtomicBool,
    failure: Mutex<Option<String>>,
    opened: Mutex<Vec<String>>,
}

impl Default for RecordingDialer {
    fn default() -> Self {
        Self {
            supported: AtomicBool::new(true),
            failure: Mutex::new(None),
            opened: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingDialer {
    pub fn set_supported(&self, supported: bool) {
        self.supported.store(supported, Ordering::SeqCst);
    }

    pub fn fail_opens(&self, reason: &str) {
        *lock(&self.failure) = Some(reason.to_string());
    }

    /// URIs successfully opened, in order.
    pub fn opened(&self) -> Vec<String> {
        lock(&self.opened).clone()
    }
}

#[async_trait]
impl CallEscalator for RecordingDialer {
    async fn can_open(&self, _uri: &Url) -> bool {
        self.supported.load(Ordering::SeqCst)
    }

    async fn open(&self, uri: &Url) -> Result<(), DialError> {
        if let Some(message) = lock(&self.failure).clone() {
            return Err(DialError::OpenFailed {
                uri: uri.to_string(),
                message,
            });
        }
        lock(&self.opened).push(uri.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryContactStore {
    values: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.values).get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock(&self.values).insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        lock(&self.notices).clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.notices().into_iter().map(|n| n.title).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        lock(&self.notices).push(notice.clone());
    }
}

/// A full set of doubles plus helpers to build controllers over them.
pub struct Harness {
    pub location: Arc<RecordingLocation>,
    pub alerts: Arc<RecordingAlerts>,
    pub dialer: Arc<RecordingDialer>,
    pub contacts: Arc<MemoryContactStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    pub fn new() -> Self {
        Self {
            location: Arc::new(RecordingLocation::new(Some(DEFAULT_COORDINATE))),
            alerts: Arc::new(RecordingAlerts::default()),
            dialer: Arc::new(RecordingDialer::default()),
            contacts: Arc::new(MemoryContactStore::default()),
            notifier: Arc::new(RecordingNotifier::default()),
        }
    }

    pub async fn with_contact(self, contact: &str) -> Self {
        // The memory store cannot fail.
        let _ = self.contacts.set(CONTACT_KEY, contact).await;
        self
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            location: self.location.clone(),
            alerts: self.alerts.clone(),
            dialer: self.dialer.clone(),
            contacts: self.contacts.clone(),
            notifier: self.notifier.clone(),
        }
    }

    pub fn controller(&self) -> EmergencyController {
        self.controller_with(Config::default())
    }

    pub fn controller_with(&self, config: Config) -> EmergencyController {
        EmergencyController::new(config, self.collaborators())
    }

    /// Controller with its location already acquired.
    pub async fn ready_controller(&self) -> EmergencyController {
        self.ready_controller_with(Config::default()).await
    }

    pub async fn ready_controller_with(&self, config: Config) -> EmergencyController {
        let mut controller = self.controller_with(config);
        let _ = controller.acquire_location().await;
        controller
    }
}
