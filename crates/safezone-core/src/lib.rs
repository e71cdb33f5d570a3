//! # SafeZone Core Library
//!
//! This library provides the core logic for the SafeZone personal-safety
//! alert flow: on a trigger it texts the device location to an emergency
//! contact, then calls that contact after a cancellable countdown. A
//! detector running in its own tasks can trigger the same flow when it hears
//! a distress keyword or a loud sound.
//!
//! ## Architecture
//!
//! - **Trigger Controller**: a state machine that requires the caller to feed
//!   it countdown ticks; the [`Session`] loop does this from a [`Ticker`]
//! - **Detector Bridge**: a bounded one-way channel from the sensing tasks to
//!   the host
//! - **Platform contracts**: location, messaging, telephony and user notices,
//!   all behind traits
//! - **Storage**: SQLite-backed contact store and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`EmergencyController`]: trigger / cancel / tick / detector handling
//! - [`Session`]: event loop owning the controller, ticker and bridge
//! - [`DetectorBridge`]: host end of the detector channel
//! - [`Config`]: application configuration management

pub mod detector;
pub mod error;
pub mod events;
pub mod platform;
pub mod storage;
pub mod testing;
pub mod trigger;

pub use detector::{spawn_detector, DetectorBridge, DetectorEvent, DetectorSink, KeywordMatcher};
pub use error::{
    ConfigError, CoreError, DetectorError, LocationError, PreconditionKind, StorageError,
    TriggerError,
};
pub use events::Event;
pub use platform::{Coordinate, Notice, Notifier};
pub use storage::{Config, ContactStore, SqliteContactStore};
pub use trigger::{
    Collaborators, Countdown, DetectorOutcome, EmergencyController, Session, SessionCommand, Ticker,
    TriggerPhase,
};
