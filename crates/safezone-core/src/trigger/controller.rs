//! Emergency trigger controller.
//!
//! The controller is the single authority over whether an alert cycle is in
//! progress and the only component that opens a call. It does not own a
//! timer thread: the host feeds it ticks (see [`super::Session`], which does
//! so from a [`super::Ticker`]).
//!
//! ## Usage
//!
//! ```ignore
//! let mut controller = EmergencyController::new(config, collaborators);
//! controller.acquire_location().await?;
//! controller.trigger().await?;        // sends the alert, starts the countdown
//! // once per countdown unit:
//! controller.tick().await;            // escalates on the last unit
//! ```

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::countdown::{Countdown, TickOutcome};
use super::TriggerPhase;
use crate::detector::{DetectorBridge, DetectorEvent, KeywordMatcher};
use crate::error::{LocationError, PreconditionKind, StorageError, TriggerError};
use crate::events::Event;
use crate::platform::{
    compose_alert_message, tel_uri, AlertChannel, CallEscalator, Coordinate, LocationProvider,
    Notice, Notifier, PermissionStatus,
};
use crate::storage::{Config, ContactStore, CONTACT_KEY};

/// The device services a controller drives.
#[derive(Clone)]
pub struct Collaborators {
    pub location: Arc<dyn LocationProvider>,
    pub alerts: Arc<dyn AlertChannel>,
    pub dialer: Arc<dyn CallEscalator>,
    pub contacts: Arc<dyn ContactStore>,
    pub notifier: Arc<dyn Notifier>,
}

/// State of the cycle currently sending or counting down.
#[derive(Debug, Clone)]
struct Cycle {
    id: Uuid,
    contact: String,
}

pub struct EmergencyController {
    config: Config,
    matcher: KeywordMatcher,
    services: Collaborators,
    coordinate: Option<Coordinate>,
    phase: TriggerPhase,
    countdown: Countdown,
    cycle: Option<Cycle>,
}

impl EmergencyController {
    pub fn new(config: Config, services: Collaborators) -> Self {
        let matcher = KeywordMatcher::from_config(&config.detector);
        Self {
            config,
            matcher,
            services,
            coordinate: None,
            phase: TriggerPhase::Idle,
            countdown: Countdown::default(),
            cycle: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> TriggerPhase {
        self.phase
    }

    pub fn countdown(&self) -> Countdown {
        self.countdown
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Contact the next cycle would use: the configured override, else the
    /// stored one. Blank values count as absent.
    pub async fn contact(&self) -> Result<Option<String>, StorageError> {
        if let Some(fixed) = non_blank(self.config.contact_override.as_deref()) {
            return Ok(Some(fixed));
        }
        let stored = self.services.contacts.get(CONTACT_KEY).await?;
        Ok(non_blank(stored.as_deref()))
    }

    pub async fn snapshot(&self) -> Event {
        let contact_set = matches!(self.contact().await, Ok(Some(_)));
        let countdown_text = self
            .countdown
            .is_active()
            .then(|| format!("📞 Calling in {} sec...", self.countdown.remaining_units()));
        Event::StateSnapshot {
            phase: self.phase,
            active: self.countdown.is_active(),
            remaining_units: self.countdown.remaining_units(),
            contact_set,
            location: self.coordinate,
            countdown_text,
            at: Utc::now(),
        }
    }

    // ── Setup ────────────────────────────────────────────────────────

    /// Ask for location permission and capture the session's coordinate.
    pub async fn acquire_location(&mut self) -> Result<Event, LocationError> {
        let result = match self.services.location.request_permission().await {
            PermissionStatus::Denied => Err(LocationError::PermissionDenied),
            PermissionStatus::Granted => self.services.location.current_position().await,
        };

        match result {
            Ok(coordinate) => {
                tracing::info!(location = %coordinate.display(), "location acquired");
                self.coordinate = Some(coordinate);
                Ok(Event::LocationAcquired {
                    coordinate,
                    at: Utc::now(),
                })
            }
            Err(err) => {
                tracing::warn!(error = %err, "location unavailable");
                self.services.notifier.notify(&err.notice());
                Err(err)
            }
        }
    }

    /// Persist a new emergency contact. Blank input is rejected.
    pub async fn save_contact(&self, value: &str) -> Result<Event, StorageError> {
        let Some(contact) = non_blank(Some(value)) else {
            self.services.notifier.notify(&Notice::new(
                "Invalid Input",
                "Please enter a valid phone number.",
            ));
            return Err(StorageError::InvalidContact(value.to_string()));
        };

        self.services.contacts.set(CONTACT_KEY, &contact).await?;
        tracing::info!("emergency contact saved");
        self.services
            .notifier
            .notify(&Notice::new("Saved", "Emergency contact saved successfully."));
        Ok(Event::ContactSaved { at: Utc::now() })
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Send the alert and, once it is out, start the escalation countdown.
    ///
    /// Returns `AlertSent` followed by `CountdownStarted`. On any error the
    /// countdown is left untouched and the user is notified.
    pub async fn trigger(&mut self) -> Result<Vec<Event>, TriggerError> {
        let result = self.begin_cycle().await;
        if let Err(err) = &result {
            tracing::warn!(error = %err, "trigger rejected");
            self.services.notifier.notify(&err.notice());
        }
        result
    }

    async fn begin_cycle(&mut self) -> Result<Vec<Event>, TriggerError> {
        if self.phase.in_progress() || self.countdown.is_active() {
            return Err(TriggerError::AlreadyInProgress);
        }
        let coordinate = self
            .coordinate
            .ok_or(TriggerError::Precondition(PreconditionKind::MissingLocation))?;
        let contact = match self.contact().await {
            Ok(Some(contact)) => contact,
            Ok(None) => return Err(TriggerError::Precondition(PreconditionKind::MissingContact)),
            Err(err) => {
                tracing::warn!(error = %err, "contact store unreadable");
                return Err(TriggerError::Precondition(PreconditionKind::MissingContact));
            }
        };

        let cycle = Cycle {
            id: Uuid::new_v4(),
            contact,
        };
        let body = compose_alert_message(&coordinate);
        tracing::info!(cycle_id = %cycle.id, "sending emergency alert");
        self.phase = TriggerPhase::Sending;

        if !self.services.alerts.is_available().await {
            self.phase = TriggerPhase::Idle;
            return Err(TriggerError::ChannelUnavailable);
        }
        let recipients = [cycle.contact.clone()];
        if let Err(err) = self.services.alerts.send(&recipients, &body).await {
            self.phase = TriggerPhase::Idle;
            return Err(TriggerError::SendFailure(err.to_string()));
        }

        let units = self.config.countdown.units;
        self.countdown.start(units);
        self.phase = TriggerPhase::Counting;
        tracing::info!(cycle_id = %cycle.id, units, "countdown started");

        self.services.notifier.notify(&Notice::new(
            "Emergency Triggered",
            format!(
                "Location shared. Call will be made in {}.",
                describe_delay(units, self.config.countdown.unit_ms)
            ),
        ));

        let now = Utc::now();
        let events = vec![
            Event::AlertSent {
                cycle_id: cycle.id,
                recipient: cycle.contact.clone(),
                body,
                at: now,
            },
            Event::CountdownStarted {
                cycle_id: cycle.id,
                units,
                at: now,
            },
        ];
        self.cycle = Some(cycle);
        Ok(events)
    }

    /// Abandon a running countdown. A no-op (`None`) when nothing is running.
    pub fn cancel(&mut self) -> Option<Event> {
        if !self.countdown.cancel() {
            return None;
        }
        self.phase = TriggerPhase::Cancelled;
        let cycle = self.cycle.take();
        let cycle_id = cycle.map(|c| c.id).unwrap_or_default();
        tracing::info!(
            %cycle_id,
            remaining = self.countdown.remaining_units(),
            "countdown cancelled"
        );
        let event = Event::CountdownCancelled {
            cycle_id,
            remaining_units: self.countdown.remaining_units(),
            at: Utc::now(),
        };
        self.phase = TriggerPhase::Idle;
        Some(event)
    }

    /// Advance the countdown by one unit. Stale ticks return `None`.
    ///
    /// On the last unit the call is opened. The cycle ends either way, with
    /// `EscalationStarted` or `EscalationFailed`.
    pub async fn tick(&mut self) -> Option<Event> {
        match self.countdown.tick() {
            TickOutcome::Inactive => None,
            TickOutcome::Remaining(remaining_units) => {
                let cycle_id = self.cycle.as_ref().map(|c| c.id).unwrap_or_default();
                tracing::debug!(%cycle_id, remaining_units, "countdown tick");
                Some(Event::CountdownTicked {
                    cycle_id,
                    remaining_units,
                    at: Utc::now(),
                })
            }
            TickOutcome::Expired => Some(self.escalate().await),
        }
    }

    async fn escalate(&mut self) -> Event {
        self.phase = TriggerPhase::Calling;
        let cycle = self.cycle.take();
        let cycle_id = cycle.as_ref().map(|c| c.id).unwrap_or_default();
        let result = match &cycle {
            Some(cycle) => self.place_call(cycle).await,
            None => Err(TriggerError::EscalationFailure(
                "no contact recorded for this cycle".into(),
            )),
        };
        self.phase = TriggerPhase::Idle;

        match result {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(%cycle_id, error = %err, "escalation failed");
                self.services.notifier.notify(&err.notice());
                Event::EscalationFailed {
                    cycle_id,
                    reason: err.to_string(),
                    at: Utc::now(),
                }
            }
        }
    }

    async fn place_call(&self, cycle: &Cycle) -> Result<Event, TriggerError> {
        let uri = tel_uri(&cycle.contact)
            .map_err(|e| TriggerError::EscalationFailure(e.to_string()))?;
        if !self.services.dialer.can_open(&uri).await {
            return Err(TriggerError::EscalationFailure(format!(
                "cannot open {uri}"
            )));
        }
        self.services
            .dialer
            .open(&uri)
            .await
            .map_err(|e| TriggerError::EscalationFailure(e.to_string()))?;

        tracing::info!(cycle_id = %cycle.id, %uri, "emergency call opened");
        Ok(Event::EscalationStarted {
            cycle_id: cycle.id,
            uri: uri.to_string(),
            at: Utc::now(),
        })
    }

    /// Handle one event from the detector bridge.
    ///
    /// Distress events close the bridge, then trigger. Everything else,
    /// including detector failures, is only reported. The returned events
    /// include `DetectorMatched` even when the trigger that follows fails.
    pub async fn on_detector_event(
        &mut self,
        event: DetectorEvent,
        bridge: &mut DetectorBridge,
    ) -> DetectorOutcome {
        if !self.matcher.matches(&event) {
            if event.is_failure() {
                tracing::warn!(?event, "detector reported a failure");
            } else {
                tracing::debug!(?event, "detector event ignored");
            }
            return DetectorOutcome {
                events: vec![Event::DetectorIgnored {
                    event,
                    at: Utc::now(),
                }],
                trigger_error: None,
            };
        }

        tracing::info!(?event, "distress detected");
        bridge.close();
        self.services.notifier.notify(&Notice::new(
            "Voice Detected",
            "Emergency keyword or loud sound detected!",
        ));

        let mut outcome = DetectorOutcome {
            events: vec![Event::DetectorMatched {
                event,
                at: Utc::now(),
            }],
            trigger_error: None,
        };
        match self.trigger().await {
            Ok(events) => outcome.events.extend(events),
            Err(err) => outcome.trigger_error = Some(err),
        }
        outcome
    }
}

/// Result of feeding one detector event to the controller.
#[derive(Debug)]
pub struct DetectorOutcome {
    pub events: Vec<Event>,
    /// Set when the event matched but the trigger it started failed.
    pub trigger_error: Option<TriggerError>,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn describe_delay(units: u32, unit_ms: u64) -> String {
    let total_ms = u64::from(units).saturating_mul(unit_ms);
    if total_ms == 1000 {
        "1 second".to_string()
    } else if total_ms % 1000 == 0 {
        format!("{} seconds", total_ms / 1000)
    } else {
        format!("{total_ms} ms")
    }
}
