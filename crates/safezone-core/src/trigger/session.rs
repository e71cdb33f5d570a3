//! Single-task event loop that owns a controller, its countdown ticker and the
//! host end of the detector bridge.
//!
//! Host commands, detector events and ticks are all handled on the one task,
//! one at a time, so the controller never sees concurrent calls. Commands
//! are polled first: a cancel that arrives together with a tick wins.

use std::future::pending;

use tokio::sync::mpsc::{Receiver, UnboundedSender};

use super::controller::EmergencyController;
use super::countdown::Ticker;
use crate::detector::{DetectorBridge, DetectorEvent};
use crate::events::Event;

/// What a host can ask of a running session.
#[derive(Debug)]
pub enum SessionCommand {
    Trigger,
    Cancel,
    /// Start consuming a detector bridge, replacing any current one.
    Listen(DetectorBridge),
    StopListening,
    Snapshot,
    Shutdown,
}

enum Step {
    Command(Option<SessionCommand>),
    Detector(Option<DetectorEvent>),
    Tick,
}

pub struct Session {
    controller: EmergencyController,
    ticker: Ticker,
    detector: Option<DetectorBridge>,
    events: UnboundedSender<Event>,
}

impl Session {
    pub fn new(controller: EmergencyController, events: UnboundedSender<Event>) -> Self {
        Self {
            controller,
            ticker: Ticker::default(),
            detector: None,
            events,
        }
    }

    pub fn controller(&self) -> &EmergencyController {
        &self.controller
    }

    pub fn is_listening(&self) -> bool {
        self.detector.is_some()
    }

    /// Run until `Shutdown` or until every command sender is dropped.
    /// Returns the controller so the host can inspect the final state.
    pub async fn run(mut self, mut commands: Receiver<SessionCommand>) -> EmergencyController {
        tracing::info!("session started");
        loop {
            let step = tokio::select! {
                biased;
                command = commands.recv() => Step::Command(command),
                event = next_detector_event(&mut self.detector) => Step::Detector(event),
                _ = self.ticker.tick() => Step::Tick,
            };

            match step {
                Step::Command(None) | Step::Command(Some(SessionCommand::Shutdown)) => break,
                Step::Command(Some(command)) => self.handle_command(command).await,
                Step::Detector(Some(event)) => self.handle_detector_event(event).await,
                Step::Detector(None) => {
                    tracing::info!("detector bridge ended");
                    self.detector = None;
                }
                Step::Tick => self.handle_tick().await,
            }
            self.sync_ticker();
        }

        self.ticker.disarm();
        if let Some(mut bridge) = self.detector.take() {
            bridge.close();
        }
        tracing::info!("session stopped");
        self.controller
    }

    async fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Trigger => {
                if let Ok(events) = self.controller.trigger().await {
                    self.emit(events);
                }
            }
            SessionCommand::Cancel => {
                if let Some(event) = self.controller.cancel() {
                    self.emit([event]);
                }
            }
            SessionCommand::Listen(bridge) => {
                if let Some(mut previous) = self.detector.replace(bridge) {
                    previous.close();
                }
                tracing::info!("listening for distress");
            }
            SessionCommand::StopListening => {
                if let Some(mut bridge) = self.detector.take() {
                    bridge.close();
                }
            }
            SessionCommand::Snapshot => {
                let snapshot = self.controller.snapshot().await;
                self.emit([snapshot]);
            }
            SessionCommand::Shutdown => {}
        }
    }

    async fn handle_detector_event(&mut self, event: DetectorEvent) {
        let Some(bridge) = self.detector.as_mut() else {
            return;
        };
        let outcome = self.controller.on_detector_event(event, bridge).await;
        if bridge.is_closed() {
            self.detector = None;
        }
        if let Some(err) = &outcome.trigger_error {
            tracing::debug!(error = %err, "detector-initiated trigger failed");
        }
        self.emit(outcome.events);
    }

    async fn handle_tick(&mut self) {
        if let Some(event) = self.controller.tick().await {
            self.emit([event]);
        }
    }

    /// Keep the ticker armed exactly while a countdown runs.
    fn sync_ticker(&mut self) {
        let active = self.controller.countdown().is_active();
        if active && !self.ticker.is_armed() {
            self.ticker.arm(self.controller.config().countdown.unit());
        } else if !active && self.ticker.is_armed() {
            self.ticker.disarm();
        }
    }

    fn emit(&self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            // A host that stopped listening for events still gets the
            // side effects; nothing to do if the receiver is gone.
            let _ = self.events.send(event);
        }
    }
}

async fn next_detector_event(detector: &mut Option<DetectorBridge>) -> Option<DetectorEvent> {
    match detector {
        Some(bridge) => bridge.recv().await,
        None => pending().await,
    }
}
