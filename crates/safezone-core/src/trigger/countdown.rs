//! Escalation countdown and the timer that drives it.
//!
//! [`Countdown`] is pure state: the caller feeds it ticks. [`Ticker`] is the
//! recurring timer a host arms when a countdown starts and disarms as a unit
//! when it ends, so no tick from an old cycle can outlive it.

use std::future::pending;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Result of feeding one tick to a countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No countdown was active; the tick was stale.
    Inactive,
    Remaining(u32),
    /// Reached zero on this tick. Reported once per countdown.
    Expired,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    remaining_units: u32,
    active: bool,
}

impl Countdown {
    pub fn remaining_units(&self) -> u32 {
        self.remaining_units
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn start(&mut self, units: u32) {
        self.remaining_units = units;
        self.active = units > 0;
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.active {
            return TickOutcome::Inactive;
        }
        self.remaining_units = self.remaining_units.saturating_sub(1);
        if self.remaining_units == 0 {
            self.active = false;
            TickOutcome::Expired
        } else {
            TickOutcome::Remaining(self.remaining_units)
        }
    }

    /// Returns whether a running countdown was stopped.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.active;
        self.active = false;
        was_active
    }
}

/// Recurring timer, disarmed by default.
#[derive(Debug, Default)]
pub struct Ticker {
    interval: Option<Interval>,
}

impl Ticker {
    /// Start ticking every `period`, first tick one period from now.
    /// Re-arming replaces any previous schedule.
    pub fn arm(&mut self, period: Duration) {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
    }

    pub fn disarm(&mut self) {
        self.interval = None;
    }

    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Wait for the next tick. Never completes while disarmed.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => pending::<()>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_then_expires_once() {
        let mut c = Countdown::default();
        c.start(3);
        assert!(c.is_active());
        assert_eq!(c.tick(), TickOutcome::Remaining(2));
        assert_eq!(c.tick(), TickOutcome::Remaining(1));
        assert_eq!(c.tick(), TickOutcome::Expired);
        assert!(!c.is_active());
        assert_eq!(c.tick(), TickOutcome::Inactive);
    }

    #[test]
    fn cancel_stops_ticks() {
        let mut c = Countdown::default();
        c.start(10);
        c.tick();
        assert!(c.cancel());
        assert_eq!(c.remaining_units(), 9);
        assert_eq!(c.tick(), TickOutcome::Inactive);
        assert!(!c.cancel());
    }

    #[test]
    fn zero_units_never_activates() {
        let mut c = Countdown::default();
        c.start(0);
        assert!(!c.is_active());
        assert_eq!(c.tick(), TickOutcome::Inactive);
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_fires_once_per_period() {
        let mut ticker = Ticker::default();
        ticker.arm(Duration::from_secs(1));
        let started = Instant::now();
        ticker.tick().await;
        assert_eq!(started.elapsed(), Duration::from_secs(1));
        ticker.tick().await;
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn disarmed_ticker_never_fires() {
        let mut ticker = Ticker::default();
        ticker.arm(Duration::from_millis(10));
        ticker.disarm();
        assert!(!ticker.is_armed());
        let fired = tokio::time::timeout(Duration::from_secs(5), ticker.tick()).await;
        assert!(fired.is_err());
    }
}
