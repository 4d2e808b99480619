//! RRC timers
//!
//! Timers are polled from the RRC task's tick rather than armed as separate
//! futures, so expiry is observed between two messages and never in the
//! middle of a handler. `tokio::time::Instant` is used so that tests running
//! with a paused clock can advance time.

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

/// T300: supervises RRCSetupRequest (3GPP TS 38.331 §7.1).
pub const TIMER_T300: u16 = 300;

/// A one-shot RRC timer checked by `perform_tick`.
#[derive(Debug, Clone)]
pub struct RrcTimer {
    code: u16,
    interval: Duration,
    start_time: Option<Instant>,
    expiry_count: u32,
}

impl RrcTimer {
    pub fn new(code: u16, interval: Duration) -> Self {
        Self {
            code,
            interval,
            start_time: None,
            expiry_count: 0,
        }
    }

    /// Creates T300 with the given duration in milliseconds.
    pub fn t300(interval_ms: u64) -> Self {
        Self::new(TIMER_T300, Duration::from_millis(interval_ms))
    }

    /// Starts (or restarts) the timer.
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    pub fn stop(&mut self) {
        self.start_time = None;
    }

    /// Returns true exactly once when the running timer has expired.
    pub fn perform_tick(&mut self) -> bool {
        match self.start_time {
            Some(start) if start.elapsed() >= self.interval => {
                self.stop();
                self.expiry_count += 1;
                true
            }
            _ => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.start_time.is_some()
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left before expiry; zero when stopped.
    pub fn remaining(&self) -> Duration {
        self.start_time
            .map(|start| self.interval.saturating_sub(start.elapsed()))
            .unwrap_or_default()
    }

    pub fn expiry_count(&self) -> u32 {
        self.expiry_count
    }
}

impl fmt::Display for RrcTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_running() {
            write!(
                f,
                "T{}: rem[{}ms] int[{}ms]",
                self.code,
                self.remaining().as_millis(),
                self.interval.as_millis()
            )
        } else {
            write!(f, "T{}: .", self.code)
        }
    }
}
