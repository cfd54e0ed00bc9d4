//! Two-tier inactivity supervision: pause on any input, resume after idling.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use super::timer::TimerSlot;

/// Whether the board is cycling on its own or a person is driving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardMode {
    Auto,
    Manual,
}

#[derive(Debug, Clone)]
pub struct InactivityMonitor {
    idle: Duration,
    timer: TimerSlot,
    paused: bool,
}

impl InactivityMonitor {
    pub fn new(idle: Duration) -> Self {
        Self {
            idle,
            timer: TimerSlot::new(),
            paused: false,
        }
    }

    /// Record qualifying input: pause and restart the idle countdown.
    pub fn on_input(&mut self, now: Instant) {
        self.paused = true;
        self.timer.arm(now, self.idle);
    }

    /// True exactly once when the idle countdown expires; clears the pause.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.timer.fire_if_due(now) {
            self.paused = false;
            true
        } else {
            false
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn mode(&self) -> BoardMode {
        if self.paused {
            BoardMode::Manual
        } else {
            BoardMode::Auto
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }
}
