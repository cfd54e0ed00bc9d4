//! Cancellable one-shot timer slot.
//!
//! Every controller timer on the board is a `TimerSlot`: arming it replaces
//! whatever deadline was pending, so a slot can never hold two pending
//! instances. Slots never read the clock themselves; the runtime sleeps until
//! the earliest armed deadline and then hands the current instant back in.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerSlot {
    deadline: Option<Instant>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear any pending deadline and arm a new one `delay` after `now`.
    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.clear();
        self.deadline = Some(now + delay);
    }

    pub fn clear(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the slot is armed and its deadline has passed.
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| d <= now)
    }

    /// Disarm and return true when due; leave the slot untouched otherwise.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }
}

/// Earliest of a set of optional deadlines.
pub fn earliest(deadlines: impl IntoIterator<Item = Option<Instant>>) -> Option<Instant> {
    deadlines.into_iter().flatten().min()
}
