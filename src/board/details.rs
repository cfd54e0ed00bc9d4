//! Details overlay: debounced bottom sheet describing the focused item.
//!
//! Show and hide are two timer slots, and arming either one clears both, so at
//! most one of them is ever pending. The overlay remembers which slot it shows,
//! not a copy of the item; its content is resolved against the current layout
//! at render time, which keeps it from going stale after a re-render.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;

use super::focus::Slot;
use super::layout::BoardLayout;
use super::model::{DisplayItem, ItemData};
use super::timer::{earliest, TimerSlot};

#[derive(Debug, Clone)]
pub struct DetailsOverlay {
    show_delay: Duration,
    hide_delay: Duration,
    show_timer: TimerSlot,
    hide_timer: TimerSlot,
    pending: Option<Slot>,
    visible: Option<Slot>,
}

impl DetailsOverlay {
    pub fn new(show_delay: Duration, hide_delay: Duration) -> Self {
        Self {
            show_delay,
            hide_delay,
            show_timer: TimerSlot::new(),
            hide_timer: TimerSlot::new(),
            pending: None,
            visible: None,
        }
    }

    fn clear_timers(&mut self) {
        self.show_timer.clear();
        self.hide_timer.clear();
        self.pending = None;
    }

    pub fn schedule_show(&mut self, slot: Slot, now: Instant) {
        self.clear_timers();
        self.pending = Some(slot);
        self.show_timer.arm(now, self.show_delay);
    }

    pub fn schedule_hide(&mut self, now: Instant) {
        self.clear_timers();
        self.hide_timer.arm(now, self.hide_delay);
    }

    /// Cancel pending timers and show at once. Returns true if visibility changed.
    pub fn show_now(&mut self, slot: Slot, layout: &BoardLayout) -> bool {
        self.clear_timers();
        self.show(slot, layout)
    }

    /// Cancel pending timers and hide at once. Returns true if visibility changed.
    pub fn hide_now(&mut self) -> bool {
        self.clear_timers();
        self.visible.take().is_some()
    }

    fn show(&mut self, slot: Slot, layout: &BoardLayout) -> bool {
        let before = self.visible;
        self.visible = match layout.item(&slot) {
            Some(item) if item.has_details() => Some(slot),
            _ => {
                debug!("No details to show for {}", slot);
                None
            }
        };
        before != self.visible
    }

    /// Fire whichever timer is due. Returns true if visibility changed.
    pub fn poll(&mut self, now: Instant, layout: &BoardLayout) -> bool {
        if self.show_timer.fire_if_due(now) {
            if let Some(slot) = self.pending.take() {
                return self.show(slot, layout);
            }
        }
        if self.hide_timer.fire_if_due(now) {
            return self.visible.take().is_some();
        }
        false
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        earliest([self.show_timer.deadline(), self.hide_timer.deadline()])
    }

    /// Drop a shown item that vanished or lost its content in a re-render.
    pub fn reconcile(&mut self, layout: &BoardLayout) -> bool {
        match self.visible {
            Some(slot) if !layout.item(&slot).is_some_and(DisplayItem::has_details) => {
                self.visible = None;
                true
            }
            _ => false,
        }
    }

    pub fn visible(&self) -> Option<Slot> {
        self.visible
    }

    pub fn is_show_pending(&self) -> bool {
        self.show_timer.is_armed()
    }

    pub fn is_hide_pending(&self) -> bool {
        self.hide_timer.is_armed()
    }

    /// Render model of the visible overlay, if any.
    pub fn view(&self, layout: &BoardLayout) -> Option<DetailsView> {
        let slot = self.visible?;
        layout.item(&slot).map(DetailsView::from_item)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTone {
    Active,
    Planned,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub label: String,
    pub tone: BadgeTone,
}

/// Text content of the overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailsView {
    pub title: String,
    pub body: String,
    pub meta: String,
    pub badge: Option<Badge>,
}

impl DetailsView {
    pub fn from_item(item: &DisplayItem) -> Self {
        match &item.data {
            ItemData::Ticket(ticket) => {
                let badge = if ticket.is_in_progress() {
                    Badge {
                        label: "IN PROGRESS".into(),
                        tone: BadgeTone::Active,
                    }
                } else {
                    Badge {
                        label: "SCHEDULED".into(),
                        tone: BadgeTone::Planned,
                    }
                };
                let assignee = ticket
                    .assignee_name
                    .as_deref()
                    .filter(|a| !a.trim().is_empty())
                    .unwrap_or("Unassigned");
                Self {
                    title: ticket.title.clone(),
                    body: ticket.description_text().unwrap_or_default().to_string(),
                    meta: format!(
                        "TICKET #{} • {} • {}",
                        ticket.code(),
                        ticket.machine_name,
                        assignee
                    ),
                    badge: Some(badge),
                }
            }
            ItemData::Event(event) => {
                let mut meta = String::from("EVENT");
                if let Some(day) = event.day() {
                    meta.push_str(&format!(" • {}", day.format("%-d %B %Y")));
                }
                if let Some(time) = event.time_label() {
                    meta.push_str(&format!(" • {time}"));
                }
                Self {
                    title: event.title.clone(),
                    body: event
                        .details_text()
                        .or_else(|| event.category())
                        .unwrap_or_default()
                        .to_string(),
                    meta,
                    badge: event.category().map(|label| Badge {
                        label: label.to_string(),
                        tone: BadgeTone::Neutral,
                    }),
                }
            }
        }
    }
}
