//! The board's single owned state object.
//!
//! `BoardController` holds the current snapshot and layout, the focus cursor
//! and every controller timer. It is driven from one task: inputs, new
//! snapshots and timer polls are applied one at a time, so no operation ever
//! observes a half-applied render. Every method takes the current instant;
//! nothing here reads a clock or performs I/O.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tokio::time::Instant;
use tracing::{debug, info};

use super::details::{DetailsOverlay, DetailsView};
use super::focus::{FocusTarget, Slot};
use super::inactivity::{BoardMode, InactivityMonitor};
use super::layout::{build_banner, build_layout, BoardLayout};
use super::model::Snapshot;
use super::navigation::{navigate, Direction};
use super::presentation::Presenter;
use super::tickers::WeatherReading;
use super::timer::{earliest, TimerSlot};
use crate::config::BoardConfig;

/// Shortest allowed auto-cycle dwell.
pub const MIN_DWELL: Duration = Duration::from_secs(1);

/// Controller timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardSettings {
    pub show_delay: Duration,
    pub hide_delay: Duration,
    pub dwell: Duration,
    pub idle: Duration,
    pub startup_grace: Duration,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self::from_config(&BoardConfig::default())
    }
}

impl BoardSettings {
    pub fn from_config(config: &BoardConfig) -> Self {
        Self {
            show_delay: Duration::from_millis(config.show_delay_ms),
            hide_delay: Duration::from_millis(config.hide_delay_ms),
            dwell: Duration::from_secs(config.cycle_secs).max(MIN_DWELL),
            idle: Duration::from_secs(config.idle_secs),
            startup_grace: Duration::from_secs(config.startup_grace_secs),
        }
    }
}

/// Raw input forwarded by a viewing surface.
///
/// `target` values are `header` or an item's `data-slot` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoardInput {
    Key { key: String },
    PointerMove,
    PointerEnter { target: String },
    PointerLeave { target: String },
    TouchStart {
        #[serde(default)]
        target: Option<String>,
    },
    TouchEnd {
        #[serde(default)]
        target: Option<String>,
    },
    Click {
        #[serde(default)]
        target: Option<String>,
    },
}

impl BoardInput {
    /// Inputs that count as someone using the board.
    pub fn is_activity(&self) -> bool {
        matches!(
            self,
            Self::Key { .. } | Self::PointerMove | Self::TouchStart { .. } | Self::Click { .. }
        )
    }
}

fn parse_slot(target: Option<&str>) -> Option<Slot> {
    target.and_then(FocusTarget::parse).and_then(|t| t.slot())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoardTimer {
    Startup,
    Idle,
    Cycle,
    Details,
}

/// Everything a surface needs to draw the board at one revision.
#[derive(Debug, Clone)]
pub struct BoardView {
    pub revision: u64,
    pub layout_revision: u64,
    pub layout: Arc<BoardLayout>,
    pub has_data: bool,
    pub focus: FocusTarget,
    pub details: Option<DetailsView>,
    pub mode: BoardMode,
    pub setup_required: bool,
    pub weather: Option<WeatherReading>,
}

#[derive(Debug)]
pub struct BoardController {
    settings: BoardSettings,
    snapshot: Arc<Snapshot>,
    layout: Arc<BoardLayout>,
    /// Local day the lists were partitioned for
    day: Option<NaiveDate>,
    has_data: bool,
    revision: u64,
    layout_revision: u64,
    focus: FocusTarget,
    details: DetailsOverlay,
    presenter: Presenter,
    inactivity: InactivityMonitor,
    startup: TimerSlot,
    setup_required: bool,
    weather: Option<WeatherReading>,
}

impl BoardController {
    pub fn new(settings: BoardSettings) -> Self {
        Self {
            settings,
            snapshot: Arc::new(Snapshot::default()),
            layout: Arc::new(BoardLayout::default()),
            day: None,
            has_data: false,
            revision: 0,
            layout_revision: 0,
            focus: FocusTarget::None,
            details: DetailsOverlay::new(settings.show_delay, settings.hide_delay),
            presenter: Presenter::new(settings.dwell),
            inactivity: InactivityMonitor::new(settings.idle),
            startup: TimerSlot::new(),
            setup_required: false,
            weather: None,
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Bumped on every visible change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    pub fn focus(&self) -> FocusTarget {
        self.focus
    }

    pub fn mode(&self) -> BoardMode {
        self.inactivity.mode()
    }

    pub fn details_visible(&self) -> Option<Slot> {
        self.details.visible()
    }

    pub fn cycle_index(&self) -> Option<usize> {
        self.presenter.index()
    }

    pub fn is_cycling(&self) -> bool {
        self.presenter.is_running()
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Swap in a new snapshot and rebuild both lists.
    pub fn apply_snapshot(&mut self, snapshot: Arc<Snapshot>, now: Instant, local: NaiveDateTime) {
        self.setup_required = false;
        self.rebuild(snapshot, now, local);
    }

    fn rebuild(&mut self, snapshot: Arc<Snapshot>, now: Instant, local: NaiveDateTime) {
        let was_cycling = self.presenter.is_running() && !self.inactivity.is_paused();
        self.presenter.stop();

        self.layout = Arc::new(build_layout(&snapshot, local));
        self.snapshot = snapshot;
        self.day = Some(local.date());
        self.layout_revision += 1;
        self.touch();

        debug!(
            "Board rebuilt: {} today, {} upcoming",
            self.layout.today.len(),
            self.layout.item_count() - self.layout.today.len()
        );

        if let FocusTarget::Item(slot) = self.focus {
            if !self.layout.contains(&slot) {
                debug!("Focused {} vanished after re-render", slot);
                self.set_focus(FocusTarget::None, now);
            }
        }
        self.details.reconcile(&self.layout);

        if !self.has_data {
            self.has_data = true;
            self.startup.arm(now, self.settings.startup_grace);
        }

        if was_cycling {
            let count = self.layout.item_count();
            if let Some(index) = self.presenter.start(count, now) {
                self.focus_cycle_index(index, now);
            }
        }
    }

    /// Re-evaluate the broadcast banner against the wall clock.
    pub fn refresh_banner(&mut self, local: NaiveDateTime) -> bool {
        let banner = build_banner(&self.snapshot, local);
        if banner == self.layout.banner {
            return false;
        }
        Arc::make_mut(&mut self.layout).banner = banner;
        self.touch();
        true
    }

    /// Re-partition the lists when the local day rolled over. The banner
    /// is left to `refresh_banner`.
    pub fn refresh_day(&mut self, now: Instant, local: NaiveDateTime) {
        if !self.has_data || self.day == Some(local.date()) {
            return;
        }
        info!("Day changed to {}, rebuilding board", local.date());
        let snapshot = Arc::clone(&self.snapshot);
        self.rebuild(snapshot, now, local);
    }

    pub fn set_setup_required(&mut self, required: bool) {
        if self.setup_required != required {
            self.setup_required = required;
            self.touch();
        }
    }

    pub fn set_weather(&mut self, reading: WeatherReading) {
        if self.weather != Some(reading) {
            self.weather = Some(reading);
            self.touch();
        }
    }

    // =========================================================================
    // Focus
    // =========================================================================

    /// The single focus setter. Leaving an item blurs it (schedule hide);
    /// entering an item focuses it (schedule show).
    pub fn set_focus(&mut self, target: FocusTarget, now: Instant) -> bool {
        if target == self.focus {
            return false;
        }
        if let FocusTarget::Item(slot) = target {
            if !self.layout.contains(&slot) {
                return false;
            }
        }
        if self.focus.slot().is_some() {
            self.details.schedule_hide(now);
        }
        if let FocusTarget::Item(slot) = target {
            self.details.schedule_show(slot, now);
        }
        self.focus = target;
        self.touch();
        true
    }

    fn focus_cycle_index(&mut self, index: usize, now: Instant) {
        if let Some(slot) = self.layout.cycle_order().get(index).copied() {
            self.set_focus(FocusTarget::Item(slot), now);
        }
    }

    // =========================================================================
    // Input
    // =========================================================================

    pub fn handle_input(&mut self, input: BoardInput, now: Instant) {
        if input.is_activity() {
            let was_paused = self.inactivity.is_paused();
            self.inactivity.on_input(now);
            self.presenter.stop();
            if !was_paused {
                debug!("Input received, auto-cycle paused");
                self.touch();
            }
        }

        match input {
            BoardInput::Key { key } => self.handle_key(&key, now),
            BoardInput::PointerMove => {}
            BoardInput::PointerEnter { target }
            | BoardInput::TouchStart {
                target: Some(target),
            } => {
                if let Some(slot) = parse_slot(Some(&target)) {
                    if self.layout.contains(&slot) {
                        self.details.schedule_show(slot, now);
                    }
                }
            }
            BoardInput::PointerLeave { target } | BoardInput::TouchEnd { target: Some(target) } => {
                if let Some(slot) = parse_slot(Some(&target)) {
                    if self.focus.slot() != Some(slot) {
                        self.details.schedule_hide(now);
                    }
                }
            }
            BoardInput::TouchStart { target: None } | BoardInput::TouchEnd { target: None } => {}
            BoardInput::Click { target } => self.handle_click(target.as_deref(), now),
        }
    }

    fn handle_key(&mut self, key: &str, now: Instant) {
        if key == "Escape" || key == "Backspace" {
            if self.details.hide_now() {
                self.touch();
            }
            return;
        }
        let Some(direction) = Direction::from_key(key) else {
            return;
        };
        if let Some(target) = navigate(&self.layout, self.focus, direction) {
            self.set_focus(target, now);
        }
    }

    /// Clicking an item focuses it and shows its details immediately; clicking
    /// anywhere else moves focus off the lists.
    fn handle_click(&mut self, target: Option<&str>, now: Instant) {
        match target.and_then(FocusTarget::parse) {
            Some(FocusTarget::Item(slot)) if self.layout.contains(&slot) => {
                self.set_focus(FocusTarget::Item(slot), now);
                if self.details.show_now(slot, &self.layout) {
                    self.touch();
                }
            }
            Some(FocusTarget::Header) => {
                self.set_focus(FocusTarget::Header, now);
            }
            _ => {
                self.set_focus(FocusTarget::None, now);
            }
        }
    }

    // =========================================================================
    // Timers
    // =========================================================================

    pub fn next_deadline(&self) -> Option<Instant> {
        earliest([
            self.startup.deadline(),
            self.inactivity.next_deadline(),
            self.presenter.next_deadline(),
            self.details.next_deadline(),
        ])
    }

    fn next_due(&self, now: Instant) -> Option<BoardTimer> {
        [
            (BoardTimer::Startup, self.startup.deadline()),
            (BoardTimer::Idle, self.inactivity.next_deadline()),
            (BoardTimer::Cycle, self.presenter.next_deadline()),
            (BoardTimer::Details, self.details.next_deadline()),
        ]
        .into_iter()
        .filter_map(|(timer, deadline)| deadline.filter(|d| *d <= now).map(|d| (d, timer)))
        .min_by_key(|(deadline, _)| *deadline)
        .map(|(_, timer)| timer)
    }

    /// Fire every due timer, earliest deadline first.
    pub fn poll(&mut self, now: Instant) {
        while let Some(timer) = self.next_due(now) {
            match timer {
                BoardTimer::Startup => {
                    self.startup.clear();
                    if !self.inactivity.is_paused() {
                        info!("Starting auto-cycle");
                        self.start_presentation(now);
                    }
                }
                BoardTimer::Idle => {
                    if self.inactivity.poll(now) {
                        self.resume_after_idle(now);
                    }
                }
                BoardTimer::Cycle => {
                    let count = self.layout.item_count();
                    let paused = self.inactivity.is_paused();
                    if let Some(index) = self.presenter.poll(now, count, paused) {
                        self.focus_cycle_index(index, now);
                    }
                }
                BoardTimer::Details => {
                    if self.details.poll(now, &self.layout) {
                        self.touch();
                    }
                }
            }
        }
    }

    fn start_presentation(&mut self, now: Instant) {
        let count = self.layout.item_count();
        if let Some(index) = self.presenter.start(count, now) {
            self.focus_cycle_index(index, now);
        }
    }

    fn resume_after_idle(&mut self, now: Instant) {
        debug!("Idle timeout, resuming auto-cycle");
        self.set_focus(FocusTarget::None, now);
        self.details.hide_now();
        self.startup.clear();
        self.touch();
        self.start_presentation(now);
    }

    // =========================================================================
    // View
    // =========================================================================

    pub fn view(&self) -> BoardView {
        BoardView {
            revision: self.revision,
            layout_revision: self.layout_revision,
            layout: Arc::clone(&self.layout),
            has_data: self.has_data,
            focus: self.focus,
            details: self.details.view(&self.layout),
            mode: self.inactivity.mode(),
            setup_required: self.setup_required,
            weather: self.weather,
        }
    }
}
