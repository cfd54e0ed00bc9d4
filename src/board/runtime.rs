//! Board task - owns the `BoardController` and drives it from one loop.
//!
//! Inputs from viewing surfaces, bus events from the adapters, the clock and
//! the controller's own timers are multiplexed with `tokio::select!`, applied
//! one at a time, and each visible change is published as a `BoardFrame` on a
//! watch channel. List markup is rendered once per layout revision.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::controller::{BoardController, BoardInput, BoardSettings, BoardView};
use super::inactivity::BoardMode;
use super::layout::BoardStats;
use super::tickers::{ClockFace, WeatherReading};
use crate::bus::{BusEvent, SharedBus};
use crate::ui::fragments::{render_banner, render_details, render_today, render_upcoming};

/// Source of local wall-clock time.
pub type WallClock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

pub fn system_clock() -> WallClock {
    Arc::new(|| chrono::Local::now().naive_local())
}

const INPUT_QUEUE: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeatherView {
    pub label: String,
    pub icon: &'static str,
    pub tone: &'static str,
}

impl From<WeatherReading> for WeatherView {
    fn from(reading: WeatherReading) -> Self {
        Self {
            label: reading.label(),
            icon: reading.kind.icon(),
            tone: reading.kind.tone(),
        }
    }
}

/// Rendered list markup for one layout revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrameLists {
    pub today: String,
    pub upcoming: String,
}

/// Board state as shipped to viewing surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct BoardFrame {
    pub revision: u64,
    pub layout_revision: u64,
    pub has_data: bool,
    pub setup_required: bool,
    pub mode: BoardMode,
    pub clock: ClockFace,
    pub stats: BoardStats,
    pub weather: Option<WeatherView>,
    pub banner: Option<String>,
    /// DOM id of the focused element
    pub focused: Option<String>,
    pub details: Option<String>,
    #[serde(skip)]
    pub lists: Arc<FrameLists>,
}

/// Wire form of a frame; lists are only sent when the viewer needs them.
#[derive(Debug, Serialize)]
pub struct FramePayload<'a> {
    #[serde(flatten)]
    frame: &'a BoardFrame,
    #[serde(skip_serializing_if = "Option::is_none")]
    lists: Option<&'a FrameLists>,
}

impl BoardFrame {
    pub fn payload(&self, include_lists: bool) -> FramePayload<'_> {
        FramePayload {
            frame: self,
            lists: include_lists.then(|| self.lists.as_ref()),
        }
    }
}

#[derive(Debug, Default)]
struct FrameRenderer {
    lists: Arc<FrameLists>,
    layout_revision: Option<u64>,
}

impl FrameRenderer {
    fn render(&mut self, view: &BoardView, clock: ClockFace) -> BoardFrame {
        if self.layout_revision != Some(view.layout_revision) {
            self.lists = Arc::new(FrameLists {
                today: render_today(&view.layout),
                upcoming: render_upcoming(&view.layout),
            });
            self.layout_revision = Some(view.layout_revision);
        }

        BoardFrame {
            revision: view.revision,
            layout_revision: view.layout_revision,
            has_data: view.has_data,
            setup_required: view.setup_required,
            mode: view.mode,
            clock,
            stats: view.layout.stats,
            weather: view.weather.map(WeatherView::from),
            banner: view.layout.banner.as_ref().map(render_banner),
            focused: view.focus.dom_id(),
            details: view.details.as_ref().map(render_details),
            lists: Arc::clone(&self.lists),
        }
    }
}

#[derive(Debug, Error)]
#[error("board task is not running")]
pub struct BoardClosed;

/// Cheap handle to the board task, shared by HTTP handlers.
#[derive(Clone)]
pub struct BoardHandle {
    inputs: mpsc::Sender<BoardInput>,
    frames: watch::Receiver<Arc<BoardFrame>>,
}

impl BoardHandle {
    pub async fn send(&self, input: BoardInput) -> Result<(), BoardClosed> {
        self.inputs.send(input).await.map_err(|_| BoardClosed)
    }

    /// Latest published frame.
    pub fn frame(&self) -> Arc<BoardFrame> {
        Arc::clone(&self.frames.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<BoardFrame>> {
        self.frames.clone()
    }
}

struct BoardTask {
    board: BoardController,
    renderer: FrameRenderer,
    inputs: mpsc::Receiver<BoardInput>,
    events: broadcast::Receiver<BusEvent>,
    frames: watch::Sender<Arc<BoardFrame>>,
    clock: WallClock,
    banner_every: Duration,
    last_revision: u64,
    last_clock: ClockFace,
}

/// Spawn the board task. It subscribes to the bus before returning, so no
/// event published afterwards is missed.
pub fn spawn_board(
    settings: BoardSettings,
    banner_every: Duration,
    bus: &SharedBus,
    clock: WallClock,
    shutdown: CancellationToken,
) -> (BoardHandle, JoinHandle<()>) {
    let board = BoardController::new(settings);
    let mut renderer = FrameRenderer::default();
    let face = ClockFace::at(clock());
    let initial = renderer.render(&board.view(), face.clone());

    let (input_tx, input_rx) = mpsc::channel(INPUT_QUEUE);
    let (frame_tx, frame_rx) = watch::channel(Arc::new(initial));

    let task = BoardTask {
        last_revision: board.revision(),
        board,
        renderer,
        inputs: input_rx,
        events: bus.subscribe(),
        frames: frame_tx,
        clock,
        banner_every: banner_every.max(Duration::from_secs(1)),
        last_clock: face,
    };
    let join = tokio::spawn(task.run(shutdown));

    let handle = BoardHandle {
        inputs: input_tx,
        frames: frame_rx,
    };
    (handle, join)
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

impl BoardTask {
    async fn run(mut self, shutdown: CancellationToken) {
        let mut clock_tick = interval(Duration::from_secs(1));
        clock_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut banner_tick = interval(self.banner_every);
        banner_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Board task started");
        loop {
            let deadline = self.board.next_deadline();
            tokio::select! {
                _ = shutdown.cancelled() => break,
                input = self.inputs.recv() => match input {
                    Some(input) => self.board.handle_input(input, Instant::now()),
                    None => break,
                },
                event = self.events.recv() => match event {
                    Ok(event) => self.apply_event(event),
                    Err(RecvError::Lagged(n)) => warn!("Board lagged {} bus events", n),
                    Err(RecvError::Closed) => break,
                },
                _ = clock_tick.tick() => {
                    let local = (self.clock)();
                    self.board.refresh_day(Instant::now(), local);
                }
                _ = banner_tick.tick() => {
                    let local = (self.clock)();
                    self.board.refresh_banner(local);
                }
                _ = wait_until(deadline) => {}
            }

            self.board.poll(Instant::now());
            self.publish();
        }
        info!("Board task stopped");
    }

    fn apply_event(&mut self, event: BusEvent) {
        debug!("Board received {}", event.kind());
        match event {
            BusEvent::SnapshotChanged { snapshot, hash } => {
                debug!("Applying snapshot {}", &hash[..hash.len().min(12)]);
                let local = (self.clock)();
                self.board.apply_snapshot(snapshot, Instant::now(), local);
            }
            BusEvent::SnapshotUnchanged { .. } | BusEvent::AccessProvisioned => {
                self.board.set_setup_required(false);
            }
            BusEvent::AccessRequired => self.board.set_setup_required(true),
            BusEvent::WeatherUpdated { reading } => self.board.set_weather(reading),
            BusEvent::FetchFailed { .. } => {}
        }
    }

    fn publish(&mut self) {
        let face = ClockFace::at((self.clock)());
        if self.board.revision() == self.last_revision && face == self.last_clock {
            return;
        }
        let frame = self.renderer.render(&self.board.view(), face.clone());
        self.last_revision = frame.revision;
        self.last_clock = face;
        self.frames.send_replace(Arc::new(frame));
    }
}
