//! HTTP API handlers

use crate::access::AccessKeyStore;
use crate::adapters::snapshot::FetchStatus;
use crate::adapters::{SnapshotFetcher, WeatherAdapter};
use crate::board::inactivity::BoardMode;
use crate::board::tickers::WeatherReading;
use crate::board::{BoardHandle, BoardInput};
use crate::bus::SharedBus;
use crate::ui;
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Redirect, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::Stream;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub board: BoardHandle,
    pub access: AccessKeyStore,
    pub fetcher: Arc<SnapshotFetcher>,
    pub weather: Arc<WeatherAdapter>,
    pub bus: SharedBus,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        board: BoardHandle,
        access: AccessKeyStore,
        fetcher: Arc<SnapshotFetcher>,
        weather: Arc<WeatherAdapter>,
        bus: SharedBus,
    ) -> Self {
        Self {
            board,
            access,
            fetcher,
            weather,
            bus,
            started_at: Instant::now(),
        }
    }
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// General status response
#[derive(Serialize)]
pub struct StatusResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub git_sha: &'static str,
    pub uptime_secs: u64,
    pub access_key_set: bool,
    pub has_data: bool,
    pub mode: BoardMode,
    pub today_items: usize,
    pub urgent: usize,
    pub in_progress: usize,
    pub last_fetch: Option<FetchStatus>,
    pub weather: Option<WeatherReading>,
    pub bus_subscribers: usize,
}

/// GET /status - Service health check
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let frame = state.board.frame();

    Json(StatusResponse {
        service: "facility-tv-board",
        version: env!("TVB_VERSION"),
        git_sha: env!("TVB_GIT_SHA"),
        uptime_secs: state.started_at.elapsed().as_secs(),
        access_key_set: state.access.is_set().await,
        has_data: frame.has_data,
        mode: frame.mode,
        today_items: frame.stats.today_count,
        urgent: frame.stats.urgent,
        in_progress: frame.stats.in_progress,
        last_fetch: state.fetcher.last_fetch().await,
        weather: state.weather.last_reading().await,
        bus_subscribers: state.bus.subscriber_count(),
    })
}

// =============================================================================
// Board handlers
// =============================================================================

/// GET /tv/frame - Current frame, including list markup
pub async fn frame_handler(State(state): State<AppState>) -> Response {
    let frame = state.board.frame();
    Json(frame.payload(true)).into_response()
}

/// POST /tv/input - Forward one surface input to the board
pub async fn input_handler(
    State(state): State<AppState>,
    Json(input): Json<BoardInput>,
) -> impl IntoResponse {
    match state.board.send(input).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /tv/events - Server-Sent Events stream of board frames
///
/// List markup is only sent when the layout changed since this connection's
/// previous frame.
pub async fn events_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut sent_layout: Option<u64> = None;

    let stream = WatchStream::new(state.board.subscribe()).filter_map(move |frame| {
        let include_lists = sent_layout != Some(frame.layout_revision);
        match Event::default()
            .event("frame")
            .json_data(frame.payload(include_lists))
        {
            Ok(event) => {
                sent_layout = Some(frame.layout_revision);
                Some(Ok(event))
            }
            Err(e) => {
                tracing::warn!("Failed to encode frame: {}", e);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

/// GET / - The board is the only page
pub async fn root_redirect() -> Redirect {
    Redirect::to("/tv")
}

/// Build the HTTP router.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/status", get(status_handler))
        .route("/", get(root_redirect))
        // Board surface
        .route("/tv", get(ui::tv_page))
        .route("/tv/setup", get(ui::setup_page))
        .route("/tv/setup", post(ui::setup_submit))
        .route("/tv/frame", get(frame_handler))
        .route("/tv/events", get(events_handler))
        .route("/tv/input", post(input_handler))
        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
