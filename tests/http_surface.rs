//! HTTP surface tests
//!
//! Exercises the router end to end with `tower::ServiceExt::oneshot`: setup
//! redirects, key provisioning, the frame endpoint and input forwarding.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use facility_tv_board::access::AccessKeyStore;
use facility_tv_board::adapters::{SnapshotFetcher, WeatherAdapter};
use facility_tv_board::api::{self, AppState};
use facility_tv_board::board::{self, BoardSettings};
use facility_tv_board::bus::{create_bus, BusEvent, SharedBus};
use facility_tv_board::config::{UpstreamConfig, WeatherConfig};

struct Harness {
    app: Router,
    access: AccessKeyStore,
    bus: SharedBus,
    shutdown: CancellationToken,
    _dir: tempfile::TempDir,
}

impl Harness {
    fn new(seed: Option<&str>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let access = AccessKeyStore::new(dir.path().to_path_buf(), seed);
        let bus = create_bus();
        let shutdown = CancellationToken::new();

        let (board, _task) = board::spawn_board(
            BoardSettings::default(),
            Duration::from_secs(10),
            &bus,
            board::system_clock(),
            shutdown.clone(),
        );
        // Never started: requests only go out when a test asks for them
        let upstream = UpstreamConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let fetcher = Arc::new(SnapshotFetcher::new(
            &upstream,
            Duration::from_secs(60),
            access.clone(),
            bus.clone(),
        ));
        let weather = Arc::new(WeatherAdapter::new(
            WeatherConfig {
                enabled: false,
                ..Default::default()
            },
            bus.clone(),
        ));

        let state = AppState::new(board, access.clone(), fetcher, weather, bus.clone());
        Self {
            app: api::router(state),
            access,
            bus,
            shutdown,
            _dir: dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Option<String>, String) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, location, String::from_utf8_lossy(&body).into_owned())
    }

    async fn get(&self, uri: &str) -> (StatusCode, Option<String>, String) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn is_redirect(status: StatusCode) -> bool {
    status.is_redirection()
}

#[tokio::test]
async fn tv_without_key_redirects_to_setup() {
    let harness = Harness::new(None);

    let (status, location, _) = harness.get("/tv").await;
    assert!(is_redirect(status));
    assert_eq!(location.as_deref(), Some("/tv/setup"));

    let (status, _, body) = harness.get("/tv/setup").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("<!DOCTYPE html>"));
    assert!(body.contains(r#"action="/tv/setup""#));
}

#[tokio::test]
async fn key_in_query_is_provisioned_and_stripped() {
    let harness = Harness::new(None);
    let mut rx = harness.bus.subscribe();

    let (status, location, _) = harness.get("/tv?key=screen-42").await;
    assert!(is_redirect(status));
    assert_eq!(location.as_deref(), Some("/tv"));
    assert_eq!(harness.access.get().await.as_deref(), Some("screen-42"));
    assert!(matches!(rx.recv().await.unwrap(), BusEvent::AccessProvisioned));

    let (status, _, body) = harness.get("/tv").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"id="btn-fullscreen""#));
    assert!(body.contains("today-empty"));
    assert!(body.contains("EventSource"));
}

#[tokio::test]
async fn setup_form_stores_key() {
    let harness = Harness::new(None);

    let request = Request::post("/tv/setup")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("key=%20%20"))
        .unwrap();
    let (status, _, body) = harness.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("setup-error"));
    assert!(!harness.access.is_set().await);

    let request = Request::post("/tv/setup")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("key=lobby-screen"))
        .unwrap();
    let (status, location, _) = harness.send(request).await;
    assert!(is_redirect(status));
    assert_eq!(location.as_deref(), Some("/tv"));
    assert_eq!(harness.access.get().await.as_deref(), Some("lobby-screen"));
}

#[tokio::test]
async fn frame_includes_lists_and_clock() {
    let harness = Harness::new(Some("k"));

    let (status, _, body) = harness.get("/tv/frame").await;
    assert_eq!(status, StatusCode::OK);
    let frame: Value = serde_json::from_str(&body).unwrap();
    assert!(frame["lists"]["today"].as_str().unwrap().contains("today-empty"));
    assert_eq!(frame["mode"], "auto");
    assert_eq!(frame["has_data"], false);
    assert_eq!(frame["clock"]["time"].as_str().unwrap().len(), 5);
}

#[tokio::test]
async fn input_switches_board_to_manual() {
    let harness = Harness::new(Some("k"));

    let request = Request::post("/tv/input")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"type":"key","key":"ArrowDown"}"#))
        .unwrap();
    let (status, _, _) = harness.send(request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let mut mode = String::new();
    for _ in 0..50 {
        let (_, _, body) = harness.get("/tv/frame").await;
        let frame: Value = serde_json::from_str(&body).unwrap();
        mode = frame["mode"].as_str().unwrap_or_default().to_string();
        if mode == "manual" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(mode, "manual");

    let request = Request::post("/tv/input")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"type":"teleport"}"#))
        .unwrap();
    let (status, _, _) = harness.send(request).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn status_reports_service_and_key() {
    let harness = Harness::new(Some("k"));

    let (status, _, body) = harness.get("/status").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["service"], "facility-tv-board");
    assert_eq!(json["access_key_set"], true);
    assert_eq!(json["has_data"], false);
}
