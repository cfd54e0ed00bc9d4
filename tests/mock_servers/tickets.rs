//! Mock ticketing service for testing
//!
//! Simulates the TV endpoint at /api/tv/data?key=...

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

pub const DATA_PATH: &str = "/api/tv/data";

/// Mock ticketing service state
struct MockTicketState {
    status: StatusCode,
    body: String,
    valid_key: String,
    keys_seen: Vec<Option<String>>,
}

/// Mock ticketing service
pub struct MockTicketService {
    addr: SocketAddr,
    state: Arc<RwLock<MockTicketState>>,
    handle: JoinHandle<()>,
}

#[derive(Debug, Deserialize)]
struct DataQuery {
    key: Option<String>,
}

impl MockTicketService {
    /// Start a mock service on a random port, accepting `valid_key`
    pub async fn start(valid_key: &str) -> Self {
        let state = Arc::new(RwLock::new(MockTicketState {
            status: StatusCode::OK,
            body: r#"{"events":[],"tickets":[]}"#.to_string(),
            valid_key: valid_key.to_string(),
            keys_seen: Vec::new(),
        }));

        let app = Router::new()
            .route(DATA_PATH, get(handle_data))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Replace the JSON body served to authorized requests
    pub async fn set_body(&self, body: &str) {
        self.state.write().await.body = body.to_string();
    }

    /// Force a status code for authorized requests (e.g. 500)
    pub async fn set_status(&self, status: StatusCode) {
        self.state.write().await.status = status;
    }

    /// Revoke the current key, as if it was regenerated server side
    pub async fn rotate_key(&self, valid_key: &str) {
        self.state.write().await.valid_key = valid_key.to_string();
    }

    pub async fn request_count(&self) -> usize {
        self.state.read().await.keys_seen.len()
    }

    pub async fn last_key(&self) -> Option<String> {
        self.state.read().await.keys_seen.last().cloned().flatten()
    }

    /// Stop the mock server
    pub async fn stop(self) {
        self.handle.abort();
    }
}

async fn handle_data(
    State(state): State<Arc<RwLock<MockTicketState>>>,
    Query(query): Query<DataQuery>,
) -> impl IntoResponse {
    let mut state = state.write().await;
    state.keys_seen.push(query.key.clone());

    if query.key.as_deref() != Some(state.valid_key.as_str()) {
        return (StatusCode::FORBIDDEN, "invalid key".to_string());
    }
    if state.status != StatusCode::OK {
        return (state.status, "upstream failure".to_string());
    }
    (StatusCode::OK, state.body.clone())
}
