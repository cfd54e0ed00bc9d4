//! Mock open-meteo forecast endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

pub struct MockWeatherService {
    addr: SocketAddr,
    current: Arc<RwLock<Value>>,
    handle: JoinHandle<()>,
}

impl MockWeatherService {
    pub async fn start(temperature: f64, weather_code: u16) -> Self {
        let current = Arc::new(RwLock::new(json!({
            "temperature_2m": temperature,
            "weather_code": weather_code,
        })));

        let app = Router::new()
            .route("/v1/forecast", get(handle_forecast))
            .with_state(current.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            current,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn set_current(&self, temperature: f64, weather_code: u16) {
        *self.current.write().await = json!({
            "temperature_2m": temperature,
            "weather_code": weather_code,
        });
    }

    pub async fn stop(self) {
        self.handle.abort();
    }
}

async fn handle_forecast(State(current): State<Arc<RwLock<Value>>>) -> Json<Value> {
    Json(json!({
        "latitude": 45.5,
        "longitude": -73.56,
        "current": *current.read().await,
    }))
}
