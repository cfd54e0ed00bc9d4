//! Snapshot fetcher - polls the ticketing service's TV endpoint
//!
//! Fetches `{ events, tickets, message, ... }` once at start and then on a
//! fixed interval. The raw body is hashed (SHA-256) and compared with the last
//! decoded payload, so identical content never triggers a re-render. A
//! rejected key is cleared and the board is told to show the setup flow; any
//! other failure is logged and retried on the next tick, leaving the last good
//! snapshot on screen.

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Notify, RwLock};
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::access::AccessKeyStore;
use crate::board::model::Snapshot;
use crate::bus::{BusEvent, SharedBus};
use crate::config::UpstreamConfig;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no access key configured")]
    MissingKey,
    #[error("access key rejected (HTTP {0})")]
    Unauthorized(u16),
    #[error("upstream returned HTTP {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid snapshot payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl FetchError {
    /// Failures that need a new key rather than a retry.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::MissingKey | Self::Unauthorized(_))
    }
}

/// Result of one successful fetch.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Changed {
        snapshot: Arc<Snapshot>,
        hash: String,
    },
    Unchanged { hash: String },
}

/// SHA-256 of the raw body, hex encoded.
pub fn content_hash(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchState {
    Changed,
    Unchanged,
    AccessRequired,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchStatus {
    pub at: DateTime<Utc>,
    pub state: FetchState,
    pub error: Option<String>,
}

#[derive(Default)]
struct FetcherState {
    last_hash: Option<String>,
    last_fetch: Option<FetchStatus>,
    running: bool,
}

#[derive(Clone)]
pub struct SnapshotFetcher {
    state: Arc<RwLock<FetcherState>>,
    bus: SharedBus,
    http: Client,
    access: AccessKeyStore,
    base_url: String,
    data_path: String,
    refresh_every: Duration,
    refresh: Arc<Notify>,
    /// Wrapped in RwLock to allow creating fresh token on restart
    shutdown: Arc<RwLock<CancellationToken>>,
}

impl SnapshotFetcher {
    pub fn new(
        config: &UpstreamConfig,
        refresh_every: Duration,
        access: AccessKeyStore,
        bus: SharedBus,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(FetcherState::default())),
            bus,
            http: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs.max(1)))
                .build()
                .unwrap_or_default(),
            access,
            base_url: config.base_url.clone(),
            data_path: config.data_path.clone(),
            refresh_every: refresh_every.max(Duration::from_secs(1)),
            refresh: Arc::new(Notify::new()),
            shutdown: Arc::new(RwLock::new(CancellationToken::new())),
        }
    }

    fn endpoint(&self, key: &str) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.base_url)?.join(&self.data_path)?;
        url.query_pairs_mut().append_pair("key", key);
        Ok(url)
    }

    /// Fetch once and compare against the last decoded payload.
    pub async fn fetch_once(&self) -> Result<FetchOutcome, FetchError> {
        let key = self.access.get().await.ok_or(FetchError::MissingKey)?;
        let url = self.endpoint(&key)?;

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FetchError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let hash = content_hash(&body);

        if self.state.read().await.last_hash.as_deref() == Some(hash.as_str()) {
            return Ok(FetchOutcome::Unchanged { hash });
        }

        let snapshot: Snapshot = serde_json::from_slice(&body)?;
        self.state.write().await.last_hash = Some(hash.clone());
        Ok(FetchOutcome::Changed {
            snapshot: Arc::new(snapshot),
            hash,
        })
    }

    /// One poll cycle: fetch, record, publish. Never fails.
    pub async fn poll_once(&self) {
        let (state, error) = match self.fetch_once().await {
            Ok(FetchOutcome::Changed { snapshot, hash }) => {
                tracing::info!(
                    "Snapshot changed ({} events, {} tickets)",
                    snapshot.events.len(),
                    snapshot.tickets.len()
                );
                self.bus.publish(BusEvent::SnapshotChanged { snapshot, hash });
                (FetchState::Changed, None)
            }
            Ok(FetchOutcome::Unchanged { hash }) => {
                tracing::debug!("Snapshot unchanged, skipping render");
                self.bus.publish(BusEvent::SnapshotUnchanged { hash });
                (FetchState::Unchanged, None)
            }
            Err(e) if e.is_unauthorized() => {
                if matches!(e, FetchError::Unauthorized(_)) {
                    tracing::warn!("Upstream rejected access key: {}", e);
                    if let Err(store_err) = self.access.clear().await {
                        tracing::error!("Failed to clear access key: {}", store_err);
                    }
                } else {
                    tracing::debug!("No access key, waiting for setup");
                }
                self.bus.publish(BusEvent::AccessRequired);
                (FetchState::AccessRequired, Some(e.to_string()))
            }
            Err(e) => {
                tracing::warn!("Snapshot fetch failed: {}", e);
                self.bus.publish(BusEvent::FetchFailed {
                    error: e.to_string(),
                });
                (FetchState::Failed, Some(e.to_string()))
            }
        };

        self.state.write().await.last_fetch = Some(FetchStatus {
            at: Utc::now(),
            state,
            error,
        });
    }

    /// Ask the poll loop to fetch now (e.g. after a key was provisioned).
    pub fn refresh_now(&self) {
        self.refresh.notify_one();
    }

    pub async fn last_fetch(&self) -> Option<FetchStatus> {
        self.state.read().await.last_fetch.clone()
    }

    async fn start_internal(&self) -> anyhow::Result<()> {
        {
            let mut state = self.state.write().await;
            if state.running {
                return Ok(());
            }
            state.running = true;
        }

        let shutdown = {
            let mut token = self.shutdown.write().await;
            *token = CancellationToken::new();
            token.clone()
        };

        let fetcher = self.clone();
        tokio::spawn(async move {
            fetcher.poll_loop(shutdown).await;
        });

        tracing::info!(
            "Snapshot fetcher started ({}{}, every {:?})",
            self.base_url,
            self.data_path,
            self.refresh_every
        );
        Ok(())
    }

    async fn poll_loop(&self, shutdown: CancellationToken) {
        let mut ticker = interval(self.refresh_every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Snapshot poll loop shutting down");
                    break;
                }
                // First tick completes immediately: fetch once at start
                _ = ticker.tick() => {}
                _ = self.refresh.notified() => {
                    ticker.reset();
                }
            }
            self.poll_once().await;
        }
    }

    async fn stop_internal(&self) {
        self.shutdown.read().await.cancel();
        self.state.write().await.running = false;
        tracing::info!("Snapshot fetcher stopped");
    }
}

crate::impl_startable!(SnapshotFetcher, "snapshot");
