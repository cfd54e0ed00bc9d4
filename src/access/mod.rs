//! Capability key store.
//!
//! The TV endpoint of the ticketing service is authenticated by a single
//! access key passed as a query parameter. The key is persisted to
//! `tv-access.json` in the data directory so a restart does not require
//! provisioning it again. A rejected key is cleared, and the cleared state is
//! persisted too, so the configured seed key is not retried forever.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

const ACCESS_FILE: &str = "tv-access.json";

#[derive(Debug, Error)]
pub enum AccessStoreError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode access file: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredAccess {
    key: Option<String>,
    updated_at: Option<DateTime<Utc>>,
}

fn normalize(key: &str) -> Option<String> {
    let key = key.trim();
    (!key.is_empty()).then(|| key.to_string())
}

#[derive(Clone)]
pub struct AccessKeyStore {
    state: Arc<RwLock<StoredAccess>>,
    data_dir: PathBuf,
}

impl AccessKeyStore {
    /// Load the persisted key, falling back to `seed` when nothing was ever stored.
    pub fn new(data_dir: PathBuf, seed: Option<&str>) -> Self {
        let state = Self::load_from_disk(&data_dir).unwrap_or_else(|| StoredAccess {
            key: seed.and_then(normalize),
            updated_at: None,
        });
        Self {
            state: Arc::new(RwLock::new(state)),
            data_dir,
        }
    }

    fn access_file(data_dir: &Path) -> PathBuf {
        data_dir.join(ACCESS_FILE)
    }

    fn load_from_disk(data_dir: &Path) -> Option<StoredAccess> {
        let content = fs::read_to_string(Self::access_file(data_dir)).ok()?;
        match serde_json::from_str(&content) {
            Ok(stored) => Some(stored),
            Err(e) => {
                tracing::warn!("Ignoring unreadable {}: {}", ACCESS_FILE, e);
                None
            }
        }
    }

    async fn save_to_disk(&self) -> Result<(), AccessStoreError> {
        let json = {
            let state = self.state.read().await;
            serde_json::to_string_pretty(&*state)?
        };
        let path = Self::access_file(&self.data_dir);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| AccessStoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, json).map_err(|source| AccessStoreError::Io { path, source })
    }

    pub async fn get(&self) -> Option<String> {
        self.state.read().await.key.clone()
    }

    pub async fn is_set(&self) -> bool {
        self.state.read().await.key.is_some()
    }

    /// Store a new key. Returns false (and stores nothing) for a blank key.
    pub async fn set(&self, key: &str) -> Result<bool, AccessStoreError> {
        let Some(key) = normalize(key) else {
            return Ok(false);
        };
        {
            let mut state = self.state.write().await;
            if state.key.as_deref() == Some(key.as_str()) {
                return Ok(true);
            }
            state.key = Some(key);
            state.updated_at = Some(Utc::now());
        }
        self.save_to_disk().await?;
        tracing::info!("TV access key stored");
        Ok(true)
    }

    /// Forget the key after upstream rejected it.
    pub async fn clear(&self) -> Result<(), AccessStoreError> {
        {
            let mut state = self.state.write().await;
            if state.key.is_none() && state.updated_at.is_some() {
                return Ok(());
            }
            state.key = None;
            state.updated_at = Some(Utc::now());
        }
        self.save_to_disk().await?;
        tracing::warn!("TV access key cleared");
        Ok(())
    }
}
