use anyhow::Result;
use async_trait::async_trait;

// =============================================================================
// Startable - Uniform adapter lifecycle trait
// =============================================================================

/// Background adapters that can be started and stopped uniformly, so `main`
/// manages every poller through a single codepath.
#[async_trait]
pub trait Startable: Send + Sync {
    /// Adapter name for logging (e.g., "snapshot", "weather")
    fn name(&self) -> &'static str;

    /// Start the adapter. No-op if already running.
    async fn start(&self) -> Result<()>;

    /// Stop the adapter gracefully.
    async fn stop(&self);

    /// Whether this adapter should run at all (e.g., enabled in config).
    async fn can_start(&self) -> bool {
        true
    }
}

/// Implement `Startable` by delegating to inherent methods.
///
/// Adapters must implement:
/// - `async fn start_internal(&self) -> Result<()>`
/// - `async fn stop_internal(&self)`
/// - Optionally: custom `can_start` method (pass as third arg)
///
/// Usage:
/// ```ignore
/// impl_startable!(SnapshotFetcher, "snapshot");
/// impl_startable!(WeatherAdapter, "weather", is_enabled);
/// ```
#[macro_export]
macro_rules! impl_startable {
    ($adapter:ty, $name:literal, $can_start:ident) => {
        #[async_trait::async_trait]
        impl $crate::adapters::Startable for $adapter {
            fn name(&self) -> &'static str {
                $name
            }

            async fn start(&self) -> anyhow::Result<()> {
                self.start_internal().await
            }

            async fn stop(&self) {
                self.stop_internal().await
            }

            async fn can_start(&self) -> bool {
                self.$can_start().await
            }
        }
    };
    ($adapter:ty, $name:literal) => {
        #[async_trait::async_trait]
        impl $crate::adapters::Startable for $adapter {
            fn name(&self) -> &'static str {
                $name
            }

            async fn start(&self) -> anyhow::Result<()> {
                self.start_internal().await
            }

            async fn stop(&self) {
                self.stop_internal().await
            }
        }
    };
}

/// Start every adapter that can start, logging failures instead of aborting.
pub async fn start_all(adapters: &[std::sync::Arc<dyn Startable>]) {
    for adapter in adapters {
        if !adapter.can_start().await {
            tracing::info!("Adapter {} disabled, not starting", adapter.name());
            continue;
        }
        if let Err(e) = adapter.start().await {
            tracing::error!("Failed to start adapter {}: {}", adapter.name(), e);
        }
    }
}

/// Stop every adapter.
pub async fn stop_all(adapters: &[std::sync::Arc<dyn Startable>]) {
    for adapter in adapters {
        adapter.stop().await;
    }
}
