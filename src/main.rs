//! Facility TV Board - kiosk server for the planning dashboard

use facility_tv_board::{access, adapters, api, board, bus, config};

use adapters::Startable;
use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "facility_tv_board=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Starting Facility TV Board v{} ({})",
        env!("TVB_VERSION"),
        env!("TVB_GIT_SHA")
    );

    // Load configuration
    let config = config::load_config()?;
    tracing::info!(
        "Configuration loaded, port: {}, upstream: {}",
        config.port,
        config.upstream.base_url
    );

    let data_dir = config::get_data_dir();
    let access = access::AccessKeyStore::new(data_dir, config.upstream.access_key.as_deref());
    if !access.is_set().await {
        tracing::warn!("No TV access key yet, open /tv/setup to provision one");
    }

    // Create event bus
    let bus = bus::create_bus();
    tracing::info!("Event bus initialized");

    // Board task subscribes before the adapters publish anything
    let shutdown = CancellationToken::new();
    let (board, board_task) = board::spawn_board(
        board::BoardSettings::from_config(&config.board),
        Duration::from_secs(config.board.banner_refresh_secs),
        &bus,
        board::system_clock(),
        shutdown.clone(),
    );

    let fetcher = Arc::new(adapters::SnapshotFetcher::new(
        &config.upstream,
        Duration::from_secs(config.board.refresh_secs),
        access.clone(),
        bus.clone(),
    ));
    let weather = Arc::new(adapters::WeatherAdapter::new(
        config.weather.clone(),
        bus.clone(),
    ));

    let background: Vec<Arc<dyn Startable>> = vec![
        fetcher.clone() as Arc<dyn Startable>,
        weather.clone() as Arc<dyn Startable>,
    ];
    adapters::traits::start_all(&background).await;

    let state = api::AppState::new(board, access, fetcher, weather, bus);
    let app = api::router(state);

    // Start server with graceful shutdown. Cancelling the board closes the
    // frame streams, so open SSE connections do not hold shutdown up.
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown({
            let shutdown = shutdown.clone();
            async move {
                shutdown_signal().await;
                shutdown.cancel();
            }
        })
        .await?;

    // Cleanup: stop adapters, then wait for the board
    tracing::info!("Shutting down adapters...");
    adapters::traits::stop_all(&background).await;
    shutdown.cancel();
    if let Err(e) = board_task.await {
        tracing::warn!("Board task ended abnormally: {}", e);
    }
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
