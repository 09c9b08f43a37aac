use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use careers_api::auth::local::LocalIdentity;
use careers_api::config::ServerConfig;
use careers_api::notifications::{NotificationHub, NotificationRouter};
use careers_api::router::build_app_router;
use careers_api::state::AppState;
use careers_api::ws;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "careers_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid server configuration")?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Document store ---
    let pool = careers_db::create_pool(&config.store_url)
        .await
        .context("Failed to open document store")?;
    careers_db::health_check(&pool)
        .await
        .context("Document store health check failed")?;
    tracing::info!("Document store ready");

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.upload_dir.display()))?;

    // --- Identity provider ---
    let identity = Arc::new(LocalIdentity::new(
        config.identity.clone(),
        &config.public_base_url,
    ));

    // --- WebSocket manager ---
    let ws_manager = Arc::new(ws::WsManager::new());
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager));

    // --- Event bus ---
    let event_bus = Arc::new(careers_events::EventBus::default());
    let notification_hub = Arc::new(NotificationHub::new());

    // Activity feed entries for every event.
    let recorder_handle = tokio::spawn(careers_events::ActivityRecorder::run(
        pool.clone(),
        event_bus.subscribe(),
    ));

    // Stored notifications, SSE streams and chat sockets.
    let notification_router = NotificationRouter::new(
        pool.clone(),
        Arc::clone(&notification_hub),
        Arc::clone(&ws_manager),
    );
    let router_handle = tokio::spawn(notification_router.run(event_bus.subscribe()));
    tracing::info!("Event services started (activity recorder, notification router)");

    // --- App state ---
    let shutdown = CancellationToken::new();
    let state = AppState {
        pool,
        identity,
        config: Arc::new(config.clone()),
        ws_manager: Arc::clone(&ws_manager),
        notification_hub,
        event_bus: Arc::clone(&event_bus),
        shutdown: shutdown.clone(),
    };

    let app = build_app_router(state, &config)?;

    // --- Start server ---
    let host: IpAddr = config
        .host
        .parse()
        .with_context(|| format!("Invalid HOST address '{}'", config.host))?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Dropping the last bus handle closes the channel; both services then exit.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), recorder_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), router_handle).await;
    tracing::info!("Event services shut down");

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    heartbeat_handle.abort();
    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for SIGINT or SIGTERM, then cancel `shutdown` so open notification
/// streams finish and the server can drain.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
    shutdown.cancel();
}
