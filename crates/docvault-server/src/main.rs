//! `docvault` server entry point.
//!
//! Bootstraps the mock gateways, registry, and session store, then
//! starts the Axum HTTP server with graceful shutdown. A background
//! session-expiry worker runs alongside the server and is cancelled on
//! shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::middleware as axum_mw;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use docvault_core::session::SessionStore;
use docvault_core::upload::UploadSettings;
use docvault_gateway::{MockBackend, MockLatency};

use docvault_server::config::{LatencyProfile, ServerConfig};
use docvault_server::middleware::session_middleware;
use docvault_server::routes;
use docvault_server::state::AppState;

use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(latency = ?config.latency_profile, "docvault starting");

    let state = build_app_state(&config);

    // Shutdown signal channel.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Spawn the session expiry background worker.
    let expiry_worker_handle = {
        let sessions = Arc::clone(&state.sessions);
        let mut rx = shutdown_rx.clone();
        let interval = config.session_scan_interval;
        let ttl = config.session_ttl;
        tokio::spawn(async move {
            session_expiry_worker(sessions, &mut rx, interval, ttl).await;
        })
    };

    let app = build_router(Arc::clone(&state), &config);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "docvault server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await
        .context("server error")?;

    // Wait for the background worker to finish (with timeout).
    info!("waiting for background workers to stop");
    let _ = tokio::time::timeout(Duration::from_secs(10), expiry_worker_handle).await;

    info!("docvault server stopped");
    Ok(())
}

/// Build the shared application state over one mock backend instance.
fn build_app_state(config: &ServerConfig) -> Arc<AppState> {
    let latency = match config.latency_profile {
        LatencyProfile::Realistic => MockLatency::default(),
        LatencyProfile::Zero => MockLatency::zero(),
    };
    let backend = Arc::new(
        MockBackend::new(latency).with_success_rate(config.verify_success_rate),
    );

    let settings = UploadSettings {
        max_file_size: config.max_file_size,
        stage_timeout: config.stage_timeout,
    };

    Arc::new(AppState::new(
        Arc::clone(&backend) as _,
        Arc::clone(&backend) as _,
        Arc::clone(&backend) as _,
        backend as _,
        settings,
    ))
}

/// Assemble the `/v1` router with the wallet gate and HTTP middlewares.
fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    // Leave headroom above the ceiling so our own validation answers
    // with the structured 413 instead of the transport rejecting first.
    let body_limit = usize::try_from(config.max_file_size.saturating_mul(2))
        .unwrap_or(usize::MAX);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderName::from_static("x-wallet-address"),
        ]);

    // Concurrency-limit the document routes: uploads hold the mock
    // latency for several seconds each.
    let document_routes = Router::new()
        .nest("/v1/documents", routes::documents::router())
        .layer(tower::limit::ConcurrencyLimitLayer::new(32));

    Router::new()
        .nest("/v1/sys", routes::sys::router())
        .nest("/v1/session", routes::session::router())
        .merge(document_routes)
        .route_layer(axum_mw::from_fn_with_state(
            Arc::clone(&state),
            session_middleware,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .with_state(state)
}

/// Background worker that periodically sweeps idle wallet sessions.
async fn session_expiry_worker(
    sessions: Arc<SessionStore>,
    shutdown: &mut watch::Receiver<bool>,
    scan_interval: Duration,
    ttl: Duration,
) {
    let mut interval = tokio::time::interval(scan_interval);
    info!(scan_interval_secs = scan_interval.as_secs(), ttl_secs = ttl.as_secs(), "session expiry worker started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                sessions.expire_older_than(ttl).await;
            }
            _ = shutdown.changed() => {
                info!("session expiry worker shutting down");
                return;
            }
        }
    }
}

/// Wait for SIGINT or SIGTERM, then broadcast shutdown.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
    let _ = shutdown_tx.send(true);
}
