//! Tessera Gateway
//!
//! HTTP service that authenticates requests with opaque tessera tokens.
//!
//! ## Identity Endpoints
//!
//! - `GET /me` - Caller's session record (401 without a live session)
//! - `GET /context` - Resolved request context, anonymous included
//! - `GET /token` - Fields decoded from the presented token
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics

mod config;
mod error;
mod handlers;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::connect_info::IntoMakeServiceWithConnectInfo;
use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tessera_auth_core::metrics::{describe_metrics, RECONCILE_CYCLE_SECONDS};
use tessera_auth_core::TokenService;
use tessera_axum::TesseraLayer;
use tessera_store::RedisSessionStore;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::handlers::{health, identity};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    let env_file = tessera_utils::load_env();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive("gateway=debug".parse()?)
                .add_directive("tessera_auth_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Tessera Gateway");
    if let Some(path) = env_file {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        http_port = config.http_port,
        reconcile_interval_secs = config.tokens.reconcile_interval.as_secs(),
        "Configuration loaded"
    );

    // Initialize metrics
    let metrics_handle = if config.metrics_enabled {
        Some(setup_metrics()?)
    } else {
        None
    };

    // Create session store pool
    let pool = tessera_store::create_pool(
        &config.redis_url,
        config.redis_pool_size,
        config.redis_timeout,
    )?;
    if let Err(e) = tessera_store::ping(&pool).await {
        tracing::warn!(error = %e, "Session store unreachable at startup");
    } else {
        tracing::info!("Session store pool created");
    }

    // Create token service and start reconciliation
    let store = Arc::new(RedisSessionStore::new(pool.clone()));
    let tokens = Arc::new(TokenService::new(config.tokens.clone(), store));
    let shutdown = CancellationToken::new();
    let worker = tokens.worker().spawn(shutdown.clone());

    // Build HTTP router
    let state = AppState::new(tokens, pool, config.clone());
    let app = build_router(state, metrics_handle);

    let http_addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let result = run_http_server(app, http_addr).await;
    if let Err(e) = &result {
        tracing::error!(error = ?e, "HTTP server error");
    }

    // Stop the worker once the server has drained
    shutdown.cancel();
    if let Err(e) = worker.await {
        tracing::error!(error = %e, "Reconciliation worker failed");
    }

    tracing::info!("Shutdown complete");
    result
}

fn build_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let request_timeout = state.config.request_timeout;

    // Identity routes, resolved through the auth layer
    let identity_routes = Router::new()
        .route("/me", get(identity::me))
        .route("/context", get(identity::context))
        .route("/token", get(identity::token_info))
        .layer(TesseraLayer::new(Arc::clone(&state.tokens)));

    // Health routes (no timeout - must always respond quickly)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready));

    // Metrics route (no timeout)
    let metrics_route = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Build middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        // Request ID propagation (outermost)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        // Tracing with request details
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Request timeout (innermost - closest to handler)
        .layer(TimeoutLayer::new(request_timeout));

    Router::new()
        .merge(identity_routes)
        .layer(middleware)
        .merge(health_routes) // Health routes without timeout
        .merge(metrics_route) // Metrics route without timeout
        .with_state(state)
}

async fn run_http_server(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let service: IntoMakeServiceWithConnectInfo<Router, SocketAddr> =
        app.into_make_service_with_connect_info();

    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn setup_metrics() -> anyhow::Result<PrometheusHandle> {
    // Cycles read one Redis batch; anything past a second is worth seeing
    let cycle_buckets = &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(RECONCILE_CYCLE_SECONDS.to_string()),
            cycle_buckets,
        )?
        .install_recorder()?;

    describe_metrics();

    Ok(handle)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
