//! Docker Hub Rate-Limit Exporter
//!
//! Single-binary Rust service that:
//! 1. Obtains (and caches) a registry token, anonymously or with Basic auth
//! 2. Requests the rate-limit preview manifest with a `HEAD` request
//! 3. Publishes the reported quota as Prometheus metrics on every scrape

mod cli;
mod config;
mod error;
mod metrics;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use ratelimit_collector::Exporter;
use registry_auth::TokenCache;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::config::{Config, DEFAULT_CONFIG_PATH, HEALTH_PATH};

const PROGRAM: &str = "dockerhub-ratelimit-exporter";

/// Shared application state accessible from all handlers
#[derive(Clone)]
struct AppState {
    exporter: Arc<Exporter>,
    metrics_path: Arc<str>,
    started_at: Instant,
}

/// Build the axum router with all routes and shared state.
///
/// `max_connections` caps concurrent requests; scrapes are serialized inside
/// the exporter regardless.
fn build_router(state: AppState, max_connections: usize) -> Router {
    let metrics_path = state.metrics_path.clone();
    Router::new()
        .route("/", get(landing_handler))
        .route(&metrics_path, get(metrics_handler))
        .route(HEALTH_PATH, get(health_handler))
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_connections))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = match Cli::parse(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{e}\n\n{}", cli::usage(PROGRAM));
            std::process::exit(2);
        }
    };
    if cli.help {
        print!("{}", cli::usage(PROGRAM));
        return Ok(());
    }
    if cli.version {
        println!("{PROGRAM} {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "starting {PROGRAM}");

    let mut config = match Config::resolve_path(cli.config.as_deref()) {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            Config::load(&path)
                .with_context(|| format!("failed to load config from {}", path.display()))?
        }
        None => Config::load_or_default(Path::new(DEFAULT_CONFIG_PATH))
            .with_context(|| format!("failed to load config from {DEFAULT_CONFIG_PATH}"))?,
    };
    config.apply_cli(&cli);
    config.validate().context("invalid configuration")?;

    let credentials = config.registry.credentials();
    info!(
        listen_addr = %config.server.listen_addr,
        metrics_path = %config.server.metrics_path,
        authenticated = credentials.is_some(),
        "configuration loaded"
    );

    let client = reqwest::Client::builder()
        .timeout(config.registry.timeout())
        .build()
        .context("failed to build HTTP client")?;
    let tokens = TokenCache::new(config.registry.auth_url.clone(), credentials)
        .with_buffer(config.registry.token_expiry_buffer());
    info!(auth_url = tokens.auth_url(), "token cache ready");
    let exporter = Arc::new(Exporter::new(
        client,
        tokens,
        config.registry.rate_limit_url.clone(),
    ));
    info!(rate_limit_url = exporter.rate_limit_url(), "exporter ready");

    let state = AppState {
        exporter,
        metrics_path: config.server.metrics_path.as_str().into(),
        started_at: Instant::now(),
    };
    let app = build_router(state, config.server.max_connections);

    let listen_addr = config.server.listen_addr;
    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind to {listen_addr}"))?;
    info!(addr = %listen_addr, "accepting requests");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

/// Landing page pointing at the metrics path.
async fn landing_handler(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html>\n\
         <head><title>Docker Hub Exporter</title></head>\n\
         <body>\n\
         <h1>Docker Hub Exporter</h1>\n\
         <p><a href='{}'>Metrics</a></p>\n\
         </body>\n\
         </html>\n",
        state.metrics_path
    ))
}

/// Prometheus metrics endpoint: scrapes the registry, then renders.
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let body = metrics::render(state.exporter.as_ref()).await;
    (
        axum::http::StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        body,
    )
}

/// Health endpoint: uptime and the last scrape state. Never triggers a scrape.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.exporter.snapshot().await;
    let body = serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "scrapes_total": snapshot.scrapes_total,
        "poll_failures_total": snapshot.failures_total,
        "limit": snapshot.observation.limit,
        "remaining": snapshot.observation.remaining,
        "source_ip": snapshot.observation.source_label(),
    });

    (
        axum::http::StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
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
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
