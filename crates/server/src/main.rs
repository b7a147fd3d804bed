//! Travelboard server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, middleware};
use tokio::signal;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use travelboard_api::{AppState, auth_middleware, router as api_router};
use travelboard_common::{Config, LocalStorage, config::LoggingConfig};
use travelboard_core::HttpIdentityProvider;
use url::Url;

/// Multipart framing allowance on top of the configured upload size.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
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
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// `RUST_LOG` wins over the configured filter.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));

    let (json, plain) = if logging.json {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(plain)
        .init();
}

/// Route prefix uploaded files are served under, taken from the storage
/// base URL. Both absolute URLs and bare paths are accepted.
fn files_route(base_url: &str) -> String {
    let path = Url::parse(base_url)
        .map(|url| url.path().to_string())
        .unwrap_or_else(|_| base_url.to_string());
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/files".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    init_tracing(&config.logging);

    info!("Starting travelboard server...");

    let db = travelboard_db::init(&config).await?;
    info!("Running database migrations...");
    travelboard_db::migrate(&db).await?;
    info!("Migrations completed");

    let identity_provider = HttpIdentityProvider::new(&config.identity)?;
    let storage = LocalStorage::new(
        config.storage.base_path.clone(),
        config.storage.base_url.clone(),
    );

    let state = AppState::new(
        Arc::new(db),
        Arc::new(identity_provider),
        Arc::new(storage),
        config.storage.max_upload_bytes,
    );

    let files_route = files_route(&config.storage.base_url);
    info!(
        route = %files_route,
        path = %config.storage.base_path.display(),
        "Serving uploaded files"
    );

    let api = api_router()
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(DefaultBodyLimit::max(
            config.storage.max_upload_bytes + BODY_LIMIT_SLACK,
        ));

    let app = Router::new()
        .nest("/api", api)
        .nest_service(&files_route, ServeDir::new(&config.storage.base_path))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!(url = %config.server.url, "Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
