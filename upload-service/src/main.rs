use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use shared::observability::{init_logging, LogConfig};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

mod config;
mod db;
mod error;
mod handlers;
mod models;
mod storage;
#[cfg(test)]
mod testing;

use config::Config;
use db::{PgRecordStore, RecordStore};
use storage::{CloudinaryUploader, MediaUploader};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub uploader: Arc<dyn MediaUploader>,
}

pub fn create_router(state: AppState, body_limit: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/uploads", post(handlers::uploads::create_upload))
        .route("/data", get(handlers::uploads::list_uploads))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;

    init_logging(LogConfig {
        format: config.log_format,
        service_name: "upload-service".to_string(),
        ..Default::default()
    })?;

    info!("Starting Upload Service v{}", env!("CARGO_PKG_VERSION"));

    // The store must be reachable before any request is accepted
    let pool = shared::database::create_connection_pool(&config.database)
        .await
        .map_err(|e| {
            error!("Error connecting to database: {}", e);
            e
        })
        .context("Failed to connect to database")?;

    let store = PgRecordStore::new(pool.clone());
    store
        .migrate()
        .await
        .context("Failed to run database migrations")?;

    let uploader = CloudinaryUploader::new(config.cloudinary.clone())
        .context("Failed to initialize Cloudinary client")?;

    let state = AppState {
        store: Arc::new(store),
        uploader: Arc::new(uploader),
    };

    let app = create_router(state, config.server.body_limit_bytes());

    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("Invalid SERVER_HOST '{}'", config.server.host))?;
    let addr = SocketAddr::new(host, config.server.port);

    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Upload Service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    shared::database::close_connections(&pool).await;
    info!("Upload Service shut down gracefully");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
