//! A1 Mediator - Policy Type Service
//!
//! REST front for policy types of the near-RT RIC, stored in a shared
//! namespaced key-value store.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      A1 MEDIATOR                         │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐   ┌───────────────┐   ┌─────────────┐  │
//! │  │  REST API    │──▶│  Policy Type  │──▶│  Backend    │  │
//! │  │  (Axum)      │   │  Store        │   │  (trait)    │  │
//! │  └──────────────┘   └───────────────┘   └──────┬──────┘  │
//! │                                                │         │
//! │                             ┌──────────────────┴──────┐  │
//! │                             ▼                         ▼  │
//! │                      ┌─────────────┐        ┌──────────┐ │
//! │                      │ PostgreSQL  │        │ In-memory│ │
//! │                      └─────────────┘        └──────────┘ │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod models;
mod handlers;
mod error;
mod metrics;
mod storage;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::{
    map_response_body::MapResponseBodyLayer,
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

use config::{BackendKind, Config};
use metrics::Metrics;
use storage::{Backend, MemoryBackend, PgBackend};
use store::PolicyTypeStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env().map_err(anyhow::Error::msg)?;

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "a1_mediator=debug,tower_http=debug".into());
    if config.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("A1 Mediator starting...");

    let backend: Arc<dyn Backend> = match config.backend {
        BackendKind::Memory => {
            if config.is_production() {
                tracing::warn!("In-memory backend selected in production, policy types will not survive a restart");
            }
            tracing::info!("Using in-memory backend");
            Arc::new(MemoryBackend::new())
        }
        BackendKind::Postgres => {
            tracing::info!("Database: {}", config.database_url.rsplit('@').next().unwrap_or("***"));
            let backend = PgBackend::connect(&config.database_url, config.db_max_connections)
                .await
                .context("Failed to connect to the key-value database")?;
            Arc::new(backend)
        }
    };

    let store = PolicyTypeStore::new(backend, config.namespace.clone())
        .with_span(tracing::info_span!("policy_types", namespace = %config.namespace));
    tracing::info!("Policy types stored in namespace {}", store.namespace());

    // Build application state
    let state = AppState {
        store,
        config: config.clone(),
        metrics: Metrics::new().context("Failed to register metrics")?,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: PolicyTypeStore,
    pub config: Config,
    pub metrics: Metrics,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let a1_routes = Router::new()
        .route("/healthcheck", get(handlers::health::check))
        .route("/metrics", get(handlers::metrics::render))

        // Policy types
        .route("/policytypes", get(handlers::policy_types::list))
        .route(
            "/policytypes/:policy_type_id",
            get(handlers::policy_types::get).put(handlers::policy_types::create),
        )
        .route("/policytypes/:policy_type_id/status", get(handlers::policy_types::status));

    Router::new()
        .nest("/a1-p", a1_routes)
        .layer(
            ServiceBuilder::new()
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any)
                )
                .layer(MapResponseBodyLayer::new(axum::body::Body::new))
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
        )
        .with_state(state)
}
