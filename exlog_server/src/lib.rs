//! exlog HTTP server.
//!
//! Exposes the exercise tracker over JSON (and form-encoded) HTTP. Routes
//! are served both at the root and under `/api`.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use exlog_core::config::{ServerConfig, StoreConfig};
use exlog_core::{Config, JsonlStore, MemoryStore, Result, StoreBackend, UserStore};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

/// Build the application router
pub fn app(state: AppState, server: &ServerConfig) -> Router {
    let routes = Router::new()
        .route("/users", post(handlers::create_user).get(handlers::list_users))
        .route("/users/:id/exercises", post(handlers::append_exercise))
        .route("/users/:id/logs", get(handlers::user_logs))
        .route("/health", get(handlers::health));

    let mut app = Router::new()
        .merge(routes.clone())
        .nest("/api", routes)
        .with_state(state);

    if server.legacy_error_status {
        app = app.layer(middleware::map_response(error::legacy_error_status));
    }
    if server.cors {
        app = app.layer(CorsLayer::permissive());
    }

    app.layer(TraceLayer::new_for_http())
}

/// Open the record store selected by the configuration
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn UserStore>> {
    match config.backend {
        StoreBackend::Jsonl => Ok(Arc::new(JsonlStore::open(&config.data_dir)?)),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Open the store, bind the listener and serve until Ctrl-C
pub async fn run_server(config: Config) -> Result<()> {
    let store = open_store(&config.store)?;
    let app = app(AppState::new(store), &config.server);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Your app is listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
