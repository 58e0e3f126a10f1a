/// Server setup and initialization
///
/// Wires together all components: executor registry, workflow store, execution
/// engine and HTTP routes. Provides the application factory used by `main` and
/// by the HTTP tests.

use crate::{
    api::{create_realtime_routes, create_workflow_routes, AppState},
    config::Config,
    runtime::{
        engine::{ExecutionCoordinator, WorkflowEngine},
        registry::ExecutorRegistry,
    },
    workflow::storage::WorkflowStore,
};
use anyhow::Result;
use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Build the shared application state
///
/// The executor registry is populated here, once, and never mutated afterwards.
pub fn create_state(config: &Config) -> AppState {
    tracing::info!("⚙️ Registering built-in node executors");
    let registry = Arc::new(ExecutorRegistry::builtin());

    tracing::info!(
        "🚀 Initializing execution engine (max {} parallel nodes)",
        config.engine.max_parallel_nodes
    );
    let coordinator =
        ExecutionCoordinator::new(registry).with_max_parallel_nodes(config.engine.max_parallel_nodes);
    tracing::debug!("Executable node types: {:?}", coordinator.registry().node_types());

    tracing::info!("📋 Initializing workflow store");
    let store = Arc::new(WorkflowStore::new());

    AppState {
        engine: Arc::new(WorkflowEngine::new(store, coordinator)),
    }
}

/// Create the router for a prepared state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoint
        .route("/healthz", get(health_check))
        // Workflow management API routes
        .merge(create_workflow_routes())
        // Real-time channel
        .merge(create_realtime_routes())
        .with_state(state)
}

/// Create the main Axum application with all routes
pub fn create_app(config: &Config) -> Router {
    let app = create_router(create_state(config));
    tracing::info!("✅ Application initialized successfully");
    app
}

/// Start the HTTP server with the given configuration
///
/// Log verbosity follows `RUST_LOG` and defaults to `info`.
pub async fn start_server(config: Config) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting nodeflow server...");

    let app = create_app(&config);

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Health check endpoint handler
async fn health_check() -> &'static str {
    "ok"
}
