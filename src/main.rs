/// Nodeflow: node-graph workflow automation
///
/// Main entry point for the nodeflow server. Loads configuration from the
/// environment and starts the HTTP server.

use nodeflow::{config::Config, server::start_server};

/// Application entry point
///
/// The server provides:
/// - Workflow management API at /api/workflows/*
/// - Workflow execution at /api/workflows/{id}/execute
/// - Real-time channel at /ws
/// - Health check at /healthz
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::default();

    start_server(config).await?;

    Ok(())
}
