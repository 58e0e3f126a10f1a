/// HTTP API Layer
///
/// This module provides the transport surface around the engine:
/// - Workflow CRUD and execution endpoints
/// - Real-time WebSocket channel

// Workflow management endpoints (POST/GET/PUT/DELETE + execute)
pub mod workflows;

// WebSocket endpoint
pub mod realtime;

// Re-export router builders
pub use realtime::create_realtime_routes;
pub use workflows::{create_workflow_routes, AppState};
