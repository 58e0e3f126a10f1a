/// Workflow management REST API endpoints
///
/// Provides CRUD operations for workflow definitions plus synchronous execution.
/// Handlers only translate between HTTP and the store/engine; all workflow
/// semantics live in the workflow and runtime layers.

use crate::{
    runtime::{engine::WorkflowEngine, result::ExecutionResult},
    workflow::{error::StoreError, types::Workflow},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Store-backed execution engine (also owns the workflow store)
    pub engine: Arc<WorkflowEngine>,
}

/// Create workflow management routes
///
/// Sets up the REST API endpoints for workflow CRUD and execution.
pub fn create_workflow_routes() -> Router<AppState> {
    Router::new()
        .route("/api/workflows", post(create_workflow).get(list_workflows))
        .route(
            "/api/workflows/{id}",
            get(get_workflow).put(update_workflow).delete(delete_workflow),
        )
        .route("/api/workflows/{id}/execute", post(execute_workflow))
}

fn store_error_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::AlreadyExists(_) => StatusCode::CONFLICT,
    }
}

/// Create a new workflow
///
/// POST /api/workflows
/// Body: { "name": "...", "nodes": [...], "connections": [...] }
async fn create_workflow(
    State(state): State<AppState>,
    Json(workflow): Json<Workflow>,
) -> Result<Json<Workflow>, StatusCode> {
    if workflow.name.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    match state.engine.store().create(workflow).await {
        Ok(created) => {
            tracing::info!("🔥 Created workflow: {} ({})", created.id, created.name);
            Ok(Json(created))
        }
        Err(e) => {
            tracing::warn!("Failed to create workflow: {}", e);
            Err(store_error_status(&e))
        }
    }
}

/// List all workflows
///
/// GET /api/workflows
async fn list_workflows(State(state): State<AppState>) -> Json<Vec<Workflow>> {
    Json(state.engine.store().list().await)
}

/// Get a specific workflow by ID
///
/// GET /api/workflows/{id}
async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Workflow>, StatusCode> {
    state
        .engine
        .store()
        .get(&id)
        .await
        .map(Json)
        .map_err(|e| store_error_status(&e))
}

/// Update an existing workflow
///
/// PUT /api/workflows/{id}
/// The ID in the URL wins over any ID in the body.
async fn update_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(workflow): Json<Workflow>,
) -> Result<Json<Workflow>, StatusCode> {
    if workflow.name.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    match state.engine.store().update(&id, workflow).await {
        Ok(updated) => {
            tracing::info!("🔄 Updated workflow: {} ({})", updated.id, updated.name);
            Ok(Json(updated))
        }
        Err(e) => {
            tracing::warn!("Failed to update workflow {}: {}", id, e);
            Err(store_error_status(&e))
        }
    }
}

/// Delete a workflow
///
/// DELETE /api/workflows/{id}
async fn delete_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    state
        .engine
        .store()
        .delete(&id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|e| store_error_status(&e))
}

/// Execute a workflow and return its execution result
///
/// POST /api/workflows/{id}/execute
/// A run that finishes as `failed` is still a 200: the failure is data, not a
/// transport error.
async fn execute_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ExecutionResult>, StatusCode> {
    tracing::info!("📥 Execution requested for workflow: {}", id);

    match state.engine.execute_workflow(&id).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            tracing::warn!("❌ Execution request rejected: {}", e);
            Err(store_error_status(&e))
        }
    }
}
