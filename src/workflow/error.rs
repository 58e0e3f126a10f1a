/// Workflow-level error types
///
/// `GraphError` covers structural problems with a workflow definition. They are
/// detected before any node runs and are fatal to an execution attempt.
/// `StoreError` covers lookups and writes against the workflow store.

use thiserror::Error;

/// Structural errors raised by the graph model and the graph builder
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Lookup of a node identifier that is not part of the workflow
    #[error("node not found: {0}")]
    NotFound(String),

    /// Two nodes share the same identifier
    #[error("duplicate node identifier: {0}")]
    DuplicateNode(String),

    /// A connection points at a node that does not exist
    #[error("connection {connection} references missing node: {endpoint}")]
    DanglingConnection { connection: String, endpoint: String },

    /// The connection set contains at least one cycle
    #[error("cycle detected involving nodes: {}", .nodes.join(", "))]
    CycleDetected { nodes: Vec<String> },
}

/// Errors raised by the workflow store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("workflow not found: {0}")]
    NotFound(String),

    #[error("workflow already exists: {0}")]
    AlreadyExists(String),
}
