/// Workflow Management Layer
///
/// This module handles workflow definitions and their storage:
/// - Graph model types (Workflow, Node, NodeType, Connection) and structural queries
/// - Structural and storage error types
/// - Concurrency-safe in-memory store

// Core workflow type definitions
pub mod types;

// Graph and store error taxonomy
pub mod error;

// Reader/writer-locked workflow store
pub mod storage;

// Re-export commonly used types
pub use error::{GraphError, StoreError};
pub use storage::WorkflowStore;
pub use types::{
    Connection, Node, NodeInputs, NodeType, Position, Properties, Workflow, WorkflowStatus,
};
