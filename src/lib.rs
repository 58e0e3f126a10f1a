/// Nodeflow: node-graph workflow automation
///
/// This library provides the workflow execution engine: deterministic
/// dependency-ordered planning, typed executor dispatch and continue-on-error
/// aggregation of node outputs, plus the REST/WebSocket surface around it.

// Core configuration and setup
pub mod config;

// Workflow management layer - graph model, structural queries and storage
pub mod workflow;

// Runtime execution engine - planning, executor registry and coordination
pub mod runtime;

// HTTP API layer - REST endpoints and real-time channel
pub mod api;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use runtime::{ExecutionCoordinator, ExecutionResult, ExecutionStatus, ExecutorRegistry, WorkflowEngine};
pub use server::start_server;
pub use workflow::{Connection, Node, NodeType, Workflow, WorkflowStore};
