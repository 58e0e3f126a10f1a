/// Runtime Execution Engine
///
/// This module turns stored workflow graphs into executions. It handles:
/// - Deterministic execution planning (petgraph + Kahn's algorithm)
/// - Executor registry and the node executor contract
/// - Built-in node executors and their Lua sandbox
/// - Plan walking with continue-on-error semantics and bounded parallelism

// Dispatch and executor error types
pub mod error;

// Execution planning with cycle detection
pub mod graph;

// Node type tag -> executor mapping
pub mod registry;

// Built-in node executors
pub mod executor;

// Sandboxed Lua used by logic nodes
pub mod script;

// Execution result record
pub mod result;

// Execution coordinator and store-backed engine
pub mod engine;

// Re-export main types
pub use engine::{ExecutionCoordinator, WorkflowEngine};
pub use error::{ExecutionError, NodeError};
pub use graph::{build_plan, ExecutionPlan};
pub use registry::{ExecutorRegistry, ExecutorRegistryBuilder, NodeExecutor};
pub use result::{ExecutionResult, ExecutionStatus};
