/// Error types for node dispatch and node execution
///
/// Both kinds are per-node and non-fatal: the coordinator records them in the
/// execution result and keeps walking the plan.

use crate::workflow::types::NodeType;
use thiserror::Error;

/// Dispatch errors raised while resolving a node to its executor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("no executor for node type: {0}")]
    UnregisteredType(NodeType),
}

/// Typed failure returned by a node executor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    #[error("missing property '{0}'")]
    MissingProperty(String),

    #[error("invalid property '{name}': {reason}")]
    InvalidProperty { name: String, reason: String },

    #[error("script error: {0}")]
    Script(String),

    #[error("{0}")]
    Failed(String),
}

impl NodeError {
    pub fn invalid_property(name: impl Into<String>, reason: impl Into<String>) -> Self {
        NodeError::InvalidProperty {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
