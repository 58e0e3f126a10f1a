/// Executor registry
///
/// Maps node type tags to the executor able to run them. The registry is filled
/// once through `ExecutorRegistryBuilder` during start-up and is immutable
/// afterwards, so it can be shared behind an `Arc` without further locking.

use crate::runtime::{
    error::{ExecutionError, NodeError},
    executor::{
        ConditionExecutor, EmailExecutor, HttpExecutor, TimerExecutor, TransformExecutor,
        WebhookExecutor,
    },
};
use crate::workflow::types::{NodeInputs, NodeType, Properties};
use async_trait::async_trait;
use serde_json::Value;
use std::{collections::HashMap, fmt, sync::Arc};

/// The contract every node executor fulfils
///
/// An executor sees only the node's own properties and the outputs of its
/// direct predecessors. `inputs` may be empty or partially populated when
/// upstream nodes failed, and implementations must tolerate that.
#[async_trait]
pub trait NodeExecutor: Send + Sync {
    async fn execute(&self, properties: &Properties, inputs: &NodeInputs) -> Result<Value, NodeError>;
}

/// Immutable type tag → executor mapping
#[derive(Clone, Default)]
pub struct ExecutorRegistry {
    executors: HashMap<NodeType, Arc<dyn NodeExecutor>>,
}

/// Start-up builder for `ExecutorRegistry`
#[derive(Default)]
pub struct ExecutorRegistryBuilder {
    executors: HashMap<NodeType, Arc<dyn NodeExecutor>>,
}

impl ExecutorRegistry {
    pub fn builder() -> ExecutorRegistryBuilder {
        ExecutorRegistryBuilder::default()
    }

    /// Registry with every built-in executor
    ///
    /// `database`, `loop`, `slack`, `sheets` and `openai` have no built-in
    /// implementation and stay unregistered.
    pub fn builtin() -> Self {
        Self::builder()
            .register(NodeType::Webhook, WebhookExecutor)
            .register(NodeType::Timer, TimerExecutor)
            .register(NodeType::Http, HttpExecutor)
            .register(NodeType::Email, EmailExecutor)
            .register(NodeType::Condition, ConditionExecutor)
            .register(NodeType::Transform, TransformExecutor)
            .build()
    }

    /// Resolve the executor for a node type
    pub fn lookup(&self, node_type: &NodeType) -> Result<Arc<dyn NodeExecutor>, ExecutionError> {
        self.executors
            .get(node_type)
            .cloned()
            .ok_or_else(|| ExecutionError::UnregisteredType(node_type.clone()))
    }

    pub fn contains(&self, node_type: &NodeType) -> bool {
        self.executors.contains_key(node_type)
    }

    /// Registered type tags, sorted
    pub fn node_types(&self) -> Vec<&NodeType> {
        let mut types: Vec<&NodeType> = self.executors.keys().collect();
        types.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        types
    }
}

impl fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorRegistry")
            .field("node_types", &self.node_types())
            .finish()
    }
}

impl ExecutorRegistryBuilder {
    /// Register an executor, replacing any previous one for the same type
    pub fn register(mut self, node_type: NodeType, executor: impl NodeExecutor + 'static) -> Self {
        self.executors.insert(node_type, Arc::new(executor));
        self
    }

    /// Register an executor that is already shared
    pub fn register_shared(mut self, node_type: NodeType, executor: Arc<dyn NodeExecutor>) -> Self {
        self.executors.insert(node_type, executor);
        self
    }

    pub fn build(self) -> ExecutorRegistry {
        tracing::info!("⚙️ Executor registry initialized with {} node types", self.executors.len());
        ExecutorRegistry {
            executors: self.executors,
        }
    }
}
