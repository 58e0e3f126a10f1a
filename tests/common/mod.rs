//! Shared fixtures for the integration suites

#![allow(dead_code)]

use nodeflow::{
    runtime::{ExecutionCoordinator, ExecutorRegistry, WorkflowEngine},
    workflow::{Connection, Node, Workflow, WorkflowStore},
};
use std::sync::Arc;

/// Engine over an empty store with the built-in executors
pub fn engine() -> WorkflowEngine {
    engine_with_parallelism(1)
}

pub fn engine_with_parallelism(max_parallel_nodes: usize) -> WorkflowEngine {
    let coordinator = ExecutionCoordinator::new(Arc::new(ExecutorRegistry::builtin()))
        .with_max_parallel_nodes(max_parallel_nodes);
    WorkflowEngine::new(Arc::new(WorkflowStore::new()), coordinator)
}

/// Fluent builder for test workflows
pub struct WorkflowBuilder {
    workflow: Workflow,
}

impl WorkflowBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            workflow: Workflow::new("", name),
        }
    }

    pub fn node(mut self, node: Node) -> Self {
        self.workflow.nodes.push(node);
        self
    }

    pub fn connect(mut self, from: &str, to: &str) -> Self {
        let id = format!("c{}", self.workflow.connections.len() + 1);
        self.workflow.connections.push(Connection::new(id, from, to));
        self
    }

    pub fn build(self) -> Workflow {
        self.workflow
    }
}

pub fn webhook(id: &str) -> Node {
    Node::new(id, "webhook")
        .with_property("url", "/hook")
        .with_property("method", "POST")
}
