/// Petgraph-based execution planning
///
/// Converts a workflow into a directed graph and produces a deterministic
/// execution order with Kahn's algorithm. Whenever several nodes become eligible
/// at once the lexicographically smallest ID goes first, so the same definition
/// always yields the same plan. This module performs no I/O.

use crate::workflow::{error::GraphError, types::Workflow};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeMap, HashMap};

/// Ordered node IDs respecting every connection in the workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    order: Vec<String>,
}

impl ExecutionPlan {
    /// Node IDs in execution order
    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Position of a node in the plan
    pub fn position(&self, node_id: &str) -> Option<usize> {
        self.order.iter().position(|id| id == node_id)
    }
}

/// Internal representation of a workflow as a petgraph DAG candidate
#[derive(Debug)]
struct WorkflowGraph<'a> {
    /// Node weights are the workflow node IDs
    graph: DiGraph<&'a str, ()>,
}

/// Build the execution plan for a workflow
///
/// Fails with a structural error when node IDs collide, a connection dangles or
/// the connections form a cycle. No partial ordering is returned on failure.
pub fn build_plan(workflow: &Workflow) -> Result<ExecutionPlan, GraphError> {
    tracing::debug!(
        "📊 Planning workflow '{}' with {} nodes and {} connections",
        workflow.id,
        workflow.nodes.len(),
        workflow.connections.len()
    );

    workflow.validate()?;
    let graph = WorkflowGraph::build(workflow);
    let plan = graph.topological_order()?;

    tracing::debug!("📋 Execution order: {:?}", plan.order());
    Ok(plan)
}

impl<'a> WorkflowGraph<'a> {
    /// Build the directed graph from an already validated workflow
    fn build(workflow: &'a Workflow) -> Self {
        let mut graph = DiGraph::with_capacity(workflow.nodes.len(), workflow.connections.len());
        let mut node_id_to_index = HashMap::with_capacity(workflow.nodes.len());

        for node in &workflow.nodes {
            let index = graph.add_node(node.id.as_str());
            node_id_to_index.insert(node.id.as_str(), index);
        }

        for conn in &workflow.connections {
            let from = node_id_to_index.get(conn.from_id.as_str());
            let to = node_id_to_index.get(conn.to_id.as_str());
            if let (Some(&from), Some(&to)) = (from, to) {
                graph.add_edge(from, to, ());
            }
        }

        Self { graph }
    }

    /// Kahn's algorithm with an ascending-ID ready set
    fn topological_order(&self) -> Result<ExecutionPlan, GraphError> {
        let node_count = self.graph.node_count();

        // Parallel edges count once each here and are decremented once each below.
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|idx| self.graph.edges_directed(idx, Direction::Incoming).count())
            .collect();

        let mut ready: BTreeMap<&str, NodeIndex> = self
            .graph
            .node_indices()
            .filter(|idx| in_degree[idx.index()] == 0)
            .map(|idx| (self.graph[idx], idx))
            .collect();

        let mut order = Vec::with_capacity(node_count);
        while let Some((node_id, idx)) = ready.pop_first() {
            order.push(node_id.to_string());

            for successor in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                let degree = &mut in_degree[successor.index()];
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(self.graph[successor], successor);
                }
            }
        }

        if order.len() < node_count {
            let nodes = self.cycle_members();
            tracing::error!("❌ Workflow contains a cycle through: {:?}", nodes);
            return Err(GraphError::CycleDetected { nodes });
        }

        Ok(ExecutionPlan { order })
    }

    /// Members of one cycle, sorted
    ///
    /// Nodes that are merely downstream of a cycle are also left unconsumed by
    /// Kahn's algorithm, so the cycle itself is located through strongly
    /// connected components. The smallest cycle by sorted ID list is reported.
    fn cycle_members(&self) -> Vec<String> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| match component.as_slice() {
                [single] => self.graph.contains_edge(*single, *single),
                _ => true,
            })
            .map(|component| {
                let mut ids: Vec<String> = component
                    .iter()
                    .map(|&idx| self.graph[idx].to_string())
                    .collect();
                ids.sort();
                ids
            })
            .min()
            .unwrap_or_default()
    }
}
