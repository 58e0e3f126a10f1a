/// Workflow execution coordinator
///
/// Owns one execution attempt end to end: plans the workflow, walks the plan,
/// dispatches every node to its registered executor, and folds outputs and
/// failures into a single `ExecutionResult`.
///
/// Failure policy:
/// - structural errors (cycle, dangling connection, duplicate node) stop the
///   run before any node executes
/// - a missing executor or a failing executor is recorded and the run goes on;
///   the failed node simply contributes nothing to its successors' inputs

use crate::runtime::{
    error::NodeError,
    graph::{build_plan, ExecutionPlan},
    registry::{ExecutorRegistry, NodeExecutor},
    result::ExecutionResult,
};
use crate::workflow::{
    error::StoreError,
    storage::WorkflowStore,
    types::{Node, NodeInputs, Workflow},
};
use futures::{
    stream::{FuturesUnordered, StreamExt},
    FutureExt,
};
use serde_json::Value;
use std::{
    collections::{BTreeMap, HashMap},
    panic::AssertUnwindSafe,
    sync::Arc,
    time::Instant,
};

/// Runs workflows against an immutable executor registry
///
/// Up to `max_parallel_nodes` mutually independent nodes run at the same time
/// (default 1, i.e. strict plan order). A node never starts before all of its
/// direct predecessors have finished.
#[derive(Debug, Clone)]
pub struct ExecutionCoordinator {
    registry: Arc<ExecutorRegistry>,
    max_parallel_nodes: usize,
}

/// Store-backed entry point: look a workflow up, then execute a snapshot of it
#[derive(Debug, Clone)]
pub struct WorkflowEngine {
    store: Arc<WorkflowStore>,
    coordinator: ExecutionCoordinator,
}

/// Bookkeeping for a single walk over a plan
///
/// Only the coordinating task touches this, so output and error writes from
/// concurrently running nodes are applied one at a time.
struct PlanRun<'a> {
    workflow: &'a Workflow,
    plan: &'a ExecutionPlan,
    /// Plan position per node ID
    positions: HashMap<&'a str, usize>,
    /// Unfinished distinct predecessors per plan position
    pending: Vec<usize>,
    launched: Vec<bool>,
    outputs: BTreeMap<String, Value>,
    /// (plan position, message)
    errors: Vec<(usize, String)>,
}

impl ExecutionCoordinator {
    pub fn new(registry: Arc<ExecutorRegistry>) -> Self {
        Self {
            registry,
            max_parallel_nodes: 1,
        }
    }

    /// Allow up to `limit` independent nodes in flight (values below 1 mean 1)
    pub fn with_max_parallel_nodes(mut self, limit: usize) -> Self {
        self.max_parallel_nodes = limit.max(1);
        self
    }

    pub fn registry(&self) -> &ExecutorRegistry {
        &self.registry
    }

    /// Execute a workflow snapshot and return its terminal result
    ///
    /// Never fails: every problem ends up in the result's error list.
    pub async fn execute(&self, workflow: &Workflow) -> ExecutionResult {
        let workflow_start_time = Instant::now();
        let mut result = ExecutionResult::start(workflow.id.as_str());

        tracing::info!(
            "🚀 Starting workflow execution: {} ({} nodes)",
            workflow.id,
            workflow.nodes.len()
        );

        let plan = match build_plan(workflow) {
            Ok(plan) => plan,
            Err(e) => {
                tracing::error!("❌ Workflow '{}' is structurally invalid: {}", workflow.id, e);
                result.errors.push(e.to_string());
                return result.finish();
            }
        };

        let mut run = PlanRun::new(workflow, &plan);
        let mut in_flight = FuturesUnordered::new();

        loop {
            while in_flight.len() < self.max_parallel_nodes {
                let Some(position) = run.next_ready() else {
                    break;
                };
                let node_id = plan.order()[position].as_str();

                let node = match workflow.node(node_id) {
                    Ok(node) => node,
                    Err(e) => {
                        run.fail(position, e.to_string());
                        continue;
                    }
                };

                match self.registry.lookup(&node.node_type) {
                    Ok(executor) => {
                        let inputs = run.inputs_for(node_id);
                        in_flight.push(run_node(position, node, executor, inputs));
                    }
                    Err(e) => {
                        tracing::warn!("⏭️ Skipping node '{}': {}", node.id, e);
                        run.fail(position, format!("{} (node {})", e, node.id));
                    }
                }
            }

            match in_flight.next().await {
                Some((position, Ok(output))) => run.succeed(position, output),
                Some((position, Err(e))) => {
                    let message = format!("node {} error: {}", plan.order()[position], e);
                    run.fail(position, message);
                }
                None => break,
            }
        }

        run.write_into(&mut result);
        let result = result.finish();

        tracing::info!(
            "🏁 Workflow '{}' finished as {:?} in {:?}: {} outputs, {} errors",
            workflow.id,
            result.status,
            workflow_start_time.elapsed(),
            result.results.len(),
            result.errors.len()
        );

        result
    }
}

/// Run one node, converting a panicking executor into a node failure
async fn run_node(
    position: usize,
    node: &Node,
    executor: Arc<dyn NodeExecutor>,
    inputs: NodeInputs,
) -> (usize, Result<Value, NodeError>) {
    tracing::info!(
        "📍 Executing node '{}' (type: {}) with {} inputs",
        node.id,
        node.node_type,
        inputs.len()
    );
    let node_start_time = Instant::now();

    let outcome = AssertUnwindSafe(executor.execute(&node.properties, &inputs))
        .catch_unwind()
        .await
        .unwrap_or_else(|_| Err(NodeError::Failed("executor panicked".to_string())));

    match &outcome {
        Ok(_) => tracing::info!(
            "✅ Node '{}' completed in {:?}",
            node.id,
            node_start_time.elapsed()
        ),
        Err(e) => tracing::error!(
            "❌ Node '{}' failed in {:?}: {}",
            node.id,
            node_start_time.elapsed(),
            e
        ),
    }

    (position, outcome)
}

impl<'a> PlanRun<'a> {
    fn new(workflow: &'a Workflow, plan: &'a ExecutionPlan) -> Self {
        let positions: HashMap<&str, usize> = plan
            .order()
            .iter()
            .enumerate()
            .map(|(position, id)| (id.as_str(), position))
            .collect();
        let pending = plan
            .order()
            .iter()
            .map(|id| workflow.predecessors(id).len())
            .collect();

        Self {
            workflow,
            plan,
            positions,
            pending,
            launched: vec![false; plan.len()],
            outputs: BTreeMap::new(),
            errors: Vec::new(),
        }
    }

    /// Claim the earliest plan position whose predecessors have all finished
    fn next_ready(&mut self) -> Option<usize> {
        let position = (0..self.plan.len()).find(|&p| !self.launched[p] && self.pending[p] == 0)?;
        self.launched[position] = true;
        Some(position)
    }

    /// Outputs of the node's direct predecessors that succeeded
    fn inputs_for(&self, node_id: &str) -> NodeInputs {
        self.workflow
            .predecessors(node_id)
            .into_iter()
            .filter_map(|pred| {
                self.outputs
                    .get(pred)
                    .map(|output| (pred.to_string(), output.clone()))
            })
            .collect()
    }

    fn succeed(&mut self, position: usize, output: Value) {
        let node_id = self.plan.order()[position].clone();
        self.outputs.insert(node_id, output);
        self.release_successors(position);
    }

    fn fail(&mut self, position: usize, message: String) {
        self.errors.push((position, message));
        self.release_successors(position);
    }

    fn release_successors(&mut self, position: usize) {
        let (plan, workflow) = (self.plan, self.workflow);
        let node_id = plan.order()[position].as_str();
        for successor in workflow.successors(node_id) {
            if let Some(&succ_position) = self.positions.get(successor) {
                self.pending[succ_position] = self.pending[succ_position].saturating_sub(1);
            }
        }
    }

    /// Move outputs and errors into the result, errors in plan order
    fn write_into(mut self, result: &mut ExecutionResult) {
        self.errors.sort_by_key(|(position, _)| *position);
        result.results = self.outputs;
        result.errors = self.errors.into_iter().map(|(_, message)| message).collect();
    }
}

impl WorkflowEngine {
    pub fn new(store: Arc<WorkflowStore>, coordinator: ExecutionCoordinator) -> Self {
        Self { store, coordinator }
    }

    pub fn store(&self) -> &Arc<WorkflowStore> {
        &self.store
    }

    pub fn coordinator(&self) -> &ExecutionCoordinator {
        &self.coordinator
    }

    /// Execute a stored workflow by ID
    ///
    /// Unknown IDs fail before the coordinator is involved. The stored workflow
    /// is never modified.
    pub async fn execute_workflow(&self, workflow_id: &str) -> Result<ExecutionResult, StoreError> {
        let snapshot = self.store.get(workflow_id).await?;
        Ok(self.coordinator.execute(&snapshot).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::result::ExecutionStatus;
    use crate::workflow::types::{Connection, NodeType, Properties};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records start/finish events and echoes its inputs
    struct Probe {
        name: &'static str,
        delay_ms: u64,
        events: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl NodeExecutor for Probe {
        async fn execute(&self, _: &Properties, inputs: &NodeInputs) -> Result<Value, NodeError> {
            self.events.lock().unwrap().push(format!("start {}", self.name));
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            self.events.lock().unwrap().push(format!("end {}", self.name));
            Ok(json!({ "seen": inputs.keys().collect::<Vec<_>>() }))
        }
    }

    struct Panics;

    #[async_trait]
    impl NodeExecutor for Panics {
        async fn execute(&self, _: &Properties, _: &NodeInputs) -> Result<Value, NodeError> {
            panic!("integration bug")
        }
    }

    fn probe_registry(events: &Arc<Mutex<Vec<String>>>) -> Arc<ExecutorRegistry> {
        let probe = |name, delay_ms| Probe {
            name,
            delay_ms,
            events: Arc::clone(events),
        };
        Arc::new(
            ExecutorRegistry::builder()
                .register(NodeType::from("slow"), probe("slow", 50))
                .register(NodeType::from("fast"), probe("fast", 5))
                .register(NodeType::from("join"), probe("join", 0))
                .register(NodeType::from("panic"), Panics)
                .build(),
        )
    }

    fn fork_join() -> Workflow {
        let mut workflow = Workflow::new("wf-fork", "Fork/join");
        workflow.nodes = vec![
            Node::new("a", "slow"),
            Node::new("b", "fast"),
            Node::new("c", "join"),
        ];
        workflow.connections = vec![Connection::new("c1", "a", "c"), Connection::new("c2", "b", "c")];
        workflow
    }

    #[tokio::test]
    async fn sequential_mode_follows_plan_order() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let coordinator = ExecutionCoordinator::new(probe_registry(&events));

        let result = coordinator.execute(&fork_join()).await;
        assert_eq!(result.status, ExecutionStatus::Completed);
        assert_eq!(
            *events.lock().unwrap(),
            vec!["start slow", "end slow", "start fast", "end fast", "start join", "end join"]
        );
        assert_eq!(result.output("c").unwrap(), &json!({"seen": ["a", "b"]}));
    }

    #[tokio::test]
    async fn parallel_mode_overlaps_independent_nodes() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let coordinator = ExecutionCoordinator::new(probe_registry(&events)).with_max_parallel_nodes(4);

        let result = coordinator.execute(&fork_join()).await;
        assert_eq!(result.status, ExecutionStatus::Completed);

        let events = events.lock().unwrap().clone();
        assert_eq!(&events[..2], ["start slow", "start fast"]);
        let join_start = events.iter().position(|e| e == "start join").unwrap();
        let slow_end = events.iter().position(|e| e == "end slow").unwrap();
        let fast_end = events.iter().position(|e| e == "end fast").unwrap();
        assert!(join_start > slow_end && join_start > fast_end);
        assert_eq!(result.output("c").unwrap(), &json!({"seen": ["a", "b"]}));
    }

    #[tokio::test]
    async fn errors_are_ordered_by_plan_position_in_parallel_mode() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let coordinator = ExecutionCoordinator::new(probe_registry(&events)).with_max_parallel_nodes(8);

        let mut workflow = Workflow::new("wf-errors", "Errors");
        workflow.nodes = vec![
            Node::new("a", "unknown-a"),
            Node::new("b", "panic"),
            Node::new("c", "unknown-c"),
        ];

        let result = coordinator.execute(&workflow).await;
        assert_eq!(result.status, ExecutionStatus::Failed);
        assert_eq!(
            result.errors,
            vec![
                "no executor for node type: unknown-a (node a)",
                "node b error: executor panicked",
                "no executor for node type: unknown-c (node c)",
            ]
        );
    }

    #[tokio::test]
    async fn skipped_predecessor_still_releases_successor() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let coordinator = ExecutionCoordinator::new(probe_registry(&events));

        let mut workflow = Workflow::new("wf-skip", "Skip");
        workflow.nodes = vec![Node::new("a", NodeType::Database), Node::new("b", "join")];
        workflow.connections = vec![Connection::new("c1", "a", "b")];

        let result = coordinator.execute(&workflow).await;
        assert_eq!(result.errors_for("a").len(), 1);
        assert_eq!(result.output("b").unwrap(), &json!({"seen": []}));
    }

    #[tokio::test]
    async fn parallel_limit_below_one_is_clamped() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let coordinator = ExecutionCoordinator::new(probe_registry(&events)).with_max_parallel_nodes(0);
        assert!(coordinator.execute(&fork_join()).await.is_completed());
        assert!(coordinator.registry().contains(&NodeType::from("join")));
    }
}
