/// Execution result types
///
/// `ExecutionResult` is the one record the transport layer depends on. Field
/// names and status strings are part of the external contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Overall status of one execution attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
}

/// Terminal record of one execution attempt
///
/// Created when an execution starts, mutated only by the coordinator running
/// it, and handed back once. A re-execution always produces a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub workflow_id: String,
    pub status: ExecutionStatus,
    pub start_time: DateTime<Utc>,
    /// Unset while running
    pub end_time: Option<DateTime<Utc>>,
    /// Output per node ID, only for nodes that ran successfully
    pub results: BTreeMap<String, Value>,
    /// Human-readable errors, ordered by the reporting node's plan position
    pub errors: Vec<String>,
}

impl ExecutionResult {
    /// Start a new execution record
    pub(crate) fn start(workflow_id: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            status: ExecutionStatus::Running,
            start_time: Utc::now(),
            end_time: None,
            results: BTreeMap::new(),
            errors: Vec::new(),
        }
    }

    /// Stamp the end time and classify: completed iff no errors were reported
    pub(crate) fn finish(mut self) -> Self {
        self.end_time = Some(Utc::now());
        self.status = if self.errors.is_empty() {
            ExecutionStatus::Completed
        } else {
            ExecutionStatus::Failed
        };
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == ExecutionStatus::Completed
    }

    /// Output of a node, if it ran successfully
    pub fn output(&self, node_id: &str) -> Option<&Value> {
        self.results.get(node_id)
    }

    /// Errors reported by the given node
    pub fn errors_for(&self, node_id: &str) -> Vec<&str> {
        let failed = format!("node {} error: ", node_id);
        let skipped = format!("(node {})", node_id);
        self.errors
            .iter()
            .filter(|error| error.starts_with(&failed) || error.ends_with(&skipped))
            .map(String::as_str)
            .collect()
    }
}
