/// Core workflow type definitions
///
/// Defines the graph model: workflows, typed nodes and the directed connections
/// between them. These types are exchanged as JSON with the editor and the REST API.
/// The structural queries here are cheap and side-effect free; ordering and
/// execution live in the runtime layer.

use crate::workflow::error::GraphError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

/// Node configuration: property name to loosely-typed value
pub type Properties = Map<String, Value>;

/// Outputs of a node's direct predecessors, keyed by predecessor node ID.
/// Empty for source nodes and for nodes whose predecessors all failed.
pub type NodeInputs = BTreeMap<String, Value>;

/// A complete workflow definition containing nodes and their connections
///
/// Node order is irrelevant to execution; the graph builder recomputes it from
/// the connections on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// Unique workflow identifier (UUID assigned by the store when empty)
    #[serde(default)]
    pub id: String,
    /// Human-readable workflow name
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Steps of the workflow
    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: Vec<Node>,
    /// Directed edges between steps
    #[serde(default, deserialize_with = "null_as_default")]
    pub connections: Vec<Connection>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    /// Lifecycle status, owned by the CRUD layer and never touched by the engine
    #[serde(default)]
    pub status: WorkflowStatus,
}

/// Lifecycle status of a stored workflow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    #[default]
    Inactive,
    Active,
}

/// A single step in the workflow graph
///
/// The node type selects the executor; `properties` is interpreted only by that
/// executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique node identifier within the workflow (e.g. "node-1")
    pub id: String,
    /// Type tag which determines execution behavior
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub name: String,
    /// Editor canvas position, irrelevant to execution
    #[serde(flatten)]
    pub position: Position,
    /// Executor-specific configuration
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: Properties,
}

/// 2-D layout position of a node on the editor canvas
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// Node type tags
///
/// The known tags mirror the editor palette. Anything else round-trips through
/// `Custom` so that extension executors can be registered without touching
/// this enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    /// Trigger. Expected properties: { "url": "/hook", "method": "POST" }
    Webhook,
    /// Trigger/delay. Expected properties: { "interval": 5 } (seconds)
    Timer,
    /// Outbound HTTP call. Expected properties: { "url": "...", "method": "GET" }
    Http,
    /// Expected properties: { "to": "...", "subject": "..." }
    Email,
    Database,
    /// Expected properties: { "condition": "<lua expression>" }
    Condition,
    Loop,
    /// Expected properties: { "script": "<lua chunk>" }
    Transform,
    Slack,
    Sheets,
    OpenAi,
    /// Any tag outside the built-in palette
    Custom(String),
}

impl NodeType {
    /// The wire tag for this type
    pub fn as_str(&self) -> &str {
        match self {
            NodeType::Webhook => "webhook",
            NodeType::Timer => "timer",
            NodeType::Http => "http",
            NodeType::Email => "email",
            NodeType::Database => "database",
            NodeType::Condition => "condition",
            NodeType::Loop => "loop",
            NodeType::Transform => "transform",
            NodeType::Slack => "slack",
            NodeType::Sheets => "sheets",
            NodeType::OpenAi => "openai",
            NodeType::Custom(tag) => tag,
        }
    }
}

impl From<String> for NodeType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "webhook" => NodeType::Webhook,
            "timer" => NodeType::Timer,
            "http" => NodeType::Http,
            "email" => NodeType::Email,
            "database" => NodeType::Database,
            "condition" => NodeType::Condition,
            "loop" => NodeType::Loop,
            "transform" => NodeType::Transform,
            "slack" => NodeType::Slack,
            "sheets" => NodeType::Sheets,
            "openai" => NodeType::OpenAi,
            _ => NodeType::Custom(tag),
        }
    }
}

impl From<&str> for NodeType {
    fn from(tag: &str) -> Self {
        NodeType::from(tag.to_string())
    }
}

impl From<NodeType> for String {
    fn from(node_type: NodeType) -> Self {
        node_type.as_str().to_string()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed edge from one node's output to another node's input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    #[serde(default)]
    pub id: String,
    /// Source node ID
    pub from_id: String,
    /// Destination node ID
    pub to_id: String,
}

/// Accept an explicit `null` wherever the field would otherwise default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Workflow {
    /// Create an empty workflow with the given identifier and name
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            nodes: Vec::new(),
            connections: Vec::new(),
            created_at: now,
            updated_at: now,
            status: WorkflowStatus::Inactive,
        }
    }

    /// Look up a node by ID
    pub fn node(&self, node_id: &str) -> Result<&Node, GraphError> {
        self.nodes
            .iter()
            .find(|node| node.id == node_id)
            .ok_or_else(|| GraphError::NotFound(node_id.to_string()))
    }

    /// Connections leaving the given node, in definition order
    pub fn outgoing(&self, node_id: &str) -> Vec<&Connection> {
        self.connections
            .iter()
            .filter(|conn| conn.from_id == node_id)
            .collect()
    }

    /// Connections entering the given node, in definition order
    pub fn incoming(&self, node_id: &str) -> Vec<&Connection> {
        self.connections
            .iter()
            .filter(|conn| conn.to_id == node_id)
            .collect()
    }

    /// Distinct direct predecessors of a node, ascending by ID
    pub fn predecessors(&self, node_id: &str) -> Vec<&str> {
        self.incoming(node_id)
            .into_iter()
            .map(|conn| conn.from_id.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct direct successors of a node, ascending by ID
    pub fn successors(&self, node_id: &str) -> Vec<&str> {
        self.outgoing(node_id)
            .into_iter()
            .map(|conn| conn.to_id.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// True when no connection enters the node
    pub fn is_source(&self, node_id: &str) -> bool {
        !self.connections.iter().any(|conn| conn.to_id == node_id)
    }

    /// True when no connection leaves the node
    pub fn is_sink(&self, node_id: &str) -> bool {
        !self.connections.iter().any(|conn| conn.from_id == node_id)
    }

    /// Check that node IDs are unique and every connection resolves to existing nodes
    ///
    /// Connections are checked in definition order, source endpoint first, so the
    /// reported error is stable for a given definition.
    pub fn validate(&self) -> Result<(), GraphError> {
        let mut ids = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !ids.insert(node.id.as_str()) {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
        }

        for conn in &self.connections {
            for endpoint in [&conn.from_id, &conn.to_id] {
                if !ids.contains(endpoint.as_str()) {
                    return Err(GraphError::DanglingConnection {
                        connection: conn.id.clone(),
                        endpoint: endpoint.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

impl Node {
    /// Create a node at the canvas origin with no properties
    pub fn new(id: impl Into<String>, node_type: impl Into<NodeType>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            node_type: node_type.into(),
            position: Position::default(),
            properties: Properties::new(),
        }
    }

    /// Builder-style property setter
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

impl Connection {
    pub fn new(id: impl Into<String>, from_id: impl Into<String>, to_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            from_id: from_id.into(),
            to_id: to_id.into(),
        }
    }
}
