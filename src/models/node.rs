//! Sensor node references.
//!
//! Nodes are owned by the sensor-network topology. The core only ever
//! holds ids and resolves them when rebuilding learned records from disk.

use std::{collections::HashMap, fmt, sync::Arc};

use serde::{Deserialize, Serialize};

pub type NodeId = i32;

/// A sensor location on the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub location: String,
}

impl Node {
    pub fn new(id: NodeId, location: impl Into<String>) -> Self {
        Self {
            id,
            location: location.into(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.location)
    }
}

/// Resolves node ids against the live sensor network.
pub trait NodeRegistry: Send + Sync {
    fn node(&self, id: NodeId) -> Option<Arc<Node>>;

    fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }
}

/// In-memory registry for hosts that configure nodes programmatically.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    nodes: HashMap<NodeId, Arc<Node>>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node, replacing any previous node with the same id.
    pub fn with_node(mut self, id: NodeId, location: impl Into<String>) -> Self {
        self.insert(Node::new(id, location));
        self
    }

    pub fn insert(&mut self, node: Node) {
        self.nodes.insert(node.id, Arc::new(node));
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl FromIterator<Node> for Topology {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        let mut topology = Topology::new();
        for node in iter {
            topology.insert(node);
        }
        topology
    }
}

impl NodeRegistry for Topology {
    fn node(&self, id: NodeId) -> Option<Arc<Node>> {
        self.nodes.get(&id).cloned()
    }
}
