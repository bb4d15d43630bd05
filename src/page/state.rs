//! The host application's component-state graph, as captured alongside the
//! rendered markup.
//!
//! Each node links to its ancestor and may carry a properties object. Post
//! nodes in the markup map to a node through `handles`. Nothing here is a
//! documented contract of the host; it only reflects what was captured.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

pub type NodeId = u64;

/// Read-only access to an ancestor-linked state graph.
pub trait StateGraph {
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn props(&self, node: NodeId) -> Option<&Value>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateNode {
    pub id: NodeId,
    #[serde(default, alias = "return")]
    pub parent: Option<NodeId>,
    #[serde(default, alias = "memoizedProps")]
    pub props: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "RawStateTree")]
pub struct StateTree {
    nodes: HashMap<NodeId, StateNode>,
    handles: HashMap<usize, NodeId>,
}

#[derive(Deserialize)]
struct RawStateTree {
    #[serde(default)]
    nodes: Vec<StateNode>,
    #[serde(default)]
    handles: HashMap<usize, NodeId>,
}

impl From<RawStateTree> for StateTree {
    fn from(raw: RawStateTree) -> Self {
        Self {
            nodes: raw.nodes.into_iter().map(|n| (n.id, n)).collect(),
            handles: raw.handles,
        }
    }
}

impl StateTree {
    pub fn new(nodes: Vec<StateNode>, handles: HashMap<usize, NodeId>) -> Self {
        RawStateTree { nodes, handles }.into()
    }

    /// State handle of the post node at `ordinal` (document order).
    pub fn handle_for(&self, ordinal: usize) -> Option<NodeId> {
        self.handles
            .get(&ordinal)
            .copied()
            .filter(|id| self.nodes.contains_key(id))
    }
}

impl StateGraph for StateTree {
    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    fn props(&self, node: NodeId) -> Option<&Value> {
        self.nodes.get(&node).and_then(|n| n.props.as_ref())
    }
}
