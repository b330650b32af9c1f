//! Flow-graph arena.
//!
//! Nodes live in a [`FlowGraph`] arena and refer to each other through
//! [`NodeId`] indices, which keeps cyclic loop edges representable without
//! reference counting. Every node carries two successor slots: for a
//! [`NodeKind::Condition`] they are the true and false branches, for any
//! other kind they are filled in order and rendered as plain edges.

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};

/// Index of a node inside a [`FlowGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// What a flow node represents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    /// Function entry point, labeled with the signature.
    Entry { name: String, params: Vec<String> },
    /// A linear statement (expression, return, declaration).
    Statement { text: String },
    /// A branching condition.
    Condition { text: String },
}

impl NodeKind {
    /// Graphviz shape for this node kind.
    pub fn shape(&self) -> &'static str {
        match self {
            NodeKind::Entry { .. } => "ellipse",
            NodeKind::Statement { .. } => "rectangle",
            NodeKind::Condition { .. } => "diamond",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> String {
        match self {
            NodeKind::Entry { name, params } => format!("{}({})", name, params.join(", ")),
            NodeKind::Statement { text } | NodeKind::Condition { text } => text.clone(),
        }
    }
}

/// A single node with its two successor slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub true_edge: Option<NodeId>,
    pub false_edge: Option<NodeId>,
    /// Slot reservations made by pending branch-target resolution; a
    /// reserved slot is skipped by [`FlowGraph::assign`] so that only the
    /// deferred [`FlowGraph::assign_true`]/[`FlowGraph::assign_false`]
    /// call can fill it.
    #[serde(skip)]
    true_reserved: bool,
    #[serde(skip)]
    false_reserved: bool,
}

/// Arena of flow nodes for one function.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowGraph {
    nodes: Vec<FlowNode>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(FlowNode {
            id,
            kind,
            true_edge: None,
            false_edge: None,
            true_reserved: false,
            false_reserved: false,
        });
        id
    }

    /// Add the function entry node.
    pub fn add_entry(&mut self, name: impl Into<String>, params: Vec<String>) -> NodeId {
        self.push(NodeKind::Entry {
            name: name.into(),
            params,
        })
    }

    /// Add a statement node.
    pub fn add_statement(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Statement { text: text.into() })
    }

    /// Add a condition node.
    pub fn add_condition(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Condition { text: text.into() })
    }

    pub fn node(&self, id: NodeId) -> &FlowNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlowNode> {
        self.nodes.iter()
    }

    /// Fill the first unoccupied, unreserved successor slot of `node` with
    /// `target`. A no-op when both slots are already taken, matching the
    /// fall-through behaviour of sequencing into a fully wired node.
    pub fn assign(&mut self, node: NodeId, target: NodeId) {
        let n = &mut self.nodes[node.0];
        if n.true_edge.is_none() && !n.true_reserved {
            n.true_edge = Some(target);
        } else if n.false_edge.is_none() && !n.false_reserved {
            n.false_edge = Some(target);
        }
    }

    /// Set the true-branch successor. Fails if the slot is already set.
    pub fn assign_true(&mut self, node: NodeId, target: NodeId) -> Result<()> {
        let n = &mut self.nodes[node.0];
        if n.true_edge.is_some() {
            return Err(FlowError::Invariant(format!(
                "true branch of {} assigned twice",
                node
            )));
        }
        n.true_edge = Some(target);
        n.true_reserved = false;
        Ok(())
    }

    /// Set the false-branch successor. Fails if the slot is already set.
    pub fn assign_false(&mut self, node: NodeId, target: NodeId) -> Result<()> {
        let n = &mut self.nodes[node.0];
        if n.false_edge.is_some() {
            return Err(FlowError::Invariant(format!(
                "false branch of {} assigned twice",
                node
            )));
        }
        n.false_edge = Some(target);
        n.false_reserved = false;
        Ok(())
    }

    /// Reserve the true slot of `node` for a deferred branch target.
    pub fn reserve_true(&mut self, node: NodeId) {
        self.nodes[node.0].true_reserved = true;
    }

    /// Reserve the false slot of `node` for a deferred branch target.
    pub fn reserve_false(&mut self, node: NodeId) {
        self.nodes[node.0].false_reserved = true;
    }

    /// Whether the true slot of `node` is still unset and unreserved.
    /// A reserved slot is spoken for by a deferred branch target and
    /// counts as taken.
    pub fn true_slot_open(&self, node: NodeId) -> bool {
        let n = &self.nodes[node.0];
        n.true_edge.is_none() && !n.true_reserved
    }
}
