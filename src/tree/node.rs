//! Observations and prefix nodes

use serde::{Deserialize, Serialize};
use std::fmt;

/// One fuzzlog line: a value recorded at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Opaque location tag
    pub location: String,
    /// Observed value
    pub value: f64,
}

impl Observation {
    /// Create a new observation.
    pub fn new(location: impl Into<String>, value: f64) -> Self {
        Self { location: location.into(), value }
    }

    /// Bit pattern used to compare values on tree edges.
    ///
    /// `-0.0` and `0.0` map to the same key; NaNs compare by bit pattern.
    pub(crate) fn value_key(&self) -> u64 {
        if self.value == 0.0 {
            0.0f64.to_bits()
        } else {
            self.value.to_bits()
        }
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.value, self.location)
    }
}

/// Handle to a node inside an [`ExecutionTree`](super::ExecutionTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root of every tree.
    pub const ROOT: NodeId = NodeId(0);
}

/// A distinct prefix of observations shared by one or more runs.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) edge: Option<Observation>,
    pub(crate) depth: usize,
    pub(crate) reaches_success: bool,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn root() -> Self {
        Self {
            id: NodeId::ROOT,
            parent: None,
            edge: None,
            depth: 0,
            reaches_success: false,
            children: Vec::new(),
        }
    }

    pub(crate) fn child(id: NodeId, parent: &Node, edge: Observation) -> Self {
        Self {
            id,
            parent: Some(parent.id),
            edge: Some(edge),
            depth: parent.depth + 1,
            reaches_success: false,
            children: Vec::new(),
        }
    }

    /// This node's handle.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Parent handle; `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The observation on the edge leading into this node; `None` for the root.
    pub fn edge(&self) -> Option<&Observation> {
        self.edge.as_ref()
    }

    /// Number of observations between the root and this node.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether any successful run passes through this node.
    pub fn reaches_success(&self) -> bool {
        self.reaches_success
    }

    /// Children in the order their edges were first created.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether no run continues past this node.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_zero_shares_key() {
        assert_eq!(Observation::new("a", 0.0).value_key(), Observation::new("a", -0.0).value_key());
        assert_ne!(Observation::new("a", 1.0).value_key(), Observation::new("a", -1.0).value_key());
    }

    #[test]
    fn test_nan_key_is_stable() {
        let nan = Observation::new("a", f64::NAN);
        assert_eq!(nan.value_key(), nan.clone().value_key());
    }

    #[test]
    fn test_display() {
        assert_eq!(Observation::new("loc7", 2.5).to_string(), "2.5@loc7");
    }
}
