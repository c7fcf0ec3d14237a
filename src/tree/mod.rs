//! Execution-prefix tree
//!
//! Every fuzzlog is replayed from the root, one node per observation. Runs
//! that share a prefix share the nodes for it and branch where they diverge.
//! A run flagged successful marks every node on its path, so a node
//! `reaches_success` iff some successful run went through it.
//!
//! The tree also owns the [`LocationIndex`]: tags are registered in the order
//! ingestion first meets them, which makes ingestion order significant.
//!
//! ```
//! use exetree::tree::{ExecutionTree, Observation};
//!
//! let mut tree = ExecutionTree::new();
//! tree.add(&[Observation::new("X", 1.0)], true);
//! tree.add(&[Observation::new("X", 1.0), Observation::new("Y", 2.0)], false);
//!
//! assert_eq!(tree.depth(), 2);
//! assert_eq!(tree.len(), 3);
//! assert!(tree.root().reaches_success());
//! ```

mod location;
mod node;


pub use location::{LocationId, LocationIndex, PAD_ID};
pub use node::{Node, NodeId, Observation};

use std::collections::HashMap;

type EdgeKey = (NodeId, LocationId, u64);

/// Trie of execution prefixes.
#[derive(Debug, Clone)]
pub struct ExecutionTree {
    nodes: Vec<Node>,
    edges: HashMap<EdgeKey, NodeId>,
    locations: LocationIndex,
    max_depth: usize,
    runs: usize,
    successful_runs: usize,
}

impl Default for ExecutionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionTree {
    /// A tree holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::root()],
            edges: HashMap::new(),
            locations: LocationIndex::new(),
            max_depth: 0,
            runs: 0,
            successful_runs: 0,
        }
    }

    /// Replay one run from the root, creating missing nodes and OR-ing
    /// `succeeded` into every node on its path (root included).
    pub fn add(&mut self, observations: &[Observation], succeeded: bool) {
        let mut current = NodeId::ROOT;
        self.nodes[current.0].reaches_success |= succeeded;

        for observation in observations {
            let location = self.locations.register(observation.location.as_str());
            let key = (current, location, observation.value_key());
            current = match self.edges.get(&key).copied() {
                Some(child) => child,
                None => self.push_child(current, key, observation.clone()),
            };
            self.nodes[current.0].reaches_success |= succeeded;
        }

        self.max_depth = self.max_depth.max(observations.len());
        self.runs += 1;
        if succeeded {
            self.successful_runs += 1;
        }
    }

    fn push_child(&mut self, parent: NodeId, key: EdgeKey, edge: Observation) -> NodeId {
        let id = NodeId(self.nodes.len());
        let child = Node::child(id, &self.nodes[parent.0], edge);
        self.nodes.push(child);
        self.nodes[parent.0].children.push(id);
        self.edges.insert(key, id);
        id
    }

    /// Deepest node's depth; the padding width (`poscount`) of encoded rows.
    pub fn depth(&self) -> usize {
        self.max_depth
    }

    /// The root node.
    pub fn root(&self) -> &Node {
        &self.nodes[NodeId::ROOT.0]
    }

    /// Look up a node by handle.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Child of `parent` reached through `observation`, if any run took it.
    pub fn child(&self, parent: NodeId, observation: &Observation) -> Option<NodeId> {
        let location = self.locations.get_index(&observation.location)?;
        self.edges.get(&(parent, location, observation.value_key())).copied()
    }

    /// Node reached by following `observations` from the root.
    pub fn find(&self, observations: &[Observation]) -> Option<NodeId> {
        observations
            .iter()
            .try_fold(NodeId::ROOT, |node, observation| self.child(node, observation))
    }

    /// Total number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether only the root exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Number of `add` calls so far.
    pub fn run_count(&self) -> usize {
        self.runs
    }

    /// Number of `add` calls flagged successful.
    pub fn successful_run_count(&self) -> usize {
        self.successful_runs
    }

    /// Number of nodes with `reaches_success` set.
    pub fn success_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.reaches_success).count()
    }

    /// Tags seen during ingestion.
    pub fn location_index(&self) -> &LocationIndex {
        &self.locations
    }

    /// Observations on the path from the root to `id`, root first.
    pub fn logseq(&self, id: NodeId) -> Vec<&Observation> {
        let mut path = Vec::new();
        let mut cursor = self.node(id);
        while let Some(node) = cursor {
            if let Some(edge) = node.edge() {
                path.push(edge);
            }
            cursor = node.parent.and_then(|p| self.node(p));
        }
        path.reverse();
        path
    }

    /// Every node, each before its descendants, siblings in insertion order.
    ///
    /// The order is stable for an unmodified tree; the encoder's row order
    /// depends on it.
    pub fn preorder_dfs(&self) -> PreorderDfs<'_> {
        PreorderDfs { tree: self, stack: vec![NodeId::ROOT] }
    }
}

/// Lazy pre-order walk over an [`ExecutionTree`].
#[derive(Debug, Clone)]
pub struct PreorderDfs<'a> {
    tree: &'a ExecutionTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for PreorderDfs<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.tree.node(self.stack.pop()?)?;
        self.stack.extend(node.children.iter().rev().copied());
        Some(node)
    }
}
