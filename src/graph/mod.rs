//! Ontology Graph
//!
//! Arena of concept nodes backed by petgraph. Edges always run parent -> child,
//! so a single edge is both the parent link of the child and the child link of
//! the parent. Node keys are deduplicated through a HashMap index: a key
//! resolves to the same `NodeIndex` for the lifetime of the graph.
//!
//! The graph is assumed to be acyclic. Cycle formation is not detected and
//! recursive traversals over a cyclic graph do not terminate.

pub mod attribute;
pub mod traversal;

pub use attribute::{AttributeId, NodeAttribute};
pub use traversal::NodePath;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Bounds required from a node key
pub trait NodeKey: Clone + Eq + Hash + fmt::Debug {}

impl<T: Clone + Eq + Hash + fmt::Debug> NodeKey for T {}

/// A concept (class) of the ontology
#[derive(Debug, Clone)]
pub struct ConceptNode<K> {
    /// Unique key of the concept
    pub key: K,
    /// Attributes declared directly on this node
    pub(crate) attributes: Vec<AttributeId>,
}

/// The ontology DAG
#[derive(Debug, Clone)]
pub struct OntologyGraph<K> {
    /// Concept nodes, edges point from parent to child
    pub(crate) graph: DiGraph<ConceptNode<K>, ()>,

    /// Node index lookup: key -> NodeIndex
    pub(crate) node_indices: HashMap<K, NodeIndex>,

    /// Attribute arena, indexed by `AttributeId`
    pub(crate) attributes: Vec<NodeAttribute>,
}

impl<K: NodeKey> Default for OntologyGraph<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: NodeKey> OntologyGraph<K> {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_indices: HashMap::new(),
            attributes: Vec::new(),
        }
    }

    // ========== Nodes ==========

    /// Get the node registered for `key`, creating it on first reference
    pub fn get_or_insert(&mut self, key: K) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(&key) {
            return idx;
        }

        let idx = self.graph.add_node(ConceptNode {
            key: key.clone(),
            attributes: Vec::new(),
        });
        self.node_indices.insert(key, idx);
        idx
    }

    /// Resolve a key to its node, if registered
    pub fn node_index<Q>(&self, key: &Q) -> Option<NodeIndex>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.node_indices.get(key).copied()
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.node_indices.contains_key(key)
    }

    /// Key of a node
    pub fn key(&self, node: NodeIndex) -> &K {
        &self.graph[node].key
    }

    /// Get node count
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get edge count
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All nodes in creation order
    pub fn nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Debug rendering of a node key, used in logs and errors
    pub fn describe(&self, node: NodeIndex) -> String {
        format!("{:?}", self.key(node))
    }

    // ========== Edges ==========

    /// Immediate parents, in creation order
    pub fn parents(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors(node, Direction::Incoming)
    }

    /// Immediate children, in creation order
    pub fn children(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors(node, Direction::Outgoing)
    }

    pub(crate) fn child_count(&self, node: NodeIndex) -> usize {
        self.graph.edges_directed(node, Direction::Outgoing).count()
    }

    fn neighbors(&self, node: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut result: Vec<NodeIndex> = self
            .graph
            .edges_directed(node, direction)
            .map(|e| match direction {
                Direction::Outgoing => e.target(),
                Direction::Incoming => e.source(),
            })
            .collect();
        result.sort();
        result
    }

    /// Add `parent` as a parent of `node`. Returns false if the edge already exists.
    pub fn add_parent(&mut self, node: NodeIndex, parent: NodeIndex) -> bool {
        if self.graph.find_edge(parent, node).is_some() {
            return false;
        }
        self.graph.add_edge(parent, node, ());
        true
    }

    /// Add `child` as a child of `node`. Returns false if the edge already exists.
    pub fn add_child(&mut self, node: NodeIndex, child: NodeIndex) -> bool {
        self.add_parent(child, node)
    }

    /// Remove `parent` from the parents of `node`
    pub fn remove_parent(&mut self, node: NodeIndex, parent: NodeIndex) -> bool {
        match self.graph.find_edge(parent, node) {
            Some(edge) => {
                self.graph.remove_edge(edge);
                true
            }
            None => false,
        }
    }

    /// Remove `child` from the children of `node`
    pub fn remove_child(&mut self, node: NodeIndex, child: NodeIndex) -> bool {
        self.remove_parent(child, node)
    }

    pub fn is_parent_of(&self, node: NodeIndex, other: NodeIndex) -> bool {
        self.graph.find_edge(node, other).is_some()
    }

    pub fn is_child_of(&self, node: NodeIndex, other: NodeIndex) -> bool {
        self.graph.find_edge(other, node).is_some()
    }

    /// A node without parents
    pub fn is_root(&self, node: NodeIndex) -> bool {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .next()
            .is_none()
    }

    /// A node without children
    pub fn is_leaf(&self, node: NodeIndex) -> bool {
        self.child_count(node) == 0
    }
}

impl<K: NodeKey + fmt::Display> OntologyGraph<K> {
    /// Export the ontology to GraphViz DOT format
    ///
    /// Nodes carrying a feature-mapped attribute are highlighted; own
    /// attributes are listed under the node label.
    pub fn to_dot(&self) -> String {
        let mut output = String::new();

        output.push_str("digraph Ontology {\n");
        output.push_str("  rankdir=BT;\n");
        output.push_str("  node [shape=box, style=\"filled,rounded\", fontname=\"Helvetica\", fontsize=10];\n");
        output.push_str("  edge [arrowhead=empty];\n");
        output.push('\n');

        for idx in self.graph.node_indices() {
            let node = &self.graph[idx];
            let mut label = escape_label(&node.key.to_string());
            for attr in &node.attributes {
                label.push_str("\\n+ ");
                label.push_str(&escape_label(self.attribute(*attr).name()));
            }

            let color = if self.has_mapped_attributes(idx) {
                "#FF9800"
            } else if self.is_root(idx) {
                "#607D8B"
            } else {
                "#E0E0E0"
            };

            output.push_str(&format!(
                "  n{} [label=\"{}\", fillcolor=\"{}\"];\n",
                idx.index(),
                label,
                color
            ));
        }

        output.push('\n');

        // Child -> parent, the usual direction for generalization arrows
        for edge in self.graph.edge_references() {
            output.push_str(&format!(
                "  n{} -> n{};\n",
                edge.target().index(),
                edge.source().index()
            ));
        }

        output.push_str("}\n");
        output
    }
}

fn escape_label(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}
