//! Node attributes
//!
//! Attributes live in an arena owned by the graph and are attached to at most
//! one node at a time. A node sees its own attributes plus every attribute of
//! its ancestors. Attribute names are unique across any ancestor/descendant
//! chain: attaching is refused when the name is already visible on the node
//! (own or inherited) or declared on any descendant.

use super::{NodeKey, OntologyGraph};
use petgraph::graph::NodeIndex;
use std::collections::{BTreeMap, HashSet};
use std::hash::{Hash, Hasher};
use tracing::debug;

/// Handle to an attribute in the graph's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeId(pub(crate) usize);

/// A named property of a concept
///
/// Identity is the name: two attributes with the same name compare equal.
#[derive(Debug, Clone)]
pub struct NodeAttribute {
    name: String,
    attached_node: Option<NodeIndex>,
    mapped_to_node: Option<NodeIndex>,
}

impl NodeAttribute {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Node currently declaring the attribute
    pub fn attached_node(&self) -> Option<NodeIndex> {
        self.attached_node
    }

    /// Node of the feature mapping that references this attribute
    pub fn mapped_to_node(&self) -> Option<NodeIndex> {
        self.mapped_to_node
    }
}

impl PartialEq for NodeAttribute {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for NodeAttribute {}

impl Hash for NodeAttribute {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<K: NodeKey> OntologyGraph<K> {
    /// Create a detached attribute
    pub fn create_attribute(&mut self, name: impl Into<String>) -> AttributeId {
        let id = AttributeId(self.attributes.len());
        self.attributes.push(NodeAttribute {
            name: name.into(),
            attached_node: None,
            mapped_to_node: None,
        });
        id
    }

    pub fn attribute(&self, id: AttributeId) -> &NodeAttribute {
        &self.attributes[id.0]
    }

    /// Attach an attribute to `node`
    ///
    /// Returns false when the name collides with an own, inherited or
    /// descendant attribute. An attribute attached elsewhere is moved.
    pub fn add_attribute(&mut self, node: NodeIndex, id: AttributeId) -> bool {
        let name = self.attributes[id.0].name.clone();

        let visible = self
            .all_attributes(node)
            .iter()
            .any(|a| self.attributes[a.0].name == name);
        if visible || self.descendant_attribute_names(node).contains(name.as_str()) {
            debug!(
                "Refused attribute '{}' on {}: name already in use",
                name,
                self.describe(node)
            );
            return false;
        }

        if let Some(previous) = self.attributes[id.0].attached_node.take() {
            self.graph[previous].attributes.retain(|a| *a != id);
        }

        self.graph[node].attributes.push(id);
        self.attributes[id.0].attached_node = Some(node);
        debug!("Attached attribute '{}' to {}", name, self.describe(node));
        true
    }

    /// Detach the own attribute called `name` from `node`
    pub fn remove_attribute(&mut self, node: NodeIndex, name: &str) -> bool {
        let position = self.graph[node]
            .attributes
            .iter()
            .position(|a| self.attributes[a.0].name == name);

        match position {
            Some(pos) => {
                let id = self.graph[node].attributes.remove(pos);
                self.attributes[id.0].attached_node = None;
                debug!("Removed attribute '{}' from {}", name, self.describe(node));
                true
            }
            None => false,
        }
    }

    /// Attributes declared directly on `node`
    pub fn attributes(&self, node: NodeIndex) -> &[AttributeId] {
        &self.graph[node].attributes
    }

    /// Own and inherited attributes, one per name, ordered by name
    pub fn all_attributes(&self, node: NodeIndex) -> Vec<AttributeId> {
        let mut by_name = BTreeMap::new();
        self.collect_attributes(node, &mut by_name);
        by_name.into_values().collect()
    }

    fn collect_attributes<'a>(&'a self, node: NodeIndex, acc: &mut BTreeMap<&'a str, AttributeId>) {
        for id in &self.graph[node].attributes {
            acc.entry(self.attributes[id.0].name.as_str()).or_insert(*id);
        }
        for parent in self.parents(node) {
            self.collect_attributes(parent, acc);
        }
    }

    fn descendant_attribute_names(&self, node: NodeIndex) -> HashSet<&str> {
        let mut names = HashSet::new();
        let mut stack = self.children(node);
        let mut seen = HashSet::new();

        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            for id in &self.graph[current].attributes {
                names.insert(self.attributes[id.0].name.as_str());
            }
            stack.extend(self.children(current));
        }

        names
    }

    /// Look up an own or inherited attribute by name
    pub fn attribute_by_name(&self, node: NodeIndex, name: &str) -> Option<AttributeId> {
        self.all_attributes(node)
            .into_iter()
            .find(|a| self.attributes[a.0].name == name)
    }

    pub fn has_attribute(&self, node: NodeIndex, name: &str) -> bool {
        self.attribute_by_name(node, name).is_some()
    }

    /// True if some own or inherited attribute is mapped to `node`
    pub fn has_mapped_attributes(&self, node: NodeIndex) -> bool {
        self.all_attributes(node)
            .iter()
            .any(|a| self.attributes[a.0].mapped_to_node == Some(node))
    }

    pub(crate) fn set_attribute_mapping(&mut self, id: AttributeId, node: Option<NodeIndex>) {
        self.attributes[id.0].mapped_to_node = node;
    }
}
