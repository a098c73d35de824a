//! Feature mappings
//!
//! Associates a recommender feature with either a concept node or an
//! attribute visible on a concept node.

use crate::error::{Result, WeightingError};
use crate::graph::{AttributeId, NodeKey, OntologyGraph};
use petgraph::graph::NodeIndex;

/// Association of a feature with a node, optionally through an attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureMapping {
    feature_name: String,
    node: NodeIndex,
    attribute: Option<AttributeId>,
}

impl FeatureMapping {
    /// Map a feature directly to a node
    pub fn to_node(feature_name: impl Into<String>, node: NodeIndex) -> Self {
        Self {
            feature_name: feature_name.into(),
            node,
            attribute: None,
        }
    }

    /// Map a feature to an own or inherited attribute of `node`
    ///
    /// The attribute records `node` as its mapped node.
    pub fn to_attribute<K: NodeKey>(
        graph: &mut OntologyGraph<K>,
        feature_name: impl Into<String>,
        node: NodeIndex,
        attribute: &str,
    ) -> Result<Self> {
        let id = graph
            .attribute_by_name(node, attribute)
            .ok_or_else(|| WeightingError::MissingAttribute {
                node: graph.describe(node),
                attribute: attribute.to_string(),
            })?;

        graph.set_attribute_mapping(id, Some(node));

        Ok(Self {
            feature_name: feature_name.into(),
            node,
            attribute: Some(id),
        })
    }

    pub fn feature_name(&self) -> &str {
        &self.feature_name
    }

    pub fn node(&self) -> NodeIndex {
        self.node
    }

    pub fn attribute(&self) -> Option<AttributeId> {
        self.attribute
    }

    pub fn is_attribute_mapping(&self) -> bool {
        self.attribute.is_some()
    }

    /// Render as `feature -> [attribute] (node)` or `feature -> (node)`
    pub fn describe<K: NodeKey>(&self, graph: &OntologyGraph<K>) -> String {
        match self.attribute {
            Some(id) => format!(
                "{} -> [{}] ({})",
                self.feature_name,
                graph.attribute(id).name(),
                graph.describe(self.node)
            ),
            None => format!("{} -> ({})", self.feature_name, graph.describe(self.node)),
        }
    }
}
