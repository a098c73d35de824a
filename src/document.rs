//! Ontology documents
//!
//! A small JSON description of an ontology: concept nodes with their parents
//! and own attributes, plus the feature mappings. Applying a document drives
//! the registry's population API.
//!
//! ```json
//! {
//!   "nodes": [
//!     { "key": "Element", "attributes": ["owner"] },
//!     { "key": "NamedElement", "parents": ["Element"], "attributes": ["name"] }
//!   ],
//!   "features": [
//!     { "name": "NAMED", "node": "NamedElement" },
//!     { "name": "OWNER", "node": "NamedElement", "attribute": "owner" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{Result, WeightingError};
use crate::registry::GraphRegistry;

/// Declarative ontology description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OntologyDocument {
    #[serde(default)]
    pub nodes: Vec<NodeDecl>,

    #[serde(default)]
    pub features: Vec<FeatureDecl>,
}

/// A concept node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDecl {
    pub key: String,

    /// Keys of the immediate parents, each declared somewhere in the document
    #[serde(default)]
    pub parents: Vec<String>,

    /// Names of the attributes declared on this node
    #[serde(default)]
    pub attributes: Vec<String>,
}

/// A feature mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureDecl {
    pub name: String,
    pub node: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

/// What applying a document changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub nodes: usize,
    pub edges: usize,
    pub attributes: usize,
    /// (node, attribute) pairs refused because of a name collision
    pub refused_attributes: Vec<(String, String)>,
    pub features: usize,
}

impl OntologyDocument {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Populate `registry` with this document
    ///
    /// Nodes first, then edges, then attributes, so collision checks see the
    /// complete hierarchy. Features are registered last.
    pub fn apply(&self, registry: &mut GraphRegistry<String>) -> Result<ApplySummary> {
        let mut summary = ApplySummary::default();

        for decl in &self.nodes {
            if !registry.node_exists(decl.key.as_str()) {
                summary.nodes += 1;
            }
            registry.get_node(decl.key.clone());
        }

        for decl in &self.nodes {
            let node = registry.get_node(decl.key.clone());
            for parent_key in &decl.parents {
                let parent = registry
                    .graph()
                    .node_index(parent_key.as_str())
                    .ok_or_else(|| WeightingError::UnknownNode(parent_key.clone()))?;
                if registry.graph_mut().add_parent(node, parent) {
                    summary.edges += 1;
                }
            }
        }

        for decl in &self.nodes {
            let node = registry.get_node(decl.key.clone());
            for name in &decl.attributes {
                match registry.create_attribute(name.clone(), node) {
                    Some(_) => summary.attributes += 1,
                    None => {
                        warn!("Attribute '{}' on {} collides with its hierarchy", name, decl.key);
                        summary.refused_attributes.push((decl.key.clone(), name.clone()));
                    }
                }
            }
        }

        for decl in &self.features {
            let node = registry
                .graph()
                .node_index(decl.node.as_str())
                .ok_or_else(|| WeightingError::UnknownNode(decl.node.clone()))?;
            registry.add_feature_mapping(decl.name.clone(), node, decl.attribute.as_deref())?;
            summary.features += 1;
        }

        debug!(
            "Applied document: {} nodes, {} edges, {} attributes, {} features",
            summary.nodes, summary.edges, summary.attributes, summary.features
        );
        Ok(summary)
    }
}
