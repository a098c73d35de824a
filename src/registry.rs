//! Graph Registry
//!
//! Owns the ontology graph, the feature mappings and the weighting strategy.
//! This is the entry point for populating an ontology and computing weights.

use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::Hash;

use petgraph::graph::NodeIndex;
use tracing::{debug, info};

use crate::config::WeightingConfig;
use crate::error::{Result, WeightingError};
use crate::graph::{AttributeId, NodeKey, OntologyGraph};
use crate::mapping::FeatureMapping;
use crate::weighting::{fill_unreachable, FeatureWeights, WeightingRequest, WeightingStrategy};

/// Registry of an ontology and its feature mappings
#[derive(Debug)]
pub struct GraphRegistry<K: NodeKey> {
    /// The ontology graph
    graph: OntologyGraph<K>,
    /// Registered mappings by feature name
    feature_mapping: BTreeMap<String, FeatureMapping>,
    /// Distance policy
    strategy: Box<dyn WeightingStrategy<K>>,
    collapse_single_child_ancestors: bool,
    include_selected_as_targets: bool,
}

impl<K: NodeKey> GraphRegistry<K> {
    pub fn new(
        strategy: Box<dyn WeightingStrategy<K>>,
        collapse_single_child_ancestors: bool,
        include_selected_as_targets: bool,
    ) -> Self {
        Self {
            graph: OntologyGraph::new(),
            feature_mapping: BTreeMap::new(),
            strategy,
            collapse_single_child_ancestors,
            include_selected_as_targets,
        }
    }

    /// Build a registry using the configured strategy and flags
    pub fn from_config(config: &WeightingConfig) -> Self {
        Self::new(
            config.strategy.build(),
            config.collapse_single_child_ancestors,
            config.include_selected_as_targets,
        )
    }

    pub fn graph(&self) -> &OntologyGraph<K> {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut OntologyGraph<K> {
        &mut self.graph
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn collapse_single_child_ancestors(&self) -> bool {
        self.collapse_single_child_ancestors
    }

    pub fn include_selected_as_targets(&self) -> bool {
        self.include_selected_as_targets
    }

    // ========== Population ==========

    /// Get the node for `key`, creating it on first reference
    pub fn get_node(&mut self, key: K) -> NodeIndex {
        self.graph.get_or_insert(key)
    }

    pub fn node_exists<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.graph.contains(key)
    }

    /// Create an attribute and attach it to `node`
    ///
    /// Returns `None` when the name collides along the node's hierarchy; the
    /// detached attribute is left unused.
    pub fn create_attribute(&mut self, name: impl Into<String>, node: NodeIndex) -> Option<AttributeId> {
        let id = self.graph.create_attribute(name);
        self.graph.add_attribute(node, id).then_some(id)
    }

    /// Register a feature mapped to `node`, or to an attribute visible on it
    ///
    /// Fails if the attribute is not visible on `node`, even for a feature
    /// name that is already registered. A registered name is otherwise left
    /// untouched, attribute back-references included.
    pub fn add_feature_mapping(
        &mut self,
        feature_name: impl Into<String>,
        node: NodeIndex,
        attribute: Option<&str>,
    ) -> Result<()> {
        let feature_name = feature_name.into();
        if self.feature_mapping.contains_key(&feature_name) {
            // Validate without touching the attribute
            if let Some(attribute) = attribute {
                if !self.graph.has_attribute(node, attribute) {
                    return Err(WeightingError::MissingAttribute {
                        node: self.graph.describe(node),
                        attribute: attribute.to_string(),
                    });
                }
            }
            debug!("Feature {} already registered", feature_name);
            return Ok(());
        }

        let mapping = match attribute {
            Some(attribute) => FeatureMapping::to_attribute(&mut self.graph, feature_name.clone(), node, attribute)?,
            None => FeatureMapping::to_node(feature_name.clone(), node),
        };

        debug!("Registered feature {}", mapping.describe(&self.graph));
        self.feature_mapping.insert(feature_name, mapping);
        Ok(())
    }

    /// Unregister a feature
    ///
    /// An attribute keeps pointing at a node only while another remaining
    /// mapping still targets it.
    pub fn remove_feature_mapping(&mut self, feature_name: &str) -> bool {
        let Some(removed) = self.feature_mapping.remove(feature_name) else {
            return false;
        };

        if let Some(id) = removed.attribute() {
            let remaining = self
                .feature_mapping
                .values()
                .find(|m| m.attribute() == Some(id))
                .map(FeatureMapping::node);
            self.graph.set_attribute_mapping(id, remaining);
        }

        debug!("Removed feature {}", feature_name);
        true
    }

    pub fn feature_mapping(&self, feature_name: &str) -> Option<&FeatureMapping> {
        self.feature_mapping.get(feature_name)
    }

    /// Registered mappings, ordered by feature name
    pub fn feature_mappings(&self) -> impl Iterator<Item = &FeatureMapping> {
        self.feature_mapping.values()
    }

    pub fn feature_count(&self) -> usize {
        self.feature_mapping.len()
    }

    /// Names of every registered feature
    pub fn mapped_features(&self) -> BTreeSet<String> {
        self.feature_mapping.keys().cloned().collect()
    }

    /// Nodes targeted by node mappings
    pub fn mapped_nodes(&self) -> BTreeSet<NodeIndex> {
        self.feature_mapping
            .values()
            .filter(|m| !m.is_attribute_mapping())
            .map(FeatureMapping::node)
            .collect()
    }

    /// Nodes targeted by attribute mappings
    pub fn attribute_nodes(&self) -> BTreeSet<NodeIndex> {
        self.feature_mapping
            .values()
            .filter(|m| m.is_attribute_mapping())
            .map(FeatureMapping::node)
            .collect()
    }

    // ========== Weighting ==========

    /// Weight every registered feature against the selected ones
    ///
    /// Every registered feature appears in the result; selected features
    /// weigh 1.0. Fails if a selected feature is not registered.
    pub fn compute_feature_weights<I, S>(&self, selected_features: I, max_ancestor_height: usize) -> Result<FeatureWeights>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let selected: BTreeSet<String> = selected_features.into_iter().map(Into::into).collect();
        let direct = self.mapped_nodes();
        let attribute = self.attribute_nodes();

        let request = WeightingRequest {
            selected_features: &selected,
            direct_mapped_nodes: &direct,
            attribute_mapped_nodes: &attribute,
            feature_mapping: &self.feature_mapping,
            max_ancestor_height,
            collapse_single_child_ancestors: self.collapse_single_child_ancestors,
            include_other_selected_as_targets: self.include_selected_as_targets,
        };

        info!(
            "Weighting {} features against {:?} with the {} strategy (height {})",
            self.feature_mapping.len(),
            selected,
            self.strategy.name(),
            max_ancestor_height
        );

        let mut weights = self.strategy.compute_feature_weights(&self.graph, &request)?;
        fill_unreachable(&mut weights, self.feature_mapping.keys());
        Ok(weights)
    }
}
