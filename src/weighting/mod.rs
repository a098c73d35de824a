//! Feature weighting
//!
//! A weighting pass turns a set of selected features into a weight for every
//! registered feature. Strategies differ only in how node distances from a
//! reference feature are measured; the rest of the pipeline is shared:
//!
//! 1. For each selected feature, the strategy computes node distances.
//! 2. Node distances become feature distances, charging one extra hop for
//!    each end mapped through an attribute.
//! 3. Feature distances are normalized into `1 - d / sum`, with selected
//!    features pinned to 1.0.
//! 4. Partial maps are merged by averaging with the running value.
//! 5. Registered features never reached get 0.0.

pub mod ancestor;
pub mod bounded;

pub use ancestor::AncestorDescentWeighting;
pub use bounded::BoundedSearchWeighting;

use crate::error::{Result, WeightingError};
use crate::graph::{NodeKey, OntologyGraph};
use crate::mapping::FeatureMapping;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use tracing::debug;

/// Feature name -> weight in [0, 1]
pub type FeatureWeights = BTreeMap<String, f64>;

/// Inputs of a single weighting pass
#[derive(Debug, Clone, Copy)]
pub struct WeightingRequest<'a> {
    /// Reference features chosen by the user
    pub selected_features: &'a BTreeSet<String>,
    /// Nodes targeted by node mappings
    pub direct_mapped_nodes: &'a BTreeSet<NodeIndex>,
    /// Nodes targeted by attribute mappings
    pub attribute_mapped_nodes: &'a BTreeSet<NodeIndex>,
    /// Every registered mapping, by feature name
    pub feature_mapping: &'a BTreeMap<String, FeatureMapping>,
    pub max_ancestor_height: usize,
    pub collapse_single_child_ancestors: bool,
    /// Whether other selected features count as targets
    pub include_other_selected_as_targets: bool,
}

impl WeightingRequest<'_> {
    /// Union of node-mapped and attribute-mapped nodes
    pub fn target_nodes(&self) -> BTreeSet<NodeIndex> {
        self.direct_mapped_nodes
            .union(self.attribute_mapped_nodes)
            .copied()
            .collect()
    }

    /// Height left for the node search once the attribute hop is charged
    ///
    /// `None` when an attribute reference has no height to spare.
    pub fn effective_height(&self, reference: &FeatureMapping) -> Option<usize> {
        if reference.is_attribute_mapping() {
            self.max_ancestor_height.checked_sub(1)
        } else {
            Some(self.max_ancestor_height)
        }
    }
}

/// Policy measuring node distances from a reference feature
pub trait WeightingStrategy<K: NodeKey>: fmt::Debug {
    /// Short identifier used in logs and configuration
    fn name(&self) -> &'static str;

    /// Distance from the reference feature's node to every reachable target
    fn node_distances(
        &self,
        graph: &OntologyGraph<K>,
        reference: &FeatureMapping,
        targets: &BTreeSet<NodeIndex>,
        request: &WeightingRequest<'_>,
    ) -> HashMap<NodeIndex, usize>;

    /// Run the full weighting pipeline for the selected features
    fn compute_feature_weights(
        &self,
        graph: &OntologyGraph<K>,
        request: &WeightingRequest<'_>,
    ) -> Result<FeatureWeights> {
        let targets = request.target_nodes();
        let mut weights = FeatureWeights::new();

        for reference_feature in request.selected_features {
            let reference = request
                .feature_mapping
                .get(reference_feature)
                .ok_or_else(|| WeightingError::UnknownFeature(reference_feature.clone()))?;

            let node_distances = self.node_distances(graph, reference, &targets, request);
            debug!(
                "[{}] {} reaches {} of {} target nodes",
                self.name(),
                reference.describe(graph),
                node_distances.len(),
                targets.len()
            );

            let distances = distances_to_features(reference, &node_distances, request);
            debug!("[{}] Distances from {}: {:?}", self.name(), reference_feature, distances);

            let partial = normalize_distances(&distances, request.selected_features);
            debug!("[{}] Partial weights: {:?}", self.name(), partial);

            merge_weights(&mut weights, partial);
        }

        fill_unreachable(&mut weights, request.feature_mapping.keys());
        debug!("[{}] Final weights: {:?}", self.name(), weights);
        Ok(weights)
    }
}

/// Convert node distances into distances between features
///
/// Skips the reference feature itself, other selected features unless
/// requested, and features whose node was not reached.
pub fn distances_to_features(
    reference: &FeatureMapping,
    node_distances: &HashMap<NodeIndex, usize>,
    request: &WeightingRequest<'_>,
) -> BTreeMap<String, usize> {
    let reference_hop = usize::from(reference.is_attribute_mapping());
    let mut distances = BTreeMap::new();

    for (feature, target) in request.feature_mapping {
        if feature == reference.feature_name() {
            continue;
        }
        if !request.include_other_selected_as_targets && request.selected_features.contains(feature) {
            continue;
        }
        let Some(&node_distance) = node_distances.get(&target.node()) else {
            continue;
        };

        let distance = reference_hop + node_distance + usize::from(target.is_attribute_mapping());
        distances.insert(feature.clone(), distance);
    }

    distances
}

/// Turn distances into similarity weights
///
/// Non-selected features get `1 - d / sum`; a zero sum keeps the raw distance.
/// Every selected feature is pinned to 1.0.
pub fn normalize_distances(
    distances: &BTreeMap<String, usize>,
    selected_features: &BTreeSet<String>,
) -> FeatureWeights {
    let sum: usize = distances.values().sum();

    let mut weights: FeatureWeights = distances
        .iter()
        .filter(|(feature, _)| !selected_features.contains(*feature))
        .map(|(feature, &distance)| {
            let weight = if sum == 0 {
                distance as f64
            } else {
                1.0 - distance as f64 / sum as f64
            };
            (feature.clone(), weight)
        })
        .collect();

    for feature in selected_features {
        weights.insert(feature.clone(), 1.0);
    }

    weights
}

/// Fold a partial map into the running map, averaging shared features
pub fn merge_weights(weights: &mut FeatureWeights, partial: FeatureWeights) {
    for (feature, weight) in partial {
        weights
            .entry(feature)
            .and_modify(|current| *current = (*current + weight) / 2.0)
            .or_insert(weight);
    }
}

/// Give 0.0 to every registered feature missing from the map
pub fn fill_unreachable<'a, I>(weights: &mut FeatureWeights, features: I)
where
    I: IntoIterator<Item = &'a String>,
{
    for feature in features {
        weights.entry(feature.clone()).or_insert(0.0);
    }
}

/// Available weighting strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Undirected search inside the bounded ancestor subgraph
    #[default]
    Bounded,
    /// Climb to the frontier, then descend
    Ancestor,
}

impl StrategyKind {
    pub fn build<K: NodeKey>(self) -> Box<dyn WeightingStrategy<K>> {
        match self {
            StrategyKind::Bounded => Box::new(BoundedSearchWeighting),
            StrategyKind::Ancestor => Box::new(AncestorDescentWeighting),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Bounded => "bounded",
            StrategyKind::Ancestor => "ancestor",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bounded" => Ok(StrategyKind::Bounded),
            "ancestor" => Ok(StrategyKind::Ancestor),
            other => Err(format!("unknown strategy '{}' (expected bounded or ancestor)", other)),
        }
    }
}
