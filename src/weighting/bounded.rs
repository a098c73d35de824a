//! Bounded-subgraph search
//!
//! The reference node climbs `max_ancestor_height` levels to find its
//! frontier; the search space is the union of everything below the frontier.
//! Distances are shortest undirected paths inside that space.

use super::{WeightingRequest, WeightingStrategy};
use crate::graph::{NodeKey, OntologyGraph};
use crate::mapping::FeatureMapping;
use petgraph::graph::NodeIndex;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct BoundedSearchWeighting;

impl<K: NodeKey> WeightingStrategy<K> for BoundedSearchWeighting {
    fn name(&self) -> &'static str {
        "bounded"
    }

    fn node_distances(
        &self,
        graph: &OntologyGraph<K>,
        reference: &FeatureMapping,
        targets: &BTreeSet<NodeIndex>,
        request: &WeightingRequest<'_>,
    ) -> HashMap<NodeIndex, usize> {
        let origin = reference.node();
        let collapse = request.collapse_single_child_ancestors;

        match request.effective_height(reference) {
            Some(height) => graph.distances_to(origin, targets, height, collapse),
            None => {
                debug!(
                    "No height left for {}, searching from the node only",
                    reference.feature_name()
                );
                graph.bfs_non_directional_distances(origin, &HashSet::new(), targets, collapse)
            }
        }
    }
}
