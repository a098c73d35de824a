//! Ancestor-descent search
//!
//! Every target is reached by climbing from the reference node to a frontier
//! ancestor and descending from there. The climb is charged the full
//! `max_ancestor_height`, whatever the real number of levels climbed; the
//! descent is the BFS length below the frontier node.

use super::{WeightingRequest, WeightingStrategy};
use crate::graph::{NodeKey, OntologyGraph};
use crate::mapping::FeatureMapping;
use petgraph::graph::NodeIndex;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct AncestorDescentWeighting;

impl<K: NodeKey> WeightingStrategy<K> for AncestorDescentWeighting {
    fn name(&self) -> &'static str {
        "ancestor"
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

        let Some(height) = request.effective_height(reference) else {
            debug!("No frontier for {}", reference.feature_name());
            return HashMap::new();
        };

        let frontier = graph.extract_max_nodes_from_height(origin, height, collapse);
        debug!(
            "Frontier of {}: {:?}",
            reference.feature_name(),
            frontier.iter().map(|&n| graph.describe(n)).collect::<Vec<_>>()
        );

        let mut distances: HashMap<NodeIndex, usize> = HashMap::new();
        for ancestor in frontier {
            for (node, descent) in graph.bfs_descendant_distances(ancestor, targets, collapse) {
                if node == origin {
                    continue;
                }

                let distance = request.max_ancestor_height + descent;
                if distance == 0 {
                    continue;
                }

                distances
                    .entry(node)
                    .and_modify(|current| *current = (*current).min(distance))
                    .or_insert(distance);
            }
        }

        distances
    }
}
