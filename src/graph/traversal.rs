//! Graph traversal primitives
//!
//! Ancestor path enumeration, bounded-height subgraph paths and the BFS
//! searches the weighting strategies are built on. Results are returned in
//! ordered collections so that every computation is reproducible.

use super::{NodeKey, OntologyGraph};
use petgraph::graph::NodeIndex;
use petgraph::visit::Bfs;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use tracing::trace;

/// A sequence of nodes, starting at the origin of the walk
pub type NodePath = Vec<NodeIndex>;

impl<K: NodeKey> OntologyGraph<K> {
    /// Exactly one child and no attribute mapped to the node itself
    ///
    /// Such nodes are elided from paths and do not consume height budget
    /// when single-child collapsing is enabled.
    pub fn is_only_begotten(&self, node: NodeIndex) -> bool {
        self.child_count(node) == 1 && !self.has_mapped_attributes(node)
    }

    // ========== Ancestor paths ==========

    /// Every path from `node` to a root, node first and root last
    pub fn all_paths_to_root(&self, node: NodeIndex) -> BTreeSet<NodePath> {
        let parents = self.parents(node);
        if parents.is_empty() {
            return BTreeSet::from([vec![node]]);
        }

        let mut paths = BTreeSet::new();
        for parent in parents {
            for tail in self.all_paths_to_root(parent) {
                let mut path = Vec::with_capacity(tail.len() + 1);
                path.push(node);
                path.extend(tail);
                paths.insert(path);
            }
        }
        paths
    }

    /// Ancestor paths from `node` climbing at most `max_height` levels
    ///
    /// Each path starts at `node` and ends at the highest ancestor reached:
    /// either the node where the height budget ran out or a root. With
    /// `collapse`, only-begotten ancestors do not consume budget and are
    /// left out of the path; `node` itself is always kept.
    pub fn subgraph_max_height_paths(
        &self,
        node: NodeIndex,
        max_height: usize,
        collapse: bool,
    ) -> BTreeSet<NodePath> {
        self.height_paths_reversed(node, node, max_height, collapse)
            .into_iter()
            .map(|mut path| {
                path.reverse();
                path
            })
            .collect()
    }

    /// Paths built top-down: highest ancestor first, `current` appended last
    fn height_paths_reversed(
        &self,
        origin: NodeIndex,
        current: NodeIndex,
        budget: usize,
        collapse: bool,
    ) -> BTreeSet<NodePath> {
        let parents = self.parents(current);
        if budget == 0 || parents.is_empty() {
            return BTreeSet::from([vec![current]]);
        }

        let keep_current = current == origin || !collapse || !self.is_only_begotten(current);

        let mut paths = BTreeSet::new();
        for parent in parents {
            let next_budget = if collapse && self.is_only_begotten(parent) {
                budget
            } else {
                budget - 1
            };

            for mut path in self.height_paths_reversed(origin, parent, next_budget, collapse) {
                if keep_current {
                    path.push(current);
                }
                paths.insert(path);
            }
        }
        paths
    }

    /// The frontier: last node of every bounded-height ancestor path
    pub fn extract_max_nodes_from_height(
        &self,
        node: NodeIndex,
        max_height: usize,
        collapse: bool,
    ) -> BTreeSet<NodeIndex> {
        self.subgraph_max_height_paths(node, max_height, collapse)
            .into_iter()
            .filter_map(|path| path.last().copied())
            .collect()
    }

    // ========== Searches ==========

    /// `node` and all of its descendants
    pub fn bfs_discover_subgraph_nodes(&self, node: NodeIndex) -> HashSet<NodeIndex> {
        let mut discovered = HashSet::new();
        let mut bfs = Bfs::new(&self.graph, node);
        while let Some(nx) = bfs.next(&self.graph) {
            discovered.insert(nx);
        }
        discovered
    }

    /// Union of the descendant closures of every frontier node
    pub fn frontier_subgraph(&self, frontier: &BTreeSet<NodeIndex>) -> HashSet<NodeIndex> {
        frontier
            .iter()
            .flat_map(|&node| self.bfs_discover_subgraph_nodes(node))
            .collect()
    }

    /// Undirected BFS from `origin` restricted to `subgraph`
    ///
    /// Neighbours are children and parents, both filtered to `subgraph`;
    /// `origin` is always the starting point even when outside it. Returns the
    /// distance of every reachable reference node. With `collapse`,
    /// only-begotten intermediate nodes are not counted; `origin` always is.
    pub fn bfs_non_directional_distances(
        &self,
        origin: NodeIndex,
        subgraph: &HashSet<NodeIndex>,
        reference: &BTreeSet<NodeIndex>,
        collapse: bool,
    ) -> HashMap<NodeIndex, usize> {
        let came_from = self.bfs_came_from(origin, |current| {
            self.children(current)
                .into_iter()
                .chain(self.parents(current))
                .filter(|n| subgraph.contains(n))
                .collect()
        });

        self.reference_distances(&came_from, origin, reference, collapse, true)
    }

    /// BFS from `origin` following child links only
    ///
    /// With `collapse`, an only-begotten `origin` is not counted either.
    pub fn bfs_descendant_distances(
        &self,
        origin: NodeIndex,
        reference: &BTreeSet<NodeIndex>,
        collapse: bool,
    ) -> HashMap<NodeIndex, usize> {
        let came_from = self.bfs_came_from(origin, |current| self.children(current));
        self.reference_distances(&came_from, origin, reference, collapse, false)
    }

    /// Distances from `origin` to reference nodes inside the bounded subgraph
    ///
    /// The subgraph is the union of the descendant closures of the frontier
    /// at `max_height`.
    pub fn distances_to(
        &self,
        origin: NodeIndex,
        reference: &BTreeSet<NodeIndex>,
        max_height: usize,
        collapse: bool,
    ) -> HashMap<NodeIndex, usize> {
        let frontier = self.extract_max_nodes_from_height(origin, max_height, collapse);
        let subgraph = self.frontier_subgraph(&frontier);
        trace!(
            "Search from {} spans {} nodes under {} frontier nodes",
            self.describe(origin),
            subgraph.len(),
            frontier.len()
        );
        self.bfs_non_directional_distances(origin, &subgraph, reference, collapse)
    }

    /// Predecessor map of a BFS from `origin`; `origin` maps to `None`
    fn bfs_came_from<F>(&self, origin: NodeIndex, neighbors: F) -> HashMap<NodeIndex, Option<NodeIndex>>
    where
        F: Fn(NodeIndex) -> Vec<NodeIndex>,
    {
        let mut came_from = HashMap::new();
        let mut queue = VecDeque::new();

        came_from.insert(origin, None);
        queue.push_back(origin);

        while let Some(current) = queue.pop_front() {
            for next in neighbors(current) {
                if !came_from.contains_key(&next) {
                    came_from.insert(next, Some(current));
                    queue.push_back(next);
                }
            }
        }

        came_from
    }

    fn reference_distances(
        &self,
        came_from: &HashMap<NodeIndex, Option<NodeIndex>>,
        origin: NodeIndex,
        reference: &BTreeSet<NodeIndex>,
        collapse: bool,
        keep_origin: bool,
    ) -> HashMap<NodeIndex, usize> {
        reference
            .iter()
            .filter(|goal| came_from.contains_key(*goal))
            .map(|&goal| {
                let path = self.reconstruct_path(came_from, origin, goal, collapse, keep_origin);
                (goal, path.len() - 1)
            })
            .collect()
    }

    /// Walk the predecessor map back from `goal`
    ///
    /// The goal is always kept. With `collapse`, only-begotten nodes are
    /// dropped, except `origin` when `keep_origin` is set.
    fn reconstruct_path(
        &self,
        came_from: &HashMap<NodeIndex, Option<NodeIndex>>,
        origin: NodeIndex,
        goal: NodeIndex,
        collapse: bool,
        keep_origin: bool,
    ) -> NodePath {
        let mut path = vec![goal];
        let mut current = goal;

        while let Some(&Some(previous)) = came_from.get(&current) {
            current = previous;
            if !collapse || (keep_origin && current == origin) || !self.is_only_begotten(current) {
                path.push(current);
            }
        }

        path.reverse();
        path
    }
}
