//! Golden Tests for Feature Weights
//!
//! Weights, paths and distances over a fragment of the UML metamodel, plus a
//! few small hand-built hierarchies.

use std::collections::{BTreeSet, HashMap};

use ontology_weights::{
    FeatureWeights, GraphRegistry, NodePath, OntologyDocument, StrategyKind, WeightingConfig,
    WeightingError,
};
use petgraph::graph::NodeIndex;

const EPSILON: f64 = 1e-9;

fn uml_document() -> OntologyDocument {
    OntologyDocument::from_json(include_str!("fixtures/uml_metamodel.json")).unwrap()
}

fn uml_registry(strategy: StrategyKind, collapse: bool, include_selected: bool) -> GraphRegistry<String> {
    let mut registry = GraphRegistry::new(strategy.build(), collapse, include_selected);
    let summary = uml_document().apply(&mut registry).unwrap();
    assert!(summary.refused_attributes.is_empty());
    registry
}

fn node(registry: &GraphRegistry<String>, key: &str) -> NodeIndex {
    registry.graph().node_index(key).unwrap()
}

fn path(registry: &GraphRegistry<String>, keys: &[&str]) -> NodePath {
    keys.iter().map(|k| node(registry, k)).collect()
}

fn assert_weight(weights: &FeatureWeights, feature: &str, expected: f64) {
    let actual = weights[feature];
    assert!(
        (actual - expected).abs() < EPSILON,
        "{}: expected {}, got {}",
        feature,
        expected,
        actual
    );
}

fn assert_well_formed(registry: &GraphRegistry<String>, selected: &[&str], weights: &FeatureWeights) {
    assert_eq!(weights.keys().cloned().collect::<BTreeSet<_>>(), registry.mapped_features());
    for (feature, weight) in weights {
        assert!((0.0..=1.0).contains(weight), "{} out of range: {}", feature, weight);
    }
    for feature in selected {
        assert_eq!(weights[*feature], 1.0);
    }
}

// =============================================================================
// Attributes
// =============================================================================

#[test]
fn test_inherited_attributes() {
    let mut registry = uml_registry(StrategyKind::Bounded, true, false);
    let property = node(&registry, "Property");
    let typed = node(&registry, "TypedElement");
    let element = node(&registry, "Element");

    let graph = registry.graph();
    for name in ["owner", "ownedElement", "ownedComment", "isStatic", "isDerived"] {
        assert!(graph.has_attribute(property, name), "Property should see {}", name);
    }
    assert!(!graph.has_attribute(typed, "isDerived"));

    assert!(registry.create_attribute("owner", property).is_none());
    assert!(registry.create_attribute("isDerived", typed).is_none());
    assert!(registry.create_attribute("newAttr1", property).is_some());

    // Declared on the common root: inherited by both
    assert!(registry.create_attribute("newAttr3", element).is_some());
    assert!(registry.create_attribute("newAttr3", property).is_none());
    assert!(registry.create_attribute("newAttr3", typed).is_none());

    assert!(registry.graph_mut().remove_attribute(element, "owner"));
    assert!(!registry.graph().has_attribute(property, "owner"));
}

// =============================================================================
// Paths
// =============================================================================

#[test]
fn test_all_paths_to_root() {
    let registry = uml_registry(StrategyKind::Bounded, true, false);
    let paths = registry.graph().all_paths_to_root(node(&registry, "Property"));

    let expected: BTreeSet<NodePath> = [
        vec!["Property", "StructuralFeature", "Feature", "RedefinableElement", "NamedElement", "Element"],
        vec!["Property", "StructuralFeature", "MultiplicityElement", "Element"],
        vec!["Property", "StructuralFeature", "TypedElement", "NamedElement", "Element"],
        vec!["Property", "ConnectableElement", "TypedElement", "NamedElement", "Element"],
        vec!["Property", "DeploymentTarget", "NamedElement", "Element"],
    ]
    .iter()
    .map(|keys| path(&registry, keys))
    .collect();

    assert_eq!(paths, expected);
}

#[test]
fn test_max_height_paths_collapsed() {
    let registry = uml_registry(StrategyKind::Bounded, true, false);
    let paths = registry
        .graph()
        .subgraph_max_height_paths(node(&registry, "X"), 3, true);

    let expected: BTreeSet<NodePath> = [
        vec!["X", "StructuralFeature", "NamedElement", "Element"],
        vec!["X", "StructuralFeature", "TypedElement", "NamedElement"],
        vec!["X", "StructuralFeature", "Element"],
    ]
    .iter()
    .map(|keys| path(&registry, keys))
    .collect();

    assert_eq!(paths, expected);
}

#[test]
fn test_max_height_paths_uncollapsed() {
    let registry = uml_registry(StrategyKind::Bounded, false, false);
    let graph = registry.graph();
    let x = node(&registry, "X");

    let expected: BTreeSet<NodePath> = [
        vec!["X", "StructuralFeature", "TypedElement", "NamedElement"],
        vec!["X", "StructuralFeature", "Feature", "RedefinableElement"],
        vec!["X", "StructuralFeature", "MultiplicityElement", "Element"],
    ]
    .iter()
    .map(|keys| path(&registry, keys))
    .collect();

    assert_eq!(graph.subgraph_max_height_paths(x, 3, false), expected);

    let frontier: BTreeSet<NodeIndex> = ["NamedElement", "RedefinableElement", "Element"]
        .iter()
        .map(|k| node(&registry, k))
        .collect();
    assert_eq!(graph.extract_max_nodes_from_height(x, 3, false), frontier);
}

// =============================================================================
// Distances
// =============================================================================

#[test]
fn test_distances_without_mapped_attributes() {
    let mut document = uml_document();
    document.features.clear();
    let mut registry = GraphRegistry::new(StrategyKind::Bounded.build(), true, false);
    document.apply(&mut registry).unwrap();

    let graph = registry.graph();
    let x = node(&registry, "X");
    let property = node(&registry, "Property");
    let port = node(&registry, "Port");
    let reference = BTreeSet::from([property, port]);

    // Property has a single child and is collapsed away
    let collapsed = graph.distances_to(x, &reference, 3, true);
    assert_eq!(collapsed, HashMap::from([(property, 2), (port, 2)]));

    let plain = graph.distances_to(x, &reference, 3, false);
    assert_eq!(plain, HashMap::from([(property, 2), (port, 3)]));
}

#[test]
fn test_mapped_attribute_keeps_node_on_the_path() {
    let registry = uml_registry(StrategyKind::Bounded, true, false);
    let graph = registry.graph();
    let property = node(&registry, "Property");
    let port = node(&registry, "Port");

    assert!(graph.has_mapped_attributes(property));
    assert!(!graph.is_only_begotten(property));

    let distances = graph.distances_to(node(&registry, "X"), &BTreeSet::from([property, port]), 3, true);
    assert_eq!(distances, HashMap::from([(property, 2), (port, 3)]));
}

// =============================================================================
// Weights on the UML metamodel
// =============================================================================

const SELECTED: [&str; 2] = ["X-FEATURE", "Y-FEATURE"];

#[test]
fn test_bounded_weights() {
    let registry = uml_registry(StrategyKind::Bounded, false, false);
    let weights = registry.compute_feature_weights(SELECTED, 3).unwrap();

    assert_well_formed(&registry, &SELECTED, &weights);
    let expected = ((1.0 - 3.0 / 9.0) + (1.0 - 3.0 / 9.0)) / 2.0;
    for feature in ["PSA", "PDA", "POP"] {
        assert_weight(&weights, feature, expected);
    }
}

#[test]
fn test_bounded_weights_including_selected() {
    let registry = uml_registry(StrategyKind::Bounded, false, true);
    let weights = registry.compute_feature_weights(SELECTED, 3).unwrap();

    assert_well_formed(&registry, &SELECTED, &weights);
    for feature in ["PSA", "PDA", "POP"] {
        assert_weight(&weights, feature, 1.0 - 3.0 / 13.0);
    }
}

#[test]
fn test_ancestor_weights() {
    let registry = uml_registry(StrategyKind::Ancestor, false, false);
    let weights = registry.compute_feature_weights(SELECTED, 3).unwrap();

    assert_well_formed(&registry, &SELECTED, &weights);
    for feature in ["PSA", "PDA", "POP"] {
        assert_weight(&weights, feature, 1.0 - 6.0 / 18.0);
    }
}

#[test]
fn test_ancestor_weights_including_selected() {
    let registry = uml_registry(StrategyKind::Ancestor, false, true);
    let weights = registry.compute_feature_weights(SELECTED, 3).unwrap();

    assert_well_formed(&registry, &SELECTED, &weights);
    let expected = ((1.0 - 6.0 / 23.0) + (1.0 - 7.0 / 27.0)) / 2.0;
    for feature in ["PSA", "PDA", "POP"] {
        assert_weight(&weights, feature, expected);
    }
}

#[test]
fn test_attribute_reference() {
    let mut document = uml_document();
    document
        .features
        .retain(|f| ["PSA", "PDA", "X-FEATURE"].contains(&f.name.as_str()));
    let mut registry = GraphRegistry::new(StrategyKind::Bounded.build(), true, true);
    document.apply(&mut registry).unwrap();

    let weights = registry.compute_feature_weights(["PSA"], 1).unwrap();
    assert_weight(&weights, "PSA", 1.0);
    assert_weight(&weights, "PDA", 1.0 - 2.0 / 2.0);
    assert_weight(&weights, "X-FEATURE", 0.0);

    let property = node(&registry, "Property");
    assert!(registry.create_attribute("A-ATTR", property).is_some());
    registry
        .add_feature_mapping("A-ATTR-FEATURE", property, Some("A-ATTR"))
        .unwrap();

    let weights = registry.compute_feature_weights(["PSA"], 1).unwrap();
    assert_weight(&weights, "PSA", 1.0);
    assert_weight(&weights, "PDA", 1.0 - 2.0 / 4.0);
    assert_weight(&weights, "A-ATTR-FEATURE", 1.0 - 2.0 / 4.0);
    assert_weight(&weights, "X-FEATURE", 0.0);
}

#[test]
fn test_ancestor_ignores_features_on_the_reference_node() {
    let mut document = uml_document();
    document
        .features
        .retain(|f| ["PSA", "PDA", "X-FEATURE"].contains(&f.name.as_str()));
    let mut registry = GraphRegistry::new(StrategyKind::Ancestor.build(), true, true);
    document.apply(&mut registry).unwrap();

    let weights = registry.compute_feature_weights(["PSA"], 1).unwrap();
    assert_weight(&weights, "PSA", 1.0);
    assert_weight(&weights, "PDA", 0.0);
    assert_weight(&weights, "X-FEATURE", 0.0);
}

#[test]
fn test_strategies_are_deterministic() {
    for strategy in [StrategyKind::Bounded, StrategyKind::Ancestor] {
        let first = uml_registry(strategy, true, true)
            .compute_feature_weights(SELECTED, 2)
            .unwrap();
        let second = uml_registry(strategy, true, true)
            .compute_feature_weights(["Y-FEATURE", "X-FEATURE"], 2)
            .unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_from_config() {
    let config = WeightingConfig {
        strategy: StrategyKind::Ancestor,
        max_ancestor_height: 3,
        collapse_single_child_ancestors: false,
        include_selected_as_targets: false,
    };
    let mut registry = GraphRegistry::from_config(&config);
    uml_document().apply(&mut registry).unwrap();

    assert_eq!(registry.strategy_name(), "ancestor");
    let weights = registry
        .compute_feature_weights(SELECTED, config.max_ancestor_height)
        .unwrap();
    assert_weight(&weights, "POP", 1.0 - 6.0 / 18.0);
}

// =============================================================================
// Small hierarchies
// =============================================================================

/// Root -> A -> {B, D}, B -> C; attribute x on A; F1 -> C, F2 -> (D, x)
fn scenario(strategy: StrategyKind) -> GraphRegistry<&'static str> {
    let mut registry = GraphRegistry::new(strategy.build(), true, false);
    let root = registry.get_node("Root");
    let a = registry.get_node("A");
    let b = registry.get_node("B");
    let c = registry.get_node("C");
    let d = registry.get_node("D");

    let graph = registry.graph_mut();
    graph.add_child(root, a);
    graph.add_child(a, b);
    graph.add_child(a, d);
    graph.add_child(b, c);

    registry.create_attribute("x", a).unwrap();
    registry.add_feature_mapping("F1", c, None).unwrap();
    registry.add_feature_mapping("F2", d, Some("x")).unwrap();
    registry
}

#[test]
fn test_single_target_weighs_zero() {
    for strategy in [StrategyKind::Bounded, StrategyKind::Ancestor] {
        let registry = scenario(strategy);
        let weights = registry.compute_feature_weights(["F1"], 3).unwrap();
        assert_eq!(weights["F1"], 1.0);
        assert_eq!(weights["F2"], 0.0);
    }
}

#[test]
fn test_scenario_frontier_and_distances() {
    let registry = scenario(StrategyKind::Bounded);
    let graph = registry.graph();
    let root = graph.node_index("Root").unwrap();
    let c = graph.node_index("C").unwrap();
    let d = graph.node_index("D").unwrap();

    assert_eq!(graph.extract_max_nodes_from_height(c, 3, true), BTreeSet::from([root]));
    let distances = graph.distances_to(c, &BTreeSet::from([c, d]), 3, true);
    assert_eq!(distances, HashMap::from([(c, 0), (d, 2)]));
}

/// R -> {A, B}, A -> {C, D}, B -> E
fn tree(strategy: StrategyKind) -> GraphRegistry<&'static str> {
    let mut registry = GraphRegistry::new(strategy.build(), true, false);
    let keys = ["R", "A", "B", "C", "D", "E"];
    let nodes: HashMap<&str, NodeIndex> = keys.iter().map(|&k| (k, registry.get_node(k))).collect();

    for (parent, child) in [("R", "A"), ("R", "B"), ("A", "C"), ("A", "D"), ("B", "E")] {
        registry.graph_mut().add_child(nodes[parent], nodes[child]);
    }
    for (feature, key) in [("FR", "R"), ("FA", "A"), ("FC", "C"), ("FE", "E")] {
        registry.add_feature_mapping(feature, nodes[key], None).unwrap();
    }
    registry
}

#[test]
fn test_strategies_agree_on_trees_at_height_zero() {
    let bounded = tree(StrategyKind::Bounded).compute_feature_weights(["FR"], 0).unwrap();
    let ancestor = tree(StrategyKind::Ancestor).compute_feature_weights(["FR"], 0).unwrap();

    assert_weight(&bounded, "FA", 0.75);
    assert_weight(&bounded, "FC", 0.5);
    assert_weight(&bounded, "FE", 0.75);
    assert_eq!(bounded, ancestor);
}

#[test]
fn test_ancestor_charges_the_full_height() {
    let ancestor = tree(StrategyKind::Ancestor).compute_feature_weights(["FR"], 1).unwrap();

    // Root frontier: 1 + descent for every target
    assert_weight(&ancestor, "FA", 1.0 - 2.0 / 7.0);
    assert_weight(&ancestor, "FC", 1.0 - 3.0 / 7.0);
    assert_weight(&ancestor, "FE", 1.0 - 2.0 / 7.0);
}

#[test]
fn test_descent_skips_single_child_frontier() {
    // Root -> A -> {B, D}, B -> C, D -> {E, G}
    let mut registry: GraphRegistry<&str> = GraphRegistry::new(StrategyKind::Ancestor.build(), true, false);
    let keys = ["Root", "A", "B", "C", "D", "E", "G"];
    let nodes: HashMap<&str, NodeIndex> = keys.iter().map(|&k| (k, registry.get_node(k))).collect();

    for (parent, child) in [("Root", "A"), ("A", "B"), ("A", "D"), ("B", "C"), ("D", "E"), ("D", "G")] {
        registry.graph_mut().add_child(nodes[parent], nodes[child]);
    }
    for (feature, key) in [("F1", "C"), ("F2", "D"), ("F3", "B"), ("F4", "E")] {
        registry.add_feature_mapping(feature, nodes[key], None).unwrap();
    }

    let graph = registry.graph();
    let descents = graph.bfs_descendant_distances(nodes["Root"], &BTreeSet::from([nodes["B"], nodes["D"], nodes["E"]]), true);
    assert_eq!(
        descents,
        HashMap::from([(nodes["B"], 1), (nodes["D"], 1), (nodes["E"], 2)])
    );

    // Height 3 plus the descents: 4, 4 and 5
    let weights = registry.compute_feature_weights(["F1"], 3).unwrap();
    assert_weight(&weights, "F1", 1.0);
    assert_weight(&weights, "F2", 1.0 - 4.0 / 13.0);
    assert_weight(&weights, "F3", 1.0 - 4.0 / 13.0);
    assert_weight(&weights, "F4", 1.0 - 5.0 / 13.0);
}

#[test]
fn test_unknown_selected_feature() {
    let registry = tree(StrategyKind::Bounded);
    let result = registry.compute_feature_weights(["FR", "MISSING"], 2);
    assert!(matches!(result, Err(WeightingError::UnknownFeature(ref f)) if f == "MISSING"));
}

#[test]
fn test_graph_unchanged_by_weighting() {
    let registry = uml_registry(StrategyKind::Ancestor, true, true);
    let nodes = registry.graph().node_count();
    let edges = registry.graph().edge_count();

    registry.compute_feature_weights(SELECTED, 3).unwrap();
    registry.compute_feature_weights(["POP"], 1).unwrap();

    assert_eq!(registry.graph().node_count(), nodes);
    assert_eq!(registry.graph().edge_count(), edges);
    assert_eq!(registry.feature_count(), 5);
}

#[test]
fn test_zero_distance_sum_keeps_raw_distance() {
    // Both features share one node: the only distance is 0
    let mut registry: GraphRegistry<&str> = GraphRegistry::new(StrategyKind::Bounded.build(), true, false);
    let a = registry.get_node("A");
    registry.add_feature_mapping("FA", a, None).unwrap();
    registry.add_feature_mapping("FB", a, None).unwrap();

    let weights = registry.compute_feature_weights(["FA"], 2).unwrap();
    assert_eq!(weights["FA"], 1.0);
    assert_eq!(weights["FB"], 0.0);
}
