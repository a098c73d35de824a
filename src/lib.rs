//! Ontology Feature Weights
//!
//! Weights the features of a recommender system by their semantic distance in
//! an ontology. Concepts form a DAG of parent/child links; features map to
//! concepts or to attributes visible on them. Given a set of selected
//! features, every registered feature receives a weight in [0, 1], with the
//! selected features pinned to 1.0.
//!
//! ## Strategies
//!
//! - **bounded**: undirected shortest paths inside the subgraph hanging from
//!   the ancestors reached within a maximum height
//! - **ancestor**: climb to those ancestors, then descend; the climb is
//!   charged the full height
//!
//! ## Example
//!
//! ```
//! use ontology_weights::{GraphRegistry, StrategyKind};
//!
//! let mut registry: GraphRegistry<&str> = GraphRegistry::new(StrategyKind::Bounded.build(), true, false);
//! let root = registry.get_node("Root");
//! let a = registry.get_node("A");
//! let b = registry.get_node("B");
//! registry.graph_mut().add_child(root, a);
//! registry.graph_mut().add_child(root, b);
//!
//! registry.add_feature_mapping("FA", a, None).unwrap();
//! registry.add_feature_mapping("FB", b, None).unwrap();
//!
//! let weights = registry.compute_feature_weights(["FA"], 1).unwrap();
//! assert_eq!(weights["FA"], 1.0);
//! assert_eq!(weights["FB"], 0.0);
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod graph;
pub mod mapping;
pub mod registry;
pub mod weighting;

pub use config::{EngineConfig, LoggingConfig, WeightingConfig};
pub use document::{ApplySummary, OntologyDocument};
pub use error::{Result, WeightingError};
pub use graph::{AttributeId, NodeAttribute, NodeKey, NodePath, OntologyGraph};
pub use mapping::FeatureMapping;
pub use registry::GraphRegistry;
pub use weighting::{
    AncestorDescentWeighting, BoundedSearchWeighting, FeatureWeights, StrategyKind, WeightingStrategy,
};
