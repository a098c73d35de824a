//! Error types for the weighting engine

use thiserror::Error;

/// Result type for graph and weighting operations
pub type Result<T> = std::result::Result<T, WeightingError>;

/// Ontology graph and weighting errors
#[derive(Error, Debug)]
pub enum WeightingError {
    #[error("Node {node} does not contain the attribute '{attribute}'")]
    MissingAttribute { node: String, attribute: String },

    #[error("Feature not registered: {0}")]
    UnknownFeature(String),

    #[error("Node not declared: {0}")]
    UnknownNode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}
