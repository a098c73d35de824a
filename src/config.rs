//! Configuration management for the weighting engine
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (ontology-weights.toml)
//! - Environment variables (ONTOLOGY_WEIGHTS__*)
//!
//! ## Example config file (ontology-weights.toml):
//! ```toml
//! [weighting]
//! strategy = "ancestor"
//! max_ancestor_height = 3
//! collapse_single_child_ancestors = true
//! include_selected_as_targets = false
//!
//! [logging]
//! filter = "ontology_weights=debug"
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::weighting::StrategyKind;

/// Main configuration for the weighting engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Weighting settings
    #[serde(default)]
    pub weighting: WeightingConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Weighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightingConfig {
    /// Distance policy
    #[serde(default)]
    pub strategy: StrategyKind,

    /// How many ancestor levels the search may climb
    #[serde(default = "default_max_ancestor_height")]
    pub max_ancestor_height: usize,

    /// Skip single-child ancestors when climbing and counting
    #[serde(default = "default_true")]
    pub collapse_single_child_ancestors: bool,

    /// Let selected features be weighted against each other
    #[serde(default)]
    pub include_selected_as_targets: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// tracing filter used when RUST_LOG is unset
    #[serde(default = "default_filter")]
    pub filter: String,
}

// Default value functions
fn default_max_ancestor_height() -> usize {
    3
}

fn default_true() -> bool {
    true
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for WeightingConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            max_ancestor_height: default_max_ancestor_height(),
            collapse_single_child_ancestors: true,
            include_selected_as_targets: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, layering a specific file over the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = [
            "ontology-weights.toml",
            ".ontology-weights.toml",
            "config/ontology-weights.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "ontorec", "ontology-weights") {
            let xdg_config = config_dir.config_dir().join("ontology-weights.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // ONTOLOGY_WEIGHTS__WEIGHTING__MAX_ANCESTOR_HEIGHT=2
        builder = builder.add_source(
            Environment::with_prefix("ONTOLOGY_WEIGHTS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
