//! Ontology Weights CLI
//!
//! Computes feature weights for an ontology document, exports its graph to
//! DOT, or prints the effective configuration.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use ontology_weights::{EngineConfig, GraphRegistry, OntologyDocument, StrategyKind};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ontology-weights")]
#[command(about = "Weight recommender features by their distance in an ontology")]
struct Cli {
    /// Configuration file layered over the default locations
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the weight of every feature against the selected ones
    Weigh {
        /// Ontology document (JSON)
        #[arg(short, long)]
        ontology: PathBuf,

        /// Selected feature, repeat for several
        #[arg(short, long = "select", required = true)]
        select: Vec<String>,

        /// Maximum ancestor height (overrides the configuration)
        #[arg(long)]
        height: Option<usize>,

        /// bounded or ancestor (overrides the configuration)
        #[arg(long)]
        strategy: Option<StrategyKind>,

        /// Weigh selected features against each other
        #[arg(long)]
        include_selected: bool,

        /// Do not collapse single-child ancestors
        #[arg(long)]
        no_collapse: bool,
    },

    /// Export the ontology graph to DOT
    Dot {
        /// Ontology document (JSON)
        #[arg(short, long)]
        ontology: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short = 'O', long)]
        output: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config {
        /// Write it to this file instead
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match EngineConfig::load_from(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli.command, config) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands, mut config: EngineConfig) -> anyhow::Result<()> {
    match command {
        Commands::Weigh {
            ontology,
            select,
            height,
            strategy,
            include_selected,
            no_collapse,
        } => {
            if let Some(strategy) = strategy {
                config.weighting.strategy = strategy;
            }
            if let Some(height) = height {
                config.weighting.max_ancestor_height = height;
            }
            if include_selected {
                config.weighting.include_selected_as_targets = true;
            }
            if no_collapse {
                config.weighting.collapse_single_child_ancestors = false;
            }

            let mut registry = GraphRegistry::from_config(&config.weighting);
            load_document(&ontology, &mut registry)?;

            let weights = registry
                .compute_feature_weights(select, config.weighting.max_ancestor_height)
                .context("weighting failed")?;

            println!("{}", serde_json::to_string_pretty(&weights)?);
        }

        Commands::Dot { ontology, output } => {
            let mut registry = GraphRegistry::from_config(&config.weighting);
            load_document(&ontology, &mut registry)?;

            let dot = registry.graph().to_dot();
            match output {
                Some(path) => {
                    std::fs::write(&path, dot).with_context(|| format!("writing {:?}", path))?;
                    info!("Exported DOT to {:?}", path);
                }
                None => print!("{}", dot),
            }
        }

        Commands::Config { save } => match save {
            Some(path) => {
                config.save(&path).with_context(|| format!("writing {:?}", path))?;
                info!("Saved configuration to {:?}", path);
            }
            None => print!("{}", toml::to_string_pretty(&config)?),
        },
    }

    Ok(())
}

fn load_document(path: &Path, registry: &mut GraphRegistry<String>) -> anyhow::Result<()> {
    let document = OntologyDocument::from_path(path).with_context(|| format!("reading {:?}", path))?;
    let summary = document.apply(registry)?;

    if !summary.refused_attributes.is_empty() {
        bail!(
            "{} attribute(s) collide with their hierarchy: {:?}",
            summary.refused_attributes.len(),
            summary.refused_attributes
        );
    }

    info!(
        "Loaded {:?}: {} nodes, {} edges, {} features",
        path, summary.nodes, summary.edges, summary.features
    );
    Ok(())
}
