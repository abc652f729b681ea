//! # statix: Statistical Type Inference over RDF Instances
//!
//! Infers semantic type clusters of RDF instances in two steps:
//!
//! 1. **Property significance**: every property gets a weight telling how
//!    indicative it is of type membership, from its frequency and, when the
//!    frequency distribution is heavy tailed, from operator or supervised
//!    hints.
//! 2. **Similarity graph**: all instance pairs are compared with the
//!    property-weighted similarity, optionally sparsified, and the weighted
//!    graph is handed to a hierarchical clustering engine.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `SimilaritySource` is the contract with the instance
//!    data, `ClusterEngine` with the clustering
//! 2. **One traversal**: in-memory graph and network file share the pairwise
//!    pass behind `LinkSink`
//! 3. **Explicit state**: property weights flow as values between stages
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use statix::{LoadOptions, MemorySource, NetOptions, Statix};
//!
//! # fn example() -> statix::Result<()> {
//! let source = MemorySource::new()
//!     .with_occurrences("<name>", 120)
//!     .with_similarity("alice", "bob", 0.4);
//! let mut statix = Statix::with_source(source);
//!
//! statix.load_dataset(Path::new("people.nt"), &LoadOptions::default(), None)?;
//! let graph = statix.build_graph(&NetOptions::default())?;
//! assert_eq!(graph.node_count(), 2);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod quantize;
pub mod hints;
pub mod significance;
pub mod source;
pub mod network;
pub mod cluster;
pub mod config;

use std::path::Path;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{
    Graph, InstanceId, Link, LinkSet,
    PropertyOccurrence, PropertyOccurrences, PropertyWeights,
};
pub use hints::{HintSpec, Prompter, SaveSummary, StreamPrompter};
pub use significance::{HeadSplit, Inference};
pub use source::{MemorySource, SimilaritySource};
pub use network::{BuildStats, GraphSink, LinkSink, NetOptions, NetWriter};
pub use cluster::{ClusterEngine, ClusterOptions, Reduction};
pub use config::{LoadOptions, PipelineConfig};

// ============================================================================
// Top-level pipeline handle
// ============================================================================

/// The primary entry point. `Statix` owns a similarity source and runs the
/// inference and graph construction stages over it.
pub struct Statix<S: SimilaritySource> {
    source: S,
}

impl<S: SimilaritySource> Statix<S> {
    pub fn with_source(source: S) -> Self {
        Self { source }
    }

    /// Load the input dataset, infer the property weights and install them
    /// in the source.
    ///
    /// `prompter` is only needed for interactive hints.
    pub fn load_dataset(
        &mut self,
        dataset: &Path,
        options: &LoadOptions,
        prompter: Option<&mut dyn Prompter>,
    ) -> Result<Inference> {
        let occurrences = self
            .source
            .load_input_data(dataset, options.filter_untyped, options.id_map.as_deref())?;
        if occurrences.is_empty() {
            tracing::warn!(dataset = %dataset.display(), "there are no properties to be processed in the input dataset");
            return Err(Error::EmptyDataset(dataset.display().to_string()));
        }

        let inference = significance::infer(
            &mut self.source,
            &occurrences,
            dataset,
            options.hints.as_ref(),
            options.dirty,
            prompter,
        )?;
        self.source.set_property_weights(inference.weights.clone());
        Ok(inference)
    }

    /// Load the input dataset and weigh all its properties by the labeled
    /// dataset (no heavy-tail check, no hints file).
    pub fn load_datasets(&mut self, input: &Path, labeled: &Path, options: &LoadOptions) -> Result<PropertyWeights> {
        let occurrences = self
            .source
            .load_input_data(input, options.filter_untyped, options.id_map.as_deref())?;
        if occurrences.is_empty() {
            return Err(Error::EmptyDataset(input.display().to_string()));
        }
        let mut weights = significance::default_weights(&occurrences)?;
        let learned = self.source.load_gt_data(labeled, &occurrences, options.dirty)?;
        tracing::info!(learned = learned.len(), properties = occurrences.len(), "supervised property weights");
        weights.extend(learned);
        self.source.set_property_weights(weights.clone());
        Ok(weights)
    }

    /// Build the in-memory input graph.
    pub fn build_graph(&self, options: &NetOptions) -> Result<Graph> {
        network::build_graph(&self.source, options)
    }

    /// Save the clustering input network to `path`.
    pub fn save_net(&self, path: &Path, options: &NetOptions) -> Result<()> {
        network::save_net(&self.source, options, path)
    }

    /// Build the graph, release the source, then run the clustering engine.
    pub fn cluster<E: ClusterEngine + ?Sized>(
        self,
        engine: &mut E,
        net: &NetOptions,
        options: &ClusterOptions,
        output: &Path,
    ) -> Result<()> {
        options.validate()?;
        let graph = self.build_graph(net)?;
        // The similarity source is not needed by the clustering and may be large
        drop(self.source);
        tracing::info!(output = %output.display(), nodes = graph.node_count(), "starting the hierarchy building");
        engine.cluster(graph, options, output)?;
        tracing::info!(output = %output.display(), "the types inference is completed");
        Ok(())
    }

    /// Run the whole pipeline described by `config`.
    pub fn run<E: ClusterEngine + ?Sized>(
        mut self,
        config: &PipelineConfig,
        engine: &mut E,
        prompter: Option<&mut dyn Prompter>,
    ) -> Result<Inference> {
        config.validate()?;
        let inference = self.load_dataset(&config.dataset, &config.load_options()?, prompter)?;
        if let Some(network) = &config.network {
            self.save_net(network, &config.net)?;
        }
        self.cluster(engine, &config.net, &config.cluster, &config.output_path())?;
        Ok(inference)
    }

    /// Access the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("No properties to be processed in the input dataset: {0}")]
    EmptyDataset(String),

    #[error("Interactive console is not available")]
    ConsoleUnavailable,

    #[error("Similarity source error: {0}")]
    Source(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
