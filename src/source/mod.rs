//! # Similarity Source Trait
//!
//! The contract between the inference/graph pipeline and whatever holds the
//! instance data: RDF ingestion, the property-weighted similarity formula
//! and the supervised weight learner all live behind it.
//!
//! ## Implementations
//!
//! | Source         | Module   | Description                                  |
//! |----------------|----------|----------------------------------------------|
//! | `MemorySource` | `memory` | Explicit similarity matrix for tests/embedding |

pub mod memory;

use std::path::Path;

use crate::model::{InstanceId, PropertyOccurrences, PropertyWeights};
use crate::Result;

pub use memory::MemorySource;

/// Instance data with a symmetric pairwise similarity.
///
/// `similarity(a, b, _) == similarity(b, a, _)` is assumed: the graph
/// builder evaluates every unordered pair once.
pub trait SimilaritySource {
    // ========================================================================
    // Instances
    // ========================================================================

    /// All instances in a fixed, repeatable order.
    fn instances(&self) -> &[String];

    /// Numeric id of an instance; negative for filtered out (untyped) ones.
    fn instance_id(&self, instance: &str) -> Result<InstanceId>;

    /// Similarity of two instances, `>= 0`; `0` means unrelated.
    fn similarity(&self, a: &str, b: &str, jaccard: bool) -> f32;

    // ========================================================================
    // Property weights
    // ========================================================================

    /// Install the significance weights the similarity is evaluated with.
    fn set_property_weights(&mut self, weights: PropertyWeights);

    // ========================================================================
    // Datasets
    // ========================================================================

    /// Load the input dataset and return its property occurrences.
    ///
    /// `filter_untyped` marks instances without a type by negating their
    /// ids; `id_map` optionally receives the id → instance name mapping.
    fn load_input_data(
        &mut self,
        path: &Path,
        filter_untyped: bool,
        id_map: Option<&Path>,
    ) -> Result<PropertyOccurrences>;

    /// Learn weights of the `targets` properties from a labeled dataset.
    ///
    /// `dirty` input may contain duplicated triples to be eliminated.
    fn load_gt_data(
        &mut self,
        path: &Path,
        targets: &PropertyOccurrences,
        dirty: bool,
    ) -> Result<PropertyWeights>;
}
