//! # Data Model
//!
//! Plain DTOs shared by every stage of the pipeline: property statistics
//! and weights on the inference side, instances, links and the weighted
//! graph on the clustering side.
//!
//! Design rule: this module is pure data: no I/O and no logging.

pub mod instance;
pub mod property;
pub mod graph;

pub use instance::{InstanceId, Link, LinkSet};
pub use property::{PropertyOccurrence, PropertyOccurrences, PropertyWeights};
pub use graph::Graph;
