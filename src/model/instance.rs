//! Instances and the weighted links between them.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Opaque instance identifier assigned by the similarity source.
///
/// Negative ids mark instances excluded by untyped-instance filtering.
/// The network file prints ids as their unsigned 32-bit reinterpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub i32);

impl InstanceId {
    /// The id as written to the network file.
    pub fn as_unsigned(self) -> u32 {
        self.0 as u32
    }

    pub fn is_filtered(self) -> bool {
        self.0 < 0
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A weighted link from some source instance to `target`.
///
/// The weight is always positive: a zero similarity means "no link" and is
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub target: InstanceId,
    pub weight: f32,
}

impl Link {
    pub fn new(target: InstanceId, weight: f32) -> Self {
        Self { target, weight }
    }
}

/// Candidate links of one source instance.
///
/// Rebuilt for every source, so it is cleared and reused rather than kept.
pub type LinkSet = SmallVec<[Link; 32]>;
