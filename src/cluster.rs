//! Clustering engine contract.
//!
//! The hierarchical (overlapping) clustering itself is external; this module
//! only defines what the pipeline hands over: the completed [`Graph`] and
//! the options encoded the way the engine expects them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::Graph;
use crate::{Error, Result};

/// Output format flag: simple format, root level only.
pub const OUTPUT_ROOT: u16 = 0x41;
/// Output format flag: simple format, significant clusters of all levels.
pub const OUTPUT_SIGNIFICANT: u16 = 0x49;
/// Reduction flag: rank links by weight rather than by the optimization
/// function.
pub const REDUCE_BY_WEIGHT: u16 = 0x80;

/// Link reduction policy of the hierarchy building.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reduction {
    None,
    Accurate,
    #[default]
    Mean,
    Severe,
}

impl Reduction {
    /// Parse the one-letter policy code (`a`, `m`, `s`); anything else is
    /// no reduction.
    pub fn from_code(code: char) -> Self {
        match code {
            'a' => Reduction::Accurate,
            'm' => Reduction::Mean,
            's' => Reduction::Severe,
            _ => Reduction::None,
        }
    }

    pub fn mask(self) -> u16 {
        match self {
            Reduction::None => 0x0,
            Reduction::Accurate => 0x1,
            Reduction::Mean => 0x2,
            Reduction::Severe => 0x3,
        }
    }
}

/// Parameters of the hierarchy building and its output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterOptions {
    /// Resolution (gamma) of the clustering.
    pub scale: f32,
    /// Output clusters of all significant levels instead of the root only.
    pub multi_level: bool,
    pub reduction: Reduction,
    pub reduce_by_weight: bool,
    /// Drop filtered (untyped) instances from the output.
    pub filter_members: bool,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            multi_level: true,
            reduction: Reduction::default(),
            reduce_by_weight: false,
            filter_members: false,
        }
    }
}

impl ClusterOptions {
    pub fn validate(&self) -> Result<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(Error::InvalidArgument(format!("the clustering scale should be positive: {}", self.scale)));
        }
        Ok(())
    }

    /// Reduction policy with the by-weight criterion bit.
    pub fn reduction_mask(&self) -> u16 {
        let mask = self.reduction.mask();
        if self.reduce_by_weight { mask | REDUCE_BY_WEIGHT } else { mask }
    }

    pub fn output_flags(&self) -> u16 {
        if self.multi_level { OUTPUT_SIGNIFICANT } else { OUTPUT_ROOT }
    }
}

/// External hierarchical clustering engine.
pub trait ClusterEngine {
    /// Build the cluster hierarchy of `graph` and persist it to `output`.
    fn cluster(&mut self, graph: Graph, options: &ClusterOptions, output: &Path) -> Result<()>;
}
