//! Pipeline configuration.
//!
//! A run is fully described by a [`PipelineConfig`], usually read from JSON:
//!
//! ```json
//! {
//!   "dataset": "data/people.nt",
//!   "hints": "--",
//!   "net": { "weigh_nodes": true, "link_cut": 0.5 },
//!   "cluster": { "scale": 1.0, "reduction": "severe" }
//! }
//! ```
//!
//! Missing fields take their defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cluster::ClusterOptions;
use crate::hints::{update_file_extension, HintSpec, EXT_CLUSTERS};
use crate::network::NetOptions;
use crate::{Error, Result};

/// Dataset loading and significance inference options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    pub hints: Option<HintSpec>,
    /// Negate the ids of untyped instances.
    pub filter_untyped: bool,
    /// Where to write the instance id → name mapping.
    pub id_map: Option<PathBuf>,
    /// The input may contain duplicated triples.
    pub dirty: bool,
}

/// Configuration of a whole type inference run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Input RDF dataset.
    pub dataset: PathBuf,
    /// Hints specifier: a hints file, `--` (interactive), `-` or `-<g>`
    /// (supervised with granularity `g`).
    pub hints: Option<String>,
    pub filter_untyped: bool,
    pub id_map: Option<PathBuf>,
    pub dirty: bool,
    pub net: NetOptions,
    pub cluster: ClusterOptions,
    /// Clusters output, `<dataset>.cnl` by default.
    pub output: Option<PathBuf>,
    /// Also save the network (`.rcg`) to this path before clustering.
    pub network: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dataset.as_os_str().is_empty() {
            return Err(Error::Config("the input dataset is not specified".into()));
        }
        self.hint_spec()?;
        self.net.validate()?;
        self.cluster.validate()?;
        Ok(())
    }

    pub fn hint_spec(&self) -> Result<Option<HintSpec>> {
        self.hints.as_deref().map(str::parse).transpose()
    }

    pub fn load_options(&self) -> Result<LoadOptions> {
        Ok(LoadOptions {
            hints: self.hint_spec()?,
            filter_untyped: self.filter_untyped,
            id_map: self.id_map.clone(),
            dirty: self.dirty,
        })
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| update_file_extension(&self.dataset, EXT_CLUSTERS))
    }
}
