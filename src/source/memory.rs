//! In-memory similarity source.
//!
//! This is the reference implementation of `SimilaritySource`. Instances,
//! pairwise similarities, property occurrences and the "learned" weights of
//! the supervised path are all given up front.
//!
//! ## Limitations
//!
//! - **No dataset parsing**: `load_input_data()` returns the configured
//!   occurrences whatever the path; `load_gt_data()` returns the configured
//!   learned weights of the requested properties.
//! - **One matrix for both measures**: the `jaccard` flag is ignored.
//! - **Installed weights are recorded, not applied**: similarities are
//!   fixed, `property_weights()` exposes what the pipeline installed.
//!
//! Use this source for:
//! - Testing the inference and graph construction pipeline
//! - Embedding with a precomputed similarity matrix

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use hashbrown::{HashMap, HashSet};

use crate::model::{InstanceId, PropertyOccurrences, PropertyWeights};
use crate::{Error, Result};
use super::SimilaritySource;

/// Similarity source over an explicit symmetric matrix.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    instances: Vec<String>,
    index: HashMap<String, usize>,
    ids: Vec<i32>,
    untyped: HashSet<usize>,
    filtering: bool,
    /// `(min index, max index)` → similarity
    matrix: HashMap<(usize, usize), f32>,
    occurrences: PropertyOccurrences,
    learned: PropertyWeights,
    weights: PropertyWeights,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an instance; enumeration follows insertion order.
    pub fn with_instance(mut self, name: impl Into<String>, id: i32) -> Self {
        let name = name.into();
        if let Some(&i) = self.index.get(&name) {
            self.ids[i] = id;
            return self;
        }
        self.index.insert(name.clone(), self.instances.len());
        self.instances.push(name);
        self.ids.push(id);
        self
    }

    /// Set the similarity of a pair (both orders). Unknown instances are
    /// appended with their insertion position as id.
    pub fn with_similarity(mut self, a: &str, b: &str, weight: f32) -> Self {
        let ia = self.ensure(a);
        let ib = self.ensure(b);
        self.matrix.insert((ia.min(ib), ia.max(ib)), weight);
        self
    }

    /// Mark an instance as untyped: its id is negated when the input data
    /// is loaded with filtering.
    pub fn with_untyped(mut self, name: &str) -> Self {
        let i = self.ensure(name);
        self.untyped.insert(i);
        self
    }

    pub fn with_occurrences(mut self, property: impl Into<String>, occurrences: u64) -> Self {
        self.occurrences.insert(property.into(), occurrences);
        self
    }

    /// Weight returned for `property` by the supervised learner.
    pub fn with_learned_weight(mut self, property: impl Into<String>, weight: f32) -> Self {
        self.learned.insert(property.into(), weight);
        self
    }

    /// Weights installed by the pipeline.
    pub fn property_weights(&self) -> &PropertyWeights {
        &self.weights
    }

    fn ensure(&mut self, name: &str) -> usize {
        if let Some(&i) = self.index.get(name) {
            return i;
        }
        let i = self.instances.len();
        self.index.insert(name.to_string(), i);
        self.instances.push(name.to_string());
        self.ids.push(i as i32);
        i
    }

    fn write_id_map(&self, path: &Path) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        for name in &self.instances {
            writeln!(out, "{}\t{}", self.instance_id(name)?.as_unsigned(), name)?;
        }
        out.flush()?;
        Ok(())
    }
}

impl SimilaritySource for MemorySource {
    fn instances(&self) -> &[String] {
        &self.instances
    }

    fn instance_id(&self, instance: &str) -> Result<InstanceId> {
        let i = *self
            .index
            .get(instance)
            .ok_or_else(|| Error::Source(format!("unknown instance: {instance}")))?;
        let id = self.ids[i];
        if !(self.filtering && self.untyped.contains(&i)) || id < 0 {
            return Ok(InstanceId(id));
        }
        // Zero has no negative counterpart to mark it with
        match id.checked_neg().filter(|neg| *neg < 0) {
            Some(neg) => Ok(InstanceId(neg)),
            None => Err(Error::Source(format!("untyped instance cannot be marked, id {id}: {instance}"))),
        }
    }

    fn similarity(&self, a: &str, b: &str, _jaccard: bool) -> f32 {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&ia), Some(&ib)) => self.matrix.get(&(ia.min(ib), ia.max(ib))).copied().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    fn set_property_weights(&mut self, weights: PropertyWeights) {
        self.weights = weights;
    }

    fn load_input_data(
        &mut self,
        _path: &Path,
        filter_untyped: bool,
        id_map: Option<&Path>,
    ) -> Result<PropertyOccurrences> {
        self.filtering = filter_untyped;
        if let Some(path) = id_map {
            self.write_id_map(path)?;
        }
        Ok(self.occurrences.clone())
    }

    fn load_gt_data(
        &mut self,
        _path: &Path,
        targets: &PropertyOccurrences,
        _dirty: bool,
    ) -> Result<PropertyWeights> {
        Ok(self
            .learned
            .iter()
            .filter(|(prop, _)| targets.contains_key(*prop))
            .map(|(prop, w)| (prop.clone(), *w))
            .collect())
    }
}
