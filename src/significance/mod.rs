//! # Property Significance Inference
//!
//! Turns the property occurrence statistics of a dataset into significance
//! weights for the similarity source.
//!
//! ```text
//! occurrences ─▶ default_weights (sqrt(1/ocrs))
//!                   │
//!                   ├─ HintSpec::File        → overlay loaded hints
//!                   ├─ HintSpec::Interactive → heavy tail? → elicit head
//!                   └─ HintSpec::Supervised  → heavy tail? → learn head, save
//!                   ▼
//!               Inference { weights, applied_hints, split }
//! ```

pub mod heavy_tail;

use std::path::Path;

use crate::hints::{self, elicit::DEFAULT_MARKS, HintSpec, Prompter};
use crate::model::{PropertyOccurrence, PropertyOccurrences, PropertyWeights};
use crate::source::SimilaritySource;
use crate::{Error, Result};

pub use heavy_tail::{rank, split_head, HeadSplit, MASS_POWER};

/// Outcome of the significance inference.
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
    /// Final weights: defaults overlaid with hint-derived weights.
    pub weights: PropertyWeights,
    /// Number of hint-derived weights applied.
    pub applied_hints: usize,
    /// Head/tail split when heavy-tail detection ran.
    pub split: Option<HeadSplit>,
}

/// Frequency based weights: the rarer a property, the higher its weight.
pub fn default_weights(occurrences: &PropertyOccurrences) -> Result<PropertyWeights> {
    occurrences
        .iter()
        .map(|(prop, &ocrs)| {
            let p = PropertyOccurrence::new(prop.as_str(), ocrs)?;
            Ok((prop.clone(), p.default_weight()))
        })
        .collect()
}

/// Infer property weights for `dataset` from its `occurrences`.
///
/// `prompter` is required only for [`HintSpec::Interactive`].
pub fn infer<S: SimilaritySource + ?Sized>(
    source: &mut S,
    occurrences: &PropertyOccurrences,
    dataset: &Path,
    hints: Option<&HintSpec>,
    dirty: bool,
    prompter: Option<&mut dyn Prompter>,
) -> Result<Inference> {
    if occurrences.is_empty() {
        return Err(Error::EmptyDataset(dataset.display().to_string()));
    }
    let mut weights = default_weights(occurrences)?;

    let Some(spec) = hints else {
        return Ok(Inference { weights, applied_hints: 0, split: None });
    };

    let mut split = None;
    let applied_hints = match spec {
        HintSpec::File(path) => hints::load(path, &mut weights)?,
        HintSpec::Interactive | HintSpec::Supervised { .. } => {
            let ranked = rank(occurrences)?;
            let hs = split_head(&ranked);
            split = Some(hs);
            tracing::info!(
                head = hs.head_len,
                tail_start = hs.tail_start,
                properties = hs.properties,
                head_mass = hs.head_mass,
                tail_mass = hs.tail_mass,
                head_max = hs.head_max,
                "property ranking split"
            );
            let head = hs.head(&ranked);
            tracing::debug!(
                weights = ?head.iter().map(PropertyOccurrence::default_weight).collect::<Vec<_>>(),
                "head property default weights"
            );

            if !hs.is_heavy_tailed() {
                tracing::warn!(
                    dataset = %dataset.display(),
                    "brief hints are omitted: the property weights distribution is not heavy tailed"
                );
                0
            } else if let HintSpec::Supervised { granularity } = spec {
                supervise(source, head, dataset, *granularity, dirty, &mut weights)?
            } else {
                let prompter = prompter.ok_or(Error::ConsoleUnavailable)?;
                let names: Vec<String> = head.iter().map(|p| p.property().to_string()).collect();
                hints::elicit(prompter, &names, DEFAULT_MARKS, dataset, &mut weights)?.evaluated
            }
        }
    };
    tracing::info!(applied_hints, "brief hints applied");

    Ok(Inference { weights, applied_hints, split })
}

/// Learn weights of the `head` properties from the labeled `dataset`, save
/// them as hints and merge them into `weights`.
fn supervise<S: SimilaritySource + ?Sized>(
    source: &mut S,
    head: &[PropertyOccurrence],
    dataset: &Path,
    granularity: Option<u32>,
    dirty: bool,
    weights: &mut PropertyWeights,
) -> Result<usize> {
    let targets: PropertyOccurrences = head
        .iter()
        .map(|p| (p.property().to_string(), p.occurrences()))
        .collect();
    let mut learned = source.load_gt_data(dataset, &targets, dirty)?;
    learned.retain(|prop, _| targets.contains_key(prop));

    let path = hints::hints_path(dataset, granularity);
    hints::save(&mut learned, granularity.unwrap_or(0), &path)?;
    let applied = learned.len();
    weights.extend(learned);
    Ok(applied)
}
