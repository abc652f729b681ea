//! Property occurrence statistics and significance weights.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Property name → significance weight in [0, 1].
///
/// A property missing from the mapping uses its default (frequency derived)
/// weight.
pub type PropertyWeights = HashMap<String, f32>;

/// Property name → total number of occurrences in the dataset.
pub type PropertyOccurrences = HashMap<String, u64>;

/// A property together with its total occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyOccurrence {
    property: String,
    occurrences: u64,
}

impl PropertyOccurrence {
    /// Fails for an empty property name or a zero occurrence count.
    pub fn new(property: impl Into<String>, occurrences: u64) -> Result<Self> {
        let property = property.into();
        if property.is_empty() || occurrences == 0 {
            return Err(Error::InvalidArgument(format!(
                "property should be named and have positive occurrences: '{property}', {occurrences}"
            )));
        }
        Ok(Self { property, occurrences })
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn occurrences(&self) -> u64 {
        self.occurrences
    }

    /// The default significance: the rarer the property, the higher its weight.
    pub fn default_weight(&self) -> f32 {
        (1.0 / self.occurrences as f64).sqrt() as f32
    }
}
