//! # Property Hints
//!
//! Hints are persisted property significance weights, supplied by an
//! operator ([`elicit`]) or by a supervised learner, that override the
//! default frequency-derived weights.
//!
//! ## File format
//!
//! ```text
//! #/ Properties: 2
//! 0.875	<http://xmlns.com/foaf/0.1/name>
//! 0.125	<http://www.w3.org/2000/01/rdf-schema#label>
//! ```
//!
//! The header counts the persisted entries. Lines whose first field starts
//! with `#` are comments. Weights are quantized on save (see
//! [`crate::quantize`]); a weight whose rounding error would exceed the
//! weight itself is omitted from the file instead, so it keeps its default
//! on reload.

pub mod elicit;

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::PropertyWeights;
use crate::quantize;
use crate::{Error, Result};

pub use elicit::{elicit, Answer, Elicitation, Prompter, StreamPrompter};

/// Default extension of the hints file (indicativity of a property per line).
pub const EXT_HINTS: &str = ".ipl";
/// Default extension of the inferred clusters (types) file.
pub const EXT_CLUSTERS: &str = ".cnl";
/// Default extension of the network (clustering input) file.
pub const EXT_NETWORK: &str = ".rcg";

const COMMENT_MARK: char = '#';
const HEADER_PREFIX: &str = "#/ Properties: ";

// ============================================================================
// Hint specifier
// ============================================================================

/// How property hints are obtained for a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HintSpec {
    /// Load hints from an existing file (`<path>`).
    File(PathBuf),
    /// Ask an operator about the head properties (`--`).
    Interactive,
    /// Learn head property weights from the labeled dataset (`-` or `-<g>`).
    ///
    /// `None` (`-`) saves unrounded weights to `<stem>.ipl`; `Some(g)` saves
    /// them to `<stem>_<g>.ipl` with granularity `g`, `0` meaning no rounding.
    Supervised { granularity: Option<u32> },
}

impl FromStr for HintSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::InvalidArgument("empty hints specifier".into()));
        }
        let Some(opts) = s.strip_prefix('-') else {
            return Ok(HintSpec::File(PathBuf::from(s)));
        };
        if opts == "-" {
            return Ok(HintSpec::Interactive);
        }
        if opts.is_empty() {
            return Ok(HintSpec::Supervised { granularity: None });
        }
        let granularity = opts.parse::<u32>().map_err(|_| {
            Error::InvalidArgument(format!("invalid granularity in the hints specifier: '{s}'"))
        })?;
        if granularity == 1 {
            return Err(Error::InvalidArgument(format!(
                "the granularity of marks is too small: {granularity}"
            )));
        }
        Ok(HintSpec::Supervised { granularity: Some(granularity) })
    }
}

impl std::fmt::Display for HintSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HintSpec::File(path) => write!(f, "{}", path.display()),
            HintSpec::Interactive => write!(f, "--"),
            HintSpec::Supervised { granularity: None } => write!(f, "-"),
            HintSpec::Supervised { granularity: Some(g) } => write!(f, "-{g}"),
        }
    }
}

// ============================================================================
// File naming
// ============================================================================

/// Replace the extension of the last path component with `ext`.
///
/// `ext` is appended verbatim, so it carries its own dot (`".ipl"`,
/// `"_10.ipl"`). A file without an extension just gets `ext` appended.
pub fn update_file_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.with_extension("").into_os_string();
    name.push(ext);
    PathBuf::from(name)
}

/// Hints file of a dataset: `<stem>.ipl`, or `<stem>_<g>.ipl` when a
/// granularity qualifies it.
pub fn hints_path(dataset: &Path, granularity: Option<u32>) -> PathBuf {
    match granularity {
        Some(g) => update_file_extension(dataset, &format!("_{g}{EXT_HINTS}")),
        None => update_file_extension(dataset, EXT_HINTS),
    }
}

// ============================================================================
// Save
// ============================================================================

/// Outcome of a hints save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveSummary {
    pub path: PathBuf,
    /// Entries written to the file.
    pub persisted: usize,
    /// Entries too small to be quantized, kept unrounded in memory only.
    pub omitted: usize,
    /// Quantization tolerance of the persisted weights.
    pub tolerance: f32,
}

/// Quantize `weights` with `granularity` and write them as hints.
///
/// Persisted entries are replaced by their rounded values in `weights`;
/// omitted ones are left as they were. Returns `(persisted, omitted)`.
pub fn write_hints<W: Write>(
    weights: &mut PropertyWeights,
    granularity: u32,
    writer: &mut W,
) -> Result<(usize, usize)> {
    let mut persisted: Vec<(&String, f32)> = Vec::with_capacity(weights.len());
    let mut omitted = 0;
    for (prop, &weight) in weights.iter() {
        let rweight = quantize::round(weight as f64, granularity)? as f32;
        if (rweight - weight).abs() > weight {
            omitted += 1;
            continue;
        }
        persisted.push((prop, rweight));
    }
    persisted.sort_by(|a, b| a.0.cmp(b.0));

    writeln!(writer, "{HEADER_PREFIX}{}", persisted.len())?;
    for (prop, weight) in &persisted {
        writeln!(writer, "{weight}\t{prop}")?;
    }
    writer.flush()?;

    let rounded: Vec<(String, f32)> = persisted
        .into_iter()
        .map(|(prop, weight)| (prop.clone(), weight))
        .collect();
    let count = rounded.len();
    weights.extend(rounded);
    Ok((count, omitted))
}

/// Save `weights` to the hints file at `path` (see [`write_hints`]).
///
/// An empty mapping is not an error: nothing is written.
pub fn save(weights: &mut PropertyWeights, granularity: u32, path: &Path) -> Result<SaveSummary> {
    let tolerance = quantize::tolerance(granularity);
    if weights.is_empty() {
        tracing::warn!(path = %path.display(), "hints output is omitted: property weights are empty");
        return Ok(SaveSummary { path: path.to_path_buf(), persisted: 0, omitted: 0, tolerance });
    }

    let mut writer = BufWriter::new(File::create(path)?);
    let (persisted, omitted) = write_hints(weights, granularity, &mut writer)?;
    tracing::info!(
        path = %path.display(),
        persisted,
        omitted,
        eps = tolerance,
        "property weights (significance) are saved"
    );
    Ok(SaveSummary { path: path.to_path_buf(), persisted, omitted, tolerance })
}

// ============================================================================
// Load
// ============================================================================

/// Read hints from `reader` into `weights`, overwriting existing entries.
///
/// Malformed lines are skipped with a warning. Returns the number of loaded
/// entries.
pub fn read_hints<R: BufRead>(reader: R, weights: &mut PropertyWeights, origin: &str) -> Result<usize> {
    let mut loaded = 0;
    for (lnum, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with(COMMENT_MARK) {
            continue;
        }
        let parsed = line
            .split_once(char::is_whitespace)
            .map(|(weight, prop)| (weight, prop.trim()))
            .filter(|(_, prop)| !prop.is_empty())
            .and_then(|(weight, prop)| weight.parse::<f32>().ok().map(|w| (prop, w)));
        match parsed {
            Some((prop, weight)) => {
                weights.insert(prop.to_string(), weight);
                loaded += 1;
            }
            None => {
                tracing::warn!(origin, line = lnum + 1, content = line, "invalid property hint is omitted");
            }
        }
    }
    Ok(loaded)
}

/// Load the hints file at `path` into `weights`.
pub fn load(path: &Path, weights: &mut PropertyWeights) -> Result<usize> {
    let reader = BufReader::new(File::open(path)?);
    let loaded = read_hints(reader, weights, &path.display().to_string())?;
    tracing::debug!(path = %path.display(), loaded, "hints loaded");
    Ok(loaded)
}
