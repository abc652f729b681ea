//! Interactive hint elicitation.
//!
//! The operator rates each offered property on a `1 ..= g` scale (or gives
//! a raw probability when `g == 0`). Control answers:
//!
//! | Input   | Answer          | Effect                                   |
//! |---------|-----------------|------------------------------------------|
//! | (empty) | `Answer::Skip`  | keep the default weight, go to the next  |
//! | `q`     | `Answer::Quit`  | stop, keep what was rated so far         |
//! | `p`     | `Answer::Back`  | re-rate the previous property            |
//! | number  | `Answer::Value` | validated, then snapped onto the grid    |

use std::io::{BufRead, Stdin, StdinLock, Stdout, Write};
use std::path::{Path, PathBuf};

use hashbrown::HashMap;

use crate::model::PropertyWeights;
use crate::quantize;
use crate::{Error, Result};

use super::{hints_path, save};

/// Granularity offered when the operator just presses enter.
pub const DEFAULT_MARKS: u32 = 10;

// ============================================================================
// Prompter
// ============================================================================

/// Line-oriented operator console.
pub trait Prompter {
    /// Show `prompt` and read one line; `None` at end of input.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Show an informational message.
    fn say(&mut self, message: &str) -> Result<()>;
}

/// [`Prompter`] over any reader/writer pair.
pub struct StreamPrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> StreamPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl StreamPrompter<StdinLock<'static>, Stdout> {
    /// The process console (stdin / stdout).
    pub fn console() -> Self {
        let stdin: Stdin = std::io::stdin();
        Self::new(stdin.lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter for StreamPrompter<R, W> {
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{message}")?;
        Ok(())
    }
}

// ============================================================================
// Answers
// ============================================================================

/// One operator answer about a property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Answer {
    Skip,
    Quit,
    Back,
    Value(f64),
}

impl Answer {
    /// `None` when the input is neither a control token nor a number.
    pub fn parse(input: &str) -> Option<Answer> {
        match input.trim() {
            "" => Some(Answer::Skip),
            "q" => Some(Answer::Quit),
            "p" => Some(Answer::Back),
            s => s.parse::<f64>().ok().filter(|v| v.is_finite()).map(Answer::Value),
        }
    }
}

/// Convert an entered value into a weight: a mark in `1 ..= g`, or a raw
/// probability when `g == 0`.
pub fn mark_to_weight(value: f64, granularity: u32) -> Result<f32> {
    if granularity == 0 {
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::InvalidArgument(format!(
                "the property significance is out of the range 0 .. 1: {value}"
            )));
        }
        return Ok(value as f32);
    }
    if granularity < 2 {
        return Err(Error::InvalidArgument(format!("the number of marks is too small: {granularity}")));
    }
    if value.fract() != 0.0 || value < 1.0 || value > granularity as f64 {
        return Err(Error::InvalidArgument(format!(
            "the property significance is out of the range 1 .. {granularity}: {value}"
        )));
    }
    let prob = (value - 1.0) / (granularity - 1) as f64;
    Ok(quantize::round(prob, granularity)? as f32)
}

// ============================================================================
// Elicitation
// ============================================================================

/// Result of an elicitation session.
#[derive(Debug, Clone, PartialEq)]
pub struct Elicitation {
    /// Properties that received a weight.
    pub evaluated: usize,
    /// Properties passed over without a weight.
    pub skipped: usize,
    pub granularity: u32,
    /// Hints file the evaluated weights were saved to.
    pub path: PathBuf,
}

fn ask_granularity(prompter: &mut dyn Prompter, default: u32) -> Result<u32> {
    let answer = prompter.ask(&format!(
        "Input evaluation range for each property, natural number >= 2 or 0 to input probabilities [{default}]: "
    ))?;
    let granularity = match answer.as_deref().map(str::trim) {
        None | Some("") => default,
        Some(s) => s
            .parse::<u32>()
            .map_err(|_| Error::InvalidArgument(format!("invalid number of marks: '{s}'")))?,
    };
    if granularity == 1 {
        return Err(Error::InvalidArgument(format!("the number of marks is too small: {granularity}")));
    }
    Ok(granularity)
}

/// Ask the operator for the significance of `properties`.
///
/// The ratings are saved next to `dataset` (`<stem>_<g>.ipl`) and merged
/// into `weights`.
pub fn elicit(
    prompter: &mut dyn Prompter,
    properties: &[String],
    default_granularity: u32,
    dataset: &Path,
    weights: &mut PropertyWeights,
) -> Result<Elicitation> {
    let granularity = ask_granularity(prompter, default_granularity)?;
    let range = if granularity == 0 { "0 .. 1".to_string() } else { format!("1 .. {granularity}") };
    prompter.say(&format!(
        "Input significance of the properties in the range {range} for at most {} properties. \
         Leave the input empty to skip the property evaluation or in case the property is absolutely insignificant. \
         Use 'q' to quit early, 'p' to update the previous evaluation",
        properties.len()
    ))?;

    let mut rated: PropertyWeights = HashMap::with_capacity(properties.len());
    let mut i = 0;
    let mut reached = 0;
    while i < properties.len() {
        let prop = &properties[i];
        let Some(input) = prompter.ask(&format!("{prop}: "))? else {
            break;
        };
        match Answer::parse(&input) {
            Some(Answer::Quit) => break,
            Some(Answer::Skip) => {
                rated.remove(prop);
                i += 1;
            }
            Some(Answer::Back) => i = i.saturating_sub(1),
            Some(Answer::Value(value)) => match mark_to_weight(value, granularity) {
                Ok(weight) => {
                    rated.insert(prop.clone(), weight);
                    i += 1;
                }
                Err(err) => {
                    tracing::warn!(property = %prop, %err, "property significance rejected");
                    prompter.say(&format!("WARNING, {err}. Correct the specified value."))?;
                }
            },
            None => {
                tracing::warn!(property = %prop, input = %input, "unrecognized property significance");
                prompter.say(&format!("WARNING, unrecognized input '{input}'. Correct the specified value."))?;
            }
        }
        reached = reached.max(i);
    }

    let evaluated = rated.len();
    let skipped = reached.saturating_sub(evaluated);
    prompter.say(&format!(
        "Supervision completed: {evaluated} brief hints are specified, {skipped} skipped for {} properties",
        properties.len()
    ))?;

    let path = hints_path(dataset, Some(granularity));
    save(&mut rated, granularity, &path)?;
    weights.extend(rated);
    Ok(Elicitation { evaluated, skipped, granularity, path })
}
