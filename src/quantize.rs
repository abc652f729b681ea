//! # Weight Quantizer
//!
//! Snaps a probability onto a coarse, stable grid before it is shown to an
//! operator or persisted as a hint.
//!
//! ```text
//! granularity = 3  →  4 bands over [0, 1]
//!
//!   0        0.25       0.5       0.75        1
//!   |----*----|----*----|----*----|----*----|
//!      0.125     0.375     0.625     0.875       ← representatives
//! ```
//!
//! The band index is the remainder fold `value·(g+1) − ½` rounded half to
//! even, clamped to `[0, g]`: the edge bands absorb the half band that
//! overhangs 0 and 1. Representatives are band centres, so the rounding
//! error never exceeds [`tolerance`] and re-rounding a representative is a
//! no-op.
//!
//! The band grid is used instead of a fold over the mark step `1/(g−1)`:
//! that fold is not idempotent. Elicited marks therefore land on band
//! centres, e.g. mark 1 of 10 gives `0.5/11`.

use crate::{Error, Result};

/// Round `value` ∈ [0, 1] onto `granularity + 1` bands; `0` skips rounding.
pub fn round(value: f64, granularity: u32) -> Result<f64> {
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::InvalidArgument(format!(
            "the value to be rounded is out of [0, 1]: {value}, granularity: {granularity}"
        )));
    }
    if granularity == 0 {
        return Ok(value);
    }
    let bands = granularity as f64 + 1.0;
    let band = (value * bands - 0.5).round_ties_even().clamp(0.0, granularity as f64);
    Ok((band + 0.5) / bands)
}

/// Maximal absolute error of [`round`] for the given granularity.
pub fn tolerance(granularity: u32) -> f32 {
    0.5 / (granularity as f32 + 1.0)
}
