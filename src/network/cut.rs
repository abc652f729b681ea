//! Adaptive link cutting (sparsification).
//!
//! Once a source instance has accumulated at least [`cut_margin`] candidate
//! links, only links at or above
//!
//! ```text
//! wmarg = wmin + (wsum / count − wmin) · ratio
//! ```
//!
//! are kept, i.e. a `ratio` share of the way from the weakest link to the
//! average one. Small link sets are never cut.

use crate::model::LinkSet;
use crate::{Error, Result};

/// Minimal number of candidate links before cutting applies:
/// `⌈7 + N^(1 − e^−2)⌉`, from 8 links for a single instance up to a few
/// thousand for millions of instances.
pub fn cut_margin(instances: usize) -> usize {
    let exp = 1.0 - (-2.0f64).exp();
    (7.0 + (instances as f64).powf(exp)).ceil() as usize
}

/// Weight statistics of the candidate links of one source instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkStats {
    /// Non-self candidates accounted.
    pub count: usize,
    /// Minimal non-self weight.
    pub wmin: f32,
    pub wsum: f64,
}

impl Default for LinkStats {
    fn default() -> Self {
        Self { count: 0, wmin: f32::MAX, wsum: 0.0 }
    }
}

impl LinkStats {
    pub fn add(&mut self, weight: f32) {
        self.count += 1;
        self.wsum += weight as f64;
        if weight < self.wmin {
            self.wmin = weight;
        }
    }

    /// Account a self-link without letting its weight bias the cutoff: the
    /// sum grows by the current average, `wmin` is untouched.
    pub fn add_self_link(&mut self) {
        if self.count > 0 {
            self.wsum += self.wsum / self.count as f64;
        }
    }
}

/// Link reduction policy of one graph construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkCutter {
    ratio: f32,
    margin: usize,
}

impl LinkCutter {
    /// `ratio` in [0, 1); `0` disables cutting.
    pub fn new(ratio: f32, instances: usize) -> Self {
        Self { ratio, margin: cut_margin(instances) }
    }

    pub fn is_active(&self) -> bool {
        self.ratio > 0.0
    }

    pub fn margin(&self) -> usize {
        self.margin
    }

    /// Cut `links` in place, returning the cutoff weight when one applied.
    ///
    /// `links` may hold a self-link in addition to the `stats.count`
    /// accounted ones.
    pub fn cut(&self, links: &mut LinkSet, stats: &LinkStats) -> Result<Option<f32>> {
        if !self.is_active() || links.len() < self.margin {
            return Ok(None);
        }
        let wmin = stats.wmin as f64;
        let wmarg = (wmin + (stats.wsum / links.len() as f64 - wmin) * self.ratio as f64) as f32;
        if !(wmarg > stats.wmin) {
            return Ok(None);
        }
        links.retain(|ln| ln.weight >= wmarg);
        if links.is_empty() {
            return Err(Error::InvariantViolation(format!("links should be formed, wmarg: {wmarg}")));
        }
        Ok(Some(wmarg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InstanceId, Link};
    use proptest::prelude::*;

    fn candidates(weights: &[f32]) -> (LinkSet, LinkStats) {
        let mut links = LinkSet::new();
        let mut stats = LinkStats::default();
        for (i, &w) in weights.iter().enumerate() {
            links.push(Link::new(InstanceId(i as i32), w));
            stats.add(w);
        }
        (links, stats)
    }

    #[test]
    fn test_cut_margin() {
        assert_eq!(cut_margin(0), 7);
        assert_eq!(cut_margin(1), 8);
        assert_eq!(cut_margin(100), 7 + 54);
    }

    #[test]
    fn test_below_margin_is_untouched() {
        let (mut links, stats) = candidates(&[0.1, 0.9, 0.5]);
        let cutter = LinkCutter::new(0.5, 10);
        assert_eq!(cutter.cut(&mut links, &stats).unwrap(), None);
        assert_eq!(links.len(), 3);
    }

    #[test]
    fn test_cut_keeps_strong_links() {
        // margin for 1 instance is 8; avg 0.55, wmin 0.1 → wmarg 0.325
        let (mut links, stats) = candidates(&[0.1, 0.1, 0.1, 0.1, 1.0, 1.0, 1.0, 1.0]);
        let cutter = LinkCutter::new(0.5, 1);
        let wmarg = cutter.cut(&mut links, &stats).unwrap().unwrap();
        assert!((wmarg - 0.325).abs() < 1e-6);
        assert_eq!(links.len(), 4);
        assert!(links.iter().all(|ln| ln.weight == 1.0));
    }

    #[test]
    fn test_equal_weights_are_not_cut() {
        let (mut links, stats) = candidates(&[0.4; 12]);
        let cutter = LinkCutter::new(0.9, 1);
        assert_eq!(cutter.cut(&mut links, &stats).unwrap(), None);
        assert_eq!(links.len(), 12);
    }

    #[test]
    fn test_self_link_average_quirk() {
        // The self-link adds the running average to the sum instead of its
        // own weight, so the average over all candidates stays unchanged.
        let mut stats = LinkStats::default();
        stats.add(0.2);
        stats.add(0.6);
        stats.add_self_link();
        assert!((stats.wsum - 1.2).abs() < 1e-9);
        assert_eq!(stats.wmin, 0.2);

        let mut alone = LinkStats::default();
        alone.add_self_link();
        assert_eq!(alone.wsum, 0.0);
    }

    proptest! {
        #[test]
        fn prop_cut_retains_nonempty_above_cutoff(
            weights in proptest::collection::vec(0.001f32..=1.0, 8..64),
            ratio in 0.01f32..0.99,
        ) {
            let (mut links, stats) = candidates(&weights);
            let cutter = LinkCutter::new(ratio, 1);
            match cutter.cut(&mut links, &stats).unwrap() {
                Some(wmarg) => {
                    prop_assert!(!links.is_empty());
                    prop_assert!(links.iter().all(|ln| ln.weight >= wmarg));
                }
                None => prop_assert_eq!(links.len(), weights.len()),
            }
        }

        #[test]
        fn prop_zero_ratio_keeps_everything(weights in proptest::collection::vec(0.001f32..=1.0, 0..64)) {
            let (mut links, stats) = candidates(&weights);
            let cutter = LinkCutter::new(0.0, 1);
            prop_assert_eq!(cutter.cut(&mut links, &stats).unwrap(), None);
            prop_assert_eq!(links.len(), weights.len());
        }
    }
}
