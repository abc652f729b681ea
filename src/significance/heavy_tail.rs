//! Heavy-tail detection over the property frequency ranking.
//!
//! Supervision only pays off when a few frequent properties carry as much
//! mass as the whole less frequent half of the ranking. The head grows from
//! the most frequent property while its mass is below the tail mass; the
//! tail (initially everything from the median on) grows leftward while its
//! mass is below the head mass.
//!
//! ```text
//!  ranked by occurrences (desc)
//!  [ head ........ | .............. | tail (from N/2) ......... ]
//!    0        head_end          tail_start                    N
//!    ──────▶                    ◀──────
//! ```
//!
//! The distribution is heavy tailed when the head balances the tail within
//! `round(sqrt(N)) + 1` properties.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::{PropertyOccurrence, PropertyOccurrences};
use crate::Result;

/// Exponent damping the occurrence counts in the mass sums (sqrt of the
/// inverse golden ratio; sensible range is 0.6 – 0.9).
pub const MASS_POWER: f64 = 0.786;

/// Rank properties by descending occurrences, ties by name.
pub fn rank(occurrences: &PropertyOccurrences) -> Result<Vec<PropertyOccurrence>> {
    let mut ranked = occurrences
        .iter()
        .map(|(prop, &ocrs)| PropertyOccurrence::new(prop.as_str(), ocrs))
        .collect::<Result<Vec<_>>>()?;
    ranked.sort_by(by_occurrences_desc);
    Ok(ranked)
}

fn by_occurrences_desc(a: &PropertyOccurrence, b: &PropertyOccurrence) -> Ordering {
    b.occurrences()
        .cmp(&a.occurrences())
        .then_with(|| a.property().cmp(b.property()))
}

fn mass(p: &PropertyOccurrence) -> u64 {
    (p.occurrences() as f64).powf(MASS_POWER).round() as u64
}

/// Head/tail split of a frequency ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadSplit {
    /// Number of leading properties in the head, tie groups never split.
    pub head_len: usize,
    /// Head length bound: `round(sqrt(N)) + 1`.
    pub head_max: usize,
    /// First index of the tail.
    pub tail_start: usize,
    pub head_mass: u64,
    pub tail_mass: u64,
    pub properties: usize,
}

impl HeadSplit {
    /// Whether a non-empty head stayed under the bound.
    pub fn is_heavy_tailed(&self) -> bool {
        self.head_len > 0 && self.head_len < self.head_max
    }

    /// The head of the ranking this split was computed on.
    pub fn head<'a>(&self, ranked: &'a [PropertyOccurrence]) -> &'a [PropertyOccurrence] {
        &ranked[..self.head_len.min(ranked.len())]
    }
}

/// Split a ranking sorted by descending occurrences.
///
/// The result depends on the occurrence values only, so any order of
/// equally frequent properties yields the same split.
pub fn split_head(ranked: &[PropertyOccurrence]) -> HeadSplit {
    let n = ranked.len();
    let head_max = (n as f64).sqrt().round() as usize + 1;
    let mut tail_start = n / 2;
    let mut tail_mass: u64 = ranked[tail_start..].iter().map(mass).sum();
    let mut head_end = 0;
    let mut head_mass: u64 = 0;

    while head_end < head_max && head_end + 1 < tail_start {
        let before = (head_end, tail_start);
        while head_mass < tail_mass && head_end < head_max && head_end < tail_start {
            head_mass += mass(&ranked[head_end]);
            head_end += 1;
        }
        while tail_mass < head_mass && tail_start > head_end + 1 {
            tail_start -= 1;
            tail_mass += mass(&ranked[tail_start]);
        }
        if (head_end, tail_start) == before {
            break;
        }
    }

    // Extend the head over ties so the boundary sits on a strict drop
    while head_end > 0
        && head_end < n
        && ranked[head_end].occurrences() == ranked[head_end - 1].occurrences()
    {
        head_end += 1;
    }

    HeadSplit { head_len: head_end, head_max, tail_start, head_mass, tail_mass, properties: n }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ranking(counts: &[u64]) -> Vec<PropertyOccurrence> {
        counts
            .iter()
            .enumerate()
            .map(|(i, &c)| PropertyOccurrence::new(format!("p{i}"), c).unwrap())
            .collect()
    }

    #[test]
    fn test_rank_orders_desc_with_name_ties() {
        let mut occ = PropertyOccurrences::new();
        occ.insert("b".into(), 5);
        occ.insert("a".into(), 5);
        occ.insert("c".into(), 9);
        let ranked = rank(&occ).unwrap();
        let names: Vec<&str> = ranked.iter().map(|p| p.property()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_rank_rejects_zero_occurrences() {
        let mut occ = PropertyOccurrences::new();
        occ.insert("a".into(), 0);
        assert!(rank(&occ).is_err());
    }

    #[test]
    fn test_dominant_head_is_heavy_tailed() {
        let ranked = ranking(&[1000, 10, 9, 8, 7, 6, 5, 4, 3, 2]);
        let split = split_head(&ranked);
        assert_eq!(split.head_max, 4);
        assert_eq!(split.head_len, 1);
        assert!(split.is_heavy_tailed());
        assert_eq!(split.head(&ranked)[0].occurrences(), 1000);
    }

    #[test]
    fn test_uniform_distribution_is_not_heavy_tailed() {
        let ranked = ranking(&[10; 9]);
        let split = split_head(&ranked);
        assert_eq!(split.head_len, 9);
        assert!(!split.is_heavy_tailed());
    }

    #[test]
    fn test_tiny_rankings() {
        assert!(!split_head(&ranking(&[5])).is_heavy_tailed());
        assert!(!split_head(&ranking(&[5, 1])).is_heavy_tailed());
        assert!(!split_head(&[]).is_heavy_tailed());
    }

    #[test]
    fn test_head_extends_over_ties() {
        // Two equally dominant properties must enter the head together
        let ranked = ranking(&[800, 800, 20, 10, 9, 8, 7, 6, 5, 4, 3, 2, 2, 1, 1, 1]);
        let split = split_head(&ranked);
        assert!(split.head_len >= 2);
        assert_ne!(
            ranked[split.head_len - 1].occurrences(),
            ranked.get(split.head_len).map_or(0, |p| p.occurrences())
        );
    }

    proptest! {
        #[test]
        fn prop_split_ignores_tie_order(
            counts in proptest::collection::vec(1u64..50, 1..40),
            seed in any::<u64>(),
        ) {
            let mut sorted = counts.clone();
            sorted.sort_unstable_by(|a, b| b.cmp(a));
            let ranked = ranking(&sorted);

            // Reverse the order inside every tie group, then rotate by seed
            let mut permuted = ranked.clone();
            let mut start = 0;
            while start < permuted.len() {
                let mut end = start + 1;
                while end < permuted.len() && permuted[end].occurrences() == permuted[start].occurrences() {
                    end += 1;
                }
                let group = &mut permuted[start..end];
                group.reverse();
                let len = group.len();
                group.rotate_left(seed as usize % len);
                start = end;
            }

            let a = split_head(&ranked);
            let b = split_head(&permuted);
            prop_assert_eq!(a, b);

            let mut head_a: Vec<&str> = a.head(&ranked).iter().map(|p| p.property()).collect();
            let mut head_b: Vec<&str> = b.head(&permuted).iter().map(|p| p.property()).collect();
            head_a.sort_unstable();
            head_b.sort_unstable();
            prop_assert_eq!(head_a, head_b);
        }
    }
}
