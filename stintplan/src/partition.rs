//! Bounded ordered partitions of a lap count.
//!
//! [`partitions`] lazily yields every way to split `total` laps into
//! `bounds.len()` positive stint lengths where stint `i` runs at most
//! `bounds[i]` laps.
//!
//! # Algorithm
//!
//! Depth-first backtracking over an explicit stack of frames, one frame per
//! filled position. A frame records the laps still to place when it was
//! opened, so nothing is recomputed when the search backs up:
//!
//! ```text
//! position idx, remaining r, k positions after it
//!   k > 0:  value in 1 ..= min(bounds[idx], r - k)
//!   k = 0:  value = r, only if 1 <= r <= bounds[idx]
//! ```
//!
//! Subtracting `k` keeps at least one lap for every later position, so a
//! partial assignment that cannot be completed is never materialised.

/// One filled position of the backtracking stack.
#[derive(Debug, Clone, Copy)]
struct Frame {
    /// Laps left to place when this position was opened.
    remaining: u32,
    /// Current value at this position.
    value: u32,
    /// Largest admissible value at this position.
    upper: u32,
}

/// Lazy iterator over bounded ordered partitions.
///
/// Created by [`partitions`]. Each call creates an independent iterator.
#[derive(Debug, Clone)]
pub struct Partitions<'a> {
    bounds: &'a [u32],
    stack: Vec<Frame>,
}

/// Enumerate ordered partitions of `total` bounded per position by `bounds`.
///
/// Yields nothing when `bounds` is empty, when `total < bounds.len()`, or
/// when any bound is zero.
pub fn partitions(total: u32, bounds: &[u32]) -> Partitions<'_> {
    let mut iter = Partitions {
        bounds,
        stack: Vec::with_capacity(bounds.len()),
    };

    let admissible = !bounds.is_empty()
        && bounds.iter().all(|&b| b >= 1)
        && total as usize >= bounds.len();

    if admissible {
        iter.open(total);
    }

    iter
}

impl Partitions<'_> {
    /// Open the next position with `remaining` laps still to place.
    ///
    /// Returns `false` without pushing when the position admits no value.
    fn open(&mut self, remaining: u32) -> bool {
        let idx = self.stack.len();
        let after = (self.bounds.len() - idx - 1) as u32;
        let bound = self.bounds[idx];

        let (lower, upper) = if after == 0 {
            if remaining < 1 || remaining > bound {
                return false;
            }
            (remaining, remaining)
        } else {
            if remaining <= after {
                return false;
            }
            (1, bound.min(remaining - after))
        };

        self.stack.push(Frame {
            remaining,
            value: lower,
            upper,
        });
        true
    }

    /// Move to the next candidate value, popping exhausted frames.
    fn advance(&mut self) {
        while let Some(top) = self.stack.last_mut() {
            if top.value < top.upper {
                top.value += 1;
                return;
            }
            self.stack.pop();
        }
    }
}

impl Iterator for Partitions<'_> {
    type Item = Vec<u32>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            while self.stack.len() < self.bounds.len() {
                let top = self.stack.last()?;
                let remaining = top.remaining - top.value;
                if !self.open(remaining) {
                    break;
                }
            }

            if self.stack.is_empty() {
                return None;
            }

            if self.stack.len() == self.bounds.len() {
                let parts = self.stack.iter().map(|f| f.value).collect();
                self.advance();
                return Some(parts);
            }

            // Dead end below the current top; try its next value.
            self.advance();
        }
    }
}

/// Count bounded ordered partitions without enumerating them.
///
/// Agrees with `partitions(total, bounds).count()`; saturates at `u64::MAX`.
pub fn count_partitions(total: u32, bounds: &[u32]) -> u64 {
    if bounds.is_empty() || bounds.iter().any(|&b| b < 1) || (total as usize) < bounds.len() {
        return 0;
    }

    let total = total as usize;
    let mut ways = vec![0u64; total + 1];
    ways[0] = 1;

    for &bound in bounds {
        let mut next = vec![0u64; total + 1];
        for (placed, &count) in ways.iter().enumerate() {
            if count == 0 {
                continue;
            }
            for laps in 1..=bound as usize {
                let sum = placed + laps;
                if sum > total {
                    break;
                }
                next[sum] = next[sum].saturating_add(count);
            }
        }
        ways = next;
    }

    ways[total]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn collect(total: u32, bounds: &[u32]) -> Vec<Vec<u32>> {
        partitions(total, bounds).collect()
    }

    /// Unconstrained compositions of `total` into `parts` positive integers.
    fn brute_force(total: u32, parts: usize) -> Vec<Vec<u32>> {
        if parts == 1 {
            return if total >= 1 { vec![vec![total]] } else { vec![] };
        }
        let mut out = Vec::new();
        for first in 1..total {
            for mut tail in brute_force(total - first, parts - 1) {
                tail.insert(0, first);
                out.push(tail);
            }
        }
        out
    }

    #[test]
    fn test_single_position() {
        assert_eq!(collect(7, &[10]), vec![vec![7]]);
        assert!(collect(7, &[6]).is_empty());
    }

    #[test]
    fn test_two_positions_in_order() {
        assert_eq!(collect(5, &[3, 3]), vec![vec![2, 3], vec![3, 2]]);
    }

    #[test]
    fn test_three_positions() {
        let parts = collect(6, &[2, 3, 4]);
        assert_eq!(
            parts,
            vec![
                vec![1, 1, 4],
                vec![1, 2, 3],
                vec![1, 3, 2],
                vec![2, 1, 3],
                vec![2, 2, 2],
                vec![2, 3, 1],
            ]
        );
    }

    #[test]
    fn test_empty_bounds_yield_nothing() {
        assert!(collect(5, &[]).is_empty());
        assert!(collect(0, &[]).is_empty());
    }

    #[test]
    fn test_total_below_position_count() {
        assert!(collect(2, &[5, 5, 5]).is_empty());
    }

    #[test]
    fn test_zero_bound_yields_nothing() {
        assert!(collect(5, &[5, 0]).is_empty());
    }

    #[test]
    fn test_bounds_too_tight() {
        // 50 laps in two stints of at most 20
        assert!(collect(50, &[20, 20]).is_empty());
    }

    #[test]
    fn test_minimum_partition() {
        assert_eq!(collect(3, &[1, 1, 1]), vec![vec![1, 1, 1]]);
    }

    #[test]
    fn test_iterators_are_independent() {
        let bounds = [4, 4, 4];
        let first: Vec<_> = partitions(9, &bounds).collect();
        let second: Vec<_> = partitions(9, &bounds).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 10);
    }

    #[test]
    fn test_count_matches_enumeration() {
        assert_eq!(
            count_partitions(50, &[15, 20, 20]),
            collect(50, &[15, 20, 20]).len() as u64
        );
        assert_eq!(count_partitions(50, &[20, 20]), 0);
        assert_eq!(count_partitions(4, &[]), 0);
    }

    #[test]
    fn test_matches_brute_force_small() {
        for total in 1..=9u32 {
            for parts in 1..=4usize {
                let bounds: Vec<u32> = (0..parts).map(|i| 2 + i as u32).collect();
                let expected: Vec<Vec<u32>> = brute_force(total, parts)
                    .into_iter()
                    .filter(|p| p.iter().zip(&bounds).all(|(v, b)| v <= b))
                    .collect();
                assert_eq!(
                    collect(total, &bounds),
                    expected,
                    "total={total} bounds={bounds:?}"
                );
            }
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_partitions_are_sound(
                total in 1u32..=24,
                bounds in prop::collection::vec(1u32..=12, 1..=4)
            ) {
                prop_assume!(total as usize >= bounds.len());
                for parts in partitions(total, &bounds) {
                    prop_assert_eq!(parts.len(), bounds.len());
                    prop_assert_eq!(parts.iter().sum::<u32>(), total);
                    for (value, bound) in parts.iter().zip(&bounds) {
                        prop_assert!(*value >= 1 && value <= bound);
                    }
                }
            }

            #[test]
            fn test_partitions_are_exhaustive_and_unique(
                total in 1u32..=14,
                bounds in prop::collection::vec(1u32..=8, 1..=4)
            ) {
                let produced: Vec<Vec<u32>> = partitions(total, &bounds).collect();
                let unique: HashSet<&Vec<u32>> = produced.iter().collect();
                prop_assert_eq!(unique.len(), produced.len());

                let expected: Vec<Vec<u32>> = brute_force(total, bounds.len())
                    .into_iter()
                    .filter(|p| p.iter().zip(&bounds).all(|(v, b)| v <= b))
                    .collect();
                prop_assert_eq!(&produced, &expected);
                prop_assert_eq!(count_partitions(total, &bounds), expected.len() as u64);
            }
        }
    }
}
