//! Strategy scoring.
//!
//! [`score`] checks a compound sequence against its stint lengths and returns
//! the total race time, or `None` when any stint breaks a wear or fuel limit.
//! It is pure, so results can be cached; [`MemoScorer`] does exactly that
//! behind the same [`StrategyScorer`] trait as the uncached [`DirectScorer`].
//!
//! Infeasibility is an ordinary outcome here, not an error.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;

use crate::compound::Compound;

/// Score a strategy.
///
/// Returns `Σ(lap_time × laps) + (stints − 1) × pit_loss_secs`, or `None`
/// if any stint exceeds its compound's wear limit or the fuel range. The
/// first violating stint short-circuits the rest.
///
/// A length mismatch between `sequence` and `stint_laps` is a caller bug and
/// is treated as infeasible.
pub fn score<C: AsRef<Compound>>(
    sequence: &[C],
    stint_laps: &[u32],
    fuel_range_laps: u32,
    pit_loss_secs: f64,
) -> Option<f64> {
    debug_assert_eq!(sequence.len(), stint_laps.len());
    if sequence.len() != stint_laps.len() || sequence.is_empty() {
        return None;
    }

    let mut total = 0.0;
    for (compound, &laps) in sequence.iter().zip(stint_laps) {
        let compound = compound.as_ref();
        if laps > compound.wear_limit_laps() || laps > fuel_range_laps {
            return None;
        }
        total += compound.base_lap_time_secs() * f64::from(laps);
    }

    Some(total + (sequence.len() - 1) as f64 * pit_loss_secs)
}

/// Scores candidate strategies for the search.
///
/// Implementations must return exactly what [`score`] returns for the same
/// arguments; they may only differ in cost.
pub trait StrategyScorer: Send + Sync {
    /// Score a compound sequence with its stint lengths.
    fn score(
        &self,
        sequence: &[Arc<Compound>],
        stint_laps: &[u32],
        fuel_range_laps: u32,
        pit_loss_secs: f64,
    ) -> Option<f64>;

    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Cache statistics, for scorers that cache.
    fn memo_stats(&self) -> Option<MemoStats> {
        None
    }
}

/// Uncached scorer that calls [`score`] directly.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectScorer;

impl StrategyScorer for DirectScorer {
    fn score(
        &self,
        sequence: &[Arc<Compound>],
        stint_laps: &[u32],
        fuel_range_laps: u32,
        pit_loss_secs: f64,
    ) -> Option<f64> {
        score(sequence, stint_laps, fuel_range_laps, pit_loss_secs)
    }

    fn name(&self) -> &'static str {
        "direct"
    }
}

/// Cache key covering every argument of [`score`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MemoKey {
    compounds: Vec<String>,
    stint_laps: Vec<u32>,
    fuel_range_laps: u32,
    pit_loss_bits: u64,
}

impl MemoKey {
    fn new(
        sequence: &[Arc<Compound>],
        stint_laps: &[u32],
        fuel_range_laps: u32,
        pit_loss_secs: f64,
    ) -> Self {
        Self {
            compounds: sequence.iter().map(|c| c.name().to_string()).collect(),
            stint_laps: stint_laps.to_vec(),
            fuel_range_laps,
            pit_loss_bits: pit_loss_secs.to_bits(),
        }
    }
}

/// Cache statistics for a [`MemoScorer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to be scored.
    pub misses: u64,
    /// Entries currently cached.
    pub entries: usize,
}

/// Memoizing scorer shared safely between search workers.
///
/// Keyed by compound names, so it must only be used with one catalog.
/// Hits are rare in a normal search because stint tuples rarely repeat;
/// the cache pays off when the same candidates are scored again, e.g. when
/// re-running with identical inputs.
#[derive(Debug, Default)]
pub struct MemoScorer {
    cache: DashMap<MemoKey, Option<f64>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoScorer {
    /// Create an empty memo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cache statistics.
    pub fn stats(&self) -> MemoStats {
        MemoStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.cache.len(),
        }
    }
}

impl StrategyScorer for MemoScorer {
    fn score(
        &self,
        sequence: &[Arc<Compound>],
        stint_laps: &[u32],
        fuel_range_laps: u32,
        pit_loss_secs: f64,
    ) -> Option<f64> {
        let key = MemoKey::new(sequence, stint_laps, fuel_range_laps, pit_loss_secs);

        if let Some(cached) = self.cache.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return *cached;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let result = score(sequence, stint_laps, fuel_range_laps, pit_loss_secs);
        trace!(stint_laps = ?stint_laps, result = ?result, "Memoized strategy score");
        self.cache.insert(key, result);
        result
    }

    fn name(&self) -> &'static str {
        "memo"
    }

    fn memo_stats(&self) -> Option<MemoStats> {
        Some(self.stats())
    }
}
