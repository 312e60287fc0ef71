//! Exhaustive strategy search.
//!
//! The [`SequenceEnumerator`] walks every stop count from zero to the race's
//! ceiling. For each stop count it streams every compound sequence of the
//! matching length, drops sequences that break the coverage rule, derives
//! per-stint lap bounds, and scores every bounded partition of the race.
//!
//! # Pipeline
//!
//! ```text
//! stops 0..=max_stops
//!   └── compound sequences (|catalog|^stints, streamed)
//!         ├── coverage rule: < 2 distinct compounds → skip
//!         ├── bounds[i] = min(wear_limit, fuel_range)
//!         └── partitions(total_laps, bounds)
//!               └── scorer → ResultStore
//! ```
//!
//! # Concurrency
//!
//! In [`SearchMode::Parallel`] the sequences of each stop count are sharded
//! across the rayon pool. Every shard fills a private [`ResultStore`]; the
//! shards are concatenated in sequence order afterwards, so both modes
//! produce identical stores.
//!
//! # Cancellation
//!
//! The cancellation token is polled before each sequence. Strategies found
//! before cancellation are kept and the outcome is flagged as cancelled.
//!
//! # Example
//!
//! ```
//! use stintplan::{CompoundCatalog, RaceConfig, SequenceEnumerator};
//!
//! let catalog = CompoundCatalog::standard();
//! let config = RaceConfig::new(50, 25.0, 20, 2);
//!
//! let outcome = SequenceEnumerator::new(&catalog, &config).run().unwrap();
//! let best = outcome.store().best().unwrap();
//! assert_eq!(best.total_laps(), 50);
//! ```

use std::ops::AddAssign;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::compound::{Compound, CompoundCatalog};
use crate::error::{ConfigError, SearchError, SearchResult};
use crate::partition::{count_partitions, partitions};
use crate::progress::{ProgressCallback, ProgressTracker};
use crate::race::RaceConfig;
use crate::scorer::{DirectScorer, MemoScorer, MemoStats, StrategyScorer};
use crate::store::ResultStore;
use crate::strategy::{StintPlan, Strategy};

/// How the search distributes work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchMode {
    /// Single thread, sequences in order.
    #[default]
    Sequential,
    /// Sequences of each stop count sharded across the rayon pool.
    Parallel,
}

/// Counters collected during a search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStats {
    /// Candidate compound sequences in the whole search space.
    pub sequences_total: u64,
    /// Sequences actually visited before completion or cancellation.
    pub sequences_processed: u64,
    /// Sequences dropped by the coverage rule.
    pub coverage_rejected: u64,
    /// Stint-length partitions handed to the scorer.
    pub partitions_scored: u64,
    /// Partitions the scorer rejected.
    pub infeasible: u64,
    /// Strategies recorded.
    pub strategies_found: u64,
    /// Wall-clock time of the search.
    pub elapsed: Duration,
    /// Scorer cache counters, when the scorer caches.
    pub memo: Option<MemoStats>,
}

impl SearchStats {
    fn absorb(&mut self, tally: Tally) {
        self.sequences_processed += tally.sequences;
        self.coverage_rejected += tally.coverage_rejected;
        self.partitions_scored += tally.partitions_scored;
        self.infeasible += tally.infeasible;
        self.strategies_found += tally.strategies;
    }
}

/// Per-worker counters, folded into [`SearchStats`] at the end.
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    sequences: u64,
    coverage_rejected: u64,
    partitions_scored: u64,
    infeasible: u64,
    strategies: u64,
}

impl AddAssign for Tally {
    fn add_assign(&mut self, other: Tally) {
        self.sequences += other.sequences;
        self.coverage_rejected += other.coverage_rejected;
        self.partitions_scored += other.partitions_scored;
        self.infeasible += other.infeasible;
        self.strategies += other.strategies;
    }
}

/// Result of a search run.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    store: ResultStore,
    stats: SearchStats,
    cancelled: bool,
}

impl SearchOutcome {
    /// All feasible strategies found.
    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Take ownership of the strategies.
    pub fn into_store(self) -> ResultStore {
        self.store
    }

    /// Search counters.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Whether the search stopped early on cancellation.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Whether no feasible strategy was found.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// The strategies, or [`SearchError::NoViableStrategies`] when empty.
    pub fn into_result(self) -> SearchResult<ResultStore> {
        if self.store.is_empty() {
            Err(SearchError::NoViableStrategies)
        } else {
            Ok(self.store)
        }
    }
}

/// Odometer over every ordered selection of `len` catalog indices.
///
/// The last position changes fastest, matching [`sequence_at`].
#[derive(Debug, Clone)]
pub struct CompoundSequences {
    radix: usize,
    digits: Vec<usize>,
    done: bool,
}

/// Stream all `compounds^len` index sequences in lexicographic order.
pub fn compound_sequences(compounds: usize, len: usize) -> CompoundSequences {
    CompoundSequences {
        radix: compounds,
        digits: vec![0; len],
        done: compounds == 0 || len == 0,
    }
}

impl Iterator for CompoundSequences {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let current = self.digits.clone();

        let mut pos = self.digits.len();
        loop {
            if pos == 0 {
                self.done = true;
                break;
            }
            pos -= 1;
            self.digits[pos] += 1;
            if self.digits[pos] < self.radix {
                break;
            }
            self.digits[pos] = 0;
        }

        Some(current)
    }
}

/// The `index`-th sequence yielded by [`compound_sequences`].
pub fn sequence_at(mut index: usize, compounds: usize, len: usize) -> Vec<usize> {
    let mut digits = vec![0; len];
    if compounds == 0 {
        return digits;
    }
    for digit in digits.iter_mut().rev() {
        *digit = index % compounds;
        index /= compounds;
    }
    digits
}

/// Coverage rule: at least two distinct compounds.
fn has_coverage(indices: &[usize]) -> bool {
    indices
        .split_first()
        .is_some_and(|(first, rest)| rest.iter().any(|i| i != first))
}

/// Number of candidate sequences across all stop counts.
///
/// `None` when the count overflows.
pub fn total_sequences(compounds: usize, max_stops: u32) -> Option<u64> {
    (0..=max_stops).try_fold(0u64, |acc, stops| {
        let count = (compounds as u64).checked_pow(stops.checked_add(1)?)?;
        acc.checked_add(count)
    })
}

/// Drives the strategy search for one catalog and race configuration.
pub struct SequenceEnumerator<'a> {
    catalog: &'a CompoundCatalog,
    config: &'a RaceConfig,
    mode: SearchMode,
    scorer: Arc<dyn StrategyScorer>,
    progress: Option<ProgressCallback>,
    cancellation: CancellationToken,
}

impl<'a> SequenceEnumerator<'a> {
    /// Create a sequential, uncached enumerator.
    pub fn new(catalog: &'a CompoundCatalog, config: &'a RaceConfig) -> Self {
        Self {
            catalog,
            config,
            mode: SearchMode::Sequential,
            scorer: Arc::new(DirectScorer),
            progress: None,
            cancellation: CancellationToken::new(),
        }
    }

    /// Set the work distribution mode.
    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Use a specific scorer.
    pub fn with_scorer(mut self, scorer: Arc<dyn StrategyScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Use a fresh [`MemoScorer`].
    pub fn with_memo(self) -> Self {
        self.with_scorer(Arc::new(MemoScorer::new()))
    }

    /// Report progress after each candidate sequence.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Stop early when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Candidate sequences the search will visit, if it fits in 64 bits.
    pub fn total_sequences(&self) -> Option<u64> {
        total_sequences(self.catalog.len(), self.config.max_stops)
    }

    /// Validate inputs and run the search.
    ///
    /// Configuration errors are returned before any work is done. An empty
    /// result is not an error; check [`SearchOutcome::is_empty`].
    pub fn run(&self) -> Result<SearchOutcome, ConfigError> {
        self.config.validate()?;
        self.catalog.validate()?;

        let sequences_total = self
            .total_sequences()
            .ok_or(ConfigError::SearchSpaceTooLarge {
                compounds: self.catalog.len(),
                stints: self.config.max_stops.saturating_add(1),
            })?;

        info!(
            race = %self.config,
            compounds = ?self.catalog.names(),
            mode = ?self.mode,
            scorer = self.scorer.name(),
            sequences = sequences_total,
            "Starting strategy search"
        );

        let started = Instant::now();
        let tracker = ProgressTracker::new(sequences_total, self.progress.clone());

        let (store, tally, cancelled) = match self.mode {
            SearchMode::Sequential => self.run_sequential(&tracker),
            SearchMode::Parallel => self.run_parallel(&tracker)?,
        };

        let mut stats = SearchStats {
            sequences_total,
            elapsed: started.elapsed(),
            memo: self.scorer.memo_stats(),
            ..SearchStats::default()
        };
        stats.absorb(tally);

        if cancelled {
            warn!(
                processed = stats.sequences_processed,
                total = sequences_total,
                strategies = stats.strategies_found,
                "Strategy search cancelled, keeping partial results"
            );
        } else {
            info!(
                strategies = stats.strategies_found,
                partitions = stats.partitions_scored,
                coverage_rejected = stats.coverage_rejected,
                memo_hits = stats.memo.map(|m| m.hits),
                memo_misses = stats.memo.map(|m| m.misses),
                elapsed_ms = stats.elapsed.as_millis() as u64,
                "Strategy search complete"
            );
        }

        if store.is_empty() {
            warn!(
                min_stops_for_fuel = self.config.min_stops_for_fuel(),
                max_stops = self.config.max_stops,
                "No viable strategies found"
            );
        }

        Ok(SearchOutcome {
            store,
            stats,
            cancelled,
        })
    }

    fn run_sequential(&self, tracker: &ProgressTracker) -> (ResultStore, Tally, bool) {
        let mut store = ResultStore::new();
        let mut tally = Tally::default();

        for stops in 0..=self.config.max_stops {
            let stints = stops as usize + 1;
            debug!(stops, stints, "Enumerating compound sequences");

            for indices in compound_sequences(self.catalog.len(), stints) {
                if self.cancellation.is_cancelled() {
                    return (store, tally, true);
                }
                self.process_sequence(&indices, &mut store, &mut tally);
                tracker.tick();
            }
        }

        (store, tally, false)
    }

    fn run_parallel(
        &self,
        tracker: &ProgressTracker,
    ) -> Result<(ResultStore, Tally, bool), ConfigError> {
        let mut store = ResultStore::new();
        let mut tally = Tally::default();
        let compounds = self.catalog.len();

        for stops in 0..=self.config.max_stops {
            if self.cancellation.is_cancelled() {
                return Ok((store, tally, true));
            }

            let stints = stops as usize + 1;
            let count = compounds
                .checked_pow(stops + 1)
                .ok_or(ConfigError::SearchSpaceTooLarge {
                    compounds,
                    stints: stops + 1,
                })?;
            debug!(stops, stints, sequences = count, "Sharding compound sequences");

            // Chunks fold in index order and reduce left to right, so the
            // merged store matches the sequential one.
            let (shard, shard_tally) = (0..count)
                .into_par_iter()
                .fold(
                    || (ResultStore::new(), Tally::default()),
                    |(mut shard, mut shard_tally), index| {
                        if !self.cancellation.is_cancelled() {
                            let indices = sequence_at(index, compounds, stints);
                            self.process_sequence(&indices, &mut shard, &mut shard_tally);
                            tracker.tick();
                        }
                        (shard, shard_tally)
                    },
                )
                .reduce(
                    || (ResultStore::new(), Tally::default()),
                    |(mut left, mut left_tally), (right, right_tally)| {
                        left.merge(right);
                        left_tally += right_tally;
                        (left, left_tally)
                    },
                );

            store.merge(shard);
            tally += shard_tally;
        }

        let cancelled = self.cancellation.is_cancelled() && tally.sequences < tracker.total();
        Ok((store, tally, cancelled))
    }

    /// Score every partition of one compound sequence into `store`.
    fn process_sequence(&self, indices: &[usize], store: &mut ResultStore, tally: &mut Tally) {
        tally.sequences += 1;

        if !has_coverage(indices) {
            tally.coverage_rejected += 1;
            return;
        }

        let sequence: Vec<Arc<Compound>> = indices
            .iter()
            .filter_map(|&i| self.catalog.at(i).cloned())
            .collect();
        let fuel_range_laps = self.config.fuel_range_laps;
        let bounds: Vec<u32> = sequence
            .iter()
            .map(|c| c.max_stint_laps(fuel_range_laps))
            .collect();

        let mut found = 0u64;
        for stint_laps in partitions(self.config.total_laps, &bounds) {
            tally.partitions_scored += 1;
            let scored = self.scorer.score(
                &sequence,
                &stint_laps,
                fuel_range_laps,
                self.config.pit_loss_secs,
            );
            match scored {
                Some(total_time_secs) => {
                    let stints = sequence
                        .iter()
                        .cloned()
                        .zip(stint_laps)
                        .map(|(compound, laps)| StintPlan::new(compound, laps))
                        .collect();
                    store.add(Strategy::new(stints, total_time_secs));
                    found += 1;
                }
                None => tally.infeasible += 1,
            }
        }
        tally.strategies += found;

        trace!(
            sequence = ?sequence.iter().map(|c| c.name()).collect::<Vec<_>>(),
            bounds = ?bounds,
            candidates = count_partitions(self.config.total_laps, &bounds),
            strategies = found,
            "Processed compound sequence"
        );
    }
}

/// Run a sequential search with default settings.
pub fn run(catalog: &CompoundCatalog, config: &RaceConfig) -> Result<SearchOutcome, ConfigError> {
    SequenceEnumerator::new(catalog, config).run()
}
