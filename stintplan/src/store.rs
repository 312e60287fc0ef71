//! Accumulated search results.
//!
//! [`ResultStore`] holds every feasible strategy in insertion order. Filtering
//! returns a new store, so a caller can re-filter the same results as often as
//! it likes without re-running the search.

use std::collections::BTreeSet;

use crate::strategy::Strategy;

/// Default number of strategies returned by top-K queries.
pub const DEFAULT_TOP_K: usize = 10;

/// Predicate over stop count and compound usage.
///
/// A strategy matches when its stop count is in `stops_allowed` and at least
/// one of its stints uses a compound in `compounds_allowed`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategyFilter {
    /// Stop counts to keep.
    pub stops_allowed: BTreeSet<u32>,
    /// Compound names of which at least one must appear.
    pub compounds_allowed: BTreeSet<String>,
}

impl StrategyFilter {
    /// Create a filter from explicit sets.
    pub fn new(
        stops_allowed: impl IntoIterator<Item = u32>,
        compounds_allowed: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            stops_allowed: stops_allowed.into_iter().collect(),
            compounds_allowed: compounds_allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// A filter that admits everything currently in `store`.
    pub fn allow_all(store: &ResultStore) -> Self {
        Self {
            stops_allowed: store.stop_counts(),
            compounds_allowed: store.compound_names(),
        }
    }

    /// Replace the allowed stop counts.
    pub fn with_stops(mut self, stops: impl IntoIterator<Item = u32>) -> Self {
        self.stops_allowed = stops.into_iter().collect();
        self
    }

    /// Replace the allowed compounds.
    pub fn with_compounds(
        mut self,
        compounds: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.compounds_allowed = compounds.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `strategy` passes the filter.
    pub fn matches(&self, strategy: &Strategy) -> bool {
        self.stops_allowed.contains(&strategy.pit_stop_count())
            && self
                .compounds_allowed
                .iter()
                .any(|name| strategy.uses_compound(name))
    }
}

/// Unordered collection of feasible strategies.
///
/// Insertion order carries no meaning except for breaking ties between
/// strategies with equal total time in [`ResultStore::top_k`].
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    strategies: Vec<Strategy>,
}

impl ResultStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy.
    pub fn add(&mut self, strategy: Strategy) {
        self.strategies.push(strategy);
    }

    /// Append every strategy of `other`, keeping its order after ours.
    pub fn merge(&mut self, other: ResultStore) {
        self.strategies.extend(other.strategies);
    }

    /// Number of strategies.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Iterate strategies in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Strategy> {
        self.strategies.iter()
    }

    /// Strategies matching `filter`, as a new store in the same order.
    pub fn filter(&self, filter: &StrategyFilter) -> ResultStore {
        ResultStore {
            strategies: self
                .strategies
                .iter()
                .filter(|s| filter.matches(s))
                .cloned()
                .collect(),
        }
    }

    /// The `n` fastest strategies, ascending by total time.
    ///
    /// Equal times keep insertion order. An empty store gives an empty
    /// vector.
    pub fn top_k(&self, n: usize) -> Vec<&Strategy> {
        let mut ranked: Vec<&Strategy> = self.strategies.iter().collect();
        ranked.sort_by(|a, b| a.total_time_secs().total_cmp(&b.total_time_secs()));
        ranked.truncate(n);
        ranked
    }

    /// The fastest strategy, if any.
    pub fn best(&self) -> Option<&Strategy> {
        self.top_k(1).into_iter().next()
    }

    /// Distinct stop counts present.
    pub fn stop_counts(&self) -> BTreeSet<u32> {
        self.strategies.iter().map(|s| s.pit_stop_count()).collect()
    }

    /// Distinct compound names used by any strategy.
    pub fn compound_names(&self) -> BTreeSet<String> {
        self.strategies
            .iter()
            .flat_map(|s| s.stints().iter().map(|st| st.compound.name().to_string()))
            .collect()
    }
}

impl FromIterator<Strategy> for ResultStore {
    fn from_iter<I: IntoIterator<Item = Strategy>>(iter: I) -> Self {
        Self {
            strategies: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ResultStore {
    type Item = Strategy;
    type IntoIter = std::vec::IntoIter<Strategy>;

    fn into_iter(self) -> Self::IntoIter {
        self.strategies.into_iter()
    }
}
