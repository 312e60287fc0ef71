//! Stintplan - pit stop strategy search for fixed-length races
//!
//! This library enumerates every admissible way to split a race into stints,
//! assigns a tire compound to each stint, and ranks the resulting strategies
//! by total race time under per-compound wear limits and a global fuel range.
//!
//! # Architecture
//!
//! ```text
//! SequenceEnumerator ──► partitions() ──► StrategyScorer ──► ResultStore
//!   (stop counts,         (bounded stint    (feasibility +     (filter,
//!    compound sequences)   lengths)          total time)        top-K)
//! ```
//!
//! # Example
//!
//! ```
//! use stintplan::{CompoundCatalog, RaceConfig, StrategyFilter, SequenceEnumerator};
//!
//! let catalog = CompoundCatalog::standard();
//! let config = RaceConfig::new(50, 25.0, 20, 2);
//!
//! let outcome = SequenceEnumerator::new(&catalog, &config).run()?;
//! let store = outcome.store();
//!
//! for strategy in store.top_k(3) {
//!     println!("{}", strategy);
//! }
//!
//! let two_stops = store.filter(&StrategyFilter::allow_all(store).with_stops([2]));
//! assert_eq!(two_stops.len(), store.len());
//! # Ok::<(), stintplan::ConfigError>(())
//! ```

pub mod compound;
pub mod config;
pub mod error;
pub mod logging;
pub mod partition;
pub mod progress;
pub mod race;
pub mod scorer;
pub mod search;
pub mod store;
pub mod strategy;

pub use compound::{Compound, CompoundCatalog};
pub use error::{ConfigError, SearchError, SearchResult};
pub use partition::{count_partitions, partitions, Partitions};
pub use progress::ProgressCallback;
pub use race::RaceConfig;
pub use scorer::{score, DirectScorer, MemoScorer, MemoStats, StrategyScorer};
pub use search::{run, SearchMode, SearchOutcome, SearchStats, SequenceEnumerator};
pub use store::{ResultStore, StrategyFilter, DEFAULT_TOP_K};
pub use strategy::{StintPlan, Strategy, StrategyRow};
