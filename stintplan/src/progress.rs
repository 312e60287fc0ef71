//! Progress reporting for strategy searches.
//!
//! The search ticks a [`ProgressTracker`] once per candidate compound
//! sequence (not per partition). The tracker keeps an atomic counter so
//! parallel workers can share it, and forwards ticks to an optional callback
//! supplied by the surrounding application.
//!
//! Callback values are strictly increasing. When parallel workers race, a
//! tick overtaken by a later one is not reported, but the final count always
//! is.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Progress callback invoked with `(processed, total)` candidate sequences.
///
/// Called from search workers, so it must return quickly and must not block.
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Shared progress counter for one search run.
pub struct ProgressTracker {
    processed: AtomicU64,
    total: u64,
    callback: Option<ProgressCallback>,
    reported: Mutex<u64>,
}

impl ProgressTracker {
    /// Create a tracker expecting `total` ticks.
    pub fn new(total: u64, callback: Option<ProgressCallback>) -> Self {
        Self {
            processed: AtomicU64::new(0),
            total,
            callback,
            reported: Mutex::new(0),
        }
    }

    /// Record one processed sequence and notify the callback.
    pub fn tick(&self) {
        let processed = self.processed.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(ref callback) = self.callback {
            let mut reported = self
                .reported
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if processed > *reported {
                *reported = processed;
                callback(processed, self.total);
            }
        }
    }

    /// Sequences processed so far.
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::SeqCst)
    }

    /// Expected number of sequences.
    pub fn total(&self) -> u64 {
        self.total
    }
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("processed", &self.processed())
            .field("total", &self.total)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}
