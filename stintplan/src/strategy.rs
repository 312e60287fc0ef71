//! Strategy records produced by the search.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::compound::Compound;

/// Separator between compound names in a rendered tire sequence.
pub const SEQUENCE_SEPARATOR: &str = " → ";

/// One driving segment: a compound and the laps it runs.
#[derive(Debug, Clone, PartialEq)]
pub struct StintPlan {
    /// Compound fitted for this stint.
    pub compound: Arc<Compound>,
    /// Laps driven on it.
    pub laps: u32,
}

impl StintPlan {
    /// Create a stint.
    pub fn new(compound: Arc<Compound>, laps: u32) -> Self {
        Self { compound, laps }
    }

    /// Lap time accumulated over this stint, excluding pit loss.
    pub fn driving_time_secs(&self) -> f64 {
        self.compound.base_lap_time_secs() * f64::from(self.laps)
    }
}

/// A complete, feasible race strategy.
///
/// Immutable once emitted by the search.
#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    stints: Vec<StintPlan>,
    pit_stop_laps: Vec<u32>,
    total_time_secs: f64,
}

impl Strategy {
    /// Create a strategy from its stints and scored total time.
    ///
    /// Pit stop laps are derived as the running lap totals at the end of
    /// every stint but the last.
    pub fn new(stints: Vec<StintPlan>, total_time_secs: f64) -> Self {
        let pit_stop_laps = stints
            .iter()
            .scan(0u32, |lap, stint| {
                *lap += stint.laps;
                Some(*lap)
            })
            .take(stints.len().saturating_sub(1))
            .collect();

        Self {
            stints,
            pit_stop_laps,
            total_time_secs,
        }
    }

    /// Stints in driving order.
    pub fn stints(&self) -> &[StintPlan] {
        &self.stints
    }

    /// Absolute lap number of each pit entry.
    pub fn pit_stop_laps(&self) -> &[u32] {
        &self.pit_stop_laps
    }

    /// Total elapsed race time in seconds, including pit loss.
    pub fn total_time_secs(&self) -> f64 {
        self.total_time_secs
    }

    /// Number of pit stops (stints minus one).
    pub fn pit_stop_count(&self) -> u32 {
        self.stints.len().saturating_sub(1) as u32
    }

    /// Laps across all stints.
    pub fn total_laps(&self) -> u32 {
        self.stints.iter().map(|s| s.laps).sum()
    }

    /// Lap count of each stint.
    pub fn stint_laps(&self) -> Vec<u32> {
        self.stints.iter().map(|s| s.laps).collect()
    }

    /// Compound names in driving order.
    pub fn compound_names(&self) -> Vec<&str> {
        self.stints.iter().map(|s| s.compound.name()).collect()
    }

    /// Number of distinct compounds used.
    pub fn distinct_compounds(&self) -> usize {
        self.stints
            .iter()
            .map(|s| s.compound.name())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Whether any stint runs the named compound.
    pub fn uses_compound(&self, name: &str) -> bool {
        self.stints.iter().any(|s| s.compound.name() == name)
    }

    /// Compound names joined in driving order, e.g. `Soft → Hard`.
    pub fn tire_sequence(&self) -> String {
        self.compound_names().join(SEQUENCE_SEPARATOR)
    }

    /// Flatten into a row for tabular or JSON output.
    pub fn to_row(&self) -> StrategyRow {
        StrategyRow {
            tire_sequence: self.tire_sequence(),
            stint_laps: self.stint_laps(),
            pit_stop_laps: self.pit_stop_laps.clone(),
            pit_stops: self.pit_stop_count(),
            total_time_secs: round_centis(self.total_time_secs),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stints: Vec<String> = self
            .stints
            .iter()
            .map(|s| format!("{} x{}", s.compound.name(), s.laps))
            .collect();
        write!(
            f,
            "{} ({} stops, {:.2}s)",
            stints.join(SEQUENCE_SEPARATOR),
            self.pit_stop_count(),
            self.total_time_secs
        )
    }
}

/// Flat view of a strategy with display columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyRow {
    /// Compound names joined in driving order.
    pub tire_sequence: String,
    /// Lap count per stint.
    pub stint_laps: Vec<u32>,
    /// Absolute lap number of each pit entry.
    pub pit_stop_laps: Vec<u32>,
    /// Number of pit stops.
    pub pit_stops: u32,
    /// Total race time, rounded to two decimals.
    pub total_time_secs: f64,
}

fn round_centis(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stint(name: &str, wear: u32, lap_time: f64, laps: u32) -> StintPlan {
        StintPlan::new(Arc::new(Compound::new(name, wear, lap_time)), laps)
    }

    fn three_stop_strategy() -> Strategy {
        Strategy::new(
            vec![
                stint("Soft", 15, 90.0, 15),
                stint("Medium", 25, 92.0, 20),
                stint("Hard", 40, 95.0, 15),
            ],
            4665.0,
        )
    }

    #[test]
    fn test_pit_stop_laps_are_prefix_sums() {
        let strategy = three_stop_strategy();
        assert_eq!(strategy.pit_stop_laps(), &[15, 35]);
        assert_eq!(strategy.pit_stop_count(), 2);
        assert_eq!(strategy.total_laps(), 50);
    }

    #[test]
    fn test_no_stop_strategy_has_no_pit_laps() {
        let strategy = Strategy::new(vec![stint("Hard", 60, 95.0, 30)], 2850.0);
        assert!(strategy.pit_stop_laps().is_empty());
        assert_eq!(strategy.pit_stop_count(), 0);
    }

    #[test]
    fn test_tire_sequence_and_compounds() {
        let strategy = three_stop_strategy();
        assert_eq!(strategy.tire_sequence(), "Soft → Medium → Hard");
        assert_eq!(strategy.distinct_compounds(), 3);
        assert!(strategy.uses_compound("Medium"));
        assert!(!strategy.uses_compound("Wet"));
    }

    #[test]
    fn test_row_rounds_total_time() {
        let strategy = Strategy::new(
            vec![stint("Soft", 15, 90.123, 10), stint("Hard", 40, 95.0, 10)],
            1877.23456,
        );
        let row = strategy.to_row();
        assert_eq!(row.total_time_secs, 1877.23);
        assert_eq!(row.stint_laps, vec![10, 10]);
        assert_eq!(row.pit_stop_laps, vec![10]);
        assert_eq!(row.pit_stops, 1);
    }

    #[test]
    fn test_stint_driving_time() {
        assert_eq!(stint("Medium", 25, 92.0, 20).driving_time_secs(), 1840.0);
    }

    #[test]
    fn test_display() {
        let text = three_stop_strategy().to_string();
        assert!(text.contains("Soft x15"));
        assert!(text.contains("2 stops"));
        assert!(text.contains("4665.00s"));
    }

    #[test]
    fn test_row_serializes_columns() {
        let row = three_stop_strategy().to_row();
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["tire_sequence"], "Soft → Medium → Hard");
        assert_eq!(value["pit_stops"], 2);
        assert_eq!(value["pit_stop_laps"], serde_json::json!([15, 35]));
    }
}
