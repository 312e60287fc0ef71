//! Race configuration.

use std::fmt;

use crate::error::ConfigError;

/// Default race length in laps.
pub const DEFAULT_TOTAL_LAPS: u32 = 50;

/// Default time lost per pit stop in seconds.
pub const DEFAULT_PIT_LOSS_SECS: f64 = 25.0;

/// Default number of laps one fuel load lasts.
pub const DEFAULT_FUEL_RANGE_LAPS: u32 = 20;

/// Default upper limit on pit stops explored.
pub const DEFAULT_MAX_STOPS: u32 = 3;

/// Immutable description of the race a strategy is planned for.
///
/// Passed once per search run; the search never re-reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceConfig {
    /// Race length in laps.
    pub total_laps: u32,

    /// Fixed time cost of one pit stop in seconds.
    pub pit_loss_secs: f64,

    /// Laps sustainable on one fuel load, regardless of compound.
    pub fuel_range_laps: u32,

    /// Highest stop count explored (inclusive).
    pub max_stops: u32,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            total_laps: DEFAULT_TOTAL_LAPS,
            pit_loss_secs: DEFAULT_PIT_LOSS_SECS,
            fuel_range_laps: DEFAULT_FUEL_RANGE_LAPS,
            max_stops: DEFAULT_MAX_STOPS,
        }
    }
}

impl RaceConfig {
    /// Create a race configuration.
    pub fn new(total_laps: u32, pit_loss_secs: f64, fuel_range_laps: u32, max_stops: u32) -> Self {
        Self {
            total_laps,
            pit_loss_secs,
            fuel_range_laps,
            max_stops,
        }
    }

    /// Set the race length.
    pub fn with_total_laps(mut self, laps: u32) -> Self {
        self.total_laps = laps;
        self
    }

    /// Set the pit loss.
    pub fn with_pit_loss_secs(mut self, secs: f64) -> Self {
        self.pit_loss_secs = secs;
        self
    }

    /// Set the fuel range.
    pub fn with_fuel_range_laps(mut self, laps: u32) -> Self {
        self.fuel_range_laps = laps;
        self
    }

    /// Set the stop-count ceiling.
    pub fn with_max_stops(mut self, stops: u32) -> Self {
        self.max_stops = stops;
        self
    }

    /// Check the configuration before a search.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_laps < 1 {
            return Err(ConfigError::InvalidTotalLaps(self.total_laps));
        }
        if self.fuel_range_laps < 1 {
            return Err(ConfigError::InvalidFuelRange(self.fuel_range_laps));
        }
        if !self.pit_loss_secs.is_finite() || self.pit_loss_secs < 0.0 {
            return Err(ConfigError::InvalidPitLoss(self.pit_loss_secs));
        }
        Ok(())
    }

    /// Fewest stops any strategy needs, ignoring compound wear.
    ///
    /// Useful for explaining an empty result: below this count the fuel range
    /// alone makes every split infeasible.
    pub fn min_stops_for_fuel(&self) -> u32 {
        if self.fuel_range_laps == 0 {
            return u32::MAX;
        }
        self.total_laps.div_ceil(self.fuel_range_laps).saturating_sub(1)
    }
}

impl fmt::Display for RaceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} laps, {:.1}s pit loss, {} laps per tank, up to {} stops",
            self.total_laps, self.pit_loss_secs, self.fuel_range_laps, self.max_stops
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_race_config() {
        let config = RaceConfig::default();
        assert_eq!(config.total_laps, 50);
        assert_eq!(config.pit_loss_secs, 25.0);
        assert_eq!(config.fuel_range_laps, 20);
        assert_eq!(config.max_stops, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = RaceConfig::default()
            .with_total_laps(60)
            .with_pit_loss_secs(21.5)
            .with_fuel_range_laps(30)
            .with_max_stops(1);
        assert_eq!(config, RaceConfig::new(60, 21.5, 30, 1));
    }

    #[test]
    fn test_validate_zero_laps() {
        let config = RaceConfig::default().with_total_laps(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidTotalLaps(0)));
    }

    #[test]
    fn test_validate_zero_fuel_range() {
        let config = RaceConfig::default().with_fuel_range_laps(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidFuelRange(0)));
    }

    #[test]
    fn test_validate_negative_pit_loss() {
        let config = RaceConfig::default().with_pit_loss_secs(-1.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPitLoss(_))
        ));
    }

    #[test]
    fn test_min_stops_for_fuel() {
        assert_eq!(RaceConfig::default().min_stops_for_fuel(), 2);
        assert_eq!(
            RaceConfig::default()
                .with_fuel_range_laps(50)
                .min_stops_for_fuel(),
            0
        );
        assert_eq!(
            RaceConfig::default()
                .with_fuel_range_laps(25)
                .min_stops_for_fuel(),
            1
        );
    }
}
