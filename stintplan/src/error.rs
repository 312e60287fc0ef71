//! Error types for strategy search.
//!
//! Configuration problems are detected before any enumeration work starts and
//! reported as [`ConfigError`]. Infeasible candidates are never errors; they
//! are skipped inside the search loop and only show up as a smaller result set.

use thiserror::Error;

/// Result type for search operations.
pub type SearchResult<T> = Result<T, SearchError>;

/// Invalid race or compound configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The compound catalog has no entries.
    #[error("compound catalog is empty")]
    EmptyCatalog,

    /// Race length below one lap.
    #[error("total laps must be at least 1 (got {0})")]
    InvalidTotalLaps(u32),

    /// Fuel range below one lap.
    #[error("fuel range must be at least 1 lap (got {0})")]
    InvalidFuelRange(u32),

    /// Pit loss negative or not finite.
    #[error("pit loss must be a finite, non-negative number of seconds (got {0})")]
    InvalidPitLoss(f64),

    /// Compound with a wear limit of zero laps.
    #[error("compound '{name}' must have a wear limit of at least 1 lap")]
    InvalidWearLimit { name: String },

    /// Compound lap time negative or not finite.
    #[error("compound '{name}' has an invalid base lap time: {value}")]
    InvalidLapTime { name: String, value: f64 },

    /// Two compounds share a name.
    #[error("duplicate compound name '{0}'")]
    DuplicateCompound(String),

    /// The number of candidate compound sequences does not fit in 64 bits.
    #[error("search space too large: {compounds} compounds with up to {stints} stints")]
    SearchSpaceTooLarge { compounds: usize, stints: u32 },
}

/// Errors surfaced by a completed search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// The configuration was rejected before the search started.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No feasible strategy exists for the configuration.
    ///
    /// This is not fatal; callers usually ask for relaxed parameters.
    #[error("no viable strategies found")]
    NoViableStrategies,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidWearLimit {
            name: "Soft".to_string(),
        };
        assert!(err.to_string().contains("Soft"));
        assert!(err.to_string().contains("wear limit"));
    }

    #[test]
    fn test_search_error_from_config_error() {
        let err: SearchError = ConfigError::EmptyCatalog.into();
        assert!(matches!(err, SearchError::Config(ConfigError::EmptyCatalog)));
        assert!(err.to_string().contains("catalog is empty"));
    }
}
