//! CLI error type.

use std::fmt;

use stintplan::config::ConfigFileError;
use stintplan::logging::LoggingError;
use stintplan::{ConfigError, SearchError};

/// Errors surfaced to the user by the CLI.
#[derive(Debug)]
pub enum CliError {
    /// Invalid arguments or environment setup.
    Config(String),
    /// The configuration file could not be read or written.
    ConfigFile(ConfigFileError),
    /// Race parameters or catalog rejected by the search.
    Search(ConfigError),
    /// The tracing subscriber could not be installed.
    Logging(LoggingError),
    /// Results could not be serialized.
    Output(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "{}", msg),
            CliError::ConfigFile(e) => write!(f, "Configuration file error: {}", e),
            CliError::Search(e) => write!(f, "Invalid race setup: {}", e),
            CliError::Logging(e) => write!(f, "Logging setup failed: {}", e),
            CliError::Output(e) => write!(f, "Failed to write output: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(_) => None,
            CliError::ConfigFile(e) => Some(e),
            CliError::Search(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Output(e) => Some(e),
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Search(e)
    }
}

impl From<SearchError> for CliError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::Config(e) => CliError::Search(e),
            other => CliError::Config(other.to_string()),
        }
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_search_config_error_is_unwrapped() {
        let err = CliError::from(SearchError::Config(ConfigError::EmptyCatalog));
        assert!(matches!(err, CliError::Search(ConfigError::EmptyCatalog)));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_display_includes_cause() {
        let err = CliError::from(ConfigError::InvalidTotalLaps(0));
        let msg = err.to_string();
        assert!(msg.starts_with("Invalid race setup"));
        assert!(msg.contains(&ConfigError::InvalidTotalLaps(0).to_string()));
    }

    #[test]
    fn test_plain_config_message() {
        let err = CliError::Config("bad flag".to_string());
        assert_eq!(err.to_string(), "bad flag");
        assert!(err.source().is_none());
    }
}
