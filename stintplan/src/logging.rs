//! Tracing subscriber setup.
//!
//! Library code only emits `tracing` events. Binaries call [`init_logging`]
//! once at startup to install a subscriber that writes human-readable lines
//! to stderr and, optionally, plain lines to a log file.
//!
//! The filter comes from `RUST_LOG` when set, otherwise from
//! [`LoggingConfig::default_filter`].

use std::path::PathBuf;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "stintplan=info";

const TIME_FORMAT: &str = "[hour]:[minute]:[second].[subsecond digits:3]";

/// Errors installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directive could not be parsed.
    #[error("invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    /// The log file path has no file name component.
    #[error("invalid log file path: {}", .0.display())]
    InvalidLogFile(PathBuf),

    /// The timestamp format could not be built.
    #[error("invalid timestamp format: {0}")]
    TimeFormat(String),

    /// A global subscriber is already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Init(String),
}

/// Logging options.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub default_filter: String,

    /// Additional plain-text log file.
    pub log_file: Option<PathBuf>,

    /// Colour stderr output.
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: DEFAULT_LOG_FILTER.to_string(),
            log_file: None,
            ansi: true,
        }
    }
}

impl LoggingConfig {
    /// Set the fallback filter directive.
    pub fn with_default_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }

    /// Also log to a file.
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Enable or disable colour on stderr.
    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    fn filter(&self) -> Result<EnvFilter, LoggingError> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(&self.default_filter).map_err(|e| LoggingError::InvalidFilter {
            filter: self.default_filter.clone(),
            reason: e.to_string(),
        })
    }
}

/// Keeps the background log writer alive.
///
/// Dropping the guard flushes pending file output, so hold it until exit.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global tracing subscriber.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    let filter = config.filter()?;

    let time_format = time::format_description::parse_borrowed::<2>(TIME_FORMAT)
        .map_err(|e| LoggingError::TimeFormat(e.to_string()))?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi)
        .with_timer(LocalTime::new(time_format.clone()))
        .with_target(false);

    let (file_layer, file_guard) = match &config.log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .ok_or_else(|| LoggingError::InvalidLogFile(path.clone()))?;
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_timer(LocalTime::new(time_format));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}
