//! Logging infrastructure
//!
//! Structured logging through the `tracing` crate: configurable level,
//! human-readable or JSON output, optional daily-rotated file logs. The
//! bridge lives inside someone else's process, so the default sink is a log
//! file next to the host rather than a console nobody sees.

use parking_lot::Mutex;
use tracing::Level;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, EnvFilter};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable with timestamps
    Pretty,
    /// Compact single-line format
    Compact,
    /// JSON for structured collection
    Json,
}

/// Log output destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stderr,
    /// Daily-rotated file
    File { directory: String, prefix: String },
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level
    pub level: Level,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Extra filter directives (e.g. "vmbridge=trace")
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Compact,
            output: LogOutput::Stderr,
            filter: None,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

// A cdylib has no main to park the appender guard on; it lives here for the
// process lifetime.
static GUARD: Mutex<Option<WorkerGuard>> = Mutex::new(None);

/// Initialize the global logging system.
///
/// Returns false when a subscriber was already installed (for instance by the
/// embedding test harness); the existing subscriber stays in place.
pub fn init_logging(config: &LogConfig) -> bool {
    let filter = build_filter(config);

    let (writer, guard) = match &config.output {
        LogOutput::Stderr => tracing_appender::non_blocking(std::io::stderr()),
        LogOutput::File { directory, prefix } => {
            tracing_appender::non_blocking(rolling::daily(directory, prefix))
        }
    };

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(matches!(config.output, LogOutput::Stderr));

    let installed = match config.format {
        LogFormat::Pretty => builder.pretty().try_init().is_ok(),
        LogFormat::Compact => builder.compact().try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    };

    if installed {
        *GUARD.lock() = Some(guard);
    }
    installed
}

fn build_filter(config: &LogConfig) -> EnvFilter {
    let base = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(config.level.into()));

    match &config.filter {
        Some(directives) => directives
            .split(',')
            .fold(base, |filter, directive| match directive.parse() {
                Ok(parsed) => filter.add_directive(parsed),
                Err(_) => {
                    eprintln!("vmbridge: invalid log filter directive: {directive}");
                    filter
                }
            }),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = LogConfig::new()
            .with_level(Level::DEBUG)
            .with_format(LogFormat::Json)
            .with_filter("vmbridge=trace");

        assert_eq!(config.level, Level::DEBUG);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.filter.as_deref(), Some("vmbridge=trace"));
    }

    #[test]
    fn second_init_is_rejected_gracefully() {
        let config = LogConfig::default();
        let first = init_logging(&config);
        let second = init_logging(&config);
        // Whichever test installed the subscriber first wins; the second
        // attempt must simply report false.
        if first {
            assert!(!second);
        }
    }
}
