//! Stderr logger for the command line driver

use std::io::Write;
use std::str::FromStr;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Environment variable holding the log level
pub const LOG_ENV: &str = "VMSIM_LOG";

/// Level used when `VMSIM_LOG` is unset or unparsable
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::Warn;

pub struct StderrLogger {
    max_level: LevelFilter,
}

impl StderrLogger {
    #[must_use]
    pub const fn new(max_level: LevelFilter) -> Self {
        Self { max_level }
    }

    /// Build a logger from `VMSIM_LOG`
    pub fn from_env() -> Self {
        Self::new(parse_level(std::env::var(LOG_ENV).ok().as_deref()))
    }

    /// Call this once, before the first request is handled.
    pub fn init(self) -> Result<(), SetLoggerError> {
        let max_level = self.max_level;
        log::set_logger(Box::leak(Box::new(self)))?;
        log::set_max_level(max_level);
        Ok(())
    }
}

/// Parse a level name, falling back to [`DEFAULT_LEVEL`]
pub fn parse_level(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|v| LevelFilter::from_str(v.trim()).ok())
        .unwrap_or(DEFAULT_LEVEL)
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        // Format: "[LEVEL] target: message"
        let _ = writeln!(
            std::io::stderr().lock(),
            "[{}] {}: {}",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}
