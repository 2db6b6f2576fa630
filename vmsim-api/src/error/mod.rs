//! Error handling module for VMSIM
//!
//! Only request-level failures live here. A translation that hits an invalid
//! segment or an out-of-range offset is a normal simulation outcome and is
//! reported as data by the segmentation engine, never through [`Error`].

use core::fmt;
use alloc::format;
use alloc::string::{String, ToString};

/// Common error type used throughout VMSIM
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An operation was issued before the engine it targets was initialized
    NotInitialized(String),
    /// Simulation parameters were rejected (policy, references, frames, segments)
    InvalidConfiguration(String),
    /// A response could not be rendered
    Serialization(String),
}

impl Error {
    /// Returns the message carried by the error, without its category prefix
    pub fn message(&self) -> &str {
        match self {
            Error::NotInitialized(msg)
            | Error::InvalidConfiguration(msg)
            | Error::Serialization(msg) => msg,
        }
    }

    /// Returns true for [`Error::NotInitialized`]
    pub fn is_not_initialized(&self) -> bool {
        matches!(self, Error::NotInitialized(_))
    }

    /// Returns true for [`Error::InvalidConfiguration`]
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, Error::InvalidConfiguration(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotInitialized(what) => write!(f, "not initialized: {}", what),
            Error::InvalidConfiguration(msg) => write!(f, "invalid configuration: {}", msg),
            Error::Serialization(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl core::error::Error for Error {}

/// Result type for operations that can fail
pub type Result<T> = core::result::Result<T, Error>;

/// Error context trait for adding context to errors
///
/// The category of the error is preserved; only the message is prefixed.
pub trait ErrorContext<T> {
    /// Adds context to the error
    fn context(self, context: &str) -> Result<T>;
}

impl<T> ErrorContext<T> for Result<T> {
    fn context(self, context: &str) -> Result<T> {
        self.map_err(|error| match error {
            Error::NotInitialized(msg) => Error::NotInitialized(format!("{}: {}", context, msg)),
            Error::InvalidConfiguration(msg) => {
                Error::InvalidConfiguration(format!("{}: {}", context, msg))
            }
            Error::Serialization(msg) => Error::Serialization(format!("{}: {}", context, msg)),
        })
    }
}

/// Creates a new not-initialized error naming the missing engine
pub fn not_initialized(what: &str) -> Error {
    Error::NotInitialized(what.to_string())
}

/// Creates a new invalid configuration error
pub fn invalid_configuration(msg: &str) -> Error {
    Error::InvalidConfiguration(msg.to_string())
}

/// Creates a new serialization error
pub fn serialization(msg: &str) -> Error {
    Error::Serialization(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_display_prefixes_category() {
        assert_eq!(not_initialized("paging").to_string(), "not initialized: paging");
        assert_eq!(
            invalid_configuration("unknown policy 'MRU'").to_string(),
            "invalid configuration: unknown policy 'MRU'"
        );
    }

    #[test]
    fn test_context_keeps_variant() {
        let result: Result<()> = Err(invalid_configuration("frame count must be positive"));
        let error = result.context("init").unwrap_err();
        assert!(error.is_invalid_configuration());
        assert_eq!(error.message(), "init: frame count must be positive");
    }
}
