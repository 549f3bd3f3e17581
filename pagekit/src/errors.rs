//! Error types for pagekit.
//!
//! Most page operations are infallible by contract (timers either fire or are
//! superseded, clipboard failures end in a notification). The errors below
//! cover the few surfaces that do report failure to the caller.

use thiserror::Error;

/// The main error type for pagekit operations.
#[derive(Debug, Error)]
pub enum PageError {
    /// A share link was requested for a platform we do not know.
    #[error("Unsupported platform: {platform}")]
    UnsupportedPlatform {
        /// The platform tag as given by the caller.
        platform: String,
    },

    /// An element lookup failed.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// A clipboard capability failed.
    #[error("{0}")]
    Clipboard(#[from] ClipboardError),

    /// A date string could not be parsed.
    #[error("Invalid date: {0}")]
    InvalidDate(#[from] chrono::ParseError),

    /// The configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PageError {
    /// Creates an unsupported platform error.
    #[must_use]
    pub fn unsupported_platform(platform: impl Into<String>) -> Self {
        Self::UnsupportedPlatform {
            platform: platform.into(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Short machine-readable code, used as the `error` field of page events.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedPlatform { .. } => "unsupported_platform",
            Self::ElementNotFound(_) => "element_not_found",
            Self::Clipboard(_) => "clipboard",
            Self::InvalidDate(_) => "invalid_date",
            Self::Config(_) => "config",
            Self::Serialization(_) => "serialization",
            Self::Io(_) => "io",
        }
    }
}

/// Errors reported by clipboard capabilities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClipboardError {
    /// The browser refused the write (permissions, focus, ...).
    #[error("Clipboard write rejected: {0}")]
    Rejected(String),

    /// The legacy copy command threw.
    #[error("Copy command failed: {0}")]
    CommandFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_platform_message() {
        let err = PageError::unsupported_platform("myspace");
        assert_eq!(err.to_string(), "Unsupported platform: myspace");
        assert_eq!(err.code(), "unsupported_platform");
    }

    #[test]
    fn test_clipboard_error_converts() {
        let err: PageError = ClipboardError::Rejected("denied".into()).into();
        assert!(matches!(err, PageError::Clipboard(_)));
        assert_eq!(err.to_string(), "Clipboard write rejected: denied");
    }

    #[test]
    fn test_serialization_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: PageError = json_err.into();
        assert_eq!(err.code(), "serialization");
    }
}
