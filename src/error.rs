//! Error types for the session state engine.
//!
//! Packet-update methods never return errors: missing data is represented as
//! `None` and background failures are logged. The errors in this module are
//! for the edges of the engine: loading configuration, talking to the engine
//! task, persisting dumps, and external lookups.
//!
//! ## Error Categories
//!
//! - **Configuration Errors**: Invalid or unreadable settings
//! - **Command Errors**: Invalid UDP action code fields or values
//! - **Persistence Errors**: Failed post-race dump writes
//! - **Engine Errors**: The engine task stopped or a packet source failed
//! - **Lookup Errors**: External pole-lap lookups that failed
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use paddock::EngineError;
//!
//! let error = EngineError::source_failed("decoder stalled");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;

/// Main error type for engine operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EngineError {
    #[error("Configuration error in {context}: {details}")]
    Config { context: String, details: String },

    #[error("Unknown UDP action code field '{field}'")]
    InvalidActionCodeField { field: String },

    #[error("UDP action code {code} is out of range (expected 1..=12)")]
    ActionCodeOutOfRange { code: u8 },

    #[error("Failed to persist session dump: {path}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error in {context}: {details}")]
    Serialization { context: String, details: String },

    #[error("Engine task is no longer running")]
    EngineStopped,

    #[error("Packet source error: {reason}")]
    Source {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("External lookup failed: {reason}")]
    Lookup {
        reason: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl EngineError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Source { .. } => true,
            EngineError::Lookup { .. } => true,
            EngineError::Persistence { .. } => true,
            EngineError::Config { .. } => false,
            EngineError::InvalidActionCodeField { .. } => false,
            EngineError::ActionCodeOutOfRange { .. } => false,
            EngineError::Serialization { .. } => false,
            EngineError::EngineStopped => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            EngineError::Config { .. } => vec![
                "Check the settings file is valid YAML",
                "Verify every UDP action code is between 1 and 12",
                "Remove unknown keys from the settings file",
            ],
            EngineError::InvalidActionCodeField { .. } => vec![
                "Use one of: custom_marker, tyre_delta, hud_toggle",
                "Check the field name spelling",
            ],
            EngineError::ActionCodeOutOfRange { .. } => {
                vec!["Pick a UDP action button between 1 and 12", "Clear the binding instead"]
            }
            EngineError::Persistence { .. } => vec![
                "Check the output directory exists and is writable",
                "Ensure sufficient disk space",
                "Trigger a manual save once the issue is fixed",
            ],
            EngineError::Serialization { .. } => {
                vec!["Check the projection contains only finite numbers", "Report the issue"]
            }
            EngineError::EngineStopped => vec![
                "Check whether the engine was cancelled",
                "Restart the engine with a fresh packet source",
            ],
            EngineError::Source { .. } => vec![
                "Verify the game is sending UDP telemetry",
                "Check the configured UDP port",
                "Restart the packet source",
            ],
            EngineError::Lookup { .. } => {
                vec!["Check network connectivity", "The lookup is retried on the next session"]
            }
        }
    }

    /// Helper constructor for configuration errors.
    pub fn config(context: impl Into<String>, details: impl Into<String>) -> Self {
        EngineError::Config { context: context.into(), details: details.into() }
    }

    /// Helper constructor for persistence errors with path context.
    pub fn persistence(path: PathBuf, source: std::io::Error) -> Self {
        EngineError::Persistence { path, source }
    }

    /// Helper constructor for packet source errors.
    pub fn source_failed(reason: impl Into<String>) -> Self {
        EngineError::Source { reason: reason.into(), source: None }
    }

    /// Helper constructor for packet source errors with source.
    pub fn source_failed_with(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        EngineError::Source { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for lookup errors.
    pub fn lookup_failed(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        EngineError::Lookup { reason: reason.into(), source }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization { context: "JSON".to_string(), details: err.to_string() }
    }
}

impl From<serde_yaml_ng::Error> for EngineError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        EngineError::Config { context: "settings YAML".to_string(), details: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
          #[test]
          fn error_messages_contain_their_context(
            reason in ".*",
            field in "\\w+",
            code in 13u8..=255u8,
            details in ".*"
          ) {
            let source_error = EngineError::source_failed(reason.clone());
            let field_error = EngineError::InvalidActionCodeField { field: field.clone() };
            let range_error = EngineError::ActionCodeOutOfRange { code };
            let config_error = EngineError::config("settings", details.clone());

            prop_assert!(source_error.to_string().contains(&reason));
            prop_assert!(field_error.to_string().contains(&field));
            prop_assert!(range_error.to_string().contains(&code.to_string()));
            prop_assert!(config_error.to_string().contains(&details));
          }

          #[test]
          fn persistence_keeps_io_message(message in ".*") {
            let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, message.clone());
            match EngineError::persistence(PathBuf::from("dump.json"), io_err) {
              EngineError::Persistence { path, source } => {
                prop_assert_eq!(path, PathBuf::from("dump.json"));
                prop_assert_eq!(source.to_string(), message);
              }
              _ => prop_assert!(false, "Expected Persistence error"),
            }
          }
        }
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<EngineError>();

        let error = EngineError::EngineStopped;
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn recovery_methods_work() {
        let source_error = EngineError::source_failed("socket closed");
        let config_error = EngineError::config("settings", "bad");
        let stopped = EngineError::EngineStopped;

        assert!(source_error.is_retryable());
        assert!(!config_error.is_retryable());
        assert!(!stopped.is_retryable());

        for error in [&source_error, &config_error, &stopped] {
            let suggestions = error.recovery_suggestions();
            assert!(!suggestions.is_empty());
            assert!(suggestions.iter().all(|s| s.len() > 5));
        }
    }

    #[test]
    fn lookup_error_chains_source() {
        let inner = std::io::Error::other("dns failure");
        let error = EngineError::lookup_failed("pole lap", Box::new(inner));
        assert!(error.is_retryable());
        let source = std::error::Error::source(&error).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("dns failure"));
    }
}
