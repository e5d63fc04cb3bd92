//! Error types for timing registry operations
//!
//! Every error here is a caller contract violation. Nothing is transient, so
//! the registry never retries or swallows them; they propagate straight back
//! to the caller that misused a key.

use std::fmt;
use thiserror::Error;

/// Error type for timing registry operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimingError {
    /// A frozen timer was requested under a key that is already tracked
    #[error("Cannot create frozen key '{key}': key already exists")]
    DuplicateFrozenKey { key: String },

    /// A query referenced a key that was never started, lapped or frozen
    #[error("Unknown timing key '{key}'")]
    UnknownKey { key: String },

    /// A frozen key was used as a live stopwatch
    #[error("Key '{key}' is frozen and cannot be started or lapped")]
    FrozenKey { key: String },

    /// The process-wide registry was configured after first use
    #[error("Global timing registry is already initialized")]
    AlreadyInitialized,

    /// Invalid registry configuration
    #[error("Configuration error: {message}")]
    Config { message: String, setting: Option<String> },
}

impl TimingError {
    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            TimingError::DuplicateFrozenKey { .. } => "duplicate_frozen_key",
            TimingError::UnknownKey { .. } => "unknown_key",
            TimingError::FrozenKey { .. } => "frozen_key",
            TimingError::AlreadyInitialized => "already_initialized",
            TimingError::Config { .. } => "configuration",
        }
    }

    /// The key involved in the error, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            TimingError::DuplicateFrozenKey { key }
            | TimingError::UnknownKey { key }
            | TimingError::FrozenKey { key } => Some(key),
            _ => None,
        }
    }

    /// Create an unknown key error
    pub fn unknown_key(key: &str) -> Self {
        Self::UnknownKey { key: key.to_string() }
    }

    /// Create a duplicate frozen key error
    pub fn duplicate_frozen_key(key: &str) -> Self {
        Self::DuplicateFrozenKey { key: key.to_string() }
    }

    /// Create a frozen key misuse error
    pub fn frozen_key(key: &str) -> Self {
        Self::FrozenKey { key: key.to_string() }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into(), setting: None }
    }

    /// Create a configuration error for a specific setting
    pub fn config_setting(setting: &str, message: impl Into<String>) -> Self {
        Self::Config { message: message.into(), setting: Some(setting.to_string()) }
    }
}

/// Lifecycle state of a key, used in diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TimerState {
    Running,
    Stopped,
    Frozen,
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerState::Running => write!(f, "RUNNING"),
            TimerState::Stopped => write!(f, "STOPPED"),
            TimerState::Frozen => write!(f, "FROZEN"),
        }
    }
}

/// Result type alias for timing operations
pub type TimingResult<T> = Result<T, TimingError>;

impl From<toml::de::Error> for TimingError {
    fn from(err: toml::de::Error) -> Self {
        TimingError::config(format!("Invalid configuration file: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(TimingError::unknown_key("a").category(), "unknown_key");
        assert_eq!(TimingError::duplicate_frozen_key("a").category(), "duplicate_frozen_key");
        assert_eq!(TimingError::frozen_key("a").category(), "frozen_key");
        assert_eq!(TimingError::AlreadyInitialized.category(), "already_initialized");
        assert_eq!(TimingError::config("bad").category(), "configuration");
    }

    #[test]
    fn test_error_key_and_message() {
        let err = TimingError::duplicate_frozen_key("outer:inner");
        assert_eq!(err.key(), Some("outer:inner"));
        assert_eq!(
            err.to_string(),
            "Cannot create frozen key 'outer:inner': key already exists"
        );
        assert_eq!(TimingError::AlreadyInitialized.key(), None);
    }

    #[test]
    fn test_timer_state_display() {
        assert_eq!(TimerState::Running.to_string(), "RUNNING");
        assert_eq!(TimerState::Frozen.to_string(), "FROZEN");
    }
}
