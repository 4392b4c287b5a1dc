// Thermo - Temperature monitoring pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for thermo
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias for thermo operations
pub type Result<T> = std::result::Result<T, ThermoError>;

/// Main error type for thermo operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThermoError {
    /// Statistics error
    #[error("Statistics error: {0}")]
    Stats(#[from] StatsError),

    /// Chain error
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    /// Observer registry error
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// One or more observers failed during a notification
    #[error("{failed} of {total} observers failed, first: {first}")]
    Notify {
        failed: usize,
        total: usize,
        first: Box<ThermoError>,
    },

    /// The process-wide monitor was already installed
    #[error("Monitor already initialized")]
    AlreadyInitialized,
}

/// Errors raised by statistic strategies and their context
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    /// Strategy invoked on zero data points
    #[error("Empty data: {strategy} needs at least one value")]
    EmptyData { strategy: &'static str },

    /// Context computed before a strategy was selected
    #[error("No strategy selected")]
    NoStrategySelected,

    /// Name does not resolve to a known strategy
    #[error("Invalid strategy: {0:?}")]
    InvalidStrategy(String),
}

/// Errors raised while assembling or walking the responsibility chain
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChainError {
    /// Successor name does not resolve to a usable link
    #[error("Invalid successor: {name:?} ({reason})")]
    InvalidSuccessor { name: String, reason: String },

    /// A chain needs at least one link
    #[error("Chain has no links")]
    EmptyChain,

    /// Link needs at least one value in the window
    #[error("Empty window passed to {link}")]
    EmptyWindow { link: &'static str },

    /// Statistics computation failed inside a link
    #[error("{0}")]
    Stats(#[from] StatsError),
}

/// Errors related to the observer registry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// Observer id was issued by a different subject
    #[error("Invalid observer: id {id} belongs to subject {owner}, not {subject}")]
    InvalidObserver { id: u64, owner: u64, subject: u64 },

    /// Observer id is not (or no longer) registered
    #[error("Observer not found: {id}")]
    ObserverNotFound { id: u64 },
}

/// Errors related to loading and validating configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// JSON could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// File could not be read
    #[error("IO error on {path}: {reason}")]
    Io { path: String, reason: String },

    /// Field has an unusable value
    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ThermoError::Stats(StatsError::EmptyData { strategy: "median" });
        let msg = format!("{}", err);
        assert!(msg.contains("Empty data"));
        assert!(msg.contains("median"));
    }

    #[test]
    fn test_error_conversion() {
        let stats_err = StatsError::InvalidStrategy("mode".to_string());
        let err: ThermoError = stats_err.into();
        assert!(matches!(err, ThermoError::Stats(_)));

        let chain_err: ChainError = StatsError::NoStrategySelected.into();
        assert!(matches!(chain_err, ChainError::Stats(StatsError::NoStrategySelected)));
    }

    #[test]
    fn test_notify_error_display() {
        let err = ThermoError::Notify {
            failed: 1,
            total: 3,
            first: Box::new(ChainError::EmptyWindow { link: "threshold" }.into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("1 of 3"));
        assert!(msg.contains("threshold"));
    }
}
