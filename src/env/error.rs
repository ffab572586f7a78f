//! Error types for scenario and composition operations.

use thiserror::Error;

/// Errors raised by scenarios, the phase sequencer and the registry.
///
/// None of these are transient: every variant is a configuration or
/// programming error and is surfaced immediately without retry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvError {
    /// A scenario was constructed with parameters it cannot honour.
    #[error("invalid configuration for {scenario}: {reason}")]
    Config {
        scenario: &'static str,
        reason: String,
    },

    /// Reset could not establish the scenario's invariants.
    #[error("contract violation in {scenario}: {reason}")]
    ContractViolation {
        scenario: &'static str,
        reason: String,
    },

    /// Attribute lookup miss, including any private-marker name.
    #[error("attempted to get missing attribute '{name}'")]
    MissingAttribute { name: String },

    #[error("{scenario} stepped before reset")]
    NotReset { scenario: &'static str },

    #[error("phase sequencer stepped before the first reset")]
    EpisodeNotStarted,

    #[error("phase sequencer used after close")]
    Closed,

    #[error("unknown scenario '{name}'")]
    UnknownScenario { name: String },
}

impl EnvError {
    pub(crate) fn config(scenario: &'static str, reason: impl Into<String>) -> Self {
        EnvError::Config {
            scenario,
            reason: reason.into(),
        }
    }

    pub(crate) fn contract(scenario: &'static str, reason: impl Into<String>) -> Self {
        EnvError::ContractViolation {
            scenario,
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(name: &str) -> Self {
        EnvError::MissingAttribute {
            name: name.to_string(),
        }
    }
}
