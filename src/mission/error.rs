//! Mission-level errors.

use super::lifecycle::MissionStatus;
use crate::builder::BuildError;
use crate::core::ConfigurationError;
use crate::machine::MachineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MissionError {
    /// The mission could not be assembled and never existed.
    #[error("invalid mission ({} problem(s)): {}", .0.len(), join(.0))]
    Configuration(Vec<ConfigurationError>),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("cannot {operation} a mission that is {status}")]
    InvalidStatus {
        operation: &'static str,
        status: MissionStatus,
    },

    /// A state hook failed; the mission deactivated itself.
    #[error("mission aborted: {0}")]
    Aborted(#[source] MachineError),

    #[error("mission lock poisoned")]
    Poisoned,

    #[error("mission driver task panicked or was cancelled")]
    DriverPanicked,
}

impl MissionError {
    pub fn configuration_errors(&self) -> &[ConfigurationError] {
        match self {
            MissionError::Configuration(errors) => errors,
            _ => &[],
        }
    }
}

fn join(errors: &[ConfigurationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
