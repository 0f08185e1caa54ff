//! Structural errors found while assembling a mission.

use super::path::StatePath;
use thiserror::Error;

/// A malformed state tree, transition table or guidance registry.
///
/// These are detected before a mission can activate and are never retried.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("state under '{parent}' has an empty name")]
    EmptyName { parent: StatePath },

    #[error("state '{name}' under '{parent}' has an invalid name (blank or containing '.')")]
    InvalidName { parent: StatePath, name: String },

    #[error("state '{parent}' has more than one child named '{name}'")]
    DuplicateChild { parent: StatePath, name: String },

    #[error("composite state '{state}' does not name an initial child")]
    MissingInitial { state: StatePath },

    #[error("initial child '{initial}' of '{state}' does not exist")]
    UnknownInitial { state: StatePath, initial: String },

    #[error("transition #{index} has an empty trigger")]
    EmptyTrigger { index: usize },

    #[error("transition #{index} ('{trigger}'): malformed path '{path}'")]
    InvalidPath {
        index: usize,
        trigger: String,
        path: StatePath,
    },

    #[error("transition #{index} ('{trigger}'): source '{source_path}' matches no state")]
    UnresolvedSource {
        index: usize,
        trigger: String,
        source_path: StatePath,
    },

    #[error("transition #{index} ('{trigger}'): target '{target}' is not a state")]
    UnresolvedTarget {
        index: usize,
        trigger: String,
        target: StatePath,
    },

    #[error("guidance mode '{id}' is registered twice")]
    DuplicateMode { id: String },

    #[error("guidance mode '{id}' has a zero tick period")]
    ZeroTickPeriod { id: String },

    #[error("state '{state}' declares unregistered guidance mode '{mode}'")]
    UnknownStateMode { state: StatePath, mode: String },
}
