//! Guidance switching errors.

use super::mode::ModeError;
use thiserror::Error;

/// Errors that abort a guidance-mode switch.
///
/// After any of these the scheduler has no active mode.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GuidanceError {
    #[error("unknown guidance mode '{0}'")]
    UnknownMode(String),

    #[error("guidance mode '{mode}' rejected its configuration: {reason}")]
    InvalidConfiguration { mode: String, reason: ModeError },

    #[error("guidance mode '{mode}' failed to enter: {reason}")]
    EnterFailed { mode: String, reason: ModeError },

    #[error("state '{state}' may not activate guidance mode '{mode}'")]
    IncompatibleMode { state: String, mode: String },
}
