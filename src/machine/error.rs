//! State machine errors.

use crate::core::{ConfigurationError, EventId, HookError, StatePath};
use std::fmt;
use thiserror::Error;

/// Which hook of a state was running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookKind {
    Enter,
    Exit,
    Step,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HookKind::Enter => "on_enter",
            HookKind::Exit => "on_exit",
            HookKind::Step => "on_step",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum MachineError {
    #[error("invalid state machine ({} problem(s)): {}", .0.len(), join(.0))]
    Configuration(Vec<ConfigurationError>),

    #[error("state machine already started")]
    AlreadyStarted,

    #[error("state machine not started")]
    NotStarted,

    #[error("state machine halted after a failed hook")]
    Faulted,

    #[error("{hook} of state '{state}' failed on '{event}': {reason}")]
    Hook {
        state: StatePath,
        hook: HookKind,
        event: EventId,
        #[source]
        reason: HookError,
    },
}

impl MachineError {
    /// Configuration problems, if this is a configuration error.
    pub fn configuration_errors(&self) -> &[ConfigurationError] {
        match self {
            MachineError::Configuration(errors) => errors,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_message_lists_every_problem() {
        let err = MachineError::Configuration(vec![
            ConfigurationError::EmptyTrigger { index: 0 },
            ConfigurationError::MissingInitial {
                state: StatePath::from("ground"),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "invalid state machine (2 problem(s)): transition #0 has an empty trigger; \
             composite state 'ground' does not name an initial child"
        );
        assert_eq!(err.configuration_errors().len(), 2);
    }

    #[test]
    fn hook_message_names_state_and_hook() {
        let err = MachineError::Hook {
            state: StatePath::from("ground.say"),
            hook: HookKind::Enter,
            event: EventId::from("say"),
            reason: HookError::failed("no camera"),
        };
        assert_eq!(
            err.to_string(),
            "on_enter of state 'ground.say' failed on 'say': no camera"
        );
    }
}
