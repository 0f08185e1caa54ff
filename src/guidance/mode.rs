//! The guidance mode contract.

use super::blob::ConfigBlob;
use super::output::{OutputConfig, ReferenceOutput};
use crate::core::Event;
use crate::runtime::TelemetrySnapshot;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a guidance mode.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModeError {
    #[error("unexpected configuration '{found}', expected '{expected}'")]
    UnexpectedConfig { expected: String, found: String },

    #[error("configuration '{expected}' is required")]
    MissingConfig { expected: String },

    #[error("malformed configuration '{type_url}': {reason}")]
    MalformedConfig { type_url: String, reason: String },

    #[error("{0}")]
    Failed(String),
}

/// Lifecycle phase of a guidance mode instance.
///
/// `Inactive → Entering → Active → Exiting → Inactive`. An instance is
/// discarded once it leaves `Exiting`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModePhase {
    #[default]
    Inactive,
    Entering,
    Active,
    Exiting,
}

/// What a mode may touch while running: the current time, the telemetry
/// snapshot of this step, and an outbox forwarded to the event bus after
/// the call returns.
pub struct GuidanceContext<'a> {
    now: Duration,
    telemetry: &'a TelemetrySnapshot,
    outbox: &'a mut Vec<Event>,
}

impl<'a> GuidanceContext<'a> {
    pub fn new(now: Duration, telemetry: &'a TelemetrySnapshot, outbox: &'a mut Vec<Event>) -> Self {
        Self {
            now,
            telemetry,
            outbox,
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn telemetry(&self) -> &TelemetrySnapshot {
        self.telemetry
    }

    /// Queue an event for the mission's event bus.
    pub fn emit(&mut self, event: Event) {
        self.outbox.push(event);
    }
}

/// A schedulable guidance mode.
///
/// The scheduler drives an instance through exactly one lifecycle:
///
/// 1. `configure()` - once, while inactive
/// 2. `enter()` - once, after a successful configure
/// 3. `tick()` - once per tick period while active
/// 4. `exit()` - once, when deactivated or replaced
///
/// After `exit` the instance is dropped; a later activation builds a fresh
/// one from the mode's factory.
///
/// `tick` must not block and must advance the mode's counters
/// deterministically from its inputs.
pub trait GuidanceMode: Send {
    /// Validate and store the configuration.
    ///
    /// The scheduler does not pre-validate blobs: a mode must check the
    /// discriminator before unpacking.
    fn configure(&mut self, config: Option<&ConfigBlob>) -> Result<(), ModeError>;

    fn enter(&mut self, _ctx: &mut GuidanceContext<'_>) -> Result<(), ModeError> {
        Ok(())
    }

    /// Output shape to announce after entering.
    fn output_config(&self) -> OutputConfig {
        OutputConfig::default()
    }

    fn tick(&mut self, ctx: &mut GuidanceContext<'_>) -> Result<ReferenceOutput, ModeError>;

    /// Release mode-private resources such as timers.
    fn exit(&mut self, _ctx: &mut GuidanceContext<'_>) {}
}
