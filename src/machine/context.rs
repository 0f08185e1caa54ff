//! What a state's hooks are allowed to touch.

use crate::core::{Event, HookError, StatePath};
use crate::guidance::{ConfigBlob, GuidanceError, GuidanceScheduler};
use crate::runtime::{Publisher, TelemetrySnapshot, TelemetrySource};
use std::collections::BTreeSet;

/// Shared services the machine lends to hooks during a dispatch.
///
/// The mission owns all of these; the machine only borrows them for the
/// duration of one `start` or `dispatch` call.
pub struct MissionServices<'a> {
    pub events: &'a Publisher,
    pub guidance: &'a mut GuidanceScheduler,
    pub telemetry: &'a dyn TelemetrySource,
}

/// Handle passed to `on_enter`, `on_exit` and `on_step`.
///
/// A hook can publish events, request a guidance mode compatible with its
/// state, inspect the guidance scheduler and read telemetry. Nothing else
/// of the mission is reachable from here.
pub struct StateContext<'a> {
    state: &'a StatePath,
    allowed_modes: &'a BTreeSet<String>,
    events: &'a Publisher,
    guidance: &'a mut GuidanceScheduler,
    telemetry: &'a dyn TelemetrySource,
}

impl<'a> StateContext<'a> {
    pub(crate) fn new(
        state: &'a StatePath,
        allowed_modes: &'a BTreeSet<String>,
        services: &'a mut MissionServices<'_>,
    ) -> Self {
        Self {
            state,
            allowed_modes,
            events: services.events,
            guidance: &mut *services.guidance,
            telemetry: services.telemetry,
        }
    }

    /// Absolute path of the state whose hook is running.
    pub fn state(&self) -> &StatePath {
        self.state
    }

    pub fn publish(&self, event: Event) -> Result<(), HookError> {
        self.events.publish(event)?;
        Ok(())
    }

    /// Switch the active guidance mode.
    ///
    /// The mode must be one this state declared; anything else is refused
    /// with [`GuidanceError::IncompatibleMode`] before the scheduler sees it.
    /// An unregistered mode fails like a direct switch would: the active
    /// mode is exited and [`GuidanceError::UnknownMode`] returned.
    pub fn set_guidance_mode(
        &mut self,
        mode: &str,
        config: Option<ConfigBlob>,
    ) -> Result<(), GuidanceError> {
        let compatible = match self.guidance.registry().get(mode) {
            Some(descriptor) => descriptor.is_compatible(self.allowed_modes),
            None => return self.guidance.switch_mode(mode, config),
        };
        if !compatible {
            tracing::error!(
                "State {} requested guidance mode {} it does not declare",
                self.state,
                mode
            );
            return Err(GuidanceError::IncompatibleMode {
                state: self.state.to_string(),
                mode: mode.to_string(),
            });
        }
        self.guidance.switch_mode(mode, config)
    }

    /// Read-only view of the guidance scheduler.
    pub fn guidance(&self) -> &GuidanceScheduler {
        self.guidance
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.telemetry.fetch()
    }
}
