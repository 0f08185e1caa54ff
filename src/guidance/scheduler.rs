//! Owner of the single active guidance mode.
//!
//! The scheduler switches modes on request from mission states and ticks
//! the active one on its declared period. Switching and ticking both take
//! `&mut self`, so a tick can never observe an instance that is half
//! entered or already exited; sharing across threads goes through the
//! mission lock.

use super::blob::ConfigBlob;
use super::error::GuidanceError;
use super::mode::{GuidanceContext, GuidanceMode, ModeError, ModePhase};
use super::output::ReferenceOutput;
use super::registry::{GuidanceModeDescriptor, GuidanceRegistry};
use crate::core::Event;
use crate::runtime::{Clock, Publisher, ReferenceSink, TelemetrySource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Result of one [`GuidanceScheduler::poll`].
#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome {
    /// No mode is active
    Idle,
    /// The active mode's next tick is in the future
    NotDue { next_tick: Duration },
    /// The mode produced and published a new output
    Ticked,
    /// The mode failed; its previous output is kept
    Failed(ModeError),
}

/// Counters kept across every instance the scheduler ran.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub switches: u64,
    pub ticks: u64,
    pub tick_failures: u64,
    pub skipped_ticks: u64,
}

/// Runtime state of the active mode.
struct ModeInstance {
    descriptor: GuidanceModeDescriptor,
    mode: Box<dyn GuidanceMode>,
    phase: ModePhase,
    config: Option<ConfigBlob>,
    reference_output: Option<ReferenceOutput>,
    next_tick: Duration,
    ticks: u64,
}

pub struct GuidanceScheduler {
    registry: GuidanceRegistry,
    clock: Arc<dyn Clock>,
    telemetry: Arc<dyn TelemetrySource>,
    sink: Box<dyn ReferenceSink>,
    events: Publisher,
    active: Option<ModeInstance>,
    stats: SchedulerStats,
}

impl GuidanceScheduler {
    pub fn new(
        registry: GuidanceRegistry,
        clock: Arc<dyn Clock>,
        telemetry: Arc<dyn TelemetrySource>,
        sink: Box<dyn ReferenceSink>,
        events: Publisher,
    ) -> Self {
        Self {
            registry,
            clock,
            telemetry,
            sink,
            events,
            active: None,
            stats: SchedulerStats::default(),
        }
    }

    pub fn registry(&self) -> &GuidanceRegistry {
        &self.registry
    }

    /// Identifier of the active mode.
    pub fn active_mode(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.descriptor.id())
    }

    pub fn phase(&self) -> ModePhase {
        self.active.as_ref().map_or(ModePhase::Inactive, |a| a.phase)
    }

    /// Configuration the active mode was entered with.
    pub fn active_config(&self) -> Option<&ConfigBlob> {
        self.active.as_ref().and_then(|a| a.config.as_ref())
    }

    /// Last output of the active mode.
    pub fn reference_output(&self) -> Option<&ReferenceOutput> {
        self.active.as_ref().and_then(|a| a.reference_output.as_ref())
    }

    /// Ticks delivered to the active instance.
    pub fn active_ticks(&self) -> u64 {
        self.active.as_ref().map_or(0, |a| a.ticks)
    }

    pub fn next_tick_at(&self) -> Option<Duration> {
        self.active.as_ref().map(|a| a.next_tick)
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    /// Replace the active mode.
    ///
    /// The current mode, if any, is exited first. On failure the scheduler
    /// is left with no active mode.
    pub fn switch_mode(&mut self, id: &str, config: Option<ConfigBlob>) -> Result<(), GuidanceError> {
        self.stop_active();

        let descriptor = self
            .registry
            .get(id)
            .cloned()
            .ok_or_else(|| GuidanceError::UnknownMode(id.to_string()))?;

        let mut instance = ModeInstance {
            mode: descriptor.instantiate(),
            descriptor,
            phase: ModePhase::Inactive,
            config: None,
            reference_output: None,
            next_tick: Duration::ZERO,
            ticks: 0,
        };

        if let Err(reason) = instance.mode.configure(config.as_ref()) {
            tracing::error!("Guidance mode {} rejected its configuration: {}", id, reason);
            return Err(GuidanceError::InvalidConfiguration {
                mode: id.to_string(),
                reason,
            });
        }
        instance.config = config;
        instance.phase = ModePhase::Entering;

        let now = self.clock.now();
        let telemetry = self.telemetry.fetch();
        let mut outbox = Vec::new();
        let entered = instance
            .mode
            .enter(&mut GuidanceContext::new(now, &telemetry, &mut outbox));
        self.forward(outbox);

        if let Err(reason) = entered {
            tracing::error!("Guidance mode {} failed to enter: {}", id, reason);
            return Err(GuidanceError::EnterFailed {
                mode: id.to_string(),
                reason,
            });
        }

        instance.phase = ModePhase::Active;
        instance.next_tick = now + instance.descriptor.tick_period();
        self.sink.configure(&instance.mode.output_config());
        self.stats.switches += 1;
        tracing::info!(
            "Guidance mode {} active (period {:?})",
            id,
            instance.descriptor.tick_period()
        );
        self.active = Some(instance);
        Ok(())
    }

    /// Tick the active mode if its deadline has passed.
    ///
    /// At most one tick is delivered per call. Deadlines missed in between
    /// are skipped rather than replayed.
    pub fn poll(&mut self) -> TickOutcome {
        let now = self.clock.now();
        let Some(active) = self.active.as_mut() else {
            return TickOutcome::Idle;
        };
        if now < active.next_tick {
            return TickOutcome::NotDue {
                next_tick: active.next_tick,
            };
        }

        let period = active.descriptor.tick_period();
        let behind = now - active.next_tick;
        let skipped = behind.as_nanos() / period.as_nanos();
        if skipped > 0 {
            tracing::debug!(
                "Guidance mode {} overran, skipping {} tick(s)",
                active.descriptor.id(),
                skipped
            );
            self.stats.skipped_ticks += u64::try_from(skipped).unwrap_or(u64::MAX);
        }
        let phase_offset = u64::try_from(behind.as_nanos() % period.as_nanos()).unwrap_or(0);
        active.next_tick = now + period - Duration::from_nanos(phase_offset);

        self.tick_now()
    }

    /// Tick the active mode immediately, ignoring its schedule.
    pub fn tick_now(&mut self) -> TickOutcome {
        let now = self.clock.now();
        let Self {
            active,
            telemetry,
            sink,
            events,
            stats,
            ..
        } = self;
        let Some(active) = active.as_mut() else {
            return TickOutcome::Idle;
        };

        let snapshot = telemetry.fetch();
        let mut outbox = Vec::new();
        let result = active
            .mode
            .tick(&mut GuidanceContext::new(now, &snapshot, &mut outbox));
        active.ticks += 1;
        stats.ticks += 1;
        forward_events(events, outbox);

        match result {
            Ok(output) => {
                active.reference_output = Some(output);
                sink.publish(&output);
                TickOutcome::Ticked
            }
            Err(err) => {
                stats.tick_failures += 1;
                tracing::warn!(
                    "Guidance mode {} tick failed, keeping previous output: {}",
                    active.descriptor.id(),
                    err
                );
                TickOutcome::Failed(err)
            }
        }
    }

    /// Exit the active mode. No tick is delivered afterwards until another
    /// switch. Returns the identifier of the mode that was exited.
    pub fn deactivate(&mut self) -> Option<String> {
        self.stop_active()
    }

    fn stop_active(&mut self) -> Option<String> {
        let mut instance = self.active.take()?;
        instance.phase = ModePhase::Exiting;

        let now = self.clock.now();
        let telemetry = self.telemetry.fetch();
        let mut outbox = Vec::new();
        instance
            .mode
            .exit(&mut GuidanceContext::new(now, &telemetry, &mut outbox));
        self.forward(outbox);

        let id = instance.descriptor.id().to_string();
        tracing::info!("Guidance mode {} exited after {} tick(s)", id, instance.ticks);
        Some(id)
    }

    fn forward(&self, outbox: Vec<Event>) {
        forward_events(&self.events, outbox);
    }
}

fn forward_events(events: &Publisher, outbox: Vec<Event>) {
    for event in outbox {
        if let Err(err) = events.publish(event) {
            tracing::warn!("Dropping guidance event: {}", err);
        }
    }
}
