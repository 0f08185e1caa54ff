//! A mission instance and its activation lifecycle.

use super::error::MissionError;
use crate::builder::MissionBuilder;
use crate::config::MissionConfig;
use crate::core::{Event, EventId, StateHistory, StatePath};
use crate::guidance::{GuidanceRegistry, GuidanceScheduler, ReferenceOutput, TickOutcome};
use crate::machine::{DispatchResult, MachineError, MissionServices, StateMachine};
use crate::runtime::{
    Clock, EventBus, Publisher, ReferenceSink, SubscriptionId, TelemetrySource,
};
use crate::snapshot::MissionSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Where a mission is in its lifecycle.
///
/// `Loaded → Active → Deactivated`, or `Active → Aborted` when a state
/// hook fails. Neither end status can be left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionStatus {
    Loaded,
    Active,
    Deactivated,
    Aborted,
}

impl fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MissionStatus::Loaded => "loaded",
            MissionStatus::Active => "active",
            MissionStatus::Deactivated => "deactivated",
            MissionStatus::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// One loaded mission: its state machine, guidance scheduler and event bus.
///
/// Every method takes `&mut self`, so dispatch and guidance ticks never
/// overlap. Share a mission across threads through
/// [`MissionHandle`](super::MissionHandle).
pub struct Mission {
    id: Uuid,
    uid: String,
    status: MissionStatus,
    machine: StateMachine,
    scheduler: GuidanceScheduler,
    bus: EventBus,
    events: Publisher,
    telemetry: Arc<dyn TelemetrySource>,
    max_events_per_poll: usize,
}

impl Mission {
    pub fn builder(config: MissionConfig) -> MissionBuilder {
        MissionBuilder::new(config)
    }

    pub(crate) fn assemble(
        config: &MissionConfig,
        machine: StateMachine,
        registry: GuidanceRegistry,
        clock: Arc<dyn Clock>,
        telemetry: Arc<dyn TelemetrySource>,
        sink: Box<dyn ReferenceSink>,
    ) -> Self {
        let bus = EventBus::new();
        let scheduler = GuidanceScheduler::new(
            registry,
            clock,
            Arc::clone(&telemetry),
            sink,
            bus.publisher("guidance"),
        );
        let id = Uuid::new_v4();
        tracing::info!("Mission {} loaded ({})", config.uid, id);

        Self {
            id,
            uid: config.uid.clone(),
            status: MissionStatus::Loaded,
            machine,
            scheduler,
            events: bus.publisher("mission"),
            bus,
            telemetry,
            max_events_per_poll: config.max_events_per_poll,
        }
    }

    /// Start the state machine. Only a freshly loaded mission activates.
    pub fn activate(&mut self) -> Result<(), MissionError> {
        self.require(MissionStatus::Loaded, "activate")?;
        self.status = MissionStatus::Active;

        let (machine, mut services) = self.split();
        if let Err(err) = machine.start(&mut services) {
            return Err(self.abort(err));
        }
        tracing::info!("Mission {} active in {}", self.uid, self.machine.active_path());
        Ok(())
    }

    /// Deliver `event` to observers and the state machine right away,
    /// bypassing the bus queue.
    pub fn dispatch(&mut self, event: &Event) -> Result<DispatchResult, MissionError> {
        self.require(MissionStatus::Active, "dispatch to")?;
        self.bus.notify(event);

        let (machine, mut services) = self.split();
        match machine.dispatch(event, &mut services) {
            Ok(result) => Ok(result),
            Err(err) => Err(self.abort(err)),
        }
    }

    /// Drain queued bus events in arrival order.
    ///
    /// At most `max_events_per_poll` events are handled per call so a
    /// feedback loop between states and guidance cannot starve ticks.
    /// Returns the number of events handled.
    pub fn process_events(&mut self) -> Result<usize, MissionError> {
        self.require(MissionStatus::Active, "process events of")?;

        let mut handled = 0;
        while handled < self.max_events_per_poll {
            let Some(envelope) = self.bus.try_next() else {
                break;
            };
            tracing::trace!("Event {} from {}", envelope.event.id(), envelope.publisher);
            self.dispatch(&envelope.event)?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Run the active guidance mode if it is due, then handle events.
    pub fn poll(&mut self) -> Result<TickOutcome, MissionError> {
        self.require(MissionStatus::Active, "poll")?;
        let outcome = self.scheduler.poll();
        self.process_events()?;
        Ok(outcome)
    }

    /// Stop the mission.
    ///
    /// The active guidance mode is exited before this returns, so no tick
    /// happens afterwards. Pending events are discarded. Deactivating an
    /// already stopped mission does nothing.
    pub fn deactivate(&mut self) -> Result<(), MissionError> {
        match self.status {
            MissionStatus::Active => {}
            MissionStatus::Deactivated | MissionStatus::Aborted => return Ok(()),
            MissionStatus::Loaded => {
                return Err(MissionError::InvalidStatus {
                    operation: "deactivate",
                    status: self.status,
                })
            }
        }

        let mode = self.scheduler.deactivate();
        let dropped = self.bus.clear();
        self.status = MissionStatus::Deactivated;
        tracing::info!(
            "Mission {} deactivated (guidance {:?}, {} pending event(s) dropped)",
            self.uid,
            mode,
            dropped
        );
        Ok(())
    }

    /// Named publisher feeding this mission's bus.
    pub fn publisher(&self, name: &str) -> Publisher {
        self.bus.publisher(name)
    }

    /// Observe events with id `event` before they reach the state machine.
    pub fn subscribe<F>(&mut self, event: impl Into<EventId>, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) + Send + 'static,
    {
        self.bus.subscribe(event, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn status(&self) -> MissionStatus {
        self.status
    }

    pub fn active_path(&self) -> StatePath {
        self.machine.active_path()
    }

    pub fn machine(&self) -> &StateMachine {
        &self.machine
    }

    pub fn guidance(&self) -> &GuidanceScheduler {
        &self.scheduler
    }

    pub fn reference_output(&self) -> Option<&ReferenceOutput> {
        self.scheduler.reference_output()
    }

    pub fn history(&self) -> &StateHistory {
        self.machine.history()
    }

    pub fn snapshot(&self) -> MissionSnapshot {
        MissionSnapshot::capture(self)
    }

    fn require(&self, expected: MissionStatus, operation: &'static str) -> Result<(), MissionError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(MissionError::InvalidStatus {
                operation,
                status: self.status,
            })
        }
    }

    fn split(&mut self) -> (&mut StateMachine, MissionServices<'_>) {
        let services = MissionServices {
            events: &self.events,
            guidance: &mut self.scheduler,
            telemetry: &*self.telemetry,
        };
        (&mut self.machine, services)
    }

    fn abort(&mut self, err: MachineError) -> MissionError {
        tracing::error!("Mission {} aborting: {}", self.uid, err);
        self.scheduler.deactivate();
        self.bus.clear();
        self.status = MissionStatus::Aborted;
        MissionError::Aborted(err)
    }
}
