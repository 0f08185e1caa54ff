//! Default flight stages shared by every mission.
//!
//! Missions usually keep most of these and replace one or two stages with
//! their own (see [`MissionBuilder::stage`](crate::builder::MissionBuilder::stage)).

use crate::core::StateNode;
use crate::machine::Transition;

/// Event identifiers driving the default stages.
pub mod events {
    pub const TAKEOFF: &str = "takeoff";
    pub const TAKEOFF_DONE: &str = "takeoff_done";
    pub const FLY: &str = "fly";
    pub const HOVER: &str = "hover";
    pub const LAND: &str = "land";
    pub const LANDED: &str = "landed";
    pub const CRITICAL: &str = "critical";
}

pub const GROUND: &str = "ground";
pub const TAKEOFF: &str = "takeoff";
pub const HOVERING: &str = "hovering";
pub const FLYING: &str = "flying";
pub const LANDING: &str = "landing";
pub const CRITICAL: &str = "critical";

fn stage(name: &str, leaf: &str) -> StateNode {
    StateNode::new(name)
        .with_initial(leaf)
        .with_child(StateNode::new(leaf))
}

pub fn ground_stage() -> StateNode {
    stage(GROUND, "idle")
}

pub fn takeoff_stage() -> StateNode {
    stage(TAKEOFF, "normal")
}

pub fn hovering_stage() -> StateNode {
    stage(HOVERING, "idle")
}

pub fn flying_stage() -> StateNode {
    stage(FLYING, "manual")
}

pub fn landing_stage() -> StateNode {
    stage(LANDING, "normal")
}

pub fn critical_stage() -> StateNode {
    stage(CRITICAL, "emergency")
}

/// All default stages, ground first.
pub fn default_stages() -> Vec<StateNode> {
    vec![
        ground_stage(),
        takeoff_stage(),
        hovering_stage(),
        flying_stage(),
        landing_stage(),
        critical_stage(),
    ]
}

/// Transitions between the default stages.
///
/// Mission-specific rows should come first so they take precedence.
pub fn default_transitions() -> Vec<Transition> {
    let mut table = vec![
        Transition::to(events::TAKEOFF, GROUND, TAKEOFF),
        Transition::to(events::TAKEOFF_DONE, TAKEOFF, HOVERING),
        Transition::to(events::FLY, HOVERING, FLYING),
        Transition::to(events::HOVER, FLYING, HOVERING),
        Transition::to(events::LAND, HOVERING, LANDING),
        Transition::to(events::LAND, FLYING, LANDING),
        Transition::to(events::LANDED, LANDING, GROUND),
    ];
    table.extend(
        [GROUND, TAKEOFF, HOVERING, FLYING, LANDING]
            .into_iter()
            .map(|source| Transition::to(events::CRITICAL, source, CRITICAL)),
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Event, StatePath};
    use crate::guidance::{GuidanceRegistry, GuidanceScheduler};
    use crate::machine::{DispatchResult, MissionServices, StateMachine};
    use crate::runtime::{EventBus, ManualClock, NullSink, TelemetrySnapshot};
    use std::sync::Arc;

    fn machine() -> StateMachine {
        let root = StateNode::new("default")
            .with_initial(GROUND)
            .with_children(default_stages());
        StateMachine::new(root, default_transitions()).unwrap()
    }

    fn run(sequence: &[&str]) -> StateMachine {
        let bus = EventBus::new();
        let publisher = bus.publisher("test");
        let telemetry = TelemetrySnapshot::new();
        let mut guidance = GuidanceScheduler::new(
            GuidanceRegistry::new(),
            Arc::new(ManualClock::new()),
            Arc::new(TelemetrySnapshot::new()),
            Box::new(NullSink),
            bus.publisher("guidance"),
        );
        let mut services = MissionServices {
            events: &publisher,
            guidance: &mut guidance,
            telemetry: &telemetry,
        };
        let mut machine = machine();
        machine.start(&mut services).unwrap();
        for event in sequence {
            machine.dispatch(&Event::new(*event), &mut services).unwrap();
        }
        machine
    }

    #[test]
    fn default_table_is_valid() {
        let machine = machine();
        assert_eq!(machine.transitions().len(), 12);
    }

    #[test]
    fn full_flight_returns_to_ground() {
        let machine = run(&[
            events::TAKEOFF,
            events::TAKEOFF_DONE,
            events::FLY,
            events::HOVER,
            events::FLY,
            events::LAND,
            events::LANDED,
        ]);
        assert_eq!(machine.active_path(), StatePath::from("ground.idle"));
        assert_eq!(machine.history().len(), 7);
    }

    #[test]
    fn critical_from_any_stage() {
        for prefix in [
            &[][..],
            &[events::TAKEOFF][..],
            &[events::TAKEOFF, events::TAKEOFF_DONE, events::FLY][..],
        ] {
            let mut sequence = prefix.to_vec();
            sequence.push(events::CRITICAL);
            let machine = run(&sequence);
            assert_eq!(machine.active_path(), StatePath::from("critical.emergency"));
        }
    }

    #[test]
    fn landing_is_ignored_on_ground() {
        let bus = EventBus::new();
        let publisher = bus.publisher("test");
        let telemetry = TelemetrySnapshot::new();
        let mut guidance = GuidanceScheduler::new(
            GuidanceRegistry::new(),
            Arc::new(ManualClock::new()),
            Arc::new(TelemetrySnapshot::new()),
            Box::new(NullSink),
            bus.publisher("guidance"),
        );
        let mut services = MissionServices {
            events: &publisher,
            guidance: &mut guidance,
            telemetry: &telemetry,
        };
        let mut machine = machine();
        machine.start(&mut services).unwrap();

        let result = machine
            .dispatch(&Event::new(events::LAND), &mut services)
            .unwrap();
        assert_eq!(result, DispatchResult::Dropped);
    }
}
