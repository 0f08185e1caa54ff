//! Builder for complete missions.

use crate::builder::error::BuildError;
use crate::config::MissionConfig;
use crate::core::{ConfigurationError, StateNode, StatePath};
use crate::guidance::{GuidanceModeDescriptor, GuidanceRegistry};
use crate::machine::{StateMachine, Transition};
use crate::mission::{Mission, MissionError};
use crate::runtime::{Clock, MonotonicClock, NullSink, ReferenceSink, TelemetrySnapshot, TelemetrySource};
use std::sync::Arc;

/// Builder assembling states, transitions and guidance modes into a
/// [`Mission`] with a fluent API.
///
/// Stages become the children of a root named after the mission uid; the
/// first stage is the root's initial child unless [`initial`](Self::initial)
/// says otherwise. Every structural problem (tree, table, registry,
/// undeclared modes) is reported at once by [`build`](Self::build).
///
/// # Example
///
/// ```
/// use sortie::builder::MissionBuilder;
/// use sortie::config::MissionConfig;
/// use sortie::core::{Event, StateNode, StatePath};
/// use sortie::transitions;
///
/// let mut mission = MissionBuilder::new(MissionConfig::default())
///     .stage(StateNode::new("ground"))
///     .stage(StateNode::new("flying"))
///     .transitions(transitions![
///         ["takeoff", "ground" => "flying"],
///         ["land", "flying" => "ground"],
///     ])
///     .build()
///     .unwrap();
///
/// mission.activate().unwrap();
/// mission.dispatch(&Event::new("takeoff")).unwrap();
/// assert_eq!(mission.active_path(), StatePath::from("flying"));
/// ```
pub struct MissionBuilder {
    config: MissionConfig,
    root: Option<StateNode>,
    stages: Vec<StateNode>,
    initial: Option<String>,
    transitions: Vec<Transition>,
    modes: Vec<GuidanceModeDescriptor>,
    clock: Option<Arc<dyn Clock>>,
    telemetry: Option<Arc<dyn TelemetrySource>>,
    sink: Option<Box<dyn ReferenceSink>>,
}

impl MissionBuilder {
    pub fn new(config: MissionConfig) -> Self {
        Self {
            config,
            root: None,
            stages: Vec::new(),
            initial: None,
            transitions: Vec::new(),
            modes: Vec::new(),
            clock: None,
            telemetry: None,
            sink: None,
        }
    }

    /// Use a complete state tree instead of stages.
    pub fn root(mut self, root: StateNode) -> Self {
        self.root = Some(root);
        self
    }

    /// Add a top-level stage, replacing an earlier stage with the same name
    /// in place.
    pub fn stage(mut self, stage: StateNode) -> Self {
        match self.stages.iter_mut().find(|s| s.name() == stage.name()) {
            Some(existing) => *existing = stage,
            None => self.stages.push(stage),
        }
        self
    }

    pub fn stages(self, stages: impl IntoIterator<Item = StateNode>) -> Self {
        stages.into_iter().fold(self, Self::stage)
    }

    /// Stage entered when the mission activates.
    pub fn initial(mut self, stage: impl Into<String>) -> Self {
        self.initial = Some(stage.into());
        self
    }

    /// Append one transition. Earlier rows take precedence.
    pub fn transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    pub fn transitions(mut self, transitions: impl IntoIterator<Item = Transition>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    pub fn guidance_mode(mut self, descriptor: GuidanceModeDescriptor) -> Self {
        self.modes.push(descriptor);
        self
    }

    /// Defaults to [`MonotonicClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Defaults to an empty snapshot.
    pub fn telemetry(mut self, telemetry: Arc<dyn TelemetrySource>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Defaults to [`NullSink`].
    pub fn sink(mut self, sink: impl ReferenceSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Validate everything and assemble the mission.
    pub fn build(self) -> Result<Mission, MissionError> {
        let root = match self.root {
            Some(root) => root,
            None => {
                let initial = self
                    .initial
                    .or_else(|| self.stages.first().map(|s| s.name().to_string()))
                    .ok_or(BuildError::MissingStates)?;
                StateNode::new(self.config.uid.clone())
                    .with_initial(initial)
                    .with_children(self.stages)
            }
        };

        let mut errors: Vec<ConfigurationError> = Vec::new();
        let mut registry = GuidanceRegistry::new();
        for descriptor in self.modes {
            if let Err(err) = registry.register(descriptor) {
                errors.push(err);
            }
        }

        let machine = match StateMachine::new(root, self.transitions) {
            Ok(machine) => Some(machine.with_history_capacity(self.config.history_capacity)),
            Err(err) => {
                errors.extend_from_slice(err.configuration_errors());
                None
            }
        };
        if let Some(machine) = &machine {
            errors.extend(undeclared_modes(machine, &registry));
        }

        match machine {
            Some(machine) if errors.is_empty() => Ok(Mission::assemble(
                &self.config,
                machine,
                registry,
                self.clock.unwrap_or_else(|| Arc::new(MonotonicClock::new())),
                self.telemetry
                    .unwrap_or_else(|| Arc::new(TelemetrySnapshot::new())),
                self.sink.unwrap_or_else(|| Box::new(NullSink)),
            )),
            _ => {
                tracing::error!(
                    "Mission {} rejected with {} configuration error(s)",
                    self.config.uid,
                    errors.len()
                );
                Err(MissionError::Configuration(errors))
            }
        }
    }
}

fn undeclared_modes(machine: &StateMachine, registry: &GuidanceRegistry) -> Vec<ConfigurationError> {
    machine
        .declared_guidance_modes()
        .filter(|(_, mode)| !registry.contains(mode))
        .map(|(state, mode): (&StatePath, &str)| ConfigurationError::UnknownStateMode {
            state: state.clone(),
            mode: mode.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guidance::{ConfigBlob, GuidanceContext, GuidanceMode, ModeError, ReferenceOutput};
    use crate::mission::MissionStatus;
    use std::time::Duration;

    struct Still;

    impl GuidanceMode for Still {
        fn configure(&mut self, _config: Option<&ConfigBlob>) -> Result<(), ModeError> {
            Ok(())
        }

        fn tick(&mut self, _ctx: &mut GuidanceContext<'_>) -> Result<ReferenceOutput, ModeError> {
            Ok(ReferenceOutput::default())
        }
    }

    fn still(id: &str) -> GuidanceModeDescriptor {
        GuidanceModeDescriptor::new(id, Duration::from_millis(30), || Still)
    }

    #[test]
    fn builder_requires_states() {
        let result = MissionBuilder::new(MissionConfig::default()).build();
        assert!(matches!(
            result,
            Err(MissionError::Build(BuildError::MissingStates))
        ));
    }

    #[test]
    fn first_stage_is_initial_by_default() {
        let mut mission = MissionBuilder::new(MissionConfig::default())
            .stages([StateNode::new("ground"), StateNode::new("flying")])
            .build()
            .unwrap();
        mission.activate().unwrap();
        assert_eq!(mission.active_path(), StatePath::from("ground"));
        assert_eq!(mission.status(), MissionStatus::Active);
    }

    #[test]
    fn explicit_initial_overrides_order() {
        let mut mission = MissionBuilder::new(MissionConfig::default())
            .stages([StateNode::new("ground"), StateNode::new("flying")])
            .initial("flying")
            .build()
            .unwrap();
        mission.activate().unwrap();
        assert_eq!(mission.active_path(), StatePath::from("flying"));
    }

    #[test]
    fn stage_with_same_name_replaces_in_place() {
        let mission = MissionBuilder::new(MissionConfig::default())
            .stage(StateNode::new("ground"))
            .stage(StateNode::new("flying"))
            .stage(
                StateNode::new("ground")
                    .with_initial("say")
                    .with_child(StateNode::new("say")),
            )
            .build()
            .unwrap();
        assert!(mission
            .machine()
            .guidance_modes(&StatePath::from("ground.say"))
            .is_some());
    }

    #[test]
    fn every_problem_is_reported_together() {
        let err = MissionBuilder::new(MissionConfig::default())
            .stage(StateNode::new("ground").with_guidance_modes(["missing"]))
            .stage(StateNode::new("flying").with_guidance_modes(["still"]))
            .guidance_mode(still("still"))
            .guidance_mode(still("still"))
            .build()
            .err()
            .unwrap();

        let errors = err.configuration_errors();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(&ConfigurationError::DuplicateMode {
            id: "still".to_string()
        }));
        assert!(errors.contains(&ConfigurationError::UnknownStateMode {
            state: StatePath::from("ground"),
            mode: "missing".to_string()
        }));
    }

    #[test]
    fn bad_transition_refuses_to_build() {
        let err = MissionBuilder::new(MissionConfig::default())
            .stage(StateNode::new("ground"))
            .transition(Transition::to("go", "ground", "orbit"))
            .build()
            .err()
            .unwrap();
        assert!(matches!(
            err.configuration_errors(),
            [ConfigurationError::UnresolvedTarget { .. }]
        ));
    }
}
