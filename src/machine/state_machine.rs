//! Hierarchical state machine executing a mission's state tree.

use super::context::{MissionServices, StateContext};
use super::error::{HookKind, MachineError};
use super::transition::{Target, Transition};
use super::tree::{StateSlot, StateTree, ROOT};
use crate::core::{Event, PathTransition, StateHistory, StateNode, StatePath};
use chrono::Utc;
use std::collections::BTreeSet;

/// Outcome of [`StateMachine::dispatch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchResult {
    /// The active path changed (or the leaf was re-entered)
    Transitioned { from: StatePath, to: StatePath },
    /// The active leaf's `on_step` handled the event
    Stepped { state: StatePath },
    /// No transition matched; the event had no effect
    Dropped,
}

/// Executes a validated state tree against an ordered transition table.
///
/// The active path always runs from the root to a leaf. Transitions are
/// evaluated first-match in declaration order; a row is eligible when some
/// active state's path ends with its source pattern. Changing path exits
/// states leaf-first up to the common ancestor, then enters the new states
/// root-ward first.
///
/// # Example
///
/// ```rust
/// use sortie::core::{Event, StateNode, StatePath};
/// use sortie::guidance::{GuidanceRegistry, GuidanceScheduler};
/// use sortie::machine::{DispatchResult, MissionServices, StateMachine, Transition};
/// use sortie::runtime::{EventBus, MonotonicClock, NullSink, TelemetrySnapshot};
/// use std::sync::Arc;
///
/// let root = StateNode::new("door")
///     .with_initial("closed")
///     .with_children([StateNode::new("closed"), StateNode::new("open")]);
/// let mut machine = StateMachine::new(
///     root,
///     vec![
///         Transition::to("push", "closed", "open"),
///         Transition::to("pull", "open", "closed"),
///     ],
/// )
/// .unwrap();
///
/// let bus = EventBus::new();
/// let events = bus.publisher("door");
/// let telemetry = TelemetrySnapshot::new();
/// let mut guidance = GuidanceScheduler::new(
///     GuidanceRegistry::new(),
///     Arc::new(MonotonicClock::new()),
///     Arc::new(TelemetrySnapshot::new()),
///     Box::new(NullSink),
///     bus.publisher("guidance"),
/// );
/// let mut services = MissionServices {
///     events: &events,
///     guidance: &mut guidance,
///     telemetry: &telemetry,
/// };
///
/// machine.start(&mut services).unwrap();
/// assert_eq!(machine.active_path(), StatePath::from("closed"));
///
/// let result = machine.dispatch(&Event::new("push"), &mut services).unwrap();
/// assert!(matches!(result, DispatchResult::Transitioned { .. }));
/// assert_eq!(machine.active_path(), StatePath::from("open"));
///
/// let result = machine.dispatch(&Event::new("push"), &mut services).unwrap();
/// assert_eq!(result, DispatchResult::Dropped);
/// ```
pub struct StateMachine {
    tree: StateTree,
    transitions: Vec<Transition>,
    targets: Vec<Option<usize>>,
    active: Vec<usize>,
    history: StateHistory,
    started: bool,
    faulted: bool,
}

impl StateMachine {
    /// Validate the tree and transition table.
    ///
    /// Every problem found is reported in one
    /// [`MachineError::Configuration`].
    pub fn new(root: StateNode, transitions: Vec<Transition>) -> Result<Self, MachineError> {
        let tree = StateTree::build(root).map_err(MachineError::Configuration)?;
        let targets = tree
            .resolve_transitions(&transitions)
            .map_err(MachineError::Configuration)?;

        Ok(Self {
            tree,
            transitions,
            targets,
            active: Vec::new(),
            history: StateHistory::new(),
            started: false,
            faulted: false,
        })
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history = StateHistory::with_capacity(capacity);
        self
    }

    /// Enter the root and descend through `initial` children to a leaf,
    /// calling `on_enter` root first with the synthetic start event.
    pub fn start(&mut self, services: &mut MissionServices<'_>) -> Result<(), MachineError> {
        if self.started {
            return Err(MachineError::AlreadyStarted);
        }
        self.started = true;

        let event = Event::start();
        for index in self.tree.activation_chain(ROOT) {
            self.active.push(index);
            self.run_hook(index, HookKind::Enter, &event, services)?;
        }
        tracing::info!("State machine started in {}", self.active_path());
        Ok(())
    }

    /// Process one event against the transition table.
    pub fn dispatch(
        &mut self,
        event: &Event,
        services: &mut MissionServices<'_>,
    ) -> Result<DispatchResult, MachineError> {
        if !self.started {
            return Err(MachineError::NotStarted);
        }
        if self.faulted {
            return Err(MachineError::Faulted);
        }

        let current = self.active_path();
        let Some(row) = self
            .transitions
            .iter()
            .position(|t| t.can_fire(event, &current))
        else {
            tracing::debug!("Dropping event {} in {}", event.id(), current);
            return Ok(DispatchResult::Dropped);
        };

        let target = match (&self.transitions[row].target, self.targets[row]) {
            (Target::Path(_), Some(target)) => target,
            _ => {
                let leaf = self.leaf();
                self.run_hook(leaf, HookKind::Step, event, services)?;
                return Ok(DispatchResult::Stepped { state: current });
            }
        };

        let chain = self.tree.activation_chain(target);
        let mut common = self
            .active
            .iter()
            .zip(&chain)
            .take_while(|(a, b)| a == b)
            .count();
        if common == self.active.len() && common == chain.len() {
            // Same path: leave and re-enter the leaf.
            common -= 1;
        }

        while self.active.len() > common {
            let leaving = self.leaf();
            self.run_hook(leaving, HookKind::Exit, event, services)?;
            self.active.pop();
        }
        for &index in &chain[common..] {
            self.active.push(index);
            self.run_hook(index, HookKind::Enter, event, services)?;
        }

        let to = self.active_path();
        tracing::info!("Transition {} -> {} on {}", current, to, event.id());
        self.history.record(PathTransition {
            from: current.clone(),
            to: to.clone(),
            trigger: event.id().clone(),
            timestamp: Utc::now(),
        });
        Ok(DispatchResult::Transitioned { from: current, to })
    }

    /// Path of the active leaf. Empty before `start`.
    pub fn active_path(&self) -> StatePath {
        self.active
            .last()
            .map(|&index| self.tree.slot(index).path.clone())
            .unwrap_or_default()
    }

    /// Names of the active states, root first.
    pub fn active_states(&self) -> Vec<&str> {
        self.active
            .iter()
            .map(|&index| self.tree.slot(index).name.as_str())
            .collect()
    }

    /// Check whether the state at the absolute `path` is active.
    pub fn is_active(&self, path: &StatePath) -> bool {
        self.tree
            .resolve(path)
            .is_some_and(|index| self.active.contains(&index))
    }

    /// Guidance modes declared by the state at `path`.
    pub fn guidance_modes(&self, path: &StatePath) -> Option<&BTreeSet<String>> {
        self.tree
            .resolve(path)
            .map(|index| &self.tree.slot(index).guidance_modes)
    }

    /// Every guidance mode some state declares, with the declaring path.
    pub fn declared_guidance_modes(&self) -> impl Iterator<Item = (&StatePath, &str)> {
        self.tree.slots().flat_map(|slot| {
            slot.guidance_modes
                .iter()
                .map(move |mode| (&slot.path, mode.as_str()))
        })
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// True once a hook has failed; the machine refuses further events.
    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    fn leaf(&self) -> usize {
        self.active.last().copied().unwrap_or(ROOT)
    }

    fn run_hook(
        &mut self,
        index: usize,
        hook: HookKind,
        event: &Event,
        services: &mut MissionServices<'_>,
    ) -> Result<(), MachineError> {
        let StateSlot {
            path,
            guidance_modes,
            behavior,
            ..
        } = self.tree.slot_mut(index);
        tracing::trace!("{} {} on {}", hook, path, event.id());

        let mut ctx = StateContext::new(path, guidance_modes, services);
        let result = match hook {
            HookKind::Enter => behavior.on_enter(event, &mut ctx),
            HookKind::Exit => behavior.on_exit(event, &mut ctx),
            HookKind::Step => behavior.on_step(event, &mut ctx),
        };

        result.map_err(|reason| {
            let state = self.tree.slot(index).path.clone();
            tracing::error!("{} of {} failed on {}: {}", hook, state, event.id(), reason);
            self.faulted = true;
            MachineError::Hook {
                state,
                hook,
                event: event.id().clone(),
                reason,
            }
        })
    }
}
