//! State tree nodes and their behavior hooks.

use crate::core::event::Event;
use crate::guidance::{GuidanceError, ModeError};
use crate::machine::StateContext;
use crate::runtime::BusError;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Failure raised by a state's `on_enter`, `on_exit` or `on_step` hook.
///
/// Hook failures are never retried: the state machine surfaces them to the
/// mission, which aborts.
#[derive(Debug, Error)]
pub enum HookError {
    #[error(transparent)]
    Guidance(#[from] GuidanceError),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error(transparent)]
    Mode(#[from] ModeError),

    #[error("{0}")]
    Failed(String),
}

impl HookError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Lifecycle hooks of a mission state.
///
/// Every hook receives the triggering event and a [`StateContext`] exposing
/// the event bus, the guidance scheduler and telemetry. All hooks default
/// to no-ops, so a state only implements what it reacts to.
///
/// State kinds are usually the variants of one enum implementing this
/// trait, matched inside each hook.
pub trait StateBehavior: Send {
    fn on_enter(&mut self, _event: &Event, _ctx: &mut StateContext<'_>) -> Result<(), HookError> {
        Ok(())
    }

    fn on_exit(&mut self, _event: &Event, _ctx: &mut StateContext<'_>) -> Result<(), HookError> {
        Ok(())
    }

    /// Receives events whose transition targets "no transition".
    fn on_step(&mut self, _event: &Event, _ctx: &mut StateContext<'_>) -> Result<(), HookError> {
        Ok(())
    }
}

/// Behavior that ignores every hook.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopBehavior;

impl StateBehavior for NoopBehavior {}

/// One node of the mission state tree.
///
/// Nodes are assembled with a small fluent API and handed to
/// [`StateMachine::new`](crate::machine::StateMachine::new), which checks
/// the tree invariants (unique sibling names, valid `initial` children).
///
/// # Example
///
/// ```rust
/// use sortie::core::StateNode;
///
/// let ground = StateNode::new("ground")
///     .with_initial("idle")
///     .with_child(StateNode::new("idle"))
///     .with_child(StateNode::new("say").with_guidance_modes(["hello.ground"]));
///
/// assert!(!ground.is_leaf());
/// assert_eq!(ground.initial(), Some("idle"));
/// assert!(ground.child("say").unwrap().guidance_modes().contains("hello.ground"));
/// ```
pub struct StateNode {
    pub(crate) name: String,
    pub(crate) children: Vec<StateNode>,
    pub(crate) initial: Option<String>,
    pub(crate) behavior: Box<dyn StateBehavior>,
    pub(crate) guidance_modes: BTreeSet<String>,
}

impl StateNode {
    /// Create a leaf with no-op behavior.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            initial: None,
            behavior: Box::new(NoopBehavior),
            guidance_modes: BTreeSet::new(),
        }
    }

    pub fn with_behavior(mut self, behavior: impl StateBehavior + 'static) -> Self {
        self.behavior = Box::new(behavior);
        self
    }

    pub fn with_child(mut self, child: StateNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = StateNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Drop the child called `name`, if present.
    pub fn without_child(mut self, name: &str) -> Self {
        self.children.retain(|c| c.name != name);
        self
    }

    pub fn with_initial(mut self, name: impl Into<String>) -> Self {
        self.initial = Some(name.into());
        self
    }

    /// Declare the guidance modes this state may activate.
    pub fn with_guidance_modes<I, S>(mut self, modes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.guidance_modes.extend(modes.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[StateNode] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&StateNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn initial(&self) -> Option<&str> {
        self.initial.as_deref()
    }

    pub fn guidance_modes(&self) -> &BTreeSet<String> {
        &self.guidance_modes
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl fmt::Debug for StateNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateNode")
            .field("name", &self.name)
            .field("initial", &self.initial)
            .field("guidance_modes", &self.guidance_modes)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ground() -> StateNode {
        StateNode::new("ground")
            .with_initial("idle")
            .with_children([StateNode::new("idle"), StateNode::new("say")])
    }

    #[test]
    fn new_node_is_leaf() {
        let node = StateNode::new("idle");
        assert!(node.is_leaf());
        assert!(node.initial().is_none());
        assert!(node.guidance_modes().is_empty());
    }

    #[test]
    fn children_keep_declaration_order() {
        let ground = ground();
        let names: Vec<_> = ground.children().iter().map(StateNode::name).collect();
        assert_eq!(names, ["idle", "say"]);
    }

    #[test]
    fn without_child_removes_by_name() {
        let node = ground().without_child("idle");
        assert!(node.child("idle").is_none());
        assert!(node.child("say").is_some());
    }

    #[test]
    fn guidance_modes_accumulate() {
        let node = StateNode::new("say")
            .with_guidance_modes(["a"])
            .with_guidance_modes(["b", "a"]);
        assert_eq!(node.guidance_modes().len(), 2);
    }

    #[test]
    fn hook_error_from_message() {
        let err = HookError::failed("camera unavailable");
        assert_eq!(err.to_string(), "camera unavailable");
    }
}
