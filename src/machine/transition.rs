//! Transition table entries.

use crate::core::{Event, EventId, StatePath};
use serde::{Deserialize, Serialize};

/// Where a matching transition leads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// Make this path active. A composite state descends through its
    /// `initial` children to a leaf.
    Path(StatePath),
    /// Keep the active path and deliver the event to the leaf's `on_step`.
    Stay,
}

/// One `(trigger, source, target)` row of a transition table.
///
/// Rows are evaluated in declaration order and the first eligible row wins.
///
/// # Example
///
/// ```rust
/// use sortie::core::{Event, StatePath};
/// use sortie::machine::Transition;
///
/// let say = Transition::to("say", "ground.idle", "ground.say");
/// assert!(say.can_fire(&Event::new("say"), &StatePath::from("ground.idle")));
/// assert!(!say.can_fire(&Event::new("say"), &StatePath::from("ground.say")));
///
/// // A source naming an active ancestor is eligible too.
/// let land = Transition::to("land", "flying", "landing");
/// assert!(land.can_fire(&Event::new("land"), &StatePath::from("flying.manual")));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub trigger: EventId,
    pub source: StatePath,
    pub target: Target,
}

impl Transition {
    pub fn new(trigger: impl Into<EventId>, source: impl Into<StatePath>, target: Target) -> Self {
        Self {
            trigger: trigger.into(),
            source: source.into(),
            target,
        }
    }

    /// Transition changing the active path to `target`.
    pub fn to(
        trigger: impl Into<EventId>,
        source: impl Into<StatePath>,
        target: impl Into<StatePath>,
    ) -> Self {
        Self::new(trigger, source, Target::Path(target.into()))
    }

    /// Transition delivering the event to the active leaf's `on_step`.
    pub fn stay(trigger: impl Into<EventId>, source: impl Into<StatePath>) -> Self {
        Self::new(trigger, source, Target::Stay)
    }

    /// Check whether this row is eligible for `event` while `active` is the
    /// active path (pure).
    pub fn can_fire(&self, event: &Event, active: &StatePath) -> bool {
        &self.trigger == event.id() && source_matches(&self.source, active)
    }
}

/// True when some node on `active` has a path ending with `pattern`.
pub(crate) fn source_matches(pattern: &StatePath, active: &StatePath) -> bool {
    let pattern = pattern.segments();
    let active = active.segments();
    !pattern.is_empty() && (pattern.len()..=active.len()).any(|end| active[..end].ends_with(pattern))
}
