//! Builder for transition table rows.

use crate::builder::error::BuildError;
use crate::core::{EventId, StatePath};
use crate::machine::{Target, Transition};

/// Builder for one [`Transition`] with a fluent API.
///
/// # Example
///
/// ```
/// use sortie::builder::TransitionBuilder;
/// use sortie::machine::Target;
///
/// let hold = TransitionBuilder::on("hold")
///     .from("ground.say")
///     .to("ground.idle")
///     .build()
///     .unwrap();
/// assert_eq!(hold.target, Target::Path("ground.idle".into()));
///
/// let count = TransitionBuilder::on("count").from("ground.say").stay().build().unwrap();
/// assert_eq!(count.target, Target::Stay);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransitionBuilder {
    trigger: Option<EventId>,
    source: Option<StatePath>,
    target: Option<Target>,
}

impl TransitionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a row triggered by `event`.
    pub fn on(event: impl Into<EventId>) -> Self {
        Self::new().trigger(event)
    }

    /// Set the trigger (required).
    pub fn trigger(mut self, event: impl Into<EventId>) -> Self {
        self.trigger = Some(event.into());
        self
    }

    /// Set the source pattern (required).
    pub fn from(mut self, source: impl Into<StatePath>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set an absolute target path.
    pub fn to(mut self, target: impl Into<StatePath>) -> Self {
        self.target = Some(Target::Path(target.into()));
        self
    }

    /// Deliver the event to the active leaf's `on_step` instead of moving.
    pub fn stay(mut self) -> Self {
        self.target = Some(Target::Stay);
        self
    }

    /// Build the row. Paths are resolved later, when the machine is built.
    pub fn build(self) -> Result<Transition, BuildError> {
        Ok(Transition {
            trigger: self.trigger.ok_or(BuildError::MissingTrigger)?,
            source: self.source.ok_or(BuildError::MissingSource)?,
            target: self.target.ok_or(BuildError::MissingTarget)?,
        })
    }
}
