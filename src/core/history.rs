//! Transition history of a mission state machine.
//!
//! Every successful transition between active paths is recorded with the
//! event that triggered it and a UTC timestamp. The history is bounded: once
//! it holds `capacity` entries the oldest one is dropped.

use super::event::EventId;
use super::path::StatePath;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Default number of transitions retained by a [`StateHistory`].
pub const DEFAULT_HISTORY_CAPACITY: usize = 256;

/// Record of one change of active path.
///
/// # Example
///
/// ```rust
/// use sortie::core::{EventId, PathTransition, StatePath};
/// use chrono::Utc;
///
/// let transition = PathTransition {
///     from: StatePath::from("ground.idle"),
///     to: StatePath::from("ground.say"),
///     trigger: EventId::from("say"),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(transition.to.leaf(), Some("say"));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathTransition {
    /// Active path before the transition
    pub from: StatePath,
    /// Active path after the transition
    pub to: StatePath,
    /// Event that selected the transition
    pub trigger: EventId,
    /// When the transition completed
    pub timestamp: DateTime<Utc>,
}

/// Ordered, bounded history of path transitions.
///
/// # Example
///
/// ```rust
/// use sortie::core::{EventId, PathTransition, StateHistory, StatePath};
/// use chrono::Utc;
///
/// let mut history = StateHistory::with_capacity(8);
/// history.record(PathTransition {
///     from: StatePath::from("ground.idle"),
///     to: StatePath::from("ground.say"),
///     trigger: EventId::from("say"),
///     timestamp: Utc::now(),
/// });
/// history.record(PathTransition {
///     from: StatePath::from("ground.say"),
///     to: StatePath::from("ground.idle"),
///     trigger: EventId::from("hold"),
///     timestamp: Utc::now(),
/// });
///
/// let path = history.get_path();
/// assert_eq!(path.len(), 3); // idle -> say -> idle
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "StoredHistory")]
pub struct StateHistory {
    capacity: usize,
    transitions: VecDeque<PathTransition>,
}

/// Wire form of [`StateHistory`]; re-clamped on the way in.
#[derive(Deserialize)]
struct StoredHistory {
    capacity: usize,
    transitions: VecDeque<PathTransition>,
}

impl From<StoredHistory> for StateHistory {
    fn from(stored: StoredHistory) -> Self {
        let mut history = Self::with_capacity(stored.capacity);
        for transition in stored.transitions {
            history.record(transition);
        }
        history
    }
}

impl Default for StateHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl StateHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Create a history retaining at most `capacity` transitions.
    ///
    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            transitions: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
        }
    }

    /// Append a transition, evicting the oldest entry when full.
    pub fn record(&mut self, transition: PathTransition) {
        while self.transitions.len() >= self.capacity {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Paths traversed: the `from` of the oldest retained transition, then
    /// the `to` of each transition.
    pub fn get_path(&self) -> Vec<&StatePath> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.front() {
            path.push(&first.from);
        }
        path.extend(self.transitions.iter().map(|t| &t.to));
        path
    }

    /// Time between the oldest and newest retained transitions.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.transitions.front()?, self.transitions.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn transitions(&self) -> impl ExactSizeIterator<Item = &PathTransition> {
        self.transitions.iter()
    }

    pub fn last(&self) -> Option<&PathTransition> {
        self.transitions.back()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
