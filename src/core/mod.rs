//! Core mission types.
//!
//! This module contains the data model shared by the state machine and the
//! guidance scheduler:
//! - State paths and events
//! - State tree nodes and their behavior hooks
//! - Bounded transition history
//! - Structural configuration errors

mod error;
mod event;
mod history;
mod node;
mod path;

pub use error::ConfigurationError;
pub use event::{Event, EventId};
pub use history::{PathTransition, StateHistory, DEFAULT_HISTORY_CAPACITY};
pub use node::{HookError, NoopBehavior, StateBehavior, StateNode};
pub use path::StatePath;
