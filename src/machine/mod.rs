//! Hierarchical state machine.
//!
//! A mission is a tree of [`StateNode`](crate::core::StateNode)s plus an
//! ordered transition table. The [`StateMachine`] keeps exactly one
//! root-to-leaf path active, runs `on_exit`/`on_enter` hooks across the
//! common ancestor on every transition and hands events with no path change
//! to the leaf's `on_step`.

mod context;
mod error;
mod state_machine;
mod transition;
mod tree;

pub use context::{MissionServices, StateContext};
pub use error::{HookKind, MachineError};
pub use state_machine::{DispatchResult, StateMachine};
pub use transition::{Target, Transition};
