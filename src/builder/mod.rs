//! Builder API for ergonomic mission construction.
//!
//! This module provides fluent builders and a macro for assembling state
//! trees, transition tables and guidance modes into a [`Mission`](crate::mission::Mission).

pub mod error;
pub mod macros;
pub mod mission;
pub mod transition;

pub use error::BuildError;
pub use mission::MissionBuilder;
pub use transition::TransitionBuilder;
