//! Sortie: hierarchical mission state machines with scheduled guidance modes
//!
//! A drone mission is a tree of named states plus an ordered transition
//! table. States own `on_enter`/`on_exit`/`on_step` hooks and may ask the
//! guidance scheduler to activate a guidance mode: a small deterministic
//! control algorithm ticked on a fixed period that turns telemetry into
//! camera references and may feed events back into the state machine.
//!
//! # Core Concepts
//!
//! - **State tree**: [`StateNode`]s with `initial` children and behaviors
//! - **State machine**: first-match transition table over one active path
//! - **Guidance modes**: configure → enter → tick → exit, one at a time
//! - **Mission**: ties both together behind activate / poll / deactivate
//!
//! # Example
//!
//! ```rust
//! use sortie::config::MissionConfig;
//! use sortie::core::{Event, StatePath};
//! use sortie::missions::hello;
//! use sortie::runtime::ManualClock;
//! use std::sync::Arc;
//!
//! let clock = ManualClock::new();
//! let mut mission = hello::mission(MissionConfig::default())
//!     .clock(Arc::new(clock.clone()))
//!     .build()
//!     .unwrap();
//!
//! mission.activate().unwrap();
//! assert_eq!(mission.active_path(), StatePath::from("ground.say"));
//!
//! mission.dispatch(&Event::new(hello::HOLD)).unwrap();
//! assert_eq!(mission.active_path(), StatePath::from("ground.idle"));
//!
//! clock.advance(hello::GROUND_MODE_TICK_PERIOD);
//! mission.poll().unwrap();
//! assert_eq!(mission.reference_output().and_then(|o| o.front_pitch()), Some(0.0));
//!
//! mission.deactivate().unwrap();
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod guidance;
pub mod logging;
pub mod machine;
pub mod mission;
pub mod missions;
pub mod runtime;
pub mod snapshot;

// Re-export commonly used types
pub use builder::MissionBuilder;
pub use core::{Event, StateBehavior, StateNode, StatePath};
pub use guidance::{GuidanceMode, GuidanceScheduler};
pub use machine::{StateContext, StateMachine, Transition};
pub use mission::{Mission, MissionError, MissionHandle};
