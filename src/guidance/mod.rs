//! Guidance modes and their scheduler.
//!
//! A guidance mode is a small, deterministic control or animation algorithm
//! that turns telemetry into camera references every tick. Exactly one mode
//! is active at a time; mission states request switches through their
//! [`StateContext`](crate::machine::StateContext), and the
//! [`GuidanceScheduler`] enforces the configure → enter → tick → exit
//! lifecycle.

mod blob;
mod error;
mod mode;
mod output;
mod registry;
mod scheduler;

pub use blob::{ConfigBlob, ConfigType, TYPE_URL_PREFIX};
pub use error::GuidanceError;
pub use mode::{GuidanceContext, GuidanceMode, ModeError, ModePhase};
pub use output::{
    AxisConfig, AxisReference, CameraConfig, CameraReference, ControlMode, FrameOfReference,
    OutputConfig, ReferenceOutput,
};
pub use registry::{GuidanceModeDescriptor, GuidanceRegistry, ModeFactory};
pub use scheduler::{GuidanceScheduler, SchedulerStats, TickOutcome};
