//! Collaborators a mission runs against.
//!
//! The mission core never talks to a transport or a controller directly.
//! It consumes these narrow interfaces instead:
//! - [`EventBus`] / [`Publisher`]: events in, from every publisher
//! - [`TelemetrySource`]: latest telemetry samples
//! - [`ReferenceSink`]: camera reference output
//! - [`Clock`]: time for the guidance tick schedule

mod bus;
mod clock;
mod sink;
mod telemetry;

pub use bus::{BusError, Envelope, EventBus, EventHandler, Publisher, SubscriptionId};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use sink::{LatestReference, NullSink, ReferenceSink};
pub use telemetry::{SharedTelemetry, TelemetrySnapshot, TelemetrySource};
