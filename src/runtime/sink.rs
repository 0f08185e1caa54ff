//! Consumers of guidance reference output.

use crate::guidance::{OutputConfig, ReferenceOutput};
use std::sync::{Arc, Mutex, PoisonError};

/// Receiver of the records filled by the active guidance mode.
///
/// Both calls must return promptly; a sink posts the record onward and
/// never waits on the consumer.
pub trait ReferenceSink: Send {
    /// Output shape declared by a newly entered mode.
    fn configure(&mut self, config: &OutputConfig);

    /// Reference output of one tick.
    fn publish(&mut self, output: &ReferenceOutput);
}

/// Sink that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ReferenceSink for NullSink {
    fn configure(&mut self, _config: &OutputConfig) {}

    fn publish(&mut self, _output: &ReferenceOutput) {}
}

#[derive(Debug, Default)]
struct Latest {
    config: Option<OutputConfig>,
    output: Option<ReferenceOutput>,
    published: u64,
}

/// Sink keeping the most recent record, readable from other threads
/// between ticks. Clones share the same slot.
///
/// # Example
///
/// ```rust
/// use sortie::guidance::ReferenceOutput;
/// use sortie::runtime::{LatestReference, ReferenceSink};
///
/// let latest = LatestReference::new();
/// let mut sink = latest.clone();
/// sink.publish(&ReferenceOutput::default());
/// assert_eq!(latest.published(), 1);
/// assert!(latest.output().is_some());
/// ```
#[derive(Clone, Debug, Default)]
pub struct LatestReference {
    inner: Arc<Mutex<Latest>>,
}

impl LatestReference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&self) -> Option<ReferenceOutput> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).output
    }

    pub fn config(&self) -> Option<OutputConfig> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).config
    }

    /// Number of outputs published so far.
    pub fn published(&self) -> u64 {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).published
    }
}

impl ReferenceSink for LatestReference {
    fn configure(&mut self, config: &OutputConfig) {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).config = Some(*config);
    }

    fn publish(&mut self, output: &ReferenceOutput) {
        let mut latest = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        latest.output = Some(*output);
        latest.published += 1;
    }
}
