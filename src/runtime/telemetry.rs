//! Telemetry snapshots consumed by states and guidance modes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Read-only view of named numeric samples, e.g.
/// `attitude_euler_angles.yaw`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    samples: BTreeMap<String, f64>,
}

impl TelemetrySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sample(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.samples.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.samples.get(name).copied()
    }

    /// Sample value, or `default` when the sample was never published.
    pub fn get_or(&self, name: &str, default: f64) -> f64 {
        self.get(name).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.samples.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Source of the latest telemetry sample set.
///
/// `fetch` must not block waiting for fresh data; stale samples are fine.
pub trait TelemetrySource: Send + Sync {
    fn fetch(&self) -> TelemetrySnapshot;
}

impl TelemetrySource for TelemetrySnapshot {
    fn fetch(&self) -> TelemetrySnapshot {
        self.clone()
    }
}

/// Telemetry source updated in place by the host, read by the mission.
///
/// # Example
///
/// ```rust
/// use sortie::runtime::{SharedTelemetry, TelemetrySource};
///
/// let telemetry = SharedTelemetry::new();
/// telemetry.set("attitude_euler_angles.yaw", 0.5);
/// assert_eq!(telemetry.fetch().get("attitude_euler_angles.yaw"), Some(0.5));
/// ```
#[derive(Clone, Debug, Default)]
pub struct SharedTelemetry {
    inner: Arc<RwLock<TelemetrySnapshot>>,
}

impl SharedTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, name: impl Into<String>, value: f64) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, value);
    }

    pub fn replace(&self, snapshot: TelemetrySnapshot) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }
}

impl TelemetrySource for SharedTelemetry {
    fn fetch(&self) -> TelemetrySnapshot {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
