//! Guidance mode descriptors and the registry the scheduler looks them up in.

use super::mode::GuidanceMode;
use crate::core::ConfigurationError;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Builds a fresh mode instance for each activation.
pub type ModeFactory = Arc<dyn Fn() -> Box<dyn GuidanceMode> + Send + Sync>;

/// Static description of a guidance mode: its identifier, its tick period
/// and how to build an instance.
#[derive(Clone)]
pub struct GuidanceModeDescriptor {
    id: String,
    tick_period: Duration,
    factory: ModeFactory,
}

impl GuidanceModeDescriptor {
    pub fn new<F, M>(id: impl Into<String>, tick_period: Duration, factory: F) -> Self
    where
        F: Fn() -> M + Send + Sync + 'static,
        M: GuidanceMode + 'static,
    {
        Self {
            id: id.into(),
            tick_period,
            factory: Arc::new(move || Box::new(factory()) as Box<dyn GuidanceMode>),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    /// Check whether a state allowing `allowed` may activate this mode.
    pub fn is_compatible(&self, allowed: &BTreeSet<String>) -> bool {
        allowed.contains(&self.id)
    }

    pub(crate) fn instantiate(&self) -> Box<dyn GuidanceMode> {
        (self.factory)()
    }
}

impl fmt::Debug for GuidanceModeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuidanceModeDescriptor")
            .field("id", &self.id)
            .field("tick_period", &self.tick_period)
            .finish_non_exhaustive()
    }
}

/// Guidance modes known to a mission, by identifier.
#[derive(Clone, Debug, Default)]
pub struct GuidanceRegistry {
    modes: BTreeMap<String, GuidanceModeDescriptor>,
}

impl GuidanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: GuidanceModeDescriptor) -> Result<(), ConfigurationError> {
        if descriptor.tick_period.is_zero() {
            return Err(ConfigurationError::ZeroTickPeriod { id: descriptor.id });
        }
        if self.modes.contains_key(&descriptor.id) {
            return Err(ConfigurationError::DuplicateMode { id: descriptor.id });
        }
        self.modes.insert(descriptor.id.clone(), descriptor);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&GuidanceModeDescriptor> {
        self.modes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.modes.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.modes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}
