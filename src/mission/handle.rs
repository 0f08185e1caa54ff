//! Thread-safe mission handle and the periodic polling driver.

use super::error::MissionError;
use super::lifecycle::{Mission, MissionStatus};
use crate::guidance::TickOutcome;
use crate::runtime::Publisher;
use crate::snapshot::MissionSnapshot;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Cloneable handle serializing every access to one [`Mission`].
///
/// Event dispatch, guidance ticks and deactivation all run under the same
/// lock, so a tick can never interleave with a mode switch and nothing
/// ticks once [`deactivate`](Self::deactivate) has returned.
#[derive(Clone)]
pub struct MissionHandle {
    inner: Arc<Mutex<Mission>>,
}

impl MissionHandle {
    pub fn new(mission: Mission) -> Self {
        Self {
            inner: Arc::new(Mutex::new(mission)),
        }
    }

    /// Run `f` with exclusive access to the mission.
    pub fn with<R>(&self, f: impl FnOnce(&mut Mission) -> R) -> Result<R, MissionError> {
        let mut mission = self.lock()?;
        Ok(f(&mut mission))
    }

    pub fn activate(&self) -> Result<(), MissionError> {
        self.lock()?.activate()
    }

    pub fn poll(&self) -> Result<TickOutcome, MissionError> {
        self.lock()?.poll()
    }

    pub fn deactivate(&self) -> Result<(), MissionError> {
        self.lock()?.deactivate()
    }

    pub fn status(&self) -> Result<MissionStatus, MissionError> {
        Ok(self.lock()?.status())
    }

    pub fn publisher(&self, name: &str) -> Result<Publisher, MissionError> {
        Ok(self.lock()?.publisher(name))
    }

    pub fn snapshot(&self) -> Result<MissionSnapshot, MissionError> {
        Ok(self.lock()?.snapshot())
    }

    /// Poll the mission every `period` on a tokio task until the returned
    /// handle is stopped or the mission leaves `Active`.
    ///
    /// Late periods are skipped rather than bunched up. Must be called from
    /// within a tokio runtime.
    pub fn spawn_driver(&self, period: Duration) -> DriverHandle {
        let (stop, stopped) = watch::channel(false);
        let join = tokio::spawn(self.clone().drive(period, stopped));
        DriverHandle {
            stop,
            join: Some(join),
        }
    }

    async fn drive(self, period: Duration, mut stop: watch::Receiver<bool>) -> Result<(), MissionError> {
        tracing::debug!("Mission driver started (period {:?})", period);
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = stop.changed() => break,
                _ = ticker.tick() => {
                    if !self.poll_if_active()? {
                        break;
                    }
                }
            }
        }
        tracing::debug!("Mission driver stopped");
        Ok(())
    }

    /// One driver step under the mission lock. Returns false once the
    /// mission is no longer active.
    fn poll_if_active(&self) -> Result<bool, MissionError> {
        let mut mission = self.lock()?;
        if mission.status() != MissionStatus::Active {
            return Ok(false);
        }
        mission.poll()?;
        Ok(true)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Mission>, MissionError> {
        self.inner.lock().map_err(|_| MissionError::Poisoned)
    }
}

/// Owner of a running driver task.
///
/// Dropping the handle signals the driver to stop without waiting for it.
pub struct DriverHandle {
    stop: watch::Sender<bool>,
    join: Option<JoinHandle<Result<(), MissionError>>>,
}

impl DriverHandle {
    /// Stop polling and wait for the task, returning the error that ended
    /// it early, if any.
    pub async fn stop(mut self) -> Result<(), MissionError> {
        self.signal();
        match self.join.take() {
            Some(join) => join.await.map_err(|_| MissionError::DriverPanicked)?,
            None => Ok(()),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.as_ref().map_or(true, JoinHandle::is_finished)
    }

    fn signal(&self) {
        // The driver may already be gone; nobody left to tell.
        let _ = self.stop.send(true);
    }
}

impl Drop for DriverHandle {
    fn drop(&mut self) {
        self.signal();
    }
}
