//! Point-in-time mission snapshots.
//!
//! A snapshot records what a mission is doing (status, active path, active
//! guidance mode and its last output, transition history) for supervisors
//! and post-flight analysis. It does not include state behaviors or mode
//! instances, which are not serializable, so a snapshot cannot restore a
//! mission.

use crate::core::{StateHistory, StatePath};
use crate::guidance::{ModePhase, ReferenceOutput, SchedulerStats};
use crate::mission::{Mission, MissionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::SnapshotError;

/// Version identifier for snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable view of one mission instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MissionSnapshot {
    /// Snapshot format version
    pub version: u32,

    /// Identifier of the mission instance
    pub id: Uuid,

    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,

    pub uid: String,
    pub status: MissionStatus,
    pub active_path: StatePath,

    /// Guidance mode active when the snapshot was taken
    pub active_mode: Option<String>,
    pub mode_phase: ModePhase,

    /// Type url of the active mode's configuration blob
    pub mode_config: Option<String>,

    /// Ticks delivered to the active mode instance
    pub ticks: u64,

    pub guidance_stats: SchedulerStats,
    pub reference_output: Option<ReferenceOutput>,
    pub history: StateHistory,
}

impl MissionSnapshot {
    pub fn capture(mission: &Mission) -> Self {
        let guidance = mission.guidance();
        Self {
            version: SNAPSHOT_VERSION,
            id: mission.id(),
            taken_at: Utc::now(),
            uid: mission.uid().to_string(),
            status: mission.status(),
            active_path: mission.active_path(),
            active_mode: guidance.active_mode().map(str::to_string),
            mode_phase: guidance.phase(),
            mode_config: guidance
                .active_config()
                .map(|config| config.type_url().to_string()),
            ticks: guidance.active_ticks(),
            guidance_stats: guidance.stats(),
            reference_output: guidance.reference_output().copied(),
            history: mission.history().clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.check_version()
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self = bincode::deserialize(bytes)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.check_version()
    }

    fn check_version(self) -> Result<Self, SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(self)
    }
}
