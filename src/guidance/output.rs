//! Camera reference records produced by guidance modes.
//!
//! The scheduler only fills and forwards these records; applying them is
//! the camera controller's job.

use serde::{Deserialize, Serialize};

/// How an axis reference is interpreted by the camera controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMode {
    #[default]
    Position,
    Velocity,
}

/// Frame an axis reference is expressed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameOfReference {
    #[default]
    Absolute,
    Relative,
}

/// Reference for one camera axis. Angles are in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisReference {
    pub ctrl_mode: ControlMode,
    pub frame_of_ref: FrameOfReference,
    pub position: f64,
}

impl AxisReference {
    /// Position-controlled reference in the absolute frame.
    pub fn absolute_position(position: f64) -> Self {
        Self {
            ctrl_mode: ControlMode::Position,
            frame_of_ref: FrameOfReference::Absolute,
            position,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraReference {
    pub yaw: AxisReference,
    pub pitch: AxisReference,
    pub roll: AxisReference,
}

/// Output of one guidance tick.
///
/// A camera left at `None` is not driven by the mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceOutput {
    pub front_cam: Option<CameraReference>,
    pub stereo_cam: Option<CameraReference>,
}

impl ReferenceOutput {
    /// Front camera pitch position, if the front camera is driven.
    pub fn front_pitch(&self) -> Option<f64> {
        self.front_cam.map(|cam| cam.pitch.position)
    }
}

/// Shape requested for one camera axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisConfig {
    pub locked: bool,
    pub filtered: bool,
}

impl AxisConfig {
    pub const LOCKED_UNFILTERED: Self = Self {
        locked: true,
        filtered: false,
    };
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub yaw: AxisConfig,
    pub pitch: AxisConfig,
    pub roll: AxisConfig,
}

impl CameraConfig {
    pub const fn uniform(axis: AxisConfig) -> Self {
        Self {
            yaw: axis,
            pitch: axis,
            roll: axis,
        }
    }
}

/// Output shape declared by a mode once it has entered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub front_cam: Option<CameraConfig>,
    pub stereo_cam: Option<CameraConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_position_defaults() {
        let axis = AxisReference::absolute_position(0.25);
        assert_eq!(axis.ctrl_mode, ControlMode::Position);
        assert_eq!(axis.frame_of_ref, FrameOfReference::Absolute);
        assert_eq!(axis.position, 0.25);
    }

    #[test]
    fn front_pitch_requires_front_camera() {
        let mut output = ReferenceOutput::default();
        assert!(output.front_pitch().is_none());

        output.front_cam = Some(CameraReference {
            pitch: AxisReference::absolute_position(-0.5),
            ..CameraReference::default()
        });
        assert_eq!(output.front_pitch(), Some(-0.5));
    }

    #[test]
    fn uniform_camera_config() {
        let config = CameraConfig::uniform(AxisConfig::LOCKED_UNFILTERED);
        assert!(config.yaw.locked && config.pitch.locked && config.roll.locked);
        assert!(!config.pitch.filtered);
    }
}
