//! "Hello" sample mission.
//!
//! On the ground the mission alternates between `ground.idle` and
//! `ground.say` on `say` / `hold` commands. Both states run the hello
//! ground guidance mode, which nods the front camera through a pitch
//! animation. In `say`, the mode's 5 s timer logs "Hello world", restarts
//! the animation and emits a `count` event that the `say` state forwards
//! to the mission UI.

use super::stages;
use crate::builder::MissionBuilder;
use crate::config::MissionConfig;
use crate::core::{Event, HookError, StateBehavior, StateNode};
use crate::guidance::{
    AxisConfig, AxisReference, CameraConfig, CameraReference, ConfigBlob, ConfigType,
    GuidanceContext, GuidanceMode, GuidanceModeDescriptor, ModeError, OutputConfig,
    ReferenceOutput,
};
use crate::machine::{StateContext, Transition};
use crate::mission::Mission;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

/// Commands from the mission UI.
pub const SAY: &str = "say";
pub const HOLD: &str = "hold";

/// Raised by the ground mode every animation period while saying hello.
pub const COUNT: &str = "count";

/// Published by the `say` state for the mission UI; carries `{"count": n}`.
pub const UI_COUNT: &str = "ui.count";

pub const GROUND_MODE_TICK_PERIOD: Duration = Duration::from_millis(30);
pub const FCAM_PITCH_ANIMATION_PERIOD: Duration = Duration::from_millis(5000);

/// Front camera pitch keyframes in degrees, one per tick.
pub const FCAM_PITCH_ANIMATION: [f64; 31] = [
    0.0, -0.2, -0.8, -2.0, -3.8, -6.6, -10.4, -15.5, -22.0, -30.1, -40.0, -25.0, -10.0, 4.9, 19.9,
    34.9, 49.9, 55.5, 42.0, 28.5, 15.0, 1.5, -11.9, -25.4, -26.9, -22.4, -18.0, -13.5, -9.0, -4.4,
    0.0,
];

pub const TLM_YAW: &str = "attitude_euler_angles.yaw";
pub const TLM_PITCH: &str = "attitude_euler_angles.pitch";
pub const TLM_ROLL: &str = "attitude_euler_angles.roll";

/// Identifier of the ground guidance mode for a mission `uid`.
pub fn ground_mode_id(uid: &str) -> String {
    format!("{uid}.ground")
}

/// Configuration of [`HelloGroundMode`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloGroundConfig {
    pub say: bool,
}

impl ConfigType for HelloGroundConfig {
    const TYPE_NAME: &'static str = "Guidance.HelloGroundMode.Messages.Config";
}

/// Ground guidance mode of the hello mission.
#[derive(Debug, Default)]
pub struct HelloGroundMode {
    say: bool,
    pitch_index: usize,
    next_hello: Option<Duration>,
    count: u64,
}

impl HelloGroundMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn descriptor(uid: &str) -> GuidanceModeDescriptor {
        GuidanceModeDescriptor::new(ground_mode_id(uid), GROUND_MODE_TICK_PERIOD, Self::new)
    }

    /// Index of the keyframe the next tick will output.
    pub fn pitch_index(&self) -> usize {
        self.pitch_index
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Clock time of the next "Hello world", if saying hello.
    pub fn next_hello(&self) -> Option<Duration> {
        self.next_hello
    }

    fn hello_timer(&mut self, ctx: &mut GuidanceContext<'_>) {
        let Some(due) = self.next_hello else {
            return;
        };
        let now = ctx.now();
        if now < due {
            return;
        }

        tracing::info!("Hello world");
        self.pitch_index = 0;
        self.count += 1;
        ctx.emit(Event::new(COUNT).with_payload(json!({ "count": self.count })));

        // Stay on the period grid, whatever the gap since the last hello.
        let period = FCAM_PITCH_ANIMATION_PERIOD;
        let offset = (now - due).as_nanos() % period.as_nanos();
        let offset = Duration::from_nanos(u64::try_from(offset).unwrap_or(0));
        self.next_hello = Some(now + period - offset);
    }
}

impl GuidanceMode for HelloGroundMode {
    fn configure(&mut self, config: Option<&ConfigBlob>) -> Result<(), ModeError> {
        let blob = config.ok_or_else(|| ModeError::MissingConfig {
            expected: HelloGroundConfig::TYPE_NAME.to_string(),
        })?;
        let config: HelloGroundConfig = blob.unpack()?;
        self.say = config.say;
        Ok(())
    }

    fn enter(&mut self, ctx: &mut GuidanceContext<'_>) -> Result<(), ModeError> {
        if self.say {
            self.next_hello = Some(ctx.now() + FCAM_PITCH_ANIMATION_PERIOD);
        }
        Ok(())
    }

    fn output_config(&self) -> OutputConfig {
        OutputConfig {
            front_cam: Some(CameraConfig::uniform(AxisConfig::LOCKED_UNFILTERED)),
            stereo_cam: None,
        }
    }

    fn tick(&mut self, ctx: &mut GuidanceContext<'_>) -> Result<ReferenceOutput, ModeError> {
        self.hello_timer(ctx);

        let telemetry = ctx.telemetry();
        let yaw = telemetry.get_or(TLM_YAW, 0.0);
        let output = ReferenceOutput {
            front_cam: Some(CameraReference {
                yaw: AxisReference::absolute_position(yaw),
                pitch: AxisReference::absolute_position(
                    FCAM_PITCH_ANIMATION[self.pitch_index].to_radians(),
                ),
                roll: AxisReference::absolute_position(0.0),
            }),
            stereo_cam: Some(CameraReference {
                yaw: AxisReference::absolute_position(yaw),
                pitch: AxisReference::absolute_position(telemetry.get_or(TLM_PITCH, 0.0)),
                roll: AxisReference::absolute_position(telemetry.get_or(TLM_ROLL, 0.0)),
            }),
        };

        if self.pitch_index < FCAM_PITCH_ANIMATION.len() - 1 {
            self.pitch_index += 1;
        }
        Ok(output)
    }

    fn exit(&mut self, _ctx: &mut GuidanceContext<'_>) {
        self.next_hello = None;
    }
}

/// Ground states of the hello mission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HelloState {
    Idle { mode: String },
    Say { mode: String },
}

impl HelloState {
    fn mode(&self) -> &str {
        match self {
            HelloState::Idle { mode } | HelloState::Say { mode } => mode,
        }
    }
}

impl StateBehavior for HelloState {
    fn on_enter(&mut self, _event: &Event, ctx: &mut StateContext<'_>) -> Result<(), HookError> {
        let say = matches!(self, HelloState::Say { .. });
        let config = ConfigBlob::pack(&HelloGroundConfig { say })?;
        ctx.set_guidance_mode(self.mode(), Some(config))?;
        Ok(())
    }

    fn on_step(&mut self, event: &Event, ctx: &mut StateContext<'_>) -> Result<(), HookError> {
        // Several events can reach on_step; only counts are forwarded.
        if !matches!(self, HelloState::Say { .. }) || !event.is(COUNT) {
            return Ok(());
        }
        let count = event
            .payload()
            .and_then(|payload| payload.get("count"))
            .and_then(|count| count.as_u64())
            .unwrap_or_default();
        tracing::info!("ground mode count event: count={}", count);
        ctx.publish(Event::new(UI_COUNT).with_payload(json!({ "count": count })))
    }
}

/// Default ground stage with `idle` replaced and `say` added.
pub fn ground_stage(uid: &str) -> StateNode {
    let mode = ground_mode_id(uid);
    stages::ground_stage()
        .without_child("idle")
        .with_initial("say")
        .with_child(
            StateNode::new("idle")
                .with_guidance_modes([mode.clone()])
                .with_behavior(HelloState::Idle { mode: mode.clone() }),
        )
        .with_child(
            StateNode::new("say")
                .with_guidance_modes([mode.clone()])
                .with_behavior(HelloState::Say { mode }),
        )
}

/// Hello-specific transitions. They precede the default table.
pub fn transitions() -> Vec<Transition> {
    vec![
        Transition::to(SAY, "ground.idle", "ground.say"),
        Transition::to(HOLD, "ground.say", "ground.idle"),
        Transition::stay(COUNT, "ground.say"),
    ]
}

/// Builder for the complete hello mission. Callers add their clock,
/// telemetry and sink before building.
pub fn mission(config: MissionConfig) -> MissionBuilder {
    let uid = config.uid.clone();
    let mut table = transitions();
    table.extend(stages::default_transitions());

    Mission::builder(config)
        .stages(stages::default_stages())
        .stage(ground_stage(&uid))
        .transitions(table)
        .guidance_mode(HelloGroundMode::descriptor(&uid))
}
