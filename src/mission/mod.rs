//! Mission lifecycle.
//!
//! A [`Mission`] ties a state machine, a guidance scheduler and an event
//! bus together behind the host-facing activate / poll / deactivate
//! surface. [`MissionHandle`] shares one mission between threads.

mod error;
mod handle;
mod lifecycle;

pub use error::MissionError;
pub use handle::{DriverHandle, MissionHandle};
pub use lifecycle::{Mission, MissionStatus};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MissionConfig;
    use crate::core::{Event, HookError, StateBehavior, StateNode, StatePath};
    use crate::guidance::{
        ConfigBlob, GuidanceContext, GuidanceMode, GuidanceModeDescriptor, ModeError,
        ReferenceOutput, TickOutcome,
    };
    use crate::machine::{DispatchResult, StateContext, Transition};
    use crate::runtime::ManualClock;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const PERIOD: Duration = Duration::from_millis(30);

    struct Pinger;

    impl GuidanceMode for Pinger {
        fn configure(&mut self, _config: Option<&ConfigBlob>) -> Result<(), ModeError> {
            Ok(())
        }

        fn tick(&mut self, ctx: &mut GuidanceContext<'_>) -> Result<ReferenceOutput, ModeError> {
            ctx.emit(Event::new("ping"));
            Ok(ReferenceOutput::default())
        }
    }

    enum Kind {
        Idle,
        Busy { pings: Arc<Mutex<u32>> },
        Broken,
    }

    impl StateBehavior for Kind {
        fn on_enter(&mut self, _event: &Event, ctx: &mut StateContext<'_>) -> Result<(), HookError> {
            match self {
                Kind::Idle => Ok(()),
                Kind::Busy { .. } => Ok(ctx.set_guidance_mode("pinger", None)?),
                Kind::Broken => Err(HookError::failed("broken on purpose")),
            }
        }

        fn on_step(&mut self, event: &Event, _ctx: &mut StateContext<'_>) -> Result<(), HookError> {
            if let Kind::Busy { pings } = self {
                if event.is("ping") {
                    *pings.lock().unwrap() += 1;
                }
            }
            Ok(())
        }
    }

    fn mission(clock: &ManualClock, pings: &Arc<Mutex<u32>>) -> Mission {
        Mission::builder(MissionConfig::default())
            .stage(StateNode::new("idle").with_behavior(Kind::Idle))
            .stage(
                StateNode::new("busy")
                    .with_guidance_modes(["pinger"])
                    .with_behavior(Kind::Busy {
                        pings: Arc::clone(pings),
                    }),
            )
            .stage(StateNode::new("broken").with_behavior(Kind::Broken))
            .transitions([
                Transition::to("work", "idle", "busy"),
                Transition::to("rest", "busy", "idle"),
                Transition::stay("ping", "busy"),
                Transition::to("break", "idle", "broken"),
            ])
            .guidance_mode(GuidanceModeDescriptor::new("pinger", PERIOD, || Pinger))
            .clock(Arc::new(clock.clone()))
            .build()
            .unwrap()
    }

    #[test]
    fn lifecycle_runs_loaded_active_deactivated() {
        let clock = ManualClock::new();
        let mut mission = mission(&clock, &Arc::default());
        assert_eq!(mission.status(), MissionStatus::Loaded);
        assert!(matches!(
            mission.poll(),
            Err(MissionError::InvalidStatus { .. })
        ));

        mission.activate().unwrap();
        assert_eq!(mission.status(), MissionStatus::Active);
        assert_eq!(mission.active_path(), StatePath::from("idle"));
        assert!(matches!(
            mission.activate(),
            Err(MissionError::InvalidStatus { .. })
        ));

        mission.deactivate().unwrap();
        assert_eq!(mission.status(), MissionStatus::Deactivated);
        mission.deactivate().unwrap();
    }

    #[test]
    fn guidance_events_feed_back_into_dispatch() {
        let clock = ManualClock::new();
        let pings = Arc::new(Mutex::new(0));
        let mut mission = mission(&clock, &pings);
        mission.activate().unwrap();

        mission.publisher("ui").publish(Event::new("work")).unwrap();
        assert_eq!(mission.process_events().unwrap(), 1);
        assert_eq!(mission.guidance().active_mode(), Some("pinger"));

        for _ in 0..3 {
            clock.advance(PERIOD);
            assert_eq!(mission.poll().unwrap(), TickOutcome::Ticked);
        }
        assert_eq!(*pings.lock().unwrap(), 3);
        assert_eq!(mission.active_path(), StatePath::from("busy"));
    }

    #[test]
    fn observers_see_events_before_dispatch() {
        let clock = ManualClock::new();
        let mut mission = mission(&clock, &Arc::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = mission.subscribe("work", move |event| {
            sink.lock().unwrap().push(event.id().to_string());
        });
        mission.activate().unwrap();

        let result = mission.dispatch(&Event::new("work")).unwrap();
        assert!(matches!(result, DispatchResult::Transitioned { .. }));
        assert_eq!(*seen.lock().unwrap(), ["work"]);

        assert!(mission.unsubscribe(id));
        mission.dispatch(&Event::new("rest")).unwrap();
        mission.dispatch(&Event::new("work")).unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn hook_failure_aborts_mission() {
        let clock = ManualClock::new();
        let mut mission = mission(&clock, &Arc::default());
        mission.activate().unwrap();

        let err = mission.dispatch(&Event::new("break")).unwrap_err();
        assert!(matches!(err, MissionError::Aborted(_)));
        assert_eq!(mission.status(), MissionStatus::Aborted);
        assert!(mission.guidance().active_mode().is_none());
        assert!(matches!(
            mission.dispatch(&Event::new("work")),
            Err(MissionError::InvalidStatus { .. })
        ));
    }

    #[test]
    fn event_budget_bounds_one_call() {
        let mut mission = Mission::builder(MissionConfig {
            max_events_per_poll: 2,
            ..MissionConfig::default()
        })
        .stage(StateNode::new("idle"))
        .build()
        .unwrap();
        mission.activate().unwrap();

        let ui = mission.publisher("ui");
        for _ in 0..5 {
            ui.publish(Event::new("noise")).unwrap();
        }
        assert_eq!(mission.process_events().unwrap(), 2);
        assert_eq!(mission.process_events().unwrap(), 2);
        assert_eq!(mission.process_events().unwrap(), 1);
        assert_eq!(mission.process_events().unwrap(), 0);
    }

    #[test]
    fn deactivate_stops_ticks_and_drops_events() {
        let clock = ManualClock::new();
        let mut mission = mission(&clock, &Arc::default());
        mission.activate().unwrap();
        mission.dispatch(&Event::new("work")).unwrap();
        mission.publisher("ui").publish(Event::new("rest")).unwrap();

        mission.deactivate().unwrap();

        assert!(mission.guidance().active_mode().is_none());
        clock.advance(PERIOD * 5);
        assert!(matches!(
            mission.poll(),
            Err(MissionError::InvalidStatus { .. })
        ));
        assert_eq!(mission.guidance().stats().ticks, 0);
    }

    #[tokio::test]
    async fn handle_driver_ticks_until_stopped() {
        let clock = ManualClock::new();
        let handle = MissionHandle::new(mission(&clock, &Arc::default()));
        handle.activate().unwrap();
        handle.with(|m| m.dispatch(&Event::new("work"))).unwrap().unwrap();

        let driver = handle.spawn_driver(Duration::from_millis(1));
        clock.advance(PERIOD);
        while handle.with(|m| m.guidance().stats().ticks).unwrap() == 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        driver.stop().await.unwrap();

        let ticks = handle.with(|m| m.guidance().stats().ticks).unwrap();
        clock.advance(PERIOD * 5);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(handle.with(|m| m.guidance().stats().ticks).unwrap(), ticks);

        handle.deactivate().unwrap();
        assert_eq!(handle.status().unwrap(), MissionStatus::Deactivated);
    }

    #[tokio::test]
    async fn driver_finishes_when_mission_deactivates() {
        let clock = ManualClock::new();
        let handle = MissionHandle::new(mission(&clock, &Arc::default()));
        handle.activate().unwrap();
        let driver = handle.spawn_driver(Duration::from_millis(1));

        handle.deactivate().unwrap();
        while !driver.is_finished() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        assert!(driver.stop().await.is_ok());
    }
}
