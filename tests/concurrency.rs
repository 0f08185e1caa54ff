//! Cross-thread access to a running mission.

use sortie::config::MissionConfig;
use sortie::core::{Event, StatePath};
use sortie::mission::{MissionHandle, MissionStatus};
use sortie::missions::hello;
use sortie::runtime::{LatestReference, ManualClock, MonotonicClock};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

fn handle_with_clock(clock: ManualClock, sink: LatestReference) -> MissionHandle {
    let mission = hello::mission(MissionConfig::default())
        .clock(Arc::new(clock))
        .sink(sink)
        .build()
        .unwrap();
    MissionHandle::new(mission)
}

#[tokio::test]
async fn publishers_on_other_tasks_reach_the_state_machine() {
    let handle = handle_with_clock(ManualClock::new(), LatestReference::new());
    handle.activate().unwrap();

    let ui = handle.publisher("ui").unwrap();
    let producer = tokio::task::spawn_blocking(move || {
        for _ in 0..10 {
            ui.publish(Event::new(hello::HOLD)).unwrap();
            ui.publish(Event::new(hello::SAY)).unwrap();
        }
        ui.publish(Event::new(hello::HOLD)).unwrap();
    });
    producer.await.unwrap();

    let poller = handle.clone();
    tokio::task::spawn_blocking(move || poller.poll().unwrap())
        .await
        .unwrap();

    let path = handle.with(|m| m.active_path()).unwrap();
    assert_eq!(path, StatePath::from("ground.idle"));
    assert_eq!(handle.with(|m| m.history().len()).unwrap(), 21);
}

#[tokio::test]
async fn driver_ticks_until_deactivated() {
    let clock = ManualClock::new();
    let sink = LatestReference::new();
    let handle = handle_with_clock(clock.clone(), sink.clone());
    handle.activate().unwrap();

    let driver = handle.spawn_driver(Duration::from_millis(1));
    let waiter = tokio::task::spawn_blocking(move || {
        while sink.published() < 3 {
            clock.advance(hello::GROUND_MODE_TICK_PERIOD);
            std::thread::sleep(Duration::from_millis(2));
        }
        sink
    });
    let sink = waiter.await.unwrap();

    handle.deactivate().unwrap();
    let published = sink.published();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(sink.published(), published);
    assert!(driver.stop().await.is_ok());
    assert_eq!(handle.status().unwrap(), MissionStatus::Deactivated);
}

#[tokio::test]
async fn driver_exits_on_its_own_after_deactivation() {
    let handle = MissionHandle::new(
        hello::mission(MissionConfig::default())
            .clock(Arc::new(MonotonicClock::new()))
            .build()
            .unwrap(),
    );
    handle.activate().unwrap();
    let driver = handle.spawn_driver(Duration::from_millis(1));

    tokio::time::sleep(Duration::from_millis(120)).await;
    handle.deactivate().unwrap();
    while !driver.is_finished() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    let snapshot = handle.snapshot().unwrap();
    assert_eq!(snapshot.status, MissionStatus::Deactivated);
    assert!(snapshot.guidance_stats.ticks > 0);
    assert!(driver.stop().await.is_ok());
}

#[test]
fn mission_config_from_file_drives_the_handle() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "uid = \"com.example.hello\"").unwrap();
    writeln!(file, "driver_period_ms = 2").unwrap();

    let config = MissionConfig::load(file.path()).unwrap();
    let period = config.driver_period();
    let handle = MissionHandle::new(hello::mission(config).build().unwrap());
    handle.activate().unwrap();

    assert_eq!(period, Duration::from_millis(2));
    assert_eq!(
        handle
            .with(|m| m.guidance().active_mode().map(str::to_string))
            .unwrap()
            .as_deref(),
        Some("com.example.hello.ground")
    );
}
