//! 传感器模式状态机与容错读取测试

mod common;

use common::{TestRig, with_captured_logs};
use dex_board::BoardCall;
use dex_driver::{DriverError, Sensor};
use dex_protocol::{SensorPortId, SensorType};
use std::time::Duration;

const SETTLE: Duration = Duration::from_millis(20);
const BACKOFF: Duration = Duration::from_millis(50);

fn mode_sets(rig: &TestRig) -> Vec<BoardCall> {
    rig.mock
        .calls()
        .into_iter()
        .filter(|c| matches!(c, BoardCall::SetSensorType(..)))
        .collect()
}

#[test]
fn test_ensure_mode_twice_is_one_set_and_one_delay() {
    let mut rig = TestRig::new();
    rig.mock.set_mode_reading(SensorPortId::S2, SensorType::Ev3ColorReflected, 40);
    let color = rig.core.sensor_port_mut(SensorPortId::S2).bind_color().unwrap();
    rig.reset_records();

    color.ensure_mode(SensorType::Ev3ColorColor).unwrap();
    color.ensure_mode(SensorType::Ev3ColorColor).unwrap();

    assert_eq!(
        mode_sets(&rig),
        vec![BoardCall::SetSensorType(SensorPortId::S2, SensorType::Ev3ColorColor)]
    );
    assert_eq!(rig.clock.sleeps(), vec![SETTLE]);
}

#[test]
fn test_differing_mode_issues_new_set() {
    let mut rig = TestRig::new();
    rig.mock.set_mode_reading(SensorPortId::S1, SensorType::Ev3UltrasonicCm, 100);
    let sonar = rig.core.sensor_port_mut(SensorPortId::S1).bind_ultrasonic().unwrap();
    rig.reset_records();

    for mode in [
        SensorType::Ev3UltrasonicInches,
        SensorType::Ev3UltrasonicCm,
        SensorType::Ev3UltrasonicListen,
    ] {
        sonar.ensure_mode(mode).unwrap();
    }

    assert_eq!(mode_sets(&rig).len(), 3);
    assert_eq!(rig.clock.sleeps(), vec![SETTLE; 3]);
}

#[test]
fn test_accessor_switches_lazily() {
    let mut rig = TestRig::new();
    rig.mock.set_mode_reading(SensorPortId::S3, SensorType::Ev3ColorReflected, 33);
    rig.mock.set_mode_reading(SensorPortId::S3, SensorType::Ev3ColorAmbient, 8);
    let color = rig.core.sensor_port_mut(SensorPortId::S3).bind_color().unwrap();
    rig.reset_records();

    // 绑定时已处于反射光模式
    assert_eq!(color.reflected().unwrap(), 33);
    assert!(mode_sets(&rig).is_empty());

    assert_eq!(color.ambient().unwrap(), 8);
    assert_eq!(color.ambient().unwrap(), 8);
    assert_eq!(mode_sets(&rig).len(), 1);
    assert_eq!(color.mode(), Some(SensorType::Ev3ColorAmbient));
}

#[test]
fn test_read_raw_recovers_after_transient_not_ready() {
    let mut rig = TestRig::new();
    let touch = rig.core.sensor_port_mut(SensorPortId::S4).bind_touch().unwrap();
    rig.reset_records();

    rig.mock.push_not_ready(SensorPortId::S4, 65);
    rig.mock.push_reading(SensorPortId::S4, 1);

    let (reading, logs) = with_captured_logs(|| touch.read_raw());
    assert_eq!(reading.unwrap().values(), &[1]);
    assert_eq!(rig.clock.sleeps(), vec![BACKOFF; 65]);

    let notices: Vec<&str> = logs.lines().filter(|l| l.contains("not ready after")).collect();
    assert_eq!(notices.len(), 3, "logs:\n{logs}");
    assert!(notices[0].contains("after 20 attempts"));
    assert!(notices[1].contains("after 40 attempts"));
    assert!(notices[2].contains("after 60 attempts"));
    assert!(notices.iter().all(|l| l.contains("WARN")));
    assert!(notices[0].contains("TouchSensor on port S4"));
}

#[test]
fn test_no_notice_before_twentieth_failure() {
    let mut rig = TestRig::new();
    let touch = rig.core.sensor_port_mut(SensorPortId::S1).bind_touch().unwrap();

    rig.mock.push_not_ready(SensorPortId::S1, 19);
    rig.mock.push_reading(SensorPortId::S1, 0);

    let (pressed, logs) = with_captured_logs(|| touch.is_pressed());
    assert!(!pressed.unwrap());
    assert!(!logs.contains("not ready after"), "logs:\n{logs}");
}

#[test]
fn test_failure_count_restarts_per_read() {
    let mut rig = TestRig::new();
    let touch = rig.core.sensor_port_mut(SensorPortId::S2).bind_touch().unwrap();

    for _ in 0..3 {
        rig.mock.push_not_ready(SensorPortId::S2, 15);
        rig.mock.push_reading(SensorPortId::S2, 1);
    }

    let (_, logs) = with_captured_logs(|| {
        for _ in 0..3 {
            assert!(touch.is_pressed().unwrap());
        }
    });
    assert!(!logs.contains("not ready after"));
}

#[test]
fn test_read_raw_until_gives_up_when_asked() {
    let mut rig = TestRig::new();
    let touch = rig.core.sensor_port_mut(SensorPortId::S3).bind_touch().unwrap();
    rig.reset_records();
    rig.mock.push_not_ready(SensorPortId::S3, 1_000);

    let clock = rig.clock.clone();
    let err = touch
        .read_raw_until(&mut || clock.elapsed() < Duration::from_millis(500))
        .unwrap_err();

    assert!(matches!(err, DriverError::Cancelled { port: SensorPortId::S3 }));
    assert_eq!(rig.clock.elapsed(), Duration::from_millis(500));
}

#[test]
fn test_other_transport_errors_are_not_retried() {
    let mut rig = TestRig::new();
    let touch = rig.core.sensor_port_mut(SensorPortId::S1).bind_touch().unwrap();
    rig.reset_records();
    rig.mock.push_fault(
        SensorPortId::S1,
        dex_board::BoardDeviceErrorKind::InvalidPort,
        "bad port",
    );

    let err = touch.is_pressed().unwrap_err();
    assert!(matches!(err, DriverError::Board(_)));
    assert!(rig.clock.sleeps().is_empty());
    assert_eq!(rig.mock.calls(), vec![BoardCall::GetSensor(SensorPortId::S1)]);
}
