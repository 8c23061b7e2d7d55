//! 行驶直到前方出现障碍物
//!
//! 两个电机以固定速度前进，超声波读数不大于停车距离时停下。
//! 使用 mock 控制板模拟一个逐渐靠近的障碍物。
//!
//! ```bash
//! cargo run -p dex-sdk --example move_until_obstacle --features mock -- --stop-cm 50
//! ```

use clap::Parser;
use dex_sdk::prelude::*;
use dex_sdk::{MockBoard, init_logging};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "move_until_obstacle")]
#[command(about = "Drive forward until the sonar sees an obstacle")]
struct Args {
    /// 停车距离（厘米）
    #[arg(long, default_value_t = 50)]
    stop_cm: i32,

    /// 行驶速度（度/秒）
    #[arg(long, default_value_t = 20.0)]
    dps: f64,

    /// 超声波轮询间隔（毫秒）
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LevelFilter::INFO)?;
    let args = Args::parse();

    // 障碍物每次轮询靠近 15cm
    let board = MockBoard::new();
    for distance in (20..=200).rev().step_by(15) {
        board.push_reading(SensorPortId::S1, distance);
    }
    board.set_mode_reading(SensorPortId::S1, SensorType::Ev3UltrasonicCm, 20);

    let mut core = Core::new(board);
    core.log_board_info()?;

    let sonar = core.sensor_port_mut(SensorPortId::S1).bind_ultrasonic()?;
    let left = core.motor_port_mut(MotorPortId::A).bind_motor()?;
    let right = core.motor_port_mut(MotorPortId::B).bind_motor()?;

    let clock = core.clock();
    let report = drive_until(
        &left,
        &right,
        clock.as_ref(),
        args.dps,
        Duration::from_millis(args.poll_ms),
        || {
            let distance = sonar.distance_cm()?;
            info!(distance, "sonar");
            Ok(distance > args.stop_cm)
        },
    )?;

    let (left_status, right_status) = (left.status()?, right.status()?);
    info!(
        polls = report.iterations,
        left = ?left_status,
        right = ?right_status,
        "stopped in front of obstacle"
    );
    Ok(())
}
