//! 巡线演示
//!
//! 在 mock 控制板上运行阻尼单传感器巡线，Ctrl+C 或超时后停车。
//! 可选地把电机状态通过 UDP 遥测发出。
//!
//! ```bash
//! cargo run -p dex-sdk --example line_follow_demo --features mock -- \
//!     --seconds 3 --telemetry 127.0.0.1:9870
//! ```

use clap::Parser;
use dex_sdk::prelude::*;
use dex_sdk::{MockBoard, init_logging};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "line_follow_demo")]
#[command(about = "Follow a simulated line edge with one color sensor")]
struct Args {
    /// 运行时长（秒）
    #[arg(long, default_value_t = 5.0)]
    seconds: f64,

    /// 巡线参数文件（TOML）
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// 遥测目的地址（host:port）
    #[arg(long)]
    telemetry: Option<String>,

    /// 每多少次迭代发送一次遥测
    #[arg(long, default_value_t = 10)]
    telemetry_every: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LevelFilter::INFO)?;
    let args = Args::parse();

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let config = match &args.config {
        Some(path) => LineFollowConfig::load(path)?,
        None => LineFollowConfig::default(),
    };

    // 模拟传感器在线边缘左右摆动
    let board = MockBoard::new();
    for i in 0..2_000 {
        let phase = f64::from(i) * 0.05;
        board.push_reading(SensorPortId::S3, (33.0 + 20.0 * phase.sin()) as i32);
    }
    board.set_mode_reading(SensorPortId::S3, SensorType::Ev3ColorReflected, 33);

    let mut core = Core::new(board);
    let color = core.sensor_port_mut(SensorPortId::S3).bind_color()?;
    let left = core.motor_port_mut(MotorPortId::B).bind_motor()?;
    let right = core.motor_port_mut(MotorPortId::C).bind_motor()?;

    let telemetry = args.telemetry.as_deref().map(UdpTelemetry::spawn).transpose()?;
    let follower = LineFollower::with_config(left.clone(), right.clone(), core.clock(), config);

    let started = Instant::now();
    let deadline = Duration::from_secs_f64(args.seconds);
    let mut iteration = 0u64;

    let report = follower.follow_line_1cs(&color, || {
        iteration += 1;
        if let Some(telemetry) = &telemetry
            && iteration % args.telemetry_every.max(1) == 0
        {
            publish(telemetry, started, &left, &right);
        }
        running.load(Ordering::SeqCst) && started.elapsed() < deadline
    })?;

    info!(
        iterations = report.iterations,
        overruns = report.overruns,
        elapsed = ?started.elapsed(),
        "line following finished"
    );
    Ok(())
}

fn publish(telemetry: &UdpTelemetry, started: Instant, left: &Motor, right: &Motor) {
    let snapshot = match (left.status(), right.status()) {
        (Ok(l), Ok(r)) => TelemetrySnapshot::new(started.elapsed().as_millis() as u64)
            .with_motor(left.port(), &l)
            .with_motor(right.port(), &r),
        (Err(e), _) | (_, Err(e)) => {
            warn!("Failed to sample motors: {}", e);
            return;
        },
    };
    if let Err(e) = telemetry.send_json(&snapshot) {
        warn!("Telemetry dropped: {}", e);
    }
}
