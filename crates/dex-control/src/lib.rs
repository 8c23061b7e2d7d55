//! # Dex Control
//!
//! 巡线控制循环
//!
//! - `law`: 纯函数控制律（读数 → 左右轮角速度）
//! - `loop_runner`: 循环骨架（继续条件、10ms 锚点周期、退出时停车）
//! - `follower`: 三种巡线算法和"行驶直到条件不满足"
//!
//! 所有循环在任何退出路径上都会向两个电机下发 0 dps。

pub mod config;
pub mod follower;
pub mod law;
pub mod loop_runner;

pub use config::LineFollowConfig;
pub use follower::{LineFollower, drive_until};
pub use law::{WheelCommand, damped_command, dual_command, simple_command};
pub use loop_runner::{LoopReport, run_loop};

use dex_driver::{ConfigError, DriverError};
use thiserror::Error;

/// 控制循环错误
#[derive(Error, Debug)]
pub enum ControlError {
    /// 传感器读取或电机指令失败（电机已尝试停车）
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// 循环参数非法
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
