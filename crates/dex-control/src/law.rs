//! 巡线控制律
//!
//! 输入反射值，输出左右轮角速度。无内部状态。

use crate::config::LineFollowConfig;

/// 左右轮角速度指令（度/秒）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelCommand {
    pub left: f64,
    pub right: f64,
}

impl WheelCommand {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    /// 两轮同速
    pub fn straight(dps: f64) -> Self {
        Self::new(dps, dps)
    }

    fn steer(forward: f64, deviation: f64) -> Self {
        Self::new(forward - deviation, forward + deviation)
    }
}

/// 单传感器，无减速
///
/// `d = (gray - r) * gain`，左轮 `v - d`，右轮 `v + d`。
pub fn simple_command(config: &LineFollowConfig, reflected: f64) -> WheelCommand {
    let deviation = (config.gray - reflected) * config.gain;
    WheelCommand::steer(config.base_speed, deviation)
}

/// 单传感器，偏离灰阈值越远越慢
///
/// `f = max(0, 1 - |gray - r| / gray)`，左轮 `v*f - d`，右轮 `v*f + d`。
pub fn damped_command(config: &LineFollowConfig, reflected: f64) -> WheelCommand {
    let deviation = (config.gray - reflected) * config.gain;
    let damping = (1.0 - (config.gray - reflected).abs() / config.gray).max(0.0);
    WheelCommand::steer(config.base_speed * damping, deviation)
}

/// 双传感器，按两侧差值转向
///
/// `d = (r1 - r2) * dual_gain`，`f = 1 - max(|gray - r1|, |gray - r2|) / gray`。
/// `f` 不做下限截断，两侧都远离灰阈值时会倒车。
pub fn dual_command(config: &LineFollowConfig, first: f64, second: f64) -> WheelCommand {
    let deviation = (first - second) * config.dual_gain;
    let worst = (config.gray - first).abs().max((config.gray - second).abs());
    let damping = 1.0 - worst / config.gray;
    WheelCommand::steer(config.base_speed * damping, deviation)
}
