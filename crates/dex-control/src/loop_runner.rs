//! 控制循环骨架
//!
//! 每次迭代：检查继续条件 → 读取传感器并计算指令 → 下发左右轮 → 睡眠到下一个锚点。
//! 使用绝对时间锚点，单次迭代的耗时不会累积成周期漂移。
//!
//! 退出时（条件为假、出错或 panic）两个电机都会收到 0 dps。

use crate::ControlError;
use crate::law::WheelCommand;
use dex_driver::{Clock, DriverError, Motor};
use std::time::Duration;
use tracing::{debug, error};

/// 循环统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopReport {
    /// 完成的迭代次数
    pub iterations: u64,
    /// 超出采样周期的迭代次数
    pub overruns: u64,
}

/// 停车守卫
///
/// 正常退出时调用 `stop()` 并传播错误；提前返回或 panic 时由 `Drop` 兜底。
struct StopGuard<'a> {
    motors: [&'a Motor; 2],
    armed: bool,
}

impl<'a> StopGuard<'a> {
    fn new(left: &'a Motor, right: &'a Motor) -> Self {
        Self {
            motors: [left, right],
            armed: true,
        }
    }

    fn stop(mut self) -> Result<(), DriverError> {
        self.armed = false;
        // 两个电机都要尝试，返回第一个错误
        let left = self.motors[0].stop();
        let right = self.motors[1].stop();
        left.and(right)
    }
}

impl Drop for StopGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        for motor in self.motors {
            if let Err(e) = motor.stop() {
                error!(port = %motor.port(), "Failed to stop motor on loop exit: {}", e);
            }
        }
    }
}

/// 运行控制循环
///
/// - `continue_condition`: 每次迭代开始时检查一次，返回 `Ok(false)` 时退出
/// - `step`: 读取传感器并计算本次指令
///
/// 条件函数和 `step` 的错误都会使循环停车后返回。
pub fn run_loop<C, S>(
    left: &Motor,
    right: &Motor,
    clock: &dyn Clock,
    period: Duration,
    mut continue_condition: C,
    mut step: S,
) -> Result<LoopReport, ControlError>
where
    C: FnMut() -> Result<bool, ControlError>,
    S: FnMut() -> Result<WheelCommand, ControlError>,
{
    let guard = StopGuard::new(left, right);
    let mut report = LoopReport::default();
    let mut next_tick = clock.now();

    while continue_condition()? {
        next_tick += period;

        let command = step()?;
        left.set_dps(command.left)?;
        right.set_dps(command.right)?;
        report.iterations += 1;

        let now = clock.now();
        if next_tick > now {
            clock.sleep(next_tick - now);
        } else {
            // 超时：不睡眠，重置锚点避免后续追赶
            report.overruns += 1;
            debug!(
                "Control loop overrun: iteration ran {:?} past its tick (period {:?})",
                now - next_tick,
                period
            );
            next_tick = now;
        }
    }

    guard.stop()?;
    debug!(
        iterations = report.iterations,
        overruns = report.overruns,
        "control loop finished"
    );
    Ok(report)
}
