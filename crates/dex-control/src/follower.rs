//! 巡线算法
//!
//! 三种算法共用 [`run_loop`] 骨架，区别只在控制律：
//!
//! | 方法 | 传感器 | 控制律 |
//! |------|--------|--------|
//! | `simple_follow_line_1cs` | 1 | [`simple_command`] |
//! | `follow_line_1cs` | 1 | [`damped_command`] |
//! | `follow_line_2cs` | 2 | [`dual_command`] |

use crate::ControlError;
use crate::config::LineFollowConfig;
use crate::law::{WheelCommand, damped_command, dual_command, simple_command};
use crate::loop_runner::{LoopReport, run_loop};
use dex_driver::{Clock, ColorSensor, DriverError, Motor};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// 双轮巡线器
///
/// `left` 对应控制律中的 `v - d`，`right` 对应 `v + d`。
pub struct LineFollower {
    left: Motor,
    right: Motor,
    clock: Arc<dyn Clock>,
    config: LineFollowConfig,
}

impl LineFollower {
    pub fn new(left: Motor, right: Motor, clock: Arc<dyn Clock>) -> Self {
        Self::with_config(left, right, clock, LineFollowConfig::default())
    }

    pub fn with_config(
        left: Motor,
        right: Motor,
        clock: Arc<dyn Clock>,
        config: LineFollowConfig,
    ) -> Self {
        Self {
            left,
            right,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &LineFollowConfig {
        &self.config
    }

    /// 单传感器巡线，不减速
    pub fn simple_follow_line_1cs<C>(
        &self,
        sensor: &ColorSensor,
        continue_condition: C,
    ) -> Result<LoopReport, ControlError>
    where
        C: FnMut() -> bool,
    {
        self.follow(continue_condition, |config| {
            let reflected = sensor.reflected()?;
            Ok(simple_command(config, f64::from(reflected)))
        })
    }

    /// 单传感器巡线，偏离线边缘时减速
    pub fn follow_line_1cs<C>(
        &self,
        sensor: &ColorSensor,
        continue_condition: C,
    ) -> Result<LoopReport, ControlError>
    where
        C: FnMut() -> bool,
    {
        self.follow(continue_condition, |config| {
            let reflected = sensor.reflected()?;
            Ok(damped_command(config, f64::from(reflected)))
        })
    }

    /// 双传感器巡线
    pub fn follow_line_2cs<C>(
        &self,
        first: &ColorSensor,
        second: &ColorSensor,
        continue_condition: C,
    ) -> Result<LoopReport, ControlError>
    where
        C: FnMut() -> bool,
    {
        self.follow(continue_condition, |config| {
            let r1 = first.reflected()?;
            let r2 = second.reflected()?;
            Ok(dual_command(config, f64::from(r1), f64::from(r2)))
        })
    }

    fn follow<C, L>(&self, mut continue_condition: C, mut law: L) -> Result<LoopReport, ControlError>
    where
        C: FnMut() -> bool,
        L: FnMut(&LineFollowConfig) -> Result<WheelCommand, DriverError>,
    {
        self.config.validate()?;
        let config = &self.config;
        run_loop(
            &self.left,
            &self.right,
            self.clock.as_ref(),
            config.sample_period(),
            || Ok(continue_condition()),
            || Ok(law(config)?),
        )
    }
}

/// 两轮以固定速度行驶，直到 `continue_condition` 返回 `false`，然后停车
///
/// 条件函数可以读取传感器，读取失败同样会停车并返回错误。
pub fn drive_until<C>(
    left: &Motor,
    right: &Motor,
    clock: &dyn Clock,
    dps: f64,
    poll: Duration,
    mut continue_condition: C,
) -> Result<LoopReport, ControlError>
where
    C: FnMut() -> Result<bool, DriverError>,
{
    info!(left = %left.port(), right = %right.port(), dps, "driving until condition clears");
    run_loop(
        left,
        right,
        clock,
        poll,
        || Ok(continue_condition()?),
        || Ok(WheelCommand::straight(dps)),
    )
}
