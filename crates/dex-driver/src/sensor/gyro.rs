use super::SensorHandle;
use crate::board::Board;
use crate::error::DriverError;
use dex_protocol::{SensorKind, SensorPortId, SensorType};
use std::sync::Arc;

const MODE: SensorType = SensorType::Ev3GyroAbsDps;

/// EV3 陀螺仪
///
/// 固件模式同时返回绝对角度和角速度，三个访问器共用同一模式。
#[derive(Debug, Clone)]
pub struct GyroSensor {
    pub(super) handle: SensorHandle,
}

impl GyroSensor {
    pub(crate) fn attach(port: SensorPortId, board: &Arc<Board>) -> Result<Self, DriverError> {
        Ok(Self {
            handle: SensorHandle::attach(port, SensorKind::Gyro, board)?,
        })
    }

    /// 绝对角度（度）
    pub fn degrees(&self) -> Result<i32, DriverError> {
        Ok(self.angle_and_rate()?.0)
    }

    /// 角速度（度/秒）
    pub fn dps(&self) -> Result<i32, DriverError> {
        Ok(self.angle_and_rate()?.1)
    }

    /// 一次读取同时得到 (角度, 角速度)
    pub fn angle_and_rate(&self) -> Result<(i32, i32), DriverError> {
        let reading = self.handle.read_in(MODE)?;
        let values = reading.expect(MODE)?;
        Ok((values[0], values[1]))
    }
}
