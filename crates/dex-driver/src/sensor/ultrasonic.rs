use super::SensorHandle;
use crate::board::Board;
use crate::error::DriverError;
use dex_protocol::{SensorKind, SensorPortId, SensorType};
use std::sync::Arc;

/// EV3 超声波传感器
#[derive(Debug, Clone)]
pub struct UltrasonicSensor {
    pub(super) handle: SensorHandle,
}

impl UltrasonicSensor {
    pub(crate) fn attach(port: SensorPortId, board: &Arc<Board>) -> Result<Self, DriverError> {
        Ok(Self {
            handle: SensorHandle::attach(port, SensorKind::Ultrasonic, board)?,
        })
    }

    /// 距离（厘米）
    pub fn distance_cm(&self) -> Result<i32, DriverError> {
        self.scalar(SensorType::Ev3UltrasonicCm)
    }

    /// 距离（英寸）
    pub fn distance_inches(&self) -> Result<i32, DriverError> {
        self.scalar(SensorType::Ev3UltrasonicInches)
    }

    /// 监听模式：附近是否有其他超声波传感器在发声
    pub fn listen(&self) -> Result<bool, DriverError> {
        Ok(self.scalar(SensorType::Ev3UltrasonicListen)? == 1)
    }

    fn scalar(&self, mode: SensorType) -> Result<i32, DriverError> {
        let reading = self.handle.read_in(mode)?;
        Ok(reading.expect_scalar(mode)?)
    }
}
