use super::SensorHandle;
use crate::board::Board;
use crate::error::DriverError;
use dex_protocol::{SensorKind, SensorPortId, SensorType};
use std::sync::Arc;

const MODE: SensorType = SensorType::Touch;

/// 触碰传感器
#[derive(Debug, Clone)]
pub struct TouchSensor {
    pub(super) handle: SensorHandle,
}

impl TouchSensor {
    pub(crate) fn attach(port: SensorPortId, board: &Arc<Board>) -> Result<Self, DriverError> {
        Ok(Self {
            handle: SensorHandle::attach(port, SensorKind::Touch, board)?,
        })
    }

    pub fn is_pressed(&self) -> Result<bool, DriverError> {
        let reading = self.handle.read_in(MODE)?;
        Ok(reading.expect_scalar(MODE)? == 1)
    }
}
