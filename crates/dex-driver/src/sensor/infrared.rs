use super::SensorHandle;
use crate::board::Board;
use crate::error::DriverError;
use dex_protocol::{
    IR_CHANNEL_COUNT, Percent, RemoteButtons, SeekChannel, SensorKind, SensorPortId, SensorType,
    decode_proximity, decode_remote, decode_seek,
};
use std::sync::Arc;

/// EV3 红外传感器
#[derive(Debug, Clone)]
pub struct InfraredSensor {
    pub(super) handle: SensorHandle,
}

impl InfraredSensor {
    pub(crate) fn attach(port: SensorPortId, board: &Arc<Board>) -> Result<Self, DriverError> {
        Ok(Self {
            handle: SensorHandle::attach(port, SensorKind::Infrared, board)?,
        })
    }

    /// 近似距离（0-100）
    pub fn proximity(&self) -> Result<Percent, DriverError> {
        let mode = SensorType::Ev3InfraredProximity;
        let reading = self.handle.read_in(mode)?;
        Ok(decode_proximity(reading.expect_scalar(mode)?)?)
    }

    /// 4 个频道的信标方位与距离
    pub fn seek(&self) -> Result<[SeekChannel; IR_CHANNEL_COUNT], DriverError> {
        let reading = self.handle.read_in(SensorType::Ev3InfraredSeek)?;
        Ok(decode_seek(reading.values())?)
    }

    /// 4 个频道的遥控器按键状态
    pub fn remote(&self) -> Result<[RemoteButtons; IR_CHANNEL_COUNT], DriverError> {
        let reading = self.handle.read_in(SensorType::Ev3InfraredRemote)?;
        Ok(decode_remote(reading.values())?)
    }
}
