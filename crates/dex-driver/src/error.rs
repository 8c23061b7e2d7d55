//! 驱动层错误类型定义

use crate::port::DeviceKind;
use dex_board::BoardError;
use dex_protocol::{PortId, ProtocolError, SensorKind, SensorPortId, SensorType};
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 控制板传输错误（"未就绪"在轮询内部被吸收，不会从这里透出）
    #[error("Board error: {0}")]
    Board(#[from] BoardError),

    /// 读数解析错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 端口已绑定设备
    #[error("Port {port} is already bound to {device}")]
    AlreadyBound { port: PortId, device: DeviceKind },

    /// 端口未绑定设备
    #[error("Port {port} has no device bound")]
    NotBound { port: PortId },

    /// 端口绑定的传感器种类与请求不符
    #[error("Port {port} holds a {actual}, not a {expected}")]
    DeviceMismatch {
        port: SensorPortId,
        expected: SensorKind,
        actual: SensorKind,
    },

    /// 传感器不支持该模式
    #[error("{kind} does not support mode {mode:?}")]
    UnsupportedMode { kind: SensorKind, mode: SensorType },

    /// 参数越界
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: String },

    /// `Core` 已释放
    #[error("Core released; handle on port {port} is dead")]
    CoreReleased { port: PortId },

    /// `reset_all` 之后使用了旧句柄
    #[error("Handle on port {port} was invalidated by reset_all")]
    StaleHandle { port: PortId },

    /// 轮询被调用方取消
    #[error("Read on port {port} cancelled while sensor was not ready")]
    Cancelled { port: SensorPortId },
}

impl DriverError {
    /// 句柄是否已失效（需要重新绑定）
    pub fn is_dead_handle(&self) -> bool {
        matches!(self, Self::CoreReleased { .. } | Self::StaleHandle { .. })
    }
}
