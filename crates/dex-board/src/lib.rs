//! # Dex Board Transport Layer
//!
//! 控制板传输层抽象，提供统一的 get/set 原语接口。
//!
//! 具体传输（SPI 固件协议等）不在本 crate 内实现；上层只依赖
//! [`BoardTransport`] trait。测试和演示使用 `mock` feature 提供的 `MockBoard`。

use dex_protocol::{
    MotorLimits, MotorPortId, MotorPower, MotorStatus, SensorPortId, SensorReading, SensorType,
};
use std::fmt;
use thiserror::Error;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(any(test, feature = "mock"))]
pub use mock::{BoardCall, MockBoard};

/// 传输层统一错误类型
#[derive(Error, Debug, Clone)]
pub enum BoardError {
    /// 传感器尚未就绪（固件报告，可重试）
    #[error("Sensor on port {0} not ready")]
    SensorNotReady(SensorPortId),
    #[error("Device Error: {0}")]
    Device(#[from] BoardDeviceError),
    #[error("Transport I/O error: {0}")]
    Io(String),
}

impl BoardError {
    /// 是否为可恢复的"传感器未就绪"
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::SensorNotReady(_))
    }
}

impl From<std::io::Error> for BoardError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// 设备错误的结构化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardDeviceErrorKind {
    Unknown,
    /// 板子未连接 / 无响应
    Disconnected,
    /// 端口参数非法
    InvalidPort,
    /// 固件返回了无法解析的回复
    InvalidResponse,
    /// 固件内部故障
    Firmware,
}

/// 结构化设备错误
#[derive(Error, Debug, Clone)]
#[error("{kind:?}: {message}")]
pub struct BoardDeviceError {
    pub kind: BoardDeviceErrorKind,
    pub message: String,
}

impl BoardDeviceError {
    pub fn new(kind: BoardDeviceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            BoardDeviceErrorKind::Disconnected | BoardDeviceErrorKind::Firmware
        )
    }
}

impl From<String> for BoardDeviceError {
    fn from(message: String) -> Self {
        Self::new(BoardDeviceErrorKind::Unknown, message)
    }
}

impl From<&str> for BoardDeviceError {
    fn from(message: &str) -> Self {
        Self::new(BoardDeviceErrorKind::Unknown, message)
    }
}

/// 板卡身份与电压信息（仅用于诊断输出）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoardInfo {
    pub manufacturer: String,
    pub board: String,
    pub serial: String,
    pub hardware_version: String,
    pub firmware_version: String,
    /// 电池电压（V）
    pub battery_voltage: f64,
    /// 9V 稳压输出（V）
    pub voltage_9v: f64,
    /// 5V 稳压输出（V）
    pub voltage_5v: f64,
    /// 3.3V 稳压输出（V）
    pub voltage_3v3: f64,
}

impl fmt::Display for BoardInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Manufacturer    : {}", self.manufacturer)?;
        writeln!(f, "Board           : {}", self.board)?;
        writeln!(f, "Serial Number   : {}", self.serial)?;
        writeln!(f, "Hardware version: {}", self.hardware_version)?;
        writeln!(f, "Firmware version: {}", self.firmware_version)?;
        writeln!(f, "Battery voltage : {:.3}", self.battery_voltage)?;
        writeln!(f, "9v voltage      : {:.3}", self.voltage_9v)?;
        writeln!(f, "5v voltage      : {:.3}", self.voltage_5v)?;
        write!(f, "3.3v voltage    : {:.3}", self.voltage_3v3)
    }
}

/// 控制板传输接口
///
/// 所有操作均以逻辑端口为键。`get_sensor` 在固件报告传感器未就绪时
/// 必须返回 [`BoardError::SensorNotReady`]，重试策略由上层负责。
pub trait BoardTransport: Send {
    fn set_sensor_type(&mut self, port: SensorPortId, sensor_type: SensorType)
    -> Result<(), BoardError>;
    fn get_sensor(&mut self, port: SensorPortId) -> Result<SensorReading, BoardError>;

    fn reset_motor_encoder(&mut self, port: MotorPortId) -> Result<(), BoardError>;
    fn set_motor_power(&mut self, port: MotorPortId, power: MotorPower) -> Result<(), BoardError>;
    fn set_motor_limits(&mut self, port: MotorPortId, limits: MotorLimits)
    -> Result<(), BoardError>;
    fn set_motor_dps(&mut self, port: MotorPortId, dps: f64) -> Result<(), BoardError>;
    fn get_motor_encoder(&mut self, port: MotorPortId) -> Result<i32, BoardError>;
    fn get_motor_status(&mut self, port: MotorPortId) -> Result<MotorStatus, BoardError>;

    /// 全部传感器设为 NONE，电机浮空，限幅恢复默认，LED 控制权交还固件
    fn reset_all(&mut self) -> Result<(), BoardError>;

    fn manufacturer(&mut self) -> Result<String, BoardError>;
    fn board_name(&mut self) -> Result<String, BoardError>;
    fn serial_id(&mut self) -> Result<String, BoardError>;
    fn hardware_version(&mut self) -> Result<String, BoardError>;
    fn firmware_version(&mut self) -> Result<String, BoardError>;
    fn voltage_battery(&mut self) -> Result<f64, BoardError>;
    fn voltage_9v(&mut self) -> Result<f64, BoardError>;
    fn voltage_5v(&mut self) -> Result<f64, BoardError>;
    fn voltage_3v3(&mut self) -> Result<f64, BoardError>;

    fn board_info(&mut self) -> Result<BoardInfo, BoardError> {
        Ok(BoardInfo {
            manufacturer: self.manufacturer()?,
            board: self.board_name()?,
            serial: self.serial_id()?,
            hardware_version: self.hardware_version()?,
            firmware_version: self.firmware_version()?,
            battery_voltage: self.voltage_battery()?,
            voltage_9v: self.voltage_9v()?,
            voltage_5v: self.voltage_5v()?,
            voltage_3v3: self.voltage_3v3()?,
        })
    }
}
