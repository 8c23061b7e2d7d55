//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use dex_sdk::prelude::*;
//! ```

pub use dex_protocol::{
    ColorIndex, MotorLimits, MotorPortId, MotorPower, MotorStatus, PortId, RemoteButtons,
    SeekChannel, SensorKind, SensorPortId, SensorReading, SensorType,
};

pub use dex_board::{BoardInfo, BoardTransport};

pub use dex_driver::{
    Clock, ColorSensor, Core, CoreConfig, GyroSensor, InfraredSensor, Motor, Rgb, Sensor,
    SensorDevice, SpinClock, TimingConfig, TouchSensor, UltrasonicSensor,
};

pub use dex_control::{LineFollowConfig, LineFollower, LoopReport, WheelCommand, drive_until};

pub use dex_telemetry::{TelemetrySnapshot, UdpTelemetry};

// 错误类型
pub use dex_board::BoardError;
pub use dex_control::ControlError;
pub use dex_driver::{ConfigError, DriverError};
pub use dex_protocol::ProtocolError;
pub use dex_telemetry::TelemetryError;
