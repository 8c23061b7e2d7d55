//! 驱动层模块
//!
//! 本模块提供 Dex 机器人控制板的设备驱动功能，包括：
//! - `Core`：唯一持有传输层的聚合根，管理 4 个传感器端口和 4 个电机端口
//! - 端口注册表：每个端口最多绑定一个设备，绑定后不可更换
//! - 传感器模式状态机：访问器按需切换固件模式（惰性、幂等）
//! - 容错轮询：传感器未就绪时按固定退避无限重试
//! - 电机指令：功率、速度、浮空、限幅与状态查询
//!
//! # 所有权
//!
//! `Core` 持有 `Arc<Board>` 的唯一强引用。传感器和电机句柄只保存端口号和
//! `Weak<Board>`，`Core` 释放后句柄的任何操作都返回
//! [`DriverError::CoreReleased`]。

mod board;
pub mod clock;
pub mod config;
mod error;
mod motor;
mod port;
mod robot;
pub mod sensor;

pub use clock::{Clock, SpinClock};
#[cfg(any(test, feature = "mock"))]
pub use clock::RecordingClock;
pub use config::{ConfigError, CoreConfig, TimingConfig};
pub use error::DriverError;
pub use motor::Motor;
pub use port::{DeviceKind, MotorPort, SensorPort};
pub use robot::Core;
pub use sensor::{
    ColorSensor, GyroSensor, InfraredSensor, Rgb, Sensor, SensorDevice, SensorHandle, TouchSensor,
    UltrasonicSensor,
};
