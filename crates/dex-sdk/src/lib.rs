//! Dex SDK - 基于 BrickPi3 类控制板的机器人核心
//!
//! # 架构设计
//!
//! 从底层到高层：
//!
//! - **协议层** (`protocol`): 端口、传感器模式、电机状态等固件词汇
//! - **控制板层** (`board`): `BoardTransport` 传输抽象（真实硬件或 mock）
//! - **驱动层** (`driver`): `Core`、端口注册表、传感器模式状态机、电机
//! - **控制层** (`control`): 巡线控制循环
//! - **遥测** (`telemetry`): UDP 遥测发送器
//!
//! # 快速开始
//!
//! ```rust,ignore
//! use dex_sdk::prelude::*;
//!
//! let mut core = Core::new(transport);
//! let color = core.sensor_port_mut(SensorPortId::S3).bind_color()?;
//! let left = core.motor_port_mut(MotorPortId::A).bind_motor()?;
//! let right = core.motor_port_mut(MotorPortId::B).bind_motor()?;
//!
//! let follower = LineFollower::new(left, right, core.clock());
//! follower.follow_line_1cs(&color, || running.load(Ordering::Relaxed))?;
//! ```

pub use dex_board as board;
pub use dex_control as control;
pub use dex_driver as driver;
pub use dex_protocol as protocol;
pub use dex_telemetry as telemetry;

mod logging;
pub mod prelude;

pub use logging::{LoggingError, init_logging};

pub use dex_board::{BoardError, BoardInfo, BoardTransport};
pub use dex_control::{ControlError, LineFollower};
pub use dex_driver::{Core, CoreConfig, DriverError};
pub use dex_protocol::ProtocolError;

#[cfg(feature = "mock")]
pub use dex_board::{BoardCall, MockBoard};
#[cfg(feature = "mock")]
pub use dex_driver::RecordingClock;
