//! # Dex Protocol
//!
//! 控制板固件词汇定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `ids`: 端口标识（4 个传感器端口、4 个电机端口）
//! - `sensor`: 传感器类型（固件模式寄存器取值）与传感器种类
//! - `motor`: 电机功率、限幅与状态位域
//! - `reading`: 传感器原始读数
//! - `infrared`: 红外传感器 seek / remote 解码
//!
//! 本 crate 只描述"板子说什么"，不关心板子怎么连（SPI、串口或 mock），
//! 传输层见 `dex-board`。

pub mod ids;
pub mod infrared;
pub mod motor;
pub mod reading;
pub mod sensor;

// 重新导出常用类型
pub use ids::*;
pub use infrared::*;
pub use motor::*;
pub use reading::*;
pub use sensor::*;

use thiserror::Error;

/// 协议解析错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// 读数元素个数与模式不符
    #[error("Unexpected reading shape for {mode:?}: expected {expected} values, got {actual}")]
    ReadingShape {
        mode: SensorType,
        expected: usize,
        actual: usize,
    },

    /// 字段取值超出协议定义
    #[error("Invalid value for field {field}: {value}")]
    InvalidValue { field: &'static str, value: i32 },

    /// 未知的传感器类型编码
    #[error("Unknown sensor type code: {0}")]
    UnknownSensorType(u8),
}
