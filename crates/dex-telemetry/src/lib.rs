//! # Dex Telemetry
//!
//! 尽力而为的 UDP 遥测发送器。
//!
//! 生产者把字节负载放入有界队列（默认容量 1000）后立即返回，
//! 一个专用线程负责把队列里的数据发往固定目的地址。队列满时
//! `send` 返回 [`TelemetryError::QueueFull`]，负载被丢弃，生产者不会阻塞。
//!
//! 本 crate 不访问控制板，只发送调用方交给它的快照。

mod sender;
mod snapshot;

pub use sender::{DEFAULT_QUEUE_CAPACITY, UdpTelemetry};
pub use snapshot::{MotorSample, SensorSample, TelemetrySnapshot};

use thiserror::Error;

/// 遥测错误
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 队列容量为 0（会退化成无缓冲的交接通道）
    #[error("Telemetry queue capacity must be at least 1")]
    ZeroCapacity,

    /// 目的地址解析为空
    #[error("Destination resolved to no address")]
    NoAddress,

    /// 队列已满，负载被丢弃
    #[error("Telemetry queue full (capacity: {capacity})")]
    QueueFull { capacity: usize },

    /// 发送线程已退出
    #[error("Telemetry sender closed")]
    Closed,

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
