//! 日志初始化
//!
//! 安装 `tracing_subscriber::fmt` 订阅器，过滤规则取自 `RUST_LOG`，
//! 未设置时使用调用方给出的默认级别。同时把 `log` crate 的记录桥接到 `tracing`。

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[derive(Error, Debug)]
pub enum LoggingError {
    /// 全局 logger 或订阅器已被安装
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// 初始化全局日志
///
/// 只能成功调用一次，重复调用返回 `AlreadyInitialized`。
pub fn init_logging(default_level: LevelFilter) -> Result<(), LoggingError> {
    tracing_log::LogTracer::init().map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
}
