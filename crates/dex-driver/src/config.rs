//! 驱动配置
//!
//! 时间参数以毫秒整数存储，便于 TOML 书写：
//!
//! ```toml
//! motor_power_limit = 80
//!
//! [timing]
//! settle_delay_ms = 20
//! retry_backoff_ms = 50
//! not_ready_notice_every = 20
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// 配置加载错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 传感器时序参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// 模式切换后的稳定等待（毫秒）
    pub settle_delay_ms: u64,
    /// 传感器未就绪时的重试间隔（毫秒）
    pub retry_backoff_ms: u64,
    /// 连续未就绪多少次输出一次诊断（0 表示从不输出）
    pub not_ready_notice_every: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 20,
            retry_backoff_ms: 50,
            not_ready_notice_every: 20,
        }
    }
}

impl TimingConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// 第 `failures` 次连续失败时是否应输出诊断
    pub fn is_notice_due(&self, failures: u32) -> bool {
        self.not_ready_notice_every != 0 && failures % self.not_ready_notice_every == 0
    }
}

/// `Core` 配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub timing: TimingConfig,
    /// 电机绑定时设置的功率上限（百分比）
    pub motor_power_limit: u8,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            motor_power_limit: dex_protocol::DEFAULT_POWER_LIMIT,
        }
    }
}

impl CoreConfig {
    /// 从 TOML 字符串解析
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.motor_power_limit > 100 {
            return Err(ConfigError::Invalid(format!(
                "motor_power_limit must be within 0..=100, got {}",
                self.motor_power_limit
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.timing.settle_delay(), Duration::from_millis(20));
        assert_eq!(config.timing.retry_backoff(), Duration::from_millis(50));
        assert_eq!(config.timing.not_ready_notice_every, 20);
        assert_eq!(config.motor_power_limit, 100);
    }

    #[test]
    fn test_notice_cadence() {
        let timing = TimingConfig::default();
        let due: Vec<u32> = (1..=65).filter(|n| timing.is_notice_due(*n)).collect();
        assert_eq!(due, vec![20, 40, 60]);

        let silent = TimingConfig {
            not_ready_notice_every: 0,
            ..TimingConfig::default()
        };
        assert!(!(1..=100).any(|n| silent.is_notice_due(n)));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CoreConfig::from_toml_str(
            r#"
            [timing]
            retry_backoff_ms = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.timing.retry_backoff_ms, 5);
        assert_eq!(config.timing.settle_delay_ms, 20);
        assert_eq!(config.motor_power_limit, 100);
    }

    #[test]
    fn test_invalid_power_limit() {
        let err = CoreConfig::from_toml_str("motor_power_limit = 150").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = CoreConfig::from_toml_str("timing = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "motor_power_limit = 60").unwrap();
        writeln!(file, "[timing]").unwrap();
        writeln!(file, "settle_delay_ms = 30").unwrap();

        let config = CoreConfig::load(file.path()).unwrap();
        assert_eq!(config.motor_power_limit, 60);
        assert_eq!(config.timing.settle_delay(), Duration::from_millis(30));
    }
}
