//! 巡线参数

use dex_driver::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// 巡线参数
///
/// ```toml
/// gray = 33.0
/// gain = 0.1
/// dual_gain = 1.0
/// base_speed = 20.0
/// sample_period_ms = 10
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineFollowConfig {
    /// "灰"阈值：传感器一半在线上、一半在底色上时的反射值
    pub gray: f64,
    /// 单传感器算法的转向灵敏度
    pub gain: f64,
    /// 双传感器算法的转向灵敏度
    pub dual_gain: f64,
    /// 基础速度（度/秒）
    pub base_speed: f64,
    /// 采样周期（毫秒）
    pub sample_period_ms: u64,
}

impl Default for LineFollowConfig {
    fn default() -> Self {
        Self {
            gray: 33.0,
            gain: 0.1,
            dual_gain: 1.0,
            base_speed: 20.0,
            sample_period_ms: 10,
        }
    }
}

impl LineFollowConfig {
    pub fn sample_period(&self) -> Duration {
        Duration::from_millis(self.sample_period_ms)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // 阻尼系数以 gray 为分母
        if !(self.gray.is_finite() && self.gray > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "gray must be a positive number, got {}",
                self.gray
            )));
        }
        for (name, value) in [
            ("gain", self.gain),
            ("dual_gain", self.dual_gain),
            ("base_speed", self.base_speed),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{name} must be finite, got {value}")));
            }
        }
        if self.sample_period_ms == 0 {
            return Err(ConfigError::Invalid("sample_period_ms must be > 0".to_string()));
        }
        Ok(())
    }
}
