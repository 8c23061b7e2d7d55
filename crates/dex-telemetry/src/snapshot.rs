//! 遥测快照
//!
//! 调用方在控制线程中采样电机和传感器的值，组装成快照后交给发送器。

use crate::TelemetryError;
use bytes::Bytes;
use dex_protocol::{MotorPortId, MotorStatus, SensorPortId, SensorReading};
use serde::{Deserialize, Serialize};

/// 单个电机的采样
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorSample {
    pub port: String,
    pub encoder: i32,
    pub dps: i32,
    pub power: i8,
    pub overloaded: bool,
    pub low_voltage_float: bool,
}

impl MotorSample {
    pub fn from_status(port: MotorPortId, status: &MotorStatus) -> Self {
        Self {
            port: port.to_string(),
            encoder: status.encoder,
            dps: status.dps,
            power: status.power,
            overloaded: status.flags.overloaded(),
            low_voltage_float: status.flags.low_voltage_float(),
        }
    }
}

/// 单个传感器的原始读数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    pub port: String,
    pub values: Vec<i32>,
}

impl SensorSample {
    pub fn new(port: SensorPortId, reading: &SensorReading) -> Self {
        Self {
            port: port.to_string(),
            values: reading.values().to_vec(),
        }
    }
}

/// 一次遥测快照
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// 采样时刻（调用方定义的毫秒时间戳）
    pub timestamp_ms: u64,
    #[serde(default)]
    pub motors: Vec<MotorSample>,
    #[serde(default)]
    pub sensors: Vec<SensorSample>,
}

impl TelemetrySnapshot {
    pub fn new(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            ..Self::default()
        }
    }

    pub fn with_motor(mut self, port: MotorPortId, status: &MotorStatus) -> Self {
        self.motors.push(MotorSample::from_status(port, status));
        self
    }

    pub fn with_sensor(mut self, port: SensorPortId, reading: &SensorReading) -> Self {
        self.sensors.push(SensorSample::new(port, reading));
        self
    }

    /// JSON 编码
    pub fn to_bytes(&self) -> Result<Bytes, TelemetryError> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }
}
