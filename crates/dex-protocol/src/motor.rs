//! 电机相关定义
//!
//! 包含功率指令、限幅参数以及 `get_motor_status` 返回的状态结构。

use bilge::prelude::*;

/// 固件约定的"浮空"功率值（不驱动，电机可自由转动）
pub const MOTOR_FLOAT_RAW: i8 = -128;

/// 默认功率上限（百分比）
pub const DEFAULT_POWER_LIMIT: u8 = 100;

/// 电机功率指令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MotorPower {
    /// 浮空：不驱动，电机自由转动
    Float,
    /// 开环功率百分比（-100..=100）
    Percent(i8),
}

impl MotorPower {
    /// 固件编码（浮空为 -128）
    pub fn raw(self) -> i8 {
        match self {
            Self::Float => MOTOR_FLOAT_RAW,
            Self::Percent(value) => value,
        }
    }

    /// 是否为合法的功率百分比
    pub fn is_valid(self) -> bool {
        match self {
            Self::Float => true,
            Self::Percent(value) => (-100..=100).contains(&value),
        }
    }
}

/// 电机限幅参数
///
/// 0 表示不限制。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotorLimits {
    /// 功率上限（百分比，0..=100）
    pub power: u8,
    /// 速度上限（度/秒）
    pub dps: u32,
}

impl MotorLimits {
    /// 仅限制功率
    pub fn power(power: u8) -> Self {
        Self { power, dps: 0 }
    }
}

/// 电机状态标志位域（Byte 0）
///
/// - Bit 0: 低电压自动浮空（1：电池电压不足，电机已被固件浮空）
/// - Bit 1: 过载（1：实际速度远低于目标速度，正在加速或被阻挡）
/// - Bit 2-7: 保留
#[bitsize(8)]
#[derive(FromBits, DebugBits, Clone, Copy, Default, PartialEq)]
pub struct MotorFlags {
    pub low_voltage_float: bool, // Bit 0
    pub overloaded: bool,        // Bit 1
    pub reserved: u6,            // Bit 2-7: 保留
}

impl MotorFlags {
    /// 从原始字节构造
    pub fn from_raw(raw: u8) -> Self {
        Self::from(u8::new(raw))
    }

    /// 原始字节
    pub fn raw(self) -> u8 {
        u8::from(self).value()
    }
}

/// 电机状态（`get_motor_status` 返回）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotorStatus {
    /// 状态标志
    pub flags: MotorFlags,
    /// 当前功率百分比（-100..=100）
    pub power: i8,
    /// 编码器读数（度）
    pub encoder: i32,
    /// 当前角速度（度/秒）
    pub dps: i32,
}
