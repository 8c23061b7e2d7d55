//! 传感器类型与种类
//!
//! `SensorType` 是固件模式寄存器的取值：同一个物理传感器通过写入不同的
//! `SensorType` 切换测量量（例如颜色传感器的反射光 / 环境光 / 颜色编号）。
//! `SensorKind` 则是驱动层的设备种类，每个种类只接受自己的一组模式。

use crate::ProtocolError;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

/// 传感器类型（固件模式寄存器取值）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum SensorType {
    /// 未配置（复位后的默认值）
    None = 1,
    /// 通用触碰开关
    Touch = 4,
    /// EV3 陀螺仪：角度 + 角速度
    Ev3GyroAbsDps = 17,
    /// EV3 颜色传感器：反射光强度
    Ev3ColorReflected = 18,
    /// EV3 颜色传感器：环境光强度
    Ev3ColorAmbient = 19,
    /// EV3 颜色传感器：颜色编号
    Ev3ColorColor = 20,
    /// EV3 超声波：厘米
    Ev3UltrasonicCm = 21,
    /// EV3 超声波：英寸
    Ev3UltrasonicInches = 22,
    /// EV3 超声波：侦听其他超声波信标
    Ev3UltrasonicListen = 23,
    /// EV3 红外：接近度百分比
    Ev3InfraredProximity = 24,
    /// EV3 红外：信标搜索（4 通道）
    Ev3InfraredSeek = 25,
    /// EV3 红外：遥控器按键（4 通道）
    Ev3InfraredRemote = 26,
    /// EV3 颜色传感器：RGB 分量
    Ev3ColorColorComponents = 28,
}

impl SensorType {
    /// 从固件编码转换
    pub fn from_code(code: u8) -> Result<Self, ProtocolError> {
        Self::try_from(code).map_err(|e| ProtocolError::UnknownSensorType(e.number))
    }

    /// 固件编码
    pub fn code(self) -> u8 {
        self.into()
    }

    /// 该模式下一次读数包含的元素个数
    pub fn reading_len(self) -> usize {
        match self {
            Self::Ev3GyroAbsDps => 2,
            Self::Ev3ColorColorComponents => 3,
            Self::Ev3InfraredSeek => 8,
            Self::Ev3InfraredRemote => 4,
            _ => 1,
        }
    }
}

/// 传感器种类（驱动层的设备变体）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SensorKind {
    Gyro,
    Touch,
    Color,
    Ultrasonic,
    Infrared,
}

impl SensorKind {
    /// 该种类支持的全部模式
    pub fn modes(self) -> &'static [SensorType] {
        match self {
            Self::Gyro => &[SensorType::Ev3GyroAbsDps],
            Self::Touch => &[SensorType::Touch],
            Self::Color => &[
                SensorType::Ev3ColorReflected,
                SensorType::Ev3ColorAmbient,
                SensorType::Ev3ColorColor,
                SensorType::Ev3ColorColorComponents,
            ],
            Self::Ultrasonic => &[
                SensorType::Ev3UltrasonicCm,
                SensorType::Ev3UltrasonicInches,
                SensorType::Ev3UltrasonicListen,
            ],
            Self::Infrared => &[
                SensorType::Ev3InfraredProximity,
                SensorType::Ev3InfraredSeek,
                SensorType::Ev3InfraredRemote,
            ],
        }
    }

    /// 绑定时写入的默认模式
    pub fn default_mode(self) -> SensorType {
        self.modes()[0]
    }

    /// 是否支持指定模式
    pub fn supports(self, mode: SensorType) -> bool {
        self.modes().contains(&mode)
    }

    /// 绑定时是否需要丢弃一次预热读数
    ///
    /// 颜色、超声波、红外传感器上电后的第一个读数经常处于"未就绪"状态，
    /// 绑定时先读一次，让等待发生在绑定阶段而不是第一次真正使用时。
    pub fn needs_warmup_read(self) -> bool {
        matches!(self, Self::Color | Self::Ultrasonic | Self::Infrared)
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gyro => "GyroSensor",
            Self::Touch => "TouchSensor",
            Self::Color => "ColorSensor",
            Self::Ultrasonic => "UltrasonicSensor",
            Self::Infrared => "InfraredSensor",
        };
        f.write_str(name)
    }
}

/// EV3 颜色传感器的颜色编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ColorIndex {
    NoColor = 0,
    Black = 1,
    Blue = 2,
    Green = 3,
    Yellow = 4,
    Red = 5,
    White = 6,
    Brown = 7,
}

impl ColorIndex {
    /// 从原始读数转换
    pub fn from_raw(value: i32) -> Result<Self, ProtocolError> {
        u8::try_from(value)
            .ok()
            .and_then(|code| Self::try_from(code).ok())
            .ok_or(ProtocolError::InvalidValue {
                field: "color_index",
                value,
            })
    }
}
