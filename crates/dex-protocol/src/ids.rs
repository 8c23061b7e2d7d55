//! 端口标识定义
//!
//! 固件以位掩码标识端口（传感器 1..4 与电机 A..D 各占 4 位），
//! 驱动层则用 0..4 的下标在端口数组里查找。两种表示都由这里给出。

use std::fmt;

/// 传感器端口数量
pub const SENSOR_PORT_COUNT: usize = 4;

/// 电机端口数量
pub const MOTOR_PORT_COUNT: usize = 4;

/// 传感器端口（S1..S4）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SensorPortId {
    S1,
    S2,
    S3,
    S4,
}

impl SensorPortId {
    /// 全部传感器端口（按下标顺序）
    pub const ALL: [SensorPortId; SENSOR_PORT_COUNT] = [Self::S1, Self::S2, Self::S3, Self::S4];

    /// 端口数组下标（0..4）
    pub fn index(self) -> usize {
        self as usize
    }

    /// 从下标转换
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for SensorPortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.index() + 1)
    }
}

/// 电机端口（A..D）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MotorPortId {
    A,
    B,
    C,
    D,
}

impl MotorPortId {
    /// 全部电机端口（按下标顺序）
    pub const ALL: [MotorPortId; MOTOR_PORT_COUNT] = [Self::A, Self::B, Self::C, Self::D];

    /// 端口数组下标（0..4）
    pub fn index(self) -> usize {
        self as usize
    }

    /// 从下标转换
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for MotorPortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        };
        f.write_str(name)
    }
}

/// 任意端口（用于错误信息和日志）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PortId {
    Sensor(SensorPortId),
    Motor(MotorPortId),
}

impl From<SensorPortId> for PortId {
    fn from(port: SensorPortId) -> Self {
        Self::Sensor(port)
    }
}

impl From<MotorPortId> for PortId {
    fn from(port: MotorPortId) -> Self {
        Self::Motor(port)
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(port) => port.fmt(f),
            Self::Motor(port) => port.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_port_index() {
        assert_eq!(SensorPortId::S3.index(), 2);
        assert_eq!(SensorPortId::from_index(3), Some(SensorPortId::S4));
        assert_eq!(SensorPortId::from_index(4), None);
    }

    #[test]
    fn test_motor_port_index() {
        assert_eq!(MotorPortId::from_index(1), Some(MotorPortId::B));
    }

    #[test]
    fn test_port_display() {
        assert_eq!(SensorPortId::S2.to_string(), "S2");
        assert_eq!(MotorPortId::C.to_string(), "C");
        assert_eq!(PortId::from(MotorPortId::A).to_string(), "A");
        assert_eq!(PortId::from(SensorPortId::S4).to_string(), "S4");
    }
}
