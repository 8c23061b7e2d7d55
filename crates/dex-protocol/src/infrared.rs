//! EV3 红外传感器解码
//!
//! - seek 模式：4 个通道，每个通道一对 (方位, 距离)
//! - remote 模式：4 个通道，每个通道一个按键编码（0..=11）
//!
//! 遥控器按键编码表（EV3 红外遥控器）：
//!
//! | 编码 | 按下的按键              |
//! |------|-------------------------|
//! | 0    | 无                      |
//! | 1    | 红上                    |
//! | 2    | 红下                    |
//! | 3    | 蓝上                    |
//! | 4    | 蓝下                    |
//! | 5    | 红上 + 蓝上             |
//! | 6    | 红上 + 蓝下             |
//! | 7    | 红下 + 蓝上             |
//! | 8    | 红下 + 蓝下             |
//! | 9    | 信标（广播）            |
//! | 10   | 红上 + 红下             |
//! | 11   | 蓝上 + 蓝下             |

use crate::{ProtocolError, SensorType};

/// 红外通道数量
pub const IR_CHANNEL_COUNT: usize = 4;

/// 接近度百分比（0..=100）
pub type Percent = u8;

/// 校验接近度读数
pub fn decode_proximity(value: i32) -> Result<Percent, ProtocolError> {
    u8::try_from(value)
        .ok()
        .filter(|p| *p <= 100)
        .ok_or(ProtocolError::InvalidValue {
            field: "proximity",
            value,
        })
}

/// seek 模式单通道读数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeekChannel {
    /// 信标方位（-25..=25，0 为正前方）
    pub heading: i32,
    /// 信标距离（固件原始值，-128 表示未检测到信标）
    pub distance: i32,
}

impl SeekChannel {
    /// 未检测到信标时固件给出的距离值
    pub const NO_BEACON: i32 = -128;

    /// 是否检测到该通道的信标
    pub fn has_beacon(&self) -> bool {
        self.distance != Self::NO_BEACON
    }
}

/// 解码 seek 读数（8 个值：每通道 heading, distance）
pub fn decode_seek(values: &[i32]) -> Result<[SeekChannel; IR_CHANNEL_COUNT], ProtocolError> {
    check_len(SensorType::Ev3InfraredSeek, values)?;
    let mut channels = [SeekChannel::default(); IR_CHANNEL_COUNT];
    for (channel, pair) in channels.iter_mut().zip(values.chunks_exact(2)) {
        channel.heading = pair[0];
        channel.distance = pair[1];
    }
    Ok(channels)
}

/// remote 模式单通道按键状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RemoteButtons {
    pub red_up: bool,
    pub red_down: bool,
    pub blue_up: bool,
    pub blue_down: bool,
    pub beacon: bool,
}

impl RemoteButtons {
    /// 从按键编码解码
    pub fn from_code(code: i32) -> Result<Self, ProtocolError> {
        let (red_up, red_down, blue_up, blue_down, beacon) = match code {
            0 => (false, false, false, false, false),
            1 => (true, false, false, false, false),
            2 => (false, true, false, false, false),
            3 => (false, false, true, false, false),
            4 => (false, false, false, true, false),
            5 => (true, false, true, false, false),
            6 => (true, false, false, true, false),
            7 => (false, true, true, false, false),
            8 => (false, true, false, true, false),
            9 => (false, false, false, false, true),
            10 => (true, true, false, false, false),
            11 => (false, false, true, true, false),
            _ => {
                return Err(ProtocolError::InvalidValue {
                    field: "remote_button_code",
                    value: code,
                });
            },
        };
        Ok(Self {
            red_up,
            red_down,
            blue_up,
            blue_down,
            beacon,
        })
    }

    /// 是否有任意按键被按下
    pub fn any(&self) -> bool {
        self.red_up || self.red_down || self.blue_up || self.blue_down || self.beacon
    }
}

/// 解码 remote 读数（4 个值：每通道一个按键编码）
pub fn decode_remote(values: &[i32]) -> Result<[RemoteButtons; IR_CHANNEL_COUNT], ProtocolError> {
    check_len(SensorType::Ev3InfraredRemote, values)?;
    let mut channels = [RemoteButtons::default(); IR_CHANNEL_COUNT];
    for (channel, code) in channels.iter_mut().zip(values) {
        *channel = RemoteButtons::from_code(*code)?;
    }
    Ok(channels)
}

fn check_len(mode: SensorType, values: &[i32]) -> Result<(), ProtocolError> {
    if values.len() != mode.reading_len() {
        return Err(ProtocolError::ReadingShape {
            mode,
            expected: mode.reading_len(),
            actual: values.len(),
        });
    }
    Ok(())
}
