//! 传感器原始读数
//!
//! 固件返回的读数可能是一个标量（反射光、距离）、一对值（陀螺仪）或
//! 一组通道值（红外 seek / remote）。`SensorReading` 统一承载这些形状，
//! 解释工作由驱动层的类型化访问器完成。

use crate::{ProtocolError, SensorType};
use smallvec::SmallVec;

/// 传感器原始读数
///
/// 内联容量 8 覆盖了最大的读数（红外 seek：4 通道 × 2）。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorReading(SmallVec<[i32; 8]>);

impl SensorReading {
    /// 标量读数
    pub fn scalar(value: i32) -> Self {
        Self(SmallVec::from_slice(&[value]))
    }

    /// 多值读数
    pub fn from_values(values: &[i32]) -> Self {
        Self(SmallVec::from_slice(values))
    }

    /// 全部元素
    pub fn values(&self) -> &[i32] {
        &self.0
    }

    /// 元素个数
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 按模式要求取出元素
    ///
    /// 元素个数必须与 `mode.reading_len()` 完全一致。
    pub fn expect(&self, mode: SensorType) -> Result<&[i32], ProtocolError> {
        self.expect_len(mode, mode.reading_len())
    }

    /// 按指定个数取出元素
    pub fn expect_len(&self, mode: SensorType, expected: usize) -> Result<&[i32], ProtocolError> {
        if self.0.len() != expected {
            return Err(ProtocolError::ReadingShape {
                mode,
                expected,
                actual: self.0.len(),
            });
        }
        Ok(&self.0)
    }

    /// 取出唯一的标量
    pub fn expect_scalar(&self, mode: SensorType) -> Result<i32, ProtocolError> {
        Ok(self.expect_len(mode, 1)?[0])
    }
}

impl From<i32> for SensorReading {
    fn from(value: i32) -> Self {
        Self::scalar(value)
    }
}

impl From<&[i32]> for SensorReading {
    fn from(values: &[i32]) -> Self {
        Self::from_values(values)
    }
}

impl<const N: usize> From<[i32; N]> for SensorReading {
    fn from(values: [i32; N]) -> Self {
        Self::from_values(&values)
    }
}
