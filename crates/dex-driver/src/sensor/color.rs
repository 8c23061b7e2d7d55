use super::SensorHandle;
use crate::board::Board;
use crate::error::DriverError;
use dex_protocol::{ColorIndex, SensorKind, SensorPortId, SensorType};
use std::sync::Arc;

/// 原始 RGB 分量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub red: i32,
    pub green: i32,
    pub blue: i32,
}

/// EV3 颜色传感器
#[derive(Debug, Clone)]
pub struct ColorSensor {
    pub(super) handle: SensorHandle,
}

impl ColorSensor {
    pub(crate) fn attach(port: SensorPortId, board: &Arc<Board>) -> Result<Self, DriverError> {
        Ok(Self {
            handle: SensorHandle::attach(port, SensorKind::Color, board)?,
        })
    }

    /// 反射光强度（0-100）
    pub fn reflected(&self) -> Result<i32, DriverError> {
        self.scalar(SensorType::Ev3ColorReflected)
    }

    /// 环境光强度（0-100）
    pub fn ambient(&self) -> Result<i32, DriverError> {
        self.scalar(SensorType::Ev3ColorAmbient)
    }

    /// 颜色编号（0-7，原始值）
    pub fn color_index(&self) -> Result<i32, DriverError> {
        self.scalar(SensorType::Ev3ColorColor)
    }

    pub fn color(&self) -> Result<ColorIndex, DriverError> {
        Ok(ColorIndex::from_raw(self.color_index()?)?)
    }

    /// RGB 分量
    ///
    /// 部分固件在分量之后附带一个环境光值，只取前三个。
    pub fn color_components(&self) -> Result<Rgb, DriverError> {
        let mode = SensorType::Ev3ColorColorComponents;
        let reading = self.handle.read_in(mode)?;
        let values = match reading.values() {
            [r, g, b, _] => [*r, *g, *b],
            _ => {
                let v = reading.expect(mode)?;
                [v[0], v[1], v[2]]
            },
        };
        Ok(Rgb {
            red: values[0],
            green: values[1],
            blue: values[2],
        })
    }

    fn scalar(&self, mode: SensorType) -> Result<i32, DriverError> {
        let reading = self.handle.read_in(mode)?;
        Ok(reading.expect_scalar(mode)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::tests::mock_board;
    use dex_protocol::ProtocolError;

    fn color_sensor() -> (dex_board::MockBoard, Arc<Board>, ColorSensor) {
        let (mock, _clock, board) = mock_board();
        mock.push_reading(SensorPortId::S3, 0);
        let sensor = ColorSensor::attach(SensorPortId::S3, &board).unwrap();
        (mock, board, sensor)
    }

    #[test]
    fn test_reflected_and_color() {
        let (mock, _board, sensor) = color_sensor();
        mock.push_reading(SensorPortId::S3, 33);
        mock.push_reading(SensorPortId::S3, 5);

        assert_eq!(sensor.reflected().unwrap(), 33);
        assert_eq!(sensor.color().unwrap(), ColorIndex::Red);
    }

    #[test]
    fn test_invalid_color_index() {
        let (mock, _board, sensor) = color_sensor();
        mock.push_reading(SensorPortId::S3, 9);
        let err = sensor.color().unwrap_err();
        assert!(matches!(err, DriverError::Protocol(ProtocolError::InvalidValue { .. })));
    }

    #[test]
    fn test_components_accepts_trailing_ambient() {
        let (mock, _board, sensor) = color_sensor();
        mock.push_reading(SensorPortId::S3, [10, 20, 30]);
        mock.push_reading(SensorPortId::S3, [11, 21, 31, 99]);

        assert_eq!(
            sensor.color_components().unwrap(),
            Rgb { red: 10, green: 20, blue: 30 }
        );
        assert_eq!(
            sensor.color_components().unwrap(),
            Rgb { red: 11, green: 21, blue: 31 }
        );
    }

    #[test]
    fn test_components_rejects_short_reading() {
        let (mock, _board, sensor) = color_sensor();
        mock.push_reading(SensorPortId::S3, [10, 20]);
        assert!(matches!(
            sensor.color_components().unwrap_err(),
            DriverError::Protocol(ProtocolError::ReadingShape { .. })
        ));
    }
}
