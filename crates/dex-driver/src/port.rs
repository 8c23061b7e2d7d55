//! 端口注册表
//!
//! 每个端口最多绑定一个设备。绑定成功后端口保存设备的一份克隆，
//! 调用方拿到另一份；二者共享模式记录。

use crate::board::Board;
use crate::error::DriverError;
use crate::motor::Motor;
use crate::sensor::{
    ColorSensor, GyroSensor, InfraredSensor, Sensor, SensorDevice, TouchSensor, UltrasonicSensor,
};
use dex_protocol::{MotorPortId, PortId, SensorKind, SensorPortId};
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::info;

/// 端口上绑定的设备种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Sensor(SensorKind),
    Motor,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(kind) => kind.fmt(f),
            Self::Motor => f.write_str("Motor"),
        }
    }
}

/// 传感器端口
pub struct SensorPort {
    id: SensorPortId,
    board: Weak<Board>,
    device: Option<SensorDevice>,
}

macro_rules! typed_getter {
    ($(#[$doc:meta])* $name:ident, $variant:ident, $ty:ty, $kind:expr) => {
        $(#[$doc])*
        pub fn $name(&self) -> Result<$ty, DriverError> {
            match self.sensor()? {
                SensorDevice::$variant(sensor) => Ok(sensor.clone()),
                other => Err(DriverError::DeviceMismatch {
                    port: self.id,
                    expected: $kind,
                    actual: other.kind(),
                }),
            }
        }
    };
}

impl SensorPort {
    pub(crate) fn new(id: SensorPortId, board: &Arc<Board>) -> Self {
        Self {
            id,
            board: Arc::downgrade(board),
            device: None,
        }
    }

    pub fn id(&self) -> SensorPortId {
        self.id
    }

    pub fn is_bound(&self) -> bool {
        self.device.is_some()
    }

    /// 已绑定的传感器
    pub fn sensor(&self) -> Result<&SensorDevice, DriverError> {
        self.device.as_ref().ok_or(DriverError::NotBound {
            port: self.id.into(),
        })
    }

    pub fn bind_gyro(&mut self) -> Result<GyroSensor, DriverError> {
        self.bind(GyroSensor::attach, SensorDevice::Gyro)
    }

    pub fn bind_touch(&mut self) -> Result<TouchSensor, DriverError> {
        self.bind(TouchSensor::attach, SensorDevice::Touch)
    }

    pub fn bind_color(&mut self) -> Result<ColorSensor, DriverError> {
        self.bind(ColorSensor::attach, SensorDevice::Color)
    }

    pub fn bind_ultrasonic(&mut self) -> Result<UltrasonicSensor, DriverError> {
        self.bind(UltrasonicSensor::attach, SensorDevice::Ultrasonic)
    }

    pub fn bind_infrared(&mut self) -> Result<InfraredSensor, DriverError> {
        self.bind(InfraredSensor::attach, SensorDevice::Infrared)
    }

    typed_getter!(gyro, Gyro, GyroSensor, SensorKind::Gyro);
    typed_getter!(touch, Touch, TouchSensor, SensorKind::Touch);
    typed_getter!(color, Color, ColorSensor, SensorKind::Color);
    typed_getter!(ultrasonic, Ultrasonic, UltrasonicSensor, SensorKind::Ultrasonic);
    typed_getter!(infrared, Infrared, InfraredSensor, SensorKind::Infrared);

    fn bind<S: Clone>(
        &mut self,
        attach: fn(SensorPortId, &Arc<Board>) -> Result<S, DriverError>,
        wrap: fn(S) -> SensorDevice,
    ) -> Result<S, DriverError> {
        if let Some(existing) = &self.device {
            return Err(DriverError::AlreadyBound {
                port: self.id.into(),
                device: DeviceKind::Sensor(existing.kind()),
            });
        }
        let board = self.board.upgrade().ok_or(DriverError::CoreReleased {
            port: self.id.into(),
        })?;

        // attach 失败时端口保持未绑定
        let sensor = attach(self.id, &board)?;
        let device = wrap(sensor.clone());
        info!(port = %self.id, sensor = %device.kind(), "sensor bound");
        self.device = Some(device);
        Ok(sensor)
    }

    pub(crate) fn clear(&mut self) {
        self.device = None;
    }
}

impl fmt::Debug for SensorPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorPort")
            .field("id", &self.id)
            .field("device", &self.device)
            .finish()
    }
}

/// 电机端口
pub struct MotorPort {
    id: MotorPortId,
    board: Weak<Board>,
    power_limit: u8,
    motor: Option<Motor>,
}

impl MotorPort {
    pub(crate) fn new(id: MotorPortId, board: &Arc<Board>, power_limit: u8) -> Self {
        Self {
            id,
            board: Arc::downgrade(board),
            power_limit,
            motor: None,
        }
    }

    pub fn id(&self) -> MotorPortId {
        self.id
    }

    pub fn is_bound(&self) -> bool {
        self.motor.is_some()
    }

    /// 绑定电机
    ///
    /// 依次：编码器清零、浮空、设置功率上限。
    pub fn bind_motor(&mut self) -> Result<Motor, DriverError> {
        let port = PortId::from(self.id);
        if self.motor.is_some() {
            return Err(DriverError::AlreadyBound {
                port,
                device: DeviceKind::Motor,
            });
        }
        let board = self
            .board
            .upgrade()
            .ok_or(DriverError::CoreReleased { port })?;

        let motor = Motor::attach(self.id, &board, self.power_limit)?;
        info!(port = %self.id, power_limit = self.power_limit, "motor bound");
        self.motor = Some(motor.clone());
        Ok(motor)
    }

    /// 已绑定的电机
    pub fn motor(&self) -> Result<Motor, DriverError> {
        self.motor.clone().ok_or(DriverError::NotBound {
            port: self.id.into(),
        })
    }

    pub(crate) fn clear(&mut self) {
        self.motor = None;
    }
}

impl fmt::Debug for MotorPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotorPort")
            .field("id", &self.id)
            .field("bound", &self.motor.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::tests::mock_board;
    use dex_board::BoardCall;

    #[test]
    fn test_single_binding() {
        let (mock, _clock, board) = mock_board();
        let mut port = SensorPort::new(SensorPortId::S1, &board);

        port.bind_touch().unwrap();
        mock.take_calls();

        let err = port.bind_gyro().unwrap_err();
        assert!(matches!(
            err,
            DriverError::AlreadyBound {
                device: DeviceKind::Sensor(SensorKind::Touch),
                ..
            }
        ));
        // 拒绝绑定时不访问控制板
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_typed_getters() {
        let (_mock, _clock, board) = mock_board();
        let mut port = SensorPort::new(SensorPortId::S2, &board);

        assert!(matches!(port.gyro().unwrap_err(), DriverError::NotBound { .. }));
        port.bind_gyro().unwrap();

        assert_eq!(port.gyro().unwrap().port(), SensorPortId::S2);
        let err = port.touch().unwrap_err();
        assert!(matches!(
            err,
            DriverError::DeviceMismatch {
                expected: SensorKind::Touch,
                actual: SensorKind::Gyro,
                ..
            }
        ));
    }

    #[test]
    fn test_failed_attach_leaves_port_unbound() {
        let (mock, _clock, board) = mock_board();
        let mut port = SensorPort::new(SensorPortId::S3, &board);

        // 颜色传感器绑定需要预热读取，没有脚本时 mock 返回设备错误
        assert!(port.bind_color().is_err());
        assert!(!port.is_bound());

        mock.push_reading(SensorPortId::S3, 0);
        assert!(port.bind_color().is_ok());
        assert!(port.is_bound());
    }

    #[test]
    fn test_motor_port_binding() {
        let (mock, _clock, board) = mock_board();
        let mut port = MotorPort::new(MotorPortId::C, &board, 100);

        assert!(matches!(port.motor().unwrap_err(), DriverError::NotBound { .. }));
        let motor = port.bind_motor().unwrap();
        assert_eq!(motor.port(), MotorPortId::C);
        assert!(port.motor().is_ok());

        mock.take_calls();
        assert!(matches!(
            port.bind_motor().unwrap_err(),
            DriverError::AlreadyBound {
                device: DeviceKind::Motor,
                ..
            }
        ));
        assert!(!mock.calls().contains(&BoardCall::ResetMotorEncoder(MotorPortId::C)));
    }
}
