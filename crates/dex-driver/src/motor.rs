//! 电机句柄

use crate::board::{Board, BoardLink};
use crate::error::DriverError;
use dex_protocol::{MotorLimits, MotorPortId, MotorPower, MotorStatus};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 电机句柄
///
/// 句柄本身无状态，所有指令直接下发到控制板，可自由克隆。
#[derive(Clone)]
pub struct Motor {
    port: MotorPortId,
    link: BoardLink,
}

impl fmt::Debug for Motor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Motor").field("port", &self.port).finish()
    }
}

impl Motor {
    /// 绑定时调用：编码器清零，然后浮空并设置功率上限
    pub(crate) fn attach(
        port: MotorPortId,
        board: &Arc<Board>,
        power_limit: u8,
    ) -> Result<Self, DriverError> {
        let motor = Self {
            port,
            link: BoardLink::new(port, board),
        };
        motor.reset_encoder()?;
        motor.set_power_float(Some(power_limit))?;
        Ok(motor)
    }

    pub fn port(&self) -> MotorPortId {
        self.port
    }

    /// 编码器清零
    pub fn reset_encoder(&self) -> Result<(), DriverError> {
        let board = self.link.upgrade()?;
        board.transport().reset_motor_encoder(self.port)?;
        Ok(())
    }

    /// 浮空（不驱动、不制动）本电机，可选地同时设置功率上限
    pub fn set_power_float(&self, power_limit: Option<u8>) -> Result<(), DriverError> {
        if let Some(limit) = power_limit {
            check_power_limit(limit)?;
        }
        let board = self.link.upgrade()?;
        let mut transport = board.transport();
        transport.set_motor_power(self.port, MotorPower::Float)?;
        if let Some(limit) = power_limit {
            transport.set_motor_limits(self.port, MotorLimits::power(limit))?;
        }
        debug!(port = %self.port, ?power_limit, "motor floated");
        Ok(())
    }

    /// 设置功率和速度上限（0 表示不限制）
    pub fn set_limits(&self, limits: MotorLimits) -> Result<(), DriverError> {
        check_power_limit(limits.power)?;
        let board = self.link.upgrade()?;
        board.transport().set_motor_limits(self.port, limits)?;
        Ok(())
    }

    /// 开环功率（-100..=100 百分比）
    pub fn set_power(&self, percent: i8) -> Result<(), DriverError> {
        let power = MotorPower::Percent(percent);
        if !power.is_valid() {
            return Err(DriverError::OutOfRange {
                field: "power",
                value: percent.to_string(),
            });
        }
        let board = self.link.upgrade()?;
        board.transport().set_motor_power(self.port, power)?;
        Ok(())
    }

    /// 闭环速度（度/秒）
    pub fn set_dps(&self, dps: f64) -> Result<(), DriverError> {
        if !dps.is_finite() {
            return Err(DriverError::OutOfRange {
                field: "dps",
                value: dps.to_string(),
            });
        }
        let board = self.link.upgrade()?;
        board.transport().set_motor_dps(self.port, dps)?;
        Ok(())
    }

    /// 以 0 度/秒保持（主动制动）
    pub fn stop(&self) -> Result<(), DriverError> {
        self.set_dps(0.0)
    }

    /// 编码器读数（度）
    pub fn degrees(&self) -> Result<i32, DriverError> {
        let board = self.link.upgrade()?;
        let degrees = board.transport().get_motor_encoder(self.port)?;
        Ok(degrees)
    }

    pub fn status(&self) -> Result<MotorStatus, DriverError> {
        let board = self.link.upgrade()?;
        let status = board.transport().get_motor_status(self.port)?;
        Ok(status)
    }
}

fn check_power_limit(limit: u8) -> Result<(), DriverError> {
    if limit > 100 {
        return Err(DriverError::OutOfRange {
            field: "power_limit",
            value: limit.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::tests::mock_board;
    use dex_board::{BoardCall, BoardDeviceError, BoardDeviceErrorKind, BoardError};

    #[test]
    fn test_attach_sequence() {
        let (mock, _clock, board) = mock_board();
        Motor::attach(MotorPortId::B, &board, 80).unwrap();

        assert_eq!(
            mock.calls(),
            vec![
                BoardCall::ResetMotorEncoder(MotorPortId::B),
                BoardCall::SetMotorPower(MotorPortId::B, MotorPower::Float),
                BoardCall::SetMotorLimits(MotorPortId::B, MotorLimits::power(80)),
            ]
        );
    }

    #[test]
    fn test_float_targets_own_port() {
        let (mock, _clock, board) = mock_board();
        let motor = Motor::attach(MotorPortId::A, &board, 100).unwrap();
        mock.take_calls();

        motor.set_power_float(None).unwrap();
        assert_eq!(
            mock.calls(),
            vec![BoardCall::SetMotorPower(MotorPortId::A, MotorPower::Float)]
        );
    }

    #[test]
    fn test_power_range() {
        let (mock, _clock, board) = mock_board();
        let motor = Motor::attach(MotorPortId::C, &board, 100).unwrap();

        motor.set_power(-100).unwrap();
        assert_eq!(mock.motor_power(MotorPortId::C), MotorPower::Percent(-100));

        let err = motor.set_power(101).unwrap_err();
        assert!(matches!(err, DriverError::OutOfRange { field: "power", .. }));
        assert!(matches!(
            motor.set_power_float(Some(120)).unwrap_err(),
            DriverError::OutOfRange { field: "power_limit", .. }
        ));
    }

    #[test]
    fn test_dps_and_stop() {
        let (mock, _clock, board) = mock_board();
        let motor = Motor::attach(MotorPortId::D, &board, 100).unwrap();

        motor.set_dps(-250.0).unwrap();
        assert_eq!(mock.motor_dps(MotorPortId::D), -250.0);
        motor.stop().unwrap();
        assert_eq!(mock.motor_dps(MotorPortId::D), 0.0);

        assert!(motor.set_dps(f64::NAN).is_err());
        assert!(motor.set_dps(f64::INFINITY).is_err());
    }

    #[test]
    fn test_encoder_and_status() {
        let (mock, _clock, board) = mock_board();
        let motor = Motor::attach(MotorPortId::A, &board, 100).unwrap();

        mock.set_encoder(MotorPortId::A, 720);
        mock.set_motor_flags(MotorPortId::A, 0b10);
        assert_eq!(motor.degrees().unwrap(), 720);

        let status = motor.status().unwrap();
        assert_eq!(status.encoder, 720);
        assert!(status.flags.overloaded());
        assert!(!status.flags.low_voltage_float());
    }

    #[test]
    fn test_transport_fault_propagates() {
        let (mock, _clock, board) = mock_board();
        let motor = Motor::attach(MotorPortId::B, &board, 100).unwrap();

        mock.set_motor_fault(Some(BoardDeviceError::new(
            BoardDeviceErrorKind::Firmware,
            "brown-out",
        )));
        let err = motor.set_dps(10.0).unwrap_err();
        assert!(matches!(err, DriverError::Board(BoardError::Device(_))));
    }
}
