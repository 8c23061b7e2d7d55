//! Mock 控制板
//!
//! 无硬件依赖的 `BoardTransport` 实现，用于单元测试、集成测试和演示程序。
//!
//! - 每个传感器端口有一个脚本队列（就绪读数 / 未就绪 / 设备故障），
//!   队列耗尽后按"端口 + 当前模式"返回固定读数
//! - 记录全部调用（`BoardCall`），用于断言调用顺序
//! - `MockBoard` 可廉价克隆，克隆之间共享同一份状态：一份交给 `Core`，
//!   另一份留在测试里检查

use crate::{BoardDeviceError, BoardDeviceErrorKind, BoardError, BoardInfo, BoardTransport};
use dex_protocol::{
    DEFAULT_POWER_LIMIT, MOTOR_PORT_COUNT, MotorFlags, MotorLimits, MotorPortId, MotorPower,
    MotorStatus, SENSOR_PORT_COUNT, SensorPortId, SensorReading, SensorType,
};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::trace;

/// 一次传输层调用的记录
#[derive(Debug, Clone, PartialEq)]
pub enum BoardCall {
    SetSensorType(SensorPortId, SensorType),
    GetSensor(SensorPortId),
    ResetMotorEncoder(MotorPortId),
    SetMotorPower(MotorPortId, MotorPower),
    SetMotorLimits(MotorPortId, MotorLimits),
    SetMotorDps(MotorPortId, f64),
    GetMotorEncoder(MotorPortId),
    GetMotorStatus(MotorPortId),
    ResetAll,
    ReadInfo,
}

/// 传感器脚本项
#[derive(Debug, Clone)]
enum MockReply {
    Ready(SensorReading),
    NotReady,
    Fault(BoardDeviceError),
}

#[derive(Debug, Clone)]
struct MockMotor {
    encoder: i32,
    power: MotorPower,
    limits: MotorLimits,
    dps: f64,
    flags: u8,
}

impl Default for MockMotor {
    fn default() -> Self {
        Self {
            encoder: 0,
            power: MotorPower::Float,
            limits: MotorLimits::power(DEFAULT_POWER_LIMIT),
            dps: 0.0,
            flags: 0,
        }
    }
}

#[derive(Debug)]
struct MockState {
    calls: Vec<BoardCall>,
    sensor_types: [SensorType; SENSOR_PORT_COUNT],
    scripts: [VecDeque<MockReply>; SENSOR_PORT_COUNT],
    mode_readings: HashMap<(SensorPortId, SensorType), SensorReading>,
    motors: [MockMotor; MOTOR_PORT_COUNT],
    motor_fault: Option<BoardDeviceError>,
    info: BoardInfo,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            sensor_types: [SensorType::None; SENSOR_PORT_COUNT],
            scripts: Default::default(),
            mode_readings: HashMap::new(),
            motors: Default::default(),
            motor_fault: None,
            info: BoardInfo {
                manufacturer: "Dexter Industries".to_string(),
                board: "BrickPi3 (mock)".to_string(),
                serial: "00000000000000000000000000000000".to_string(),
                hardware_version: "3.2.1".to_string(),
                firmware_version: "1.4.8".to_string(),
                battery_voltage: 9.6,
                voltage_9v: 9.1,
                voltage_5v: 5.0,
                voltage_3v3: 3.3,
            },
        }
    }
}

impl MockState {
    fn check_motor_fault(&self) -> Result<(), BoardError> {
        match &self.motor_fault {
            Some(err) => Err(BoardError::Device(err.clone())),
            None => Ok(()),
        }
    }
}

/// Mock 控制板
#[derive(Debug, Clone, Default)]
pub struct MockBoard {
    state: Arc<Mutex<MockState>>,
}

impl MockBoard {
    /// 创建新的 Mock 控制板
    pub fn new() -> Self {
        Self::default()
    }

    /// 排队一个就绪读数
    pub fn push_reading(&self, port: SensorPortId, reading: impl Into<SensorReading>) {
        self.state.lock().scripts[port.index()].push_back(MockReply::Ready(reading.into()));
    }

    /// 排队 `count` 次"未就绪"
    pub fn push_not_ready(&self, port: SensorPortId, count: usize) {
        let mut state = self.state.lock();
        for _ in 0..count {
            state.scripts[port.index()].push_back(MockReply::NotReady);
        }
    }

    /// 排队一次设备故障
    pub fn push_fault(&self, port: SensorPortId, kind: BoardDeviceErrorKind, message: &str) {
        self.state.lock().scripts[port.index()]
            .push_back(MockReply::Fault(BoardDeviceError::new(kind, message)));
    }

    /// 设置脚本耗尽后，端口在指定模式下的固定读数
    pub fn set_mode_reading(
        &self,
        port: SensorPortId,
        mode: SensorType,
        reading: impl Into<SensorReading>,
    ) {
        self.state.lock().mode_readings.insert((port, mode), reading.into());
    }

    /// 让后续所有电机写操作失败（`None` 取消）
    pub fn set_motor_fault(&self, fault: Option<BoardDeviceError>) {
        self.state.lock().motor_fault = fault;
    }

    /// 设置编码器读数
    pub fn set_encoder(&self, port: MotorPortId, degrees: i32) {
        self.state.lock().motors[port.index()].encoder = degrees;
    }

    /// 设置电机状态标志
    pub fn set_motor_flags(&self, port: MotorPortId, flags: u8) {
        self.state.lock().motors[port.index()].flags = flags;
    }

    /// 替换板卡信息
    pub fn set_info(&self, info: BoardInfo) {
        self.state.lock().info = info;
    }

    /// 全部调用记录
    pub fn calls(&self) -> Vec<BoardCall> {
        self.state.lock().calls.clone()
    }

    /// 取出并清空调用记录
    pub fn take_calls(&self) -> Vec<BoardCall> {
        std::mem::take(&mut self.state.lock().calls)
    }

    /// 端口当前的传感器类型
    pub fn sensor_type(&self, port: SensorPortId) -> SensorType {
        self.state.lock().sensor_types[port.index()]
    }

    /// 端口脚本中剩余的条目数
    pub fn pending_replies(&self, port: SensorPortId) -> usize {
        self.state.lock().scripts[port.index()].len()
    }

    /// 电机当前的速度设定值
    pub fn motor_dps(&self, port: MotorPortId) -> f64 {
        self.state.lock().motors[port.index()].dps
    }

    /// 电机当前的功率指令
    pub fn motor_power(&self, port: MotorPortId) -> MotorPower {
        self.state.lock().motors[port.index()].power
    }

    /// 电机当前的限幅
    pub fn motor_limits(&self, port: MotorPortId) -> MotorLimits {
        self.state.lock().motors[port.index()].limits
    }
}

impl BoardTransport for MockBoard {
    fn set_sensor_type(
        &mut self,
        port: SensorPortId,
        sensor_type: SensorType,
    ) -> Result<(), BoardError> {
        let mut state = self.state.lock();
        state.calls.push(BoardCall::SetSensorType(port, sensor_type));
        state.sensor_types[port.index()] = sensor_type;
        trace!("mock: sensor {} -> {:?}", port, sensor_type);
        Ok(())
    }

    fn get_sensor(&mut self, port: SensorPortId) -> Result<SensorReading, BoardError> {
        let mut state = self.state.lock();
        state.calls.push(BoardCall::GetSensor(port));
        match state.scripts[port.index()].pop_front() {
            Some(MockReply::Ready(reading)) => Ok(reading),
            Some(MockReply::NotReady) => Err(BoardError::SensorNotReady(port)),
            Some(MockReply::Fault(err)) => Err(BoardError::Device(err)),
            None => {
                let mode = state.sensor_types[port.index()];
                state.mode_readings.get(&(port, mode)).cloned().ok_or_else(|| {
                    BoardError::Device(BoardDeviceError::new(
                        BoardDeviceErrorKind::InvalidResponse,
                        format!("no reading scripted for {} in mode {:?}", port, mode),
                    ))
                })
            },
        }
    }

    fn reset_motor_encoder(&mut self, port: MotorPortId) -> Result<(), BoardError> {
        let mut state = self.state.lock();
        state.calls.push(BoardCall::ResetMotorEncoder(port));
        state.check_motor_fault()?;
        state.motors[port.index()].encoder = 0;
        Ok(())
    }

    fn set_motor_power(&mut self, port: MotorPortId, power: MotorPower) -> Result<(), BoardError> {
        let mut state = self.state.lock();
        state.calls.push(BoardCall::SetMotorPower(port, power));
        state.check_motor_fault()?;
        let motor = &mut state.motors[port.index()];
        motor.power = power;
        motor.dps = 0.0;
        Ok(())
    }

    fn set_motor_limits(
        &mut self,
        port: MotorPortId,
        limits: MotorLimits,
    ) -> Result<(), BoardError> {
        let mut state = self.state.lock();
        state.calls.push(BoardCall::SetMotorLimits(port, limits));
        state.check_motor_fault()?;
        state.motors[port.index()].limits = limits;
        Ok(())
    }

    fn set_motor_dps(&mut self, port: MotorPortId, dps: f64) -> Result<(), BoardError> {
        let mut state = self.state.lock();
        state.calls.push(BoardCall::SetMotorDps(port, dps));
        state.check_motor_fault()?;
        state.motors[port.index()].dps = dps;
        Ok(())
    }

    fn get_motor_encoder(&mut self, port: MotorPortId) -> Result<i32, BoardError> {
        let mut state = self.state.lock();
        state.calls.push(BoardCall::GetMotorEncoder(port));
        Ok(state.motors[port.index()].encoder)
    }

    fn get_motor_status(&mut self, port: MotorPortId) -> Result<MotorStatus, BoardError> {
        let mut state = self.state.lock();
        state.calls.push(BoardCall::GetMotorStatus(port));
        let motor = &state.motors[port.index()];
        Ok(MotorStatus {
            flags: MotorFlags::from_raw(motor.flags),
            power: motor.power.raw(),
            encoder: motor.encoder,
            dps: motor.dps as i32,
        })
    }

    fn reset_all(&mut self) -> Result<(), BoardError> {
        let mut state = self.state.lock();
        state.calls.push(BoardCall::ResetAll);
        state.sensor_types = [SensorType::None; SENSOR_PORT_COUNT];
        for motor in state.motors.iter_mut() {
            motor.power = MotorPower::Float;
            motor.limits = MotorLimits::power(DEFAULT_POWER_LIMIT);
            motor.dps = 0.0;
        }
        Ok(())
    }

    fn manufacturer(&mut self) -> Result<String, BoardError> {
        Ok(self.state.lock().info.manufacturer.clone())
    }

    fn board_name(&mut self) -> Result<String, BoardError> {
        Ok(self.state.lock().info.board.clone())
    }

    fn serial_id(&mut self) -> Result<String, BoardError> {
        Ok(self.state.lock().info.serial.clone())
    }

    fn hardware_version(&mut self) -> Result<String, BoardError> {
        Ok(self.state.lock().info.hardware_version.clone())
    }

    fn firmware_version(&mut self) -> Result<String, BoardError> {
        Ok(self.state.lock().info.firmware_version.clone())
    }

    fn voltage_battery(&mut self) -> Result<f64, BoardError> {
        Ok(self.state.lock().info.battery_voltage)
    }

    fn voltage_9v(&mut self) -> Result<f64, BoardError> {
        Ok(self.state.lock().info.voltage_9v)
    }

    fn voltage_5v(&mut self) -> Result<f64, BoardError> {
        Ok(self.state.lock().info.voltage_5v)
    }

    fn voltage_3v3(&mut self) -> Result<f64, BoardError> {
        Ok(self.state.lock().info.voltage_3v3)
    }

    fn board_info(&mut self) -> Result<BoardInfo, BoardError> {
        let mut state = self.state.lock();
        state.calls.push(BoardCall::ReadInfo);
        Ok(state.info.clone())
    }
}
