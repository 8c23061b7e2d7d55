//! `Core`：控制板的聚合根

use crate::board::Board;
use crate::clock::{Clock, SpinClock};
use crate::config::CoreConfig;
use crate::error::DriverError;
use crate::port::{MotorPort, SensorPort};
use dex_board::{BoardInfo, BoardTransport};
use dex_protocol::{MotorPortId, SensorPortId};
use std::sync::Arc;
use tracing::info;

/// 机器人核心
///
/// 独占传输层，持有 4 个传感器端口（S1-S4）和 4 个电机端口（A-D）。
/// 端口绑定需要 `&mut Core`，设备句柄可在多线程间克隆使用。
///
/// # Example
///
/// ```rust,ignore
/// let mut core = Core::new(transport);
/// let color = core.sensor_port_mut(SensorPortId::S3).bind_color()?;
/// let left = core.motor_port_mut(MotorPortId::B).bind_motor()?;
///
/// left.set_dps(color.reflected()? as f64)?;
/// ```
pub struct Core {
    board: Arc<Board>,
    config: CoreConfig,
    sensor_ports: [SensorPort; 4],
    motor_ports: [MotorPort; 4],
}

impl Core {
    /// 使用默认配置和真实时钟
    pub fn new(transport: impl BoardTransport + 'static) -> Self {
        Self::with_config(transport, CoreConfig::default())
    }

    pub fn with_config(transport: impl BoardTransport + 'static, config: CoreConfig) -> Self {
        Self::with_clock(transport, config, Arc::new(SpinClock))
    }

    /// 指定时钟（测试中注入 `RecordingClock`）
    pub fn with_clock(
        transport: impl BoardTransport + 'static,
        config: CoreConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let board = Arc::new(Board::new(Box::new(transport), clock, config.timing.clone()));
        let sensor_ports = SensorPortId::ALL.map(|id| SensorPort::new(id, &board));
        let motor_ports =
            MotorPortId::ALL.map(|id| MotorPort::new(id, &board, config.motor_power_limit));
        Self {
            board,
            config,
            sensor_ports,
            motor_ports,
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// 共享时钟（控制循环用它计时）
    pub fn clock(&self) -> Arc<dyn Clock> {
        self.board.clock().clone()
    }

    pub fn sensor_port(&self, id: SensorPortId) -> &SensorPort {
        &self.sensor_ports[id.index()]
    }

    pub fn sensor_port_mut(&mut self, id: SensorPortId) -> &mut SensorPort {
        &mut self.sensor_ports[id.index()]
    }

    pub fn motor_port(&self, id: MotorPortId) -> &MotorPort {
        &self.motor_ports[id.index()]
    }

    pub fn motor_port_mut(&mut self, id: MotorPortId) -> &mut MotorPort {
        &mut self.motor_ports[id.index()]
    }

    pub fn sensor_ports(&self) -> impl Iterator<Item = &SensorPort> {
        self.sensor_ports.iter()
    }

    pub fn motor_ports(&self) -> impl Iterator<Item = &MotorPort> {
        self.motor_ports.iter()
    }

    /// 复位控制板
    ///
    /// 全部传感器回到未配置状态、全部电机浮空。所有端口解除绑定，
    /// 之前取得的句柄随之失效（返回 `StaleHandle`），需要重新绑定。
    pub fn reset_all(&mut self) -> Result<(), DriverError> {
        self.board.transport().reset_all()?;
        let generation = self.board.bump_generation();
        for port in self.sensor_ports.iter_mut() {
            port.clear();
        }
        for port in self.motor_ports.iter_mut() {
            port.clear();
        }
        info!(generation, "board reset; all ports unbound");
        Ok(())
    }

    /// 读取板卡身份和电压
    pub fn board_info(&self) -> Result<BoardInfo, DriverError> {
        let info = self.board.transport().board_info()?;
        Ok(info)
    }

    /// 读取并以 info 级别输出板卡信息
    pub fn log_board_info(&self) -> Result<BoardInfo, DriverError> {
        let info = self.board_info()?;
        for line in info.to_string().lines() {
            info!("{}", line);
        }
        Ok(info)
    }
}

impl std::fmt::Debug for Core {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Core")
            .field("config", &self.config)
            .field("sensor_ports", &self.sensor_ports)
            .field("motor_ports", &self.motor_ports)
            .finish()
    }
}
