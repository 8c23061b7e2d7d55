//! 传感器句柄与模式状态机
//!
//! 每个传感器记录"最近一次写入固件的模式"。访问器在读取前调用
//! `ensure_mode`：模式相同则什么都不做，不同则写入新模式并等待稳定延迟。
//! 读取时遇到"未就绪"按退避间隔无限重试，每连续失败 N 次输出一条诊断。
//!
//! 模式锁在"切换 + 读取"整个过程中持有，同一端口的并发访问不会在
//! 切换和读取之间插入另一次切换。

mod color;
mod gyro;
mod infrared;
mod touch;
mod ultrasonic;

pub use color::{ColorSensor, Rgb};
pub use gyro::GyroSensor;
pub use infrared::InfraredSensor;
pub use touch::TouchSensor;
pub use ultrasonic::UltrasonicSensor;

use crate::board::{Board, BoardLink};
use crate::error::DriverError;
use dex_board::BoardError;
use dex_protocol::{SensorKind, SensorPortId, SensorReading, SensorType};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

/// 传感器公共句柄
///
/// 可克隆，克隆之间共享同一份模式记录。
#[derive(Clone)]
pub struct SensorHandle {
    port: SensorPortId,
    kind: SensorKind,
    link: BoardLink,
    mode: Arc<Mutex<Option<SensorType>>>,
}

impl fmt::Debug for SensorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorHandle")
            .field("port", &self.port)
            .field("kind", &self.kind)
            .field("mode", &*self.mode.lock())
            .finish()
    }
}

impl SensorHandle {
    /// 绑定时调用：写入默认模式，必要时做一次预热读取
    pub(crate) fn attach(
        port: SensorPortId,
        kind: SensorKind,
        board: &Arc<Board>,
    ) -> Result<Self, DriverError> {
        let handle = Self {
            port,
            kind,
            link: BoardLink::new(port, board),
            mode: Arc::new(Mutex::new(None)),
        };

        {
            let mut mode = handle.mode.lock();
            handle.switch_mode(board, &mut mode, kind.default_mode())?;
            if kind.needs_warmup_read() {
                let reading = handle.poll(board, &mut || true)?;
                trace!(port = %port, sensor = %kind, ?reading, "warm-up read");
            }
        }

        Ok(handle)
    }

    pub fn port(&self) -> SensorPortId {
        self.port
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// 最近一次写入固件的模式
    pub fn mode(&self) -> Option<SensorType> {
        *self.mode.lock()
    }

    /// 确保固件处于指定模式
    ///
    /// 与当前模式相同时不访问控制板、不等待。
    pub fn ensure_mode(&self, target: SensorType) -> Result<(), DriverError> {
        self.check_supported(target)?;
        let board = self.link.upgrade()?;
        let mut mode = self.mode.lock();
        self.switch_mode(&board, &mut mode, target)?;
        Ok(())
    }

    /// 以当前模式读取原始值（未就绪时无限重试）
    pub fn read_raw(&self) -> Result<SensorReading, DriverError> {
        self.read_raw_until(&mut || true)
    }

    /// 以当前模式读取原始值
    ///
    /// 每次未就绪后先询问 `keep_waiting`，返回 `false` 时放弃并返回 `Cancelled`。
    pub fn read_raw_until(
        &self,
        keep_waiting: &mut dyn FnMut() -> bool,
    ) -> Result<SensorReading, DriverError> {
        let board = self.link.upgrade()?;
        let _mode = self.mode.lock();
        self.poll(&board, keep_waiting)
    }

    /// 切换到 `target` 后读取
    pub(crate) fn read_in(&self, target: SensorType) -> Result<SensorReading, DriverError> {
        self.check_supported(target)?;
        let board = self.link.upgrade()?;
        let mut mode = self.mode.lock();
        self.switch_mode(&board, &mut mode, target)?;
        self.poll(&board, &mut || true)
    }

    fn check_supported(&self, target: SensorType) -> Result<(), DriverError> {
        if self.kind.supports(target) {
            Ok(())
        } else {
            Err(DriverError::UnsupportedMode {
                kind: self.kind,
                mode: target,
            })
        }
    }

    fn switch_mode(
        &self,
        board: &Board,
        mode: &mut Option<SensorType>,
        target: SensorType,
    ) -> Result<bool, DriverError> {
        if *mode == Some(target) {
            return Ok(false);
        }

        let result = board.transport().set_sensor_type(self.port, target);
        if let Err(e) = result {
            // 写入失败后固件状态未知，下次访问强制重写
            *mode = None;
            return Err(e.into());
        }
        *mode = Some(target);
        debug!(port = %self.port, sensor = %self.kind, mode = ?target, "sensor mode switched");

        board.sleep(board.timing().settle_delay());
        Ok(true)
    }

    fn poll(
        &self,
        board: &Board,
        keep_waiting: &mut dyn FnMut() -> bool,
    ) -> Result<SensorReading, DriverError> {
        let timing = board.timing();
        let mut failures: u32 = 0;

        loop {
            let result = board.transport().get_sensor(self.port);
            match result {
                Ok(reading) => {
                    if failures > 0 {
                        trace!(port = %self.port, attempts = failures, "sensor ready after retries");
                    }
                    return Ok(reading);
                },
                Err(e) if e.is_not_ready() => {
                    failures = failures.saturating_add(1);
                    if timing.is_notice_due(failures) {
                        warn!(
                            port = %self.port,
                            sensor = %self.kind,
                            attempts = failures,
                            "{} on port {} not ready after {} attempts",
                            self.kind,
                            self.port,
                            failures
                        );
                    }
                    if !keep_waiting() {
                        return Err(DriverError::Cancelled { port: self.port });
                    }
                    board.sleep(timing.retry_backoff());
                },
                Err(e) => {
                    if let BoardError::Device(device) = &e
                        && device.is_fatal()
                    {
                        error!(
                            port = %self.port,
                            sensor = %self.kind,
                            "Board fault while reading: {}",
                            device
                        );
                    }
                    return Err(e.into());
                },
            }
        }
    }
}

/// 传感器公共能力
///
/// 所有具体传感器都实现此 trait，通用操作由 [`SensorHandle`] 提供。
pub trait Sensor {
    fn handle(&self) -> &SensorHandle;

    fn port(&self) -> SensorPortId {
        self.handle().port()
    }

    fn kind(&self) -> SensorKind {
        self.handle().kind()
    }

    fn mode(&self) -> Option<SensorType> {
        self.handle().mode()
    }

    fn ensure_mode(&self, mode: SensorType) -> Result<(), DriverError> {
        self.handle().ensure_mode(mode)
    }

    fn read_raw(&self) -> Result<SensorReading, DriverError> {
        self.handle().read_raw()
    }

    fn read_raw_until(
        &self,
        keep_waiting: &mut dyn FnMut() -> bool,
    ) -> Result<SensorReading, DriverError> {
        self.handle().read_raw_until(keep_waiting)
    }
}

macro_rules! impl_sensor {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Sensor for $ty {
                fn handle(&self) -> &SensorHandle {
                    &self.handle
                }
            }
        )*
    };
}

impl_sensor!(GyroSensor, TouchSensor, ColorSensor, UltrasonicSensor, InfraredSensor);

/// 端口上绑定的传感器
#[derive(Debug, Clone)]
pub enum SensorDevice {
    Gyro(GyroSensor),
    Touch(TouchSensor),
    Color(ColorSensor),
    Ultrasonic(UltrasonicSensor),
    Infrared(InfraredSensor),
}

impl Sensor for SensorDevice {
    fn handle(&self) -> &SensorHandle {
        match self {
            Self::Gyro(s) => s.handle(),
            Self::Touch(s) => s.handle(),
            Self::Color(s) => s.handle(),
            Self::Ultrasonic(s) => s.handle(),
            Self::Infrared(s) => s.handle(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::clock::RecordingClock;
    use crate::config::TimingConfig;
    use dex_board::{BoardCall, BoardDeviceErrorKind, MockBoard};
    use std::io;
    use std::time::Duration;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn captured_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
        let buffer = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buffer.clone())
            .with_ansi(false)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        let logs = String::from_utf8_lossy(&buffer.0.lock()).into_owned();
        (result, logs)
    }

    pub(crate) fn mock_board() -> (MockBoard, Arc<RecordingClock>, Arc<Board>) {
        let mock = MockBoard::new();
        let clock = Arc::new(RecordingClock::new());
        let board = Arc::new(Board::new(
            Box::new(mock.clone()),
            clock.clone(),
            TimingConfig::default(),
        ));
        (mock, clock, board)
    }

    fn set_type_calls(mock: &MockBoard) -> usize {
        mock.calls()
            .iter()
            .filter(|c| matches!(c, BoardCall::SetSensorType(..)))
            .count()
    }

    #[test]
    fn test_attach_writes_default_mode() {
        let (mock, clock, board) = mock_board();
        let handle = SensorHandle::attach(SensorPortId::S2, SensorKind::Gyro, &board).unwrap();

        assert_eq!(handle.mode(), Some(SensorType::Ev3GyroAbsDps));
        assert_eq!(mock.sensor_type(SensorPortId::S2), SensorType::Ev3GyroAbsDps);
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(20)]);
        // 陀螺仪不做预热读取
        assert!(!mock.calls().contains(&BoardCall::GetSensor(SensorPortId::S2)));
    }

    #[test]
    fn test_attach_warm_up_read() {
        let (mock, _clock, board) = mock_board();
        mock.push_reading(SensorPortId::S1, 7);
        SensorHandle::attach(SensorPortId::S1, SensorKind::Ultrasonic, &board).unwrap();

        assert_eq!(
            mock.calls(),
            vec![
                BoardCall::SetSensorType(SensorPortId::S1, SensorType::Ev3UltrasonicCm),
                BoardCall::GetSensor(SensorPortId::S1),
            ]
        );
        assert_eq!(mock.pending_replies(SensorPortId::S1), 0);
    }

    #[test]
    fn test_ensure_mode_is_idempotent() {
        let (mock, clock, board) = mock_board();
        mock.push_reading(SensorPortId::S3, 0);
        let handle = SensorHandle::attach(SensorPortId::S3, SensorKind::Color, &board).unwrap();
        clock.take_sleeps();

        handle.ensure_mode(SensorType::Ev3ColorAmbient).unwrap();
        handle.ensure_mode(SensorType::Ev3ColorAmbient).unwrap();
        handle.ensure_mode(SensorType::Ev3ColorAmbient).unwrap();

        assert_eq!(set_type_calls(&mock), 2);
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(20)]);
        assert_eq!(handle.mode(), Some(SensorType::Ev3ColorAmbient));
    }

    #[test]
    fn test_ensure_mode_rejects_foreign_mode() {
        let (_mock, _clock, board) = mock_board();
        let handle = SensorHandle::attach(SensorPortId::S1, SensorKind::Touch, &board).unwrap();

        let err = handle.ensure_mode(SensorType::Ev3GyroAbsDps).unwrap_err();
        assert!(matches!(
            err,
            DriverError::UnsupportedMode {
                kind: SensorKind::Touch,
                mode: SensorType::Ev3GyroAbsDps
            }
        ));
        assert_eq!(handle.mode(), Some(SensorType::Touch));
    }

    #[test]
    fn test_released_board_rejects_access() {
        let (mock, _clock, board) = mock_board();
        let handle = SensorHandle::attach(SensorPortId::S4, SensorKind::Gyro, &board).unwrap();

        drop(board);
        let err = handle.ensure_mode(SensorType::Ev3GyroAbsDps).unwrap_err();
        assert!(matches!(err, DriverError::CoreReleased { .. }));
        assert_eq!(set_type_calls(&mock), 1);
    }

    #[test]
    fn test_poll_retries_with_backoff() {
        let (mock, clock, board) = mock_board();
        let handle = SensorHandle::attach(SensorPortId::S1, SensorKind::Touch, &board).unwrap();
        clock.take_sleeps();

        mock.push_not_ready(SensorPortId::S1, 3);
        mock.push_reading(SensorPortId::S1, 1);

        let reading = handle.read_raw().unwrap();
        assert_eq!(reading.values(), &[1]);
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(50); 3]);
    }

    #[test]
    fn test_poll_cancelled() {
        let (mock, clock, board) = mock_board();
        let handle = SensorHandle::attach(SensorPortId::S2, SensorKind::Touch, &board).unwrap();
        clock.take_sleeps();

        mock.push_not_ready(SensorPortId::S2, 10);
        let mut budget = 2;
        let err = handle
            .read_raw_until(&mut || {
                budget -= 1;
                budget > 0
            })
            .unwrap_err();

        assert!(matches!(err, DriverError::Cancelled { port: SensorPortId::S2 }));
        // 第 2 次失败时放弃，只睡眠 1 次
        assert_eq!(clock.sleeps().len(), 1);
        assert_eq!(mock.pending_replies(SensorPortId::S2), 8);
    }

    #[test]
    fn test_poll_propagates_device_fault() {
        let (mock, clock, board) = mock_board();
        let handle = SensorHandle::attach(SensorPortId::S3, SensorKind::Touch, &board).unwrap();
        clock.take_sleeps();

        mock.push_not_ready(SensorPortId::S3, 1);
        mock.push_fault(SensorPortId::S3, BoardDeviceErrorKind::Disconnected, "unplugged");

        let err = handle.read_raw().unwrap_err();
        match err {
            DriverError::Board(BoardError::Device(e)) => {
                assert_eq!(e.kind, BoardDeviceErrorKind::Disconnected)
            },
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(clock.sleeps().len(), 1);
    }

    #[test]
    fn test_fatal_fault_is_logged() {
        let (mock, _clock, board) = mock_board();
        let handle = SensorHandle::attach(SensorPortId::S2, SensorKind::Touch, &board).unwrap();

        mock.push_fault(SensorPortId::S2, BoardDeviceErrorKind::Firmware, "brown-out");
        mock.push_fault(SensorPortId::S2, BoardDeviceErrorKind::InvalidResponse, "garbled");

        let (result, logs) = captured_logs(|| handle.read_raw());
        assert!(result.is_err());
        assert!(logs.contains("ERROR"));
        assert!(logs.contains("brown-out"));

        // 非致命故障照样返回错误，但不输出 error 日志
        let (result, logs) = captured_logs(|| handle.read_raw());
        assert!(result.is_err());
        assert!(!logs.contains("ERROR"));
    }

    #[test]
    fn test_not_ready_notice_cadence() {
        let (mock, _clock, board) = mock_board();
        let handle = SensorHandle::attach(SensorPortId::S1, SensorKind::Touch, &board).unwrap();

        mock.push_not_ready(SensorPortId::S1, 19);
        mock.push_reading(SensorPortId::S1, 0);
        let (_, logs) = captured_logs(|| handle.read_raw().unwrap());
        assert!(!logs.contains("not ready"));

        mock.push_not_ready(SensorPortId::S1, 41);
        mock.push_reading(SensorPortId::S1, 0);
        let (_, logs) = captured_logs(|| handle.read_raw().unwrap());
        assert_eq!(logs.matches("not ready after").count(), 2);
        assert!(logs.contains("after 20 attempts"));
        assert!(logs.contains("after 40 attempts"));
    }

    #[test]
    fn test_sensor_device_dispatch() {
        let (_mock, _clock, board) = mock_board();
        let gyro = GyroSensor::attach(SensorPortId::S4, &board).unwrap();
        let device = SensorDevice::Gyro(gyro);

        assert_eq!(device.port(), SensorPortId::S4);
        assert_eq!(device.kind(), SensorKind::Gyro);
        assert_eq!(device.mode(), Some(SensorType::Ev3GyroAbsDps));
    }
}
