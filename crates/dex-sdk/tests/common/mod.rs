//! 集成测试公共设施

#![allow(dead_code)]

use dex_board::{BoardCall, MockBoard};
use dex_driver::{Core, CoreConfig, RecordingClock};
use dex_protocol::MotorPortId;
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Mock 控制板 + 虚拟时钟 + Core
pub struct TestRig {
    pub mock: MockBoard,
    pub clock: Arc<RecordingClock>,
    pub core: Core,
}

impl TestRig {
    pub fn new() -> Self {
        Self::with_config(CoreConfig::default())
    }

    pub fn with_config(config: CoreConfig) -> Self {
        let mock = MockBoard::new();
        let clock = Arc::new(RecordingClock::new());
        let core = Core::with_clock(mock.clone(), config, clock.clone());
        Self { mock, clock, core }
    }

    /// 清空调用记录和等待记录
    pub fn reset_records(&self) {
        self.mock.take_calls();
        self.clock.take_sleeps();
    }

    /// 只保留 SetMotorDps 调用
    pub fn dps_calls(&self) -> Vec<BoardCall> {
        self.mock
            .calls()
            .into_iter()
            .filter(|c| matches!(c, BoardCall::SetMotorDps(..)))
            .collect()
    }

    /// 最后两条调用是否为两个电机的 0 dps
    pub fn ends_with_stop(&self, left: MotorPortId, right: MotorPortId) -> bool {
        self.mock.calls().ends_with(&[
            BoardCall::SetMotorDps(left, 0.0),
            BoardCall::SetMotorDps(right, 0.0),
        ])
    }
}

/// 捕获 tracing 输出的 writer
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// 在线程局部订阅器下运行 `f`，返回其结果和期间输出的全部日志
pub fn with_captured_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, capture.contents())
}
