//! 共享控制板状态
//!
//! `Board` 把传输层、时钟和时序参数捆在一起。`Core` 持有唯一的 `Arc<Board>`，
//! 句柄通过 [`BoardLink`] 弱引用访问。

use crate::clock::Clock;
use crate::config::TimingConfig;
use crate::error::DriverError;
use dex_board::BoardTransport;
use dex_protocol::PortId;
use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

pub(crate) struct Board {
    transport: Mutex<Box<dyn BoardTransport>>,
    clock: Arc<dyn Clock>,
    timing: TimingConfig,
    // reset_all 每调用一次加 1，旧句柄据此判定失效
    generation: AtomicU64,
}

impl Board {
    pub(crate) fn new(
        transport: Box<dyn BoardTransport>,
        clock: Arc<dyn Clock>,
        timing: TimingConfig,
    ) -> Self {
        Self {
            transport: Mutex::new(transport),
            clock,
            timing,
            generation: AtomicU64::new(0),
        }
    }

    /// 锁定传输层
    ///
    /// 调用方不得在持有 guard 时睡眠。
    pub(crate) fn transport(&self) -> MutexGuard<'_, Box<dyn BoardTransport>> {
        self.transport.lock()
    }

    pub(crate) fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub(crate) fn sleep(&self, duration: Duration) {
        self.clock.sleep(duration);
    }

    pub(crate) fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub(crate) fn bump_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// 句柄到控制板的弱引用
#[derive(Clone)]
pub(crate) struct BoardLink {
    port: PortId,
    board: Weak<Board>,
    generation: u64,
}

impl BoardLink {
    pub(crate) fn new(port: impl Into<PortId>, board: &Arc<Board>) -> Self {
        Self {
            port: port.into(),
            board: Arc::downgrade(board),
            generation: board.generation(),
        }
    }

    /// 升级为强引用
    ///
    /// `Core` 已释放返回 `CoreReleased`，`reset_all` 之后返回 `StaleHandle`。
    pub(crate) fn upgrade(&self) -> Result<Arc<Board>, DriverError> {
        let board = self
            .board
            .upgrade()
            .ok_or(DriverError::CoreReleased { port: self.port })?;
        if board.generation() != self.generation {
            return Err(DriverError::StaleHandle { port: self.port });
        }
        Ok(board)
    }
}
