//! 时钟抽象
//!
//! 驱动层和控制循环中的全部阻塞点（模式稳定等待、重试退避、采样周期）
//! 都经过 [`Clock`]。生产环境使用 [`SpinClock`]（`spin_sleep` 提供亚毫秒精度），
//! 测试使用 `RecordingClock` 记录每一次等待而不真正睡眠。

use std::time::{Duration, Instant};

/// 时钟接口
pub trait Clock: Send + Sync {
    /// 当前时刻
    fn now(&self) -> Instant;

    /// 阻塞等待指定时长
    fn sleep(&self, duration: Duration);
}

/// 真实时钟
///
/// 使用 `spin_sleep` 提供比 `std::thread::sleep` 更稳定的 10ms 级周期。
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinClock;

impl Clock for SpinClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        spin_sleep::sleep(duration);
    }
}

#[cfg(any(test, feature = "mock"))]
pub use recording::RecordingClock;

#[cfg(any(test, feature = "mock"))]
mod recording {
    use super::Clock;
    use parking_lot::Mutex;
    use std::time::{Duration, Instant};

    /// 记录型虚拟时钟
    ///
    /// `sleep` 只记录时长并推进虚拟时间，不阻塞线程。
    #[derive(Debug)]
    pub struct RecordingClock {
        origin: Instant,
        sleeps: Mutex<Vec<Duration>>,
    }

    impl RecordingClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                sleeps: Mutex::new(Vec::new()),
            }
        }

        /// 全部等待记录
        pub fn sleeps(&self) -> Vec<Duration> {
            self.sleeps.lock().clone()
        }

        /// 取出并清空等待记录
        pub fn take_sleeps(&self) -> Vec<Duration> {
            std::mem::take(&mut *self.sleeps.lock())
        }

        /// 虚拟时间累计
        pub fn elapsed(&self) -> Duration {
            self.sleeps.lock().iter().sum()
        }

        /// 指定时长的等待次数
        pub fn count_of(&self, duration: Duration) -> usize {
            self.sleeps.lock().iter().filter(|d| **d == duration).count()
        }
    }

    impl Default for RecordingClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for RecordingClock {
        fn now(&self) -> Instant {
            self.origin + self.elapsed()
        }

        fn sleep(&self, duration: Duration) {
            self.sleeps.lock().push(duration);
        }
    }
}
