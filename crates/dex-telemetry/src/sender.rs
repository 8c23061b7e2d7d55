use crate::TelemetryError;
use bytes::Bytes;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use serde::Serialize;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, warn};

/// 默认队列容量
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

#[derive(Debug, Default)]
struct SenderStats {
    sent: AtomicU64,
    dropped: AtomicU64,
    failed: AtomicU64,
}

/// UDP 遥测发送器
///
/// Drop 时关闭队列，发送线程把剩余数据发完后退出。
pub struct UdpTelemetry {
    tx: Option<Sender<Bytes>>,
    destination: SocketAddr,
    capacity: usize,
    stats: Arc<SenderStats>,
    thread: Option<JoinHandle<()>>,
}

impl UdpTelemetry {
    /// 以默认容量启动
    pub fn spawn(destination: impl ToSocketAddrs) -> Result<Self, TelemetryError> {
        Self::with_capacity(destination, DEFAULT_QUEUE_CAPACITY)
    }

    /// 指定队列容量启动，容量必须至少为 1
    pub fn with_capacity(
        destination: impl ToSocketAddrs,
        capacity: usize,
    ) -> Result<Self, TelemetryError> {
        if capacity == 0 {
            return Err(TelemetryError::ZeroCapacity);
        }
        let destination = destination
            .to_socket_addrs()?
            .next()
            .ok_or(TelemetryError::NoAddress)?;
        let bind_addr: SocketAddr = if destination.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(bind_addr)?;

        let (tx, rx) = bounded(capacity);
        let stats = Arc::new(SenderStats::default());
        let thread_stats = stats.clone();
        let thread = thread::Builder::new()
            .name("dex-telemetry".to_string())
            .spawn(move || send_loop(socket, destination, rx, thread_stats))?;

        debug!(%destination, capacity, "telemetry sender started");
        Ok(Self {
            tx: Some(tx),
            destination,
            capacity,
            stats,
            thread: Some(thread),
        })
    }

    pub fn destination(&self) -> SocketAddr {
        self.destination
    }

    /// 入队（不阻塞）
    pub fn send(&self, payload: impl Into<Bytes>) -> Result<(), TelemetryError> {
        let tx = self.tx.as_ref().ok_or(TelemetryError::Closed)?;
        tx.try_send(payload.into()).map_err(|e| match e {
            TrySendError::Full(_) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                TelemetryError::QueueFull {
                    capacity: self.capacity,
                }
            },
            TrySendError::Disconnected(_) => TelemetryError::Closed,
        })
    }

    /// 序列化为 JSON 后入队
    pub fn send_json<T: Serialize>(&self, value: &T) -> Result<(), TelemetryError> {
        self.send(serde_json::to_vec(value)?)
    }

    /// 已发出的数据报数
    pub fn sent(&self) -> u64 {
        self.stats.sent.load(Ordering::Relaxed)
    }

    /// 因队列满丢弃的负载数
    pub fn dropped(&self) -> u64 {
        self.stats.dropped.load(Ordering::Relaxed)
    }

    /// 发送失败的数据报数
    pub fn failed(&self) -> u64 {
        self.stats.failed.load(Ordering::Relaxed)
    }
}

impl Drop for UdpTelemetry {
    fn drop(&mut self) {
        // 先关闭发送端，接收端才会 Disconnected
        drop(self.tx.take());
        if let Some(handle) = self.thread.take()
            && handle.join().is_err()
        {
            error!("Telemetry thread panicked");
        }
    }
}

fn send_loop(
    socket: UdpSocket,
    destination: SocketAddr,
    rx: Receiver<Bytes>,
    stats: Arc<SenderStats>,
) {
    for payload in rx.iter() {
        match socket.send_to(&payload, destination) {
            Ok(_) => {
                stats.sent.fetch_add(1, Ordering::Relaxed);
            },
            Err(e) => {
                let failed = stats.failed.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(%destination, failed, "Telemetry send failed: {}", e);
            },
        }
    }
    debug!(%destination, "telemetry sender stopped");
}
