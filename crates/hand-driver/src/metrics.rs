//! 分发指标模块
//!
//! 每只手一组原子计数器，可以在任何线程读取，不引入锁竞争。

use std::sync::atomic::{AtomicU64, Ordering};

/// 单手分发指标
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// 分发线程取出的请求总数
    pub received: AtomicU64,
    /// 成功提交的目标数
    pub submitted: AtomicU64,
    /// 未知手势被丢弃的次数
    pub rejected: AtomicU64,
    /// 端点未就绪（限时等待超时）被丢弃的次数
    pub unreachable: AtomicU64,
    /// 端点拒绝提交的次数
    pub submit_failures: AtomicU64,
    /// 停机时就绪等待被取消的次数
    pub cancelled: AtomicU64,
    /// 入队失败（队列满或已关闭）的次数
    pub queue_drops: AtomicU64,
}

impl DispatchMetrics {
    /// 创建新的指标实例（所有计数器初始化为 0）
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取快照
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            submitted: self.submitted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            unreachable: self.unreachable.load(Ordering::Relaxed),
            submit_failures: self.submit_failures.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            queue_drops: self.queue_drops.load(Ordering::Relaxed),
        }
    }

    /// 重置所有计数器
    pub fn reset(&self) {
        self.received.store(0, Ordering::Relaxed);
        self.submitted.store(0, Ordering::Relaxed);
        self.rejected.store(0, Ordering::Relaxed);
        self.unreachable.store(0, Ordering::Relaxed);
        self.submit_failures.store(0, Ordering::Relaxed);
        self.cancelled.store(0, Ordering::Relaxed);
        self.queue_drops.store(0, Ordering::Relaxed);
    }
}

/// 指标快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub received: u64,
    pub submitted: u64,
    pub rejected: u64,
    pub unreachable: u64,
    pub submit_failures: u64,
    pub cancelled: u64,
    pub queue_drops: u64,
}

impl MetricsSnapshot {
    /// 已处理完毕的请求数（无论结果）
    ///
    /// 分发线程空闲时等于 `received`。停机时仍在队列中的请求从未被取出，
    /// 不计入两者。
    pub fn completed(&self) -> u64 {
        self.submitted + self.rejected + self.unreachable + self.submit_failures + self.cancelled
    }
}
