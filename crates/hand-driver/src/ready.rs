//! 端点就绪等待
//!
//! 默认策略是无限期等待端点上线。
//! 等待按 `poll` 时间片执行，每个时间片之间检查运行标志，
//! 因此即便是无限等待也能在停机时被取消。

use crate::endpoint::ActuatorEndpoint;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// 就绪等待策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadyWait {
    /// 无限等待（默认）
    #[default]
    Unbounded,
    /// 最多等待指定时长
    Within(Duration),
}

impl ReadyWait {
    /// 从超时值构造：`None` 或零表示无限等待
    pub fn from_timeout(timeout: Option<Duration>) -> Self {
        match timeout {
            Some(d) if !d.is_zero() => ReadyWait::Within(d),
            _ => ReadyWait::Unbounded,
        }
    }
}

/// 就绪等待结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyOutcome {
    /// 端点已就绪
    Ready,
    /// 期限内未就绪
    TimedOut,
    /// 运行标志被清除（停机）
    Cancelled,
}

/// 等待端点就绪
///
/// # 参数
/// - `endpoint`: 目标端点
/// - `policy`: 等待策略
/// - `poll`: 单次 `wait_ready` 的最长阻塞时间
/// - `is_running`: 运行标志，变为 `false` 时返回 `Cancelled`
///
/// 限时策略下，即使期限已过也会以零超时再询问端点一次，
/// 所以 `Within(Duration::ZERO)` 等价于一次非阻塞的就绪检查。
pub fn wait_until_ready<E: ActuatorEndpoint + ?Sized>(
    endpoint: &mut E,
    policy: ReadyWait,
    poll: Duration,
    is_running: &AtomicBool,
) -> ReadyOutcome {
    let deadline = match policy {
        ReadyWait::Unbounded => None,
        // 超出 Instant 表示范围的期限按无限等待处理
        ReadyWait::Within(timeout) => Instant::now().checked_add(timeout),
    };

    loop {
        if !is_running.load(Ordering::Acquire) {
            return ReadyOutcome::Cancelled;
        }

        let slice = match deadline {
            None => poll,
            Some(deadline) => poll.min(deadline.saturating_duration_since(Instant::now())),
        };

        if endpoint.wait_ready(slice) {
            return ReadyOutcome::Ready;
        }

        if let Some(deadline) = deadline
            && Instant::now() >= deadline
        {
            return ReadyOutcome::TimedOut;
        }
    }
}
