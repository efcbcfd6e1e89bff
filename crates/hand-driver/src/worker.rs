//! 分发线程模块
//!
//! 每只手一个线程，从自己的 FIFO 队列取请求并依次执行：
//!
//! ```text
//! Idle ──取出请求──▶ 目录查询 ──未知──▶ 记录并丢弃 ──▶ Idle
//!                        │
//!                        └─命中─▶ 构建轨迹 ─▶ AwaitingReady ─▶ Submitting ─▶ Idle
//! ```
//!
//! 就绪等待是唯一的挂起点。由于每只手各有一个线程，
//! 一只手的端点卡住不会延迟另一只手的请求。
//! 同一只手的新请求在队列中排队，严格按到达顺序处理（排队策略，不抢占）。

use crate::builder::DispatchOptions;
use crate::endpoint::ActuatorEndpoint;
use crate::hooks::{DispatchEvent, HookManager};
use crate::metrics::DispatchMetrics;
use crate::ready::{ReadyOutcome, wait_until_ready};
use crate::state::{AtomicDispatchState, DispatchState};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use hand_protocol::{GestureCatalog, Hand, build_trajectory};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, trace, warn};

/// 手势分发请求
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    /// 手势名（原样转发，不做修剪）
    pub gesture: String,
    /// 入队时间（用于排队延迟日志）
    pub enqueued_at: Instant,
}

impl DispatchRequest {
    pub fn new(gesture: impl Into<String>) -> Self {
        Self {
            gesture: gesture.into(),
            enqueued_at: Instant::now(),
        }
    }
}

/// 单条请求的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// 目标已提交
    Submitted,
    /// 未知手势，已丢弃
    Rejected,
    /// 端点在期限内未就绪，已丢弃
    Unreachable,
    /// 停机取消了就绪等待
    Cancelled,
    /// 端点拒绝提交
    SubmitFailed,
}

/// 单手共享上下文
///
/// 分发线程写入，引擎与订阅端只读。两只手各持有一个实例，
/// 唯一跨手共享的是只读的钩子列表。
#[derive(Debug)]
pub struct HandContext {
    /// 所属的手
    pub hand: Hand,
    /// 当前分发状态
    pub state: AtomicDispatchState,
    /// 分发指标
    pub metrics: DispatchMetrics,
    /// 钩子列表
    pub hooks: Arc<RwLock<HookManager>>,
    /// 已入队但尚未处理完的请求数
    pending: AtomicUsize,
}

impl HandContext {
    pub fn new(hand: Hand, hooks: Arc<RwLock<HookManager>>) -> Self {
        Self {
            hand,
            state: AtomicDispatchState::default(),
            metrics: DispatchMetrics::new(),
            hooks,
            pending: AtomicUsize::new(0),
        }
    }

    /// 已入队但尚未处理完的请求数
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    pub(crate) fn mark_enqueued(&self) {
        self.pending.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn mark_done(&self) {
        self.pending.fetch_sub(1, Ordering::AcqRel);
    }

    fn emit(&self, event: DispatchEvent) {
        let hooks = self.hooks.read();
        if !hooks.is_empty() {
            hooks.trigger_all(&event);
        }
    }
}

/// 处理一条请求（分发状态机的一轮）
///
/// 未知手势只产生一条 `warn` 日志和一个 `Rejected` 事件，不返回错误。
/// 返回时状态总是回到 `Idle`。
pub fn process_request<E: ActuatorEndpoint + ?Sized>(
    request: &DispatchRequest,
    endpoint: &mut E,
    catalog: &GestureCatalog,
    ctx: &HandContext,
    options: &DispatchOptions,
    is_running: &AtomicBool,
) -> DispatchOutcome {
    let hand = ctx.hand;
    let gesture = request.gesture.as_str();

    ctx.metrics.received.fetch_add(1, Ordering::Relaxed);
    trace!(
        "{}_hand: picked {:?} after {:?} in queue",
        hand,
        gesture,
        request.enqueued_at.elapsed()
    );
    ctx.emit(DispatchEvent::Received {
        hand,
        gesture: gesture.to_string(),
    });

    let Some(targets) = catalog.lookup(hand, gesture) else {
        warn!("{}_hand: Action not implemented: {:?}", hand, gesture);
        ctx.metrics.rejected.fetch_add(1, Ordering::Relaxed);
        ctx.emit(DispatchEvent::Rejected {
            hand,
            gesture: gesture.to_string(),
        });
        return DispatchOutcome::Rejected;
    };

    info!("Action: {} for {}_hand", gesture, hand);

    // 目录构造期已校验长度，这里失败说明目录与关节表不一致
    let command = match build_trajectory(hand, targets, options.duration) {
        Ok(command) => command,
        Err(e) => {
            error!("{}_hand: failed to build trajectory for {:?}: {}", hand, gesture, e);
            ctx.metrics.rejected.fetch_add(1, Ordering::Relaxed);
            ctx.emit(DispatchEvent::Rejected {
                hand,
                gesture: gesture.to_string(),
            });
            return DispatchOutcome::Rejected;
        },
    };

    ctx.state.set(DispatchState::AwaitingReady);
    debug!("{}_hand: waiting for {}", hand, endpoint.name());

    match wait_until_ready(endpoint, options.ready_wait, options.ready_poll, is_running) {
        ReadyOutcome::Ready => {},
        ReadyOutcome::TimedOut => {
            warn!(
                "{}_hand: endpoint {} unreachable within {:?}, dropping {:?}",
                hand,
                endpoint.name(),
                options.ready_wait,
                gesture
            );
            ctx.metrics.unreachable.fetch_add(1, Ordering::Relaxed);
            ctx.state.set(DispatchState::Idle);
            ctx.emit(DispatchEvent::Unreachable {
                hand,
                gesture: gesture.to_string(),
                endpoint: endpoint.name().to_string(),
            });
            return DispatchOutcome::Unreachable;
        },
        ReadyOutcome::Cancelled => {
            debug!("{}_hand: ready wait cancelled for {:?}", hand, gesture);
            ctx.metrics.cancelled.fetch_add(1, Ordering::Relaxed);
            ctx.state.set(DispatchState::Idle);
            ctx.emit(DispatchEvent::Cancelled {
                hand,
                gesture: gesture.to_string(),
            });
            return DispatchOutcome::Cancelled;
        },
    }

    ctx.state.set(DispatchState::Submitting);

    let outcome = match endpoint.submit_goal(command.clone()) {
        Ok(handle) => {
            debug!(
                "{}_hand: goal #{} sent to {}",
                hand,
                handle.goal_id(),
                endpoint.name()
            );
            ctx.metrics.submitted.fetch_add(1, Ordering::Relaxed);
            ctx.emit(DispatchEvent::Submitted {
                hand,
                gesture: gesture.to_string(),
                command,
                handle,
            });
            DispatchOutcome::Submitted
        },
        Err(e) => {
            error!("{}_hand: failed to submit {:?}: {}", hand, gesture, e);
            ctx.metrics.submit_failures.fetch_add(1, Ordering::Relaxed);
            ctx.emit(DispatchEvent::SubmitFailed {
                hand,
                gesture: gesture.to_string(),
                error: e,
            });
            DispatchOutcome::SubmitFailed
        },
    };

    ctx.state.set(DispatchState::Idle);
    outcome
}

/// 分发线程主循环
///
/// # 参数
/// - `endpoint`: 该手的动作端点（线程独占，退出时关闭）
/// - `requests`: 请求队列接收端
/// - `catalog`: 只读手势目录
/// - `ctx`: 单手共享上下文
/// - `options`: 分发参数
/// - `is_running`: 运行标志（停机时清除）
///
/// 停机时仍在队列中的请求被丢弃。
pub fn dispatch_loop<E: ActuatorEndpoint>(
    mut endpoint: E,
    requests: Receiver<DispatchRequest>,
    catalog: Arc<GestureCatalog>,
    ctx: Arc<HandContext>,
    options: DispatchOptions,
    is_running: Arc<AtomicBool>,
) {
    let hand = ctx.hand;
    debug!("{}_hand worker started (endpoint: {})", hand, endpoint.name());

    loop {
        // Acquire: 看到 false 时，停机方之前的写入都可见
        if !is_running.load(Ordering::Acquire) {
            trace!("{}_hand worker: is_running flag is false, exiting", hand);
            break;
        }

        // 短超时，保证能及时看到运行标志变化
        let request = match requests.recv_timeout(options.ready_poll) {
            Ok(request) => request,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                trace!("{}_hand worker: request channel disconnected", hand);
                break;
            },
        };

        let _ = process_request(
            &request,
            &mut endpoint,
            &catalog,
            &ctx,
            &options,
            &is_running,
        );
        ctx.mark_done();
    }

    let mut dropped = 0usize;
    while requests.try_recv().is_ok() {
        ctx.mark_done();
        dropped += 1;
    }
    if dropped > 0 {
        warn!("{}_hand worker: dropped {} queued requests on shutdown", hand, dropped);
    }

    endpoint.close();
    ctx.state.set(DispatchState::Idle);
    trace!("{}_hand worker: loop exited", hand);
}
