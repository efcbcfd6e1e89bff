//! 分发引擎
//!
//! 对外的 [`DispatchEngine`]，封装两个分发线程、请求队列与共享上下文。
//! 两只手完全独立：各自的线程、队列、运行标志、指标与端点。

use crate::builder::DispatchOptions;
use crate::endpoint::ActuatorEndpoint;
use crate::error::DriverError;
use crate::hooks::{DispatchHook, HookManager};
use crate::inbound::{GestureSubscription, InboundAdapter, RequestQueue};
use crate::metrics::MetricsSnapshot;
use crate::state::DispatchState;
use crate::worker::{HandContext, dispatch_loop};
use crossbeam_channel::{RecvTimeoutError, bounded, unbounded};
use hand_protocol::{GestureCatalog, Hand};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// 带超时的线程 join
trait JoinTimeout {
    fn join_timeout(self, timeout: Duration) -> thread::Result<()>;
}

impl<T: Send + 'static> JoinTimeout for JoinHandle<T> {
    fn join_timeout(self, timeout: Duration) -> thread::Result<()> {
        let (tx, rx) = bounded(1);

        // 看门狗线程代为 join，超时后留给进程退出时回收
        thread::spawn(move || {
            let result = self.join();
            let _ = tx.send(result);
        });

        match rx.recv_timeout(timeout) {
            Ok(join_result) => join_result.map(|_| ()),
            Err(RecvTimeoutError::Timeout) => Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "Thread join timeout",
            ))),
            Err(RecvTimeoutError::Disconnected) => Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "Thread panicked during join",
            ))),
        }
    }
}

/// 单手分发线程
struct HandWorker {
    queue: RequestQueue,
    ctx: Arc<HandContext>,
    is_running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    endpoint_name: String,
    topic: String,
}

impl HandWorker {
    fn spawn<E: ActuatorEndpoint>(
        hand: Hand,
        endpoint: E,
        catalog: Arc<GestureCatalog>,
        options: &DispatchOptions,
        hooks: Arc<RwLock<HookManager>>,
        topic: String,
    ) -> Result<Self, DriverError> {
        let (tx, rx) = if options.queue_capacity == 0 {
            unbounded()
        } else {
            bounded(options.queue_capacity)
        };

        let ctx = Arc::new(HandContext::new(hand, hooks));
        let is_running = Arc::new(AtomicBool::new(true));
        let endpoint_name = endpoint.name().to_string();

        let thread = {
            let ctx = Arc::clone(&ctx);
            let is_running = Arc::clone(&is_running);
            let options = options.clone();
            thread::Builder::new()
                .name(format!("{}-hand-dispatch", hand))
                .spawn(move || dispatch_loop(endpoint, rx, catalog, ctx, options, is_running))
                .map_err(|e| DriverError::WorkerSpawn(e.to_string()))?
        };

        Ok(Self {
            queue: RequestQueue::new(tx, Arc::clone(&ctx), options.queue_capacity),
            ctx,
            is_running,
            thread: Some(thread),
            endpoint_name,
            topic,
        })
    }

    fn stop(&mut self, join_timeout: Duration) {
        // Release: 分发线程看到 false 时，之前的写入都可见
        self.is_running.store(false, Ordering::Release);

        if let Some(handle) = self.thread.take()
            && let Err(_e) = handle.join_timeout(join_timeout)
        {
            error!(
                "{}_hand worker panicked or failed to shut down within {:?}",
                self.ctx.hand, join_timeout
            );
        }
    }
}

/// 双手手势分发引擎
///
/// 由 [`HandDriverBuilder`](crate::HandDriverBuilder) 创建。
/// `dispatch` 只负责入队，立即返回；目录查询、就绪等待和提交都在该手的分发线程上完成。
/// Drop 时停止两个线程并释放端点。
pub struct DispatchEngine {
    right: HandWorker,
    left: HandWorker,
    catalog: Arc<GestureCatalog>,
    hooks: Arc<RwLock<HookManager>>,
}

impl DispatchEngine {
    /// 线程 join 超时
    pub const JOIN_TIMEOUT: Duration = Duration::from_secs(2);

    pub(crate) fn spawn<R, L>(
        catalog: Arc<GestureCatalog>,
        right: R,
        left: L,
        options: DispatchOptions,
        hooks: HookManager,
        topics: [String; 2],
    ) -> Result<Self, DriverError>
    where
        R: ActuatorEndpoint,
        L: ActuatorEndpoint,
    {
        let hooks = Arc::new(RwLock::new(hooks));
        let [right_topic, left_topic] = topics;

        let right = HandWorker::spawn(
            Hand::Right,
            right,
            Arc::clone(&catalog),
            &options,
            Arc::clone(&hooks),
            right_topic,
        )?;
        let left = match HandWorker::spawn(
            Hand::Left,
            left,
            Arc::clone(&catalog),
            &options,
            Arc::clone(&hooks),
            left_topic,
        ) {
            Ok(left) => left,
            Err(e) => {
                let mut right = right;
                right.stop(Self::JOIN_TIMEOUT);
                return Err(e);
            },
        };

        info!(
            "Dispatch engine started: r -> {}, l -> {} ({:?}, ready wait {:?})",
            right.endpoint_name, left.endpoint_name, options.duration, options.ready_wait
        );

        Ok(Self {
            right,
            left,
            catalog,
            hooks,
        })
    }

    fn worker(&self, hand: Hand) -> &HandWorker {
        match hand {
            Hand::Right => &self.right,
            Hand::Left => &self.left,
        }
    }

    /// 分发一个手势（非阻塞，只入队）
    ///
    /// 未知手势不会在这里报错：分发线程会记录一条诊断并丢弃。
    ///
    /// # 错误
    /// - `DriverError::ChannelFull`: 该手队列已满
    /// - `DriverError::ChannelClosed`: 该手分发线程已退出
    pub fn dispatch(&self, hand: Hand, gesture: &str) -> Result<(), DriverError> {
        self.worker(hand).queue.push(gesture)
    }

    /// 取某只手的订阅（交给外部传输层）
    pub fn subscription(&self, hand: Hand) -> GestureSubscription {
        let worker = self.worker(hand);
        GestureSubscription::new(worker.topic.clone(), worker.queue.clone())
    }

    /// 双手入站适配器
    pub fn inbound_adapter(&self) -> InboundAdapter {
        InboundAdapter::new(self.subscription(Hand::Right), self.subscription(Hand::Left))
    }

    /// 注册钩子（对两只手同时生效）
    pub fn add_hook(&self, hook: Arc<dyn DispatchHook>) {
        self.hooks.write().add_hook(hook);
    }

    /// 手势目录
    pub fn catalog(&self) -> &Arc<GestureCatalog> {
        &self.catalog
    }

    /// 某只手的端点名称
    pub fn endpoint_name(&self, hand: Hand) -> &str {
        &self.worker(hand).endpoint_name
    }

    /// 某只手的当前分发状态
    pub fn state(&self, hand: Hand) -> DispatchState {
        self.worker(hand).ctx.state.get()
    }

    /// 某只手的指标快照
    pub fn metrics(&self, hand: Hand) -> MetricsSnapshot {
        self.worker(hand).ctx.metrics.snapshot()
    }

    /// 某只手尚未处理完的请求数
    pub fn pending(&self, hand: Hand) -> usize {
        self.worker(hand).ctx.pending()
    }

    /// 某只手的分发线程是否仍在运行
    pub fn is_running(&self, hand: Hand) -> bool {
        let worker = self.worker(hand);
        worker.is_running.load(Ordering::Acquire)
            && worker.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// 等待某只手的队列清空
    ///
    /// # 错误
    /// - `DriverError::Timeout`: 超时仍有未处理请求（例如端点一直未就绪）
    pub fn flush_hand(&self, hand: Hand, timeout: Duration) -> Result<(), DriverError> {
        let deadline = Instant::now().checked_add(timeout);
        let ctx = &self.worker(hand).ctx;
        while ctx.pending() > 0 {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(DriverError::Timeout);
            }
            thread::sleep(Duration::from_millis(1));
        }
        Ok(())
    }

    /// 等待两只手的队列都清空
    pub fn flush(&self, timeout: Duration) -> Result<(), DriverError> {
        let deadline = Instant::now().checked_add(timeout);
        for hand in Hand::ALL {
            let remaining = deadline.map_or(timeout, |deadline| {
                deadline.saturating_duration_since(Instant::now())
            });
            self.flush_hand(hand, remaining)?;
        }
        Ok(())
    }

    /// 停止两个分发线程并释放端点
    ///
    /// 队列中未处理的请求被丢弃；需要先处理完时先调用 [`flush`](Self::flush)。
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        // 两只手先同时置停，再依次 join，避免一只手的慢退出拖住另一只
        self.right.is_running.store(false, Ordering::Release);
        self.left.is_running.store(false, Ordering::Release);

        self.right.stop(Self::JOIN_TIMEOUT);
        self.left.stop(Self::JOIN_TIMEOUT);
        debug!("Dispatch engine stopped");
    }
}

impl Drop for DispatchEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::HandDriverBuilder;
    use crate::loopback::LoopbackEndpoint;
    use crate::ready::ReadyWait;

    #[test]
    fn test_engine_dispatch_and_flush() {
        let (right, rc) = LoopbackEndpoint::for_hand(Hand::Right);
        let (left, lc) = LoopbackEndpoint::for_hand(Hand::Left);
        let engine = HandDriverBuilder::new()
            .ready_poll(Duration::from_millis(5))
            .build(right, left)
            .unwrap();

        engine.dispatch(Hand::Right, "fist").unwrap();
        engine.dispatch(Hand::Left, "grasp").unwrap();
        engine.flush(Duration::from_secs(2)).unwrap();

        assert_eq!(rc.submitted_count(), 1);
        assert_eq!(lc.submitted()[0].positions(), &[-1.3, 0.95, 1.5, -0.97, -1.42]);
        assert_eq!(engine.metrics(Hand::Right).submitted, 1);
        assert!(engine.state(Hand::Left).is_idle());
        assert!(engine.is_running(Hand::Right));
    }

    #[test]
    fn test_engine_drop_releases_endpoints() {
        let (right, rc) = LoopbackEndpoint::for_hand(Hand::Right);
        let (left, lc) = LoopbackEndpoint::for_hand(Hand::Left);
        let engine = HandDriverBuilder::new()
            .ready_poll(Duration::from_millis(5))
            .build(right, left)
            .unwrap();
        assert_eq!(
            engine.endpoint_name(Hand::Left),
            "l_hand_controller/follow_joint_trajectory"
        );
        drop(engine);
        assert!(rc.is_closed());
        assert!(lc.is_closed());
    }

    #[test]
    fn test_shutdown_cancels_unbounded_wait() {
        let (right, rc) = LoopbackEndpoint::offline(Hand::Right.default_action_name());
        let (left, _lc) = LoopbackEndpoint::for_hand(Hand::Left);
        let (recorder, events) = crate::hooks::EventRecorder::new();
        let engine = HandDriverBuilder::new()
            .ready_wait(ReadyWait::Unbounded)
            .ready_poll(Duration::from_millis(5))
            .hook(Arc::new(recorder))
            .build(right, left)
            .unwrap();

        engine.dispatch(Hand::Right, "open").unwrap();
        engine.dispatch(Hand::Right, "fist").unwrap();
        assert!(matches!(
            engine.flush_hand(Hand::Right, Duration::from_millis(50)),
            Err(DriverError::Timeout)
        ));
        assert_eq!(engine.state(Hand::Right), DispatchState::AwaitingReady);

        let start = Instant::now();
        engine.shutdown();
        assert!(start.elapsed() < DispatchEngine::JOIN_TIMEOUT);
        assert_eq!(rc.submitted_count(), 0);
        assert!(rc.is_closed());

        // 正在等待的 "open" 被取消，排队的 "fist" 从未取出
        let cancelled: Vec<_> = events
            .try_iter()
            .filter_map(|e| match e {
                crate::hooks::DispatchEvent::Cancelled { gesture, .. } => Some(gesture),
                _ => None,
            })
            .collect();
        assert_eq!(cancelled, vec!["open".to_string()]);
    }

    #[test]
    fn test_huge_timeouts_do_not_kill_worker() {
        let (right, rc) = LoopbackEndpoint::offline(Hand::Right.default_action_name());
        let (left, _lc) = LoopbackEndpoint::for_hand(Hand::Left);
        let engine = HandDriverBuilder::new()
            .ready_wait(ReadyWait::Within(Duration::MAX))
            .ready_poll(Duration::from_millis(5))
            .build(right, left)
            .unwrap();

        engine.dispatch(Hand::Right, "fist").unwrap();
        let deadline = Instant::now() + Duration::from_secs(1);
        while engine.state(Hand::Right) != DispatchState::AwaitingReady {
            assert!(Instant::now() < deadline, "right hand never started waiting");
            thread::sleep(Duration::from_millis(1));
        }
        assert!(engine.is_running(Hand::Right));

        rc.set_ready(true);
        engine.flush(Duration::MAX).unwrap();
        assert_eq!(rc.submitted_count(), 1);
        assert!(engine.dispatch(Hand::Right, "open").is_ok());
        engine.flush_hand(Hand::Right, Duration::MAX).unwrap();
        assert_eq!(rc.submitted_count(), 2);
    }

    #[test]
    fn test_shutdown_with_longest_poll_releases_endpoints() {
        let (right, rc) = LoopbackEndpoint::offline(Hand::Right.default_action_name());
        let (left, lc) = LoopbackEndpoint::for_hand(Hand::Left);
        let engine = HandDriverBuilder::new()
            .ready_poll(DispatchOptions::MAX_READY_POLL)
            .build(right, left)
            .unwrap();

        // 右手卡在就绪等待的时间片里，左手卡在队列等待的时间片里
        engine.dispatch(Hand::Right, "open").unwrap();
        let deadline = Instant::now() + Duration::from_secs(1);
        while engine.state(Hand::Right) != DispatchState::AwaitingReady {
            assert!(Instant::now() < deadline);
            thread::sleep(Duration::from_millis(1));
        }

        let start = Instant::now();
        engine.shutdown();
        assert!(start.elapsed() < DispatchEngine::JOIN_TIMEOUT);
        assert!(rc.is_closed());
        assert!(lc.is_closed());
    }

    #[test]
    fn test_dispatch_after_worker_exit_reports_closed() {
        let (right, _rc) = LoopbackEndpoint::for_hand(Hand::Right);
        let (left, _lc) = LoopbackEndpoint::for_hand(Hand::Left);
        let mut engine = HandDriverBuilder::new()
            .ready_poll(Duration::from_millis(5))
            .build(right, left)
            .unwrap();

        engine.right.stop(DispatchEngine::JOIN_TIMEOUT);
        assert!(!engine.is_running(Hand::Right));
        assert!(matches!(
            engine.dispatch(Hand::Right, "open"),
            Err(DriverError::ChannelClosed)
        ));
        assert!(engine.dispatch(Hand::Left, "open").is_ok());
        engine.stop();
    }
}
