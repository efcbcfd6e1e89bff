//! Builder 模式实现
//!
//! 提供链式构造 [`DispatchEngine`] 的便捷方式。

use crate::endpoint::ActuatorEndpoint;
use crate::engine::DispatchEngine;
use crate::error::DriverError;
use crate::hooks::{DispatchHook, HookManager};
use crate::ready::ReadyWait;
use hand_protocol::{DEFAULT_DURATION, GestureCatalog, Hand};
use std::sync::Arc;
use std::time::Duration;

/// 分发参数
///
/// 默认值：1 秒航点、无限等待端点就绪。
///
/// # Example
///
/// ```
/// use hand_driver::{DispatchOptions, ReadyWait};
/// use std::time::Duration;
///
/// let options = DispatchOptions {
///     ready_wait: ReadyWait::Within(Duration::from_secs(5)),
///     ..DispatchOptions::default()
/// };
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOptions {
    /// 航点 `time_from_start`
    pub duration: Duration,
    /// 端点就绪等待策略
    pub ready_wait: ReadyWait,
    /// 就绪等待/队列轮询的时间片
    pub ready_poll: Duration,
    /// 每只手的请求队列容量（0 表示无界）
    pub queue_capacity: usize,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            ready_wait: ReadyWait::Unbounded,
            ready_poll: Duration::from_millis(50),
            queue_capacity: 32,
        }
    }
}

impl DispatchOptions {
    /// 轮询时间片上限
    ///
    /// 分发线程最多阻塞一个时间片才会看到停机标志，
    /// 必须明显短于 [`DispatchEngine::JOIN_TIMEOUT`]，否则停机时端点来不及释放。
    pub const MAX_READY_POLL: Duration = Duration::from_secs(1);

    /// 校验参数
    ///
    /// # 错误
    /// - `DriverError::InvalidInput`: 时长或轮询时间片为零，或时间片超过 [`Self::MAX_READY_POLL`]
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.duration.is_zero() {
            return Err(DriverError::InvalidInput(
                "trajectory duration must be positive".to_string(),
            ));
        }
        if self.ready_poll.is_zero() {
            return Err(DriverError::InvalidInput(
                "ready poll interval must be positive".to_string(),
            ));
        }
        if self.ready_poll > Self::MAX_READY_POLL {
            return Err(DriverError::InvalidInput(format!(
                "ready poll interval {:?} exceeds {:?}",
                self.ready_poll,
                Self::MAX_READY_POLL
            )));
        }
        Ok(())
    }
}

/// 分发引擎 Builder（链式构造）
///
/// # Example
///
/// ```
/// use hand_driver::{HandDriverBuilder, LoopbackEndpoint};
/// use hand_protocol::Hand;
///
/// let (right, _right_ctl) = LoopbackEndpoint::for_hand(Hand::Right);
/// let (left, _left_ctl) = LoopbackEndpoint::for_hand(Hand::Left);
///
/// let engine = HandDriverBuilder::new().build(right, left).unwrap();
/// engine.dispatch(Hand::Right, "fist").unwrap();
/// engine.shutdown();
/// ```
#[derive(Default)]
pub struct HandDriverBuilder {
    catalog: Option<Arc<GestureCatalog>>,
    options: DispatchOptions,
    hooks: HookManager,
    right_topic: Option<String>,
    left_topic: Option<String>,
}

impl HandDriverBuilder {
    /// 创建新的 Builder
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置手势目录（可选，默认标准目录）
    pub fn catalog(mut self, catalog: impl Into<Arc<GestureCatalog>>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// 整体替换分发参数
    pub fn options(mut self, options: DispatchOptions) -> Self {
        self.options = options;
        self
    }

    /// 设置航点时长（可选，默认 1 秒）
    pub fn duration(mut self, duration: Duration) -> Self {
        self.options.duration = duration;
        self
    }

    /// 设置就绪等待策略（可选，默认无限等待）
    pub fn ready_wait(mut self, ready_wait: ReadyWait) -> Self {
        self.options.ready_wait = ready_wait;
        self
    }

    /// 设置轮询时间片（可选，默认 50ms）
    pub fn ready_poll(mut self, ready_poll: Duration) -> Self {
        self.options.ready_poll = ready_poll;
        self
    }

    /// 设置队列容量（可选，默认 32，0 表示无界）
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.options.queue_capacity = capacity;
        self
    }

    /// 注册钩子
    pub fn hook(mut self, hook: Arc<dyn DispatchHook>) -> Self {
        self.hooks.add_hook(hook);
        self
    }

    /// 设置某只手的订阅话题名（可选，默认 `/r_hand/r_hand_topic` 等）
    pub fn topic(mut self, hand: Hand, topic: impl Into<String>) -> Self {
        match hand {
            Hand::Right => self.right_topic = Some(topic.into()),
            Hand::Left => self.left_topic = Some(topic.into()),
        }
        self
    }

    /// 构建并启动分发引擎
    ///
    /// 启动两个分发线程，各自独占一个端点。
    ///
    /// # 错误
    /// - `DriverError::Protocol`: 标准目录构造失败
    /// - `DriverError::InvalidInput`: 分发参数无效
    /// - `DriverError::WorkerSpawn`: 线程创建失败
    pub fn build<R, L>(self, right: R, left: L) -> Result<DispatchEngine, DriverError>
    where
        R: ActuatorEndpoint,
        L: ActuatorEndpoint,
    {
        self.options.validate()?;

        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => Arc::new(GestureCatalog::standard()?),
        };

        let right_topic = self
            .right_topic
            .unwrap_or_else(|| Hand::Right.default_topic().to_string());
        let left_topic = self
            .left_topic
            .unwrap_or_else(|| Hand::Left.default_topic().to_string());

        DispatchEngine::spawn(
            catalog,
            right,
            left,
            self.options,
            self.hooks,
            [right_topic, left_topic],
        )
    }
}
