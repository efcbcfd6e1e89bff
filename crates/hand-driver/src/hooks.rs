//! 钩子系统（Hook System）
//!
//! 在分发线程的关键节点触发自定义回调，用于录制、调试和测试断言。
//!
//! # 设计原则
//!
//! - **非阻塞**: 回调在分发线程上同步执行，必须尽快返回，推荐 `try_send` 到 Channel
//! - **只读**: 回调拿到的是事件引用，不能影响分发结果
//!
//! # 使用示例
//!
//! ```rust
//! use hand_driver::hooks::{DispatchEvent, EventRecorder, HookManager};
//! use hand_protocol::Hand;
//! use std::sync::Arc;
//!
//! let mut hooks = HookManager::new();
//! let (recorder, rx) = EventRecorder::new();
//! hooks.add_hook(Arc::new(recorder));
//!
//! hooks.trigger_all(&DispatchEvent::Rejected {
//!     hand: Hand::Right,
//!     gesture: "wave".to_string(),
//! });
//! assert!(matches!(rx.try_recv(), Ok(DispatchEvent::Rejected { .. })));
//! ```

use crate::endpoint::GoalHandle;
use crate::error::EndpointError;
use crossbeam_channel::{Receiver, Sender, unbounded};
use hand_protocol::{Hand, TrajectoryCommand};
use std::sync::Arc;

/// 分发事件
#[derive(Debug, Clone)]
pub enum DispatchEvent {
    /// 分发线程取出一条请求
    Received { hand: Hand, gesture: String },
    /// 手势不在目录中，请求被丢弃
    Rejected { hand: Hand, gesture: String },
    /// 目标已提交
    Submitted {
        hand: Hand,
        gesture: String,
        command: TrajectoryCommand,
        handle: GoalHandle,
    },
    /// 端点在期限内未就绪，请求被丢弃
    Unreachable {
        hand: Hand,
        gesture: String,
        endpoint: String,
    },
    /// 端点拒绝提交
    SubmitFailed {
        hand: Hand,
        gesture: String,
        error: EndpointError,
    },
    /// 停机取消了就绪等待，请求被丢弃
    Cancelled { hand: Hand, gesture: String },
}

impl DispatchEvent {
    /// 事件所属的手
    pub fn hand(&self) -> Hand {
        match self {
            DispatchEvent::Received { hand, .. }
            | DispatchEvent::Rejected { hand, .. }
            | DispatchEvent::Submitted { hand, .. }
            | DispatchEvent::Unreachable { hand, .. }
            | DispatchEvent::SubmitFailed { hand, .. }
            | DispatchEvent::Cancelled { hand, .. } => *hand,
        }
    }

    /// 事件对应的手势名
    pub fn gesture(&self) -> &str {
        match self {
            DispatchEvent::Received { gesture, .. }
            | DispatchEvent::Rejected { gesture, .. }
            | DispatchEvent::Submitted { gesture, .. }
            | DispatchEvent::Unreachable { gesture, .. }
            | DispatchEvent::SubmitFailed { gesture, .. }
            | DispatchEvent::Cancelled { gesture, .. } => gesture,
        }
    }
}

/// 分发回调 Trait
pub trait DispatchHook: Send + Sync {
    /// 分发事件发生时调用（在分发线程上）
    fn on_event(&self, event: &DispatchEvent);
}

/// 钩子管理器
///
/// 回调列表本身不是线程安全的，由引擎放在 `RwLock<HookManager>` 中共享。
#[derive(Default)]
pub struct HookManager {
    hooks: Vec<Arc<dyn DispatchHook>>,
}

impl HookManager {
    /// 创建新的钩子管理器
    #[must_use]
    pub const fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// 添加回调
    pub fn add_hook(&mut self, hook: Arc<dyn DispatchHook>) {
        self.hooks.push(hook);
    }

    /// 移除所有回调
    pub fn clear(&mut self) {
        self.hooks.clear();
    }

    /// 触发所有回调
    pub fn trigger_all(&self, event: &DispatchEvent) {
        for hook in self.hooks.iter() {
            hook.on_event(event);
        }
    }

    /// 回调数量
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// 是否没有回调
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl std::fmt::Debug for HookManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookManager")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// 事件录制钩子
///
/// 把每个事件克隆后投递到无界 Channel，在其他线程消费。
pub struct EventRecorder {
    sender: Sender<DispatchEvent>,
}

impl EventRecorder {
    /// 创建录制钩子与接收端
    pub fn new() -> (Self, Receiver<DispatchEvent>) {
        let (sender, receiver) = unbounded();
        (Self { sender }, receiver)
    }
}

impl DispatchHook for EventRecorder {
    fn on_event(&self, event: &DispatchEvent) {
        let _ = self.sender.try_send(event.clone());
    }
}
