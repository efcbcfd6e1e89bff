//! 回环端点
//!
//! 进程内的 [`ActuatorEndpoint`] 实现：接受目标后立即上报 `Accepted` 与 `Succeeded`，
//! 并把收到的轨迹命令记录下来。CLI 在没有真实动作服务时用它代替，测试用它观察提交结果。
//!
//! 通过 [`LoopbackControl`] 可以在运行中切换就绪状态、注入提交失败。
//! 长期运行时用 [`LoopbackEndpoint::recording`] 关闭命令记录，避免记录无限增长。

use crate::endpoint::{ActuatorEndpoint, GoalHandle, GoalStatus};
use crate::error::EndpointError;
use crossbeam_channel::{Receiver, Sender, unbounded};
use hand_protocol::{Hand, TrajectoryCommand};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug)]
struct Shared {
    ready: Mutex<bool>,
    ready_cv: Condvar,
    goals: Mutex<Vec<TrajectoryCommand>>,
    reject_with: Mutex<Option<EndpointError>>,
    closed: AtomicBool,
}

/// 回环端点（分发线程持有）
#[derive(Debug)]
pub struct LoopbackEndpoint {
    name: String,
    shared: Arc<Shared>,
    goal_tx: Sender<TrajectoryCommand>,
    next_goal_id: u64,
    recording: bool,
}

/// 回环端点控制端（测试/CLI 持有）
#[derive(Debug, Clone)]
pub struct LoopbackControl {
    name: String,
    shared: Arc<Shared>,
    goal_rx: Receiver<TrajectoryCommand>,
}

impl LoopbackEndpoint {
    /// 创建已就绪的回环端点
    pub fn new(name: impl Into<String>) -> (Self, LoopbackControl) {
        Self::with_ready(name.into(), true)
    }

    /// 创建未就绪的回环端点，需通过 `LoopbackControl::set_ready` 上线
    pub fn offline(name: impl Into<String>) -> (Self, LoopbackControl) {
        Self::with_ready(name.into(), false)
    }

    /// 以该手默认动作名称创建已就绪的回环端点
    pub fn for_hand(hand: Hand) -> (Self, LoopbackControl) {
        Self::new(hand.default_action_name())
    }

    /// 是否记录提交的命令（默认开启）
    ///
    /// 关闭后 [`LoopbackControl::submitted`] 与 `recv_goal` 不再收到命令，
    /// 目标状态仍正常上报。
    #[must_use]
    pub fn recording(mut self, enabled: bool) -> Self {
        self.recording = enabled;
        self
    }

    /// 是否记录提交的命令
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    fn with_ready(name: String, ready: bool) -> (Self, LoopbackControl) {
        let shared = Arc::new(Shared {
            ready: Mutex::new(ready),
            ready_cv: Condvar::new(),
            goals: Mutex::new(Vec::new()),
            reject_with: Mutex::new(None),
            closed: AtomicBool::new(false),
        });
        let (goal_tx, goal_rx) = unbounded();

        (
            Self {
                name: name.clone(),
                shared: Arc::clone(&shared),
                goal_tx,
                next_goal_id: 1,
                recording: true,
            },
            LoopbackControl {
                name,
                shared,
                goal_rx,
            },
        )
    }
}

impl ActuatorEndpoint for LoopbackEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    fn wait_ready(&mut self, timeout: Duration) -> bool {
        let mut ready = self.shared.ready.lock();
        if !*ready && !timeout.is_zero() {
            let _ = self
                .shared
                .ready_cv
                .wait_while_for(&mut ready, |ready| !*ready, timeout);
        }
        *ready
    }

    fn submit_goal(&mut self, command: TrajectoryCommand) -> Result<GoalHandle, EndpointError> {
        if let Some(err) = self.shared.reject_with.lock().clone() {
            return Err(err);
        }

        let goal_id = self.next_goal_id;
        self.next_goal_id += 1;
        let (handle, reporter) = GoalHandle::new(goal_id);

        info!(
            "{}: goal #{} accepted, {} joints -> {:?} in {:?}",
            self.name,
            goal_id,
            command.joint_names().len(),
            command.positions(),
            command.time_from_start()
        );

        if self.recording {
            self.shared.goals.lock().push(command.clone());
            // 控制端已全部丢弃时没有人读取
            let _ = self.goal_tx.send(command);
        }

        reporter.report(GoalStatus::Accepted);
        reporter.report(GoalStatus::Succeeded);
        Ok(handle)
    }

    fn close(&mut self) {
        debug!("{}: endpoint released", self.name);
        self.shared.closed.store(true, Ordering::Release);
    }
}

impl LoopbackControl {
    /// 端点名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 切换就绪状态（唤醒正在等待的分发线程）
    pub fn set_ready(&self, ready: bool) {
        *self.shared.ready.lock() = ready;
        self.shared.ready_cv.notify_all();
    }

    /// 当前是否就绪
    pub fn is_ready(&self) -> bool {
        *self.shared.ready.lock()
    }

    /// 设置后续提交返回的错误，`None` 恢复正常
    pub fn reject_with(&self, error: Option<EndpointError>) {
        *self.shared.reject_with.lock() = error;
    }

    /// 已收到的全部命令（按提交顺序）
    pub fn submitted(&self) -> Vec<TrajectoryCommand> {
        self.shared.goals.lock().clone()
    }

    /// 已收到的命令数量
    pub fn submitted_count(&self) -> usize {
        self.shared.goals.lock().len()
    }

    /// 等待下一条提交的命令
    pub fn recv_goal(&self, timeout: Duration) -> Option<TrajectoryCommand> {
        self.goal_rx.recv_timeout(timeout).ok()
    }

    /// 端点是否已被分发线程释放
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }
}
