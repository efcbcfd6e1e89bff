//! 动作端点抽象
//!
//! [`ActuatorEndpoint`] 是分发线程与外部轨迹执行服务之间的唯一接缝。
//! 每只手一个端点实例，由该手的分发线程独占持有，线程退出时关闭。
//!
//! 提交是"发出即忘"：`submit_goal` 在目标被接受发送后立即返回一个 [`GoalHandle`]，
//! 调用方可以稍后观察状态，但分发线程本身从不等待执行结果。

use crate::error::{DriverError, EndpointError};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, unbounded};
use hand_protocol::TrajectoryCommand;
use std::time::Duration;

/// 轨迹动作端点
///
/// # 实现要求
///
/// - `wait_ready` 最多阻塞 `timeout`，端点就绪时返回 `true`。
///   分发线程按小时间片反复调用它，以便在停机时取消等待。
/// - `submit_goal` 不得等待轨迹执行完成。
pub trait ActuatorEndpoint: Send + 'static {
    /// 端点名称（如 `r_hand_controller/follow_joint_trajectory`）
    fn name(&self) -> &str;

    /// 等待端点可以接受目标，最多阻塞 `timeout`
    fn wait_ready(&mut self, timeout: Duration) -> bool;

    /// 异步提交轨迹目标
    fn submit_goal(&mut self, command: TrajectoryCommand) -> Result<GoalHandle, EndpointError>;

    /// 释放端点连接（分发线程退出时调用一次）
    fn close(&mut self) {}
}

impl<E: ActuatorEndpoint + ?Sized> ActuatorEndpoint for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn wait_ready(&mut self, timeout: Duration) -> bool {
        (**self).wait_ready(timeout)
    }

    fn submit_goal(&mut self, command: TrajectoryCommand) -> Result<GoalHandle, EndpointError> {
        (**self).submit_goal(command)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// 目标状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalStatus {
    /// 端点已接受目标
    Accepted,
    /// 端点拒绝目标
    Rejected(String),
    /// 轨迹执行完成
    Succeeded,
    /// 轨迹执行中止
    Aborted(String),
}

impl GoalStatus {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GoalStatus::Accepted)
    }
}

/// 目标句柄
///
/// 由端点在提交时创建。克隆的句柄共享同一个状态通道，
/// 每条状态只会被其中一个句柄收到。
#[derive(Debug, Clone)]
pub struct GoalHandle {
    goal_id: u64,
    status_rx: Receiver<GoalStatus>,
}

/// 目标状态上报端（端点侧持有）
#[derive(Debug, Clone)]
pub struct GoalStatusSender {
    goal_id: u64,
    status_tx: Sender<GoalStatus>,
}

impl GoalHandle {
    /// 创建句柄及其上报端
    pub fn new(goal_id: u64) -> (Self, GoalStatusSender) {
        let (status_tx, status_rx) = unbounded();
        (
            Self { goal_id, status_rx },
            GoalStatusSender { goal_id, status_tx },
        )
    }

    /// 目标 ID（端点内单调递增）
    pub fn goal_id(&self) -> u64 {
        self.goal_id
    }

    /// 非阻塞读取下一条状态
    pub fn try_status(&self) -> Option<GoalStatus> {
        match self.status_rx.try_recv() {
            Ok(status) => Some(status),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// 阻塞等待下一条状态
    ///
    /// # 错误
    /// - `DriverError::Timeout`: 超时未收到状态
    /// - `DriverError::Endpoint(Disconnected)`: 端点已丢弃上报端
    pub fn wait_status(&self, timeout: Duration) -> Result<GoalStatus, DriverError> {
        match self.status_rx.recv_timeout(timeout) {
            Ok(status) => Ok(status),
            Err(RecvTimeoutError::Timeout) => Err(DriverError::Timeout),
            Err(RecvTimeoutError::Disconnected) => {
                Err(DriverError::Endpoint(EndpointError::Disconnected))
            },
        }
    }

    /// 等待终态（跳过 `Accepted`）
    pub fn wait_terminal(&self, timeout: Duration) -> Result<GoalStatus, DriverError> {
        let deadline = std::time::Instant::now().checked_add(timeout);
        loop {
            let remaining = deadline.map_or(timeout, |deadline| {
                deadline.saturating_duration_since(std::time::Instant::now())
            });
            let status = self.wait_status(remaining)?;
            if status.is_terminal() {
                return Ok(status);
            }
        }
    }
}

impl GoalStatusSender {
    /// 对应的目标 ID
    pub fn goal_id(&self) -> u64 {
        self.goal_id
    }

    /// 上报状态（句柄已全部丢弃时静默忽略）
    pub fn report(&self, status: GoalStatus) {
        let _ = self.status_tx.send(status);
    }
}
