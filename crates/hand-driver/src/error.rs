//! 驱动层错误类型定义

use hand_protocol::ProtocolError;
use thiserror::Error;

/// 动作端点错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EndpointError {
    /// 端点在期限内未就绪
    #[error("Endpoint unreachable: {0}")]
    Unreachable(String),

    /// 端点拒绝了目标
    #[error("Goal rejected by endpoint: {0}")]
    Rejected(String),

    /// 端点连接已断开
    #[error("Endpoint disconnected")]
    Disconnected,
}

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 协议/目录错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 动作端点错误
    #[error("Endpoint error: {0}")]
    Endpoint(#[from] EndpointError),

    /// 请求队列已关闭（分发线程退出）
    #[error("Request channel closed")]
    ChannelClosed,

    /// 请求队列已满
    #[error("Request channel full (capacity: {0})")]
    ChannelFull(usize),

    /// 操作超时
    #[error("Operation timeout")]
    Timeout,

    /// 分发线程创建失败
    #[error("Failed to spawn dispatch worker: {0}")]
    WorkerSpawn(String),

    /// 无效输入（如零时长）
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
