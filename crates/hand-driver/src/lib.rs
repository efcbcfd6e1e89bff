//! 驱动层模块
//!
//! 本模块提供双手手势分发引擎，包括：
//! - 每只手一个独立的分发线程（互不阻塞）
//! - 每只手一个 FIFO 请求队列（同一只手的手势严格按到达顺序处理）
//! - 可取消、可限时的端点就绪等待
//! - 非阻塞的目标提交（提交即返回，不等待轨迹执行完成）
//! - 钩子系统与原子计数器（观测分发过程）
//!
//! # 数据流
//!
//! ```text
//! 外部事件 → GestureSubscription (固定 hand)
//!          → 请求队列 (FIFO)
//!          → 分发线程: 目录查询 → 轨迹构建 → 等待就绪 → 提交目标
//!          → ActuatorEndpoint (外部)
//! ```

mod builder;
mod endpoint;
mod engine;
mod error;
pub mod hooks;
pub mod inbound;
pub mod loopback;
pub mod metrics;
pub mod ready;
pub mod state;
pub mod worker;

pub use builder::{DispatchOptions, HandDriverBuilder};
pub use endpoint::{ActuatorEndpoint, GoalHandle, GoalStatus, GoalStatusSender};
pub use engine::DispatchEngine;
pub use error::{DriverError, EndpointError};
pub use hooks::{DispatchEvent, DispatchHook, EventRecorder, HookManager};
pub use inbound::{GestureSubscription, InboundAdapter};
pub use loopback::{LoopbackControl, LoopbackEndpoint};
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use ready::{ReadyOutcome, ReadyWait, wait_until_ready};
pub use state::{AtomicDispatchState, DispatchState};
pub use worker::{DispatchOutcome, DispatchRequest, HandContext};
