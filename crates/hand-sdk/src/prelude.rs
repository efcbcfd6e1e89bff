//! Prelude 模块
//!
//! 常用类型的便捷导入：
//!
//! ```rust
//! use hand_sdk::prelude::*;
//! ```

pub use hand_driver::{
    ActuatorEndpoint, DispatchEngine, DispatchEvent, DispatchHook, DispatchOptions,
    DispatchState, DriverError, EndpointError, EventRecorder, GestureSubscription, GoalHandle,
    GoalStatus, HandDriverBuilder, InboundAdapter, LoopbackControl, LoopbackEndpoint,
    MetricsSnapshot, ReadyWait,
};
pub use hand_protocol::{
    DEFAULT_DURATION, GestureCatalog, Hand, HandCatalog, ProtocolError, TrajectoryCommand,
    build_trajectory,
};
pub use hand_tools::DispatchConfig;
