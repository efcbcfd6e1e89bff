//! Hand SDK - 双手手势分发 Rust SDK
//!
//! 把离散的手势指令（如 `"fist"`、`"point"`）映射为两只机械手的轨迹目标，
//! 并按手路由到各自的动作端点。
//!
//! # 架构设计
//!
//! 本 SDK 采用分层架构，从底层到高层：
//!
//! - **协议层** (`protocol`): 手部标识、手势目录、轨迹命令（纯数据）
//! - **驱动层** (`driver`): 分发线程、端点抽象、入站适配器、钩子与指标
//! - **工具层** (`tools`): TOML 配置
//!
//! # 快速开始
//!
//! ```rust
//! use hand_sdk::prelude::*;
//! use std::time::Duration;
//!
//! let (right, right_ctl) = LoopbackEndpoint::for_hand(Hand::Right);
//! let (left, _left_ctl) = LoopbackEndpoint::for_hand(Hand::Left);
//!
//! let engine = HandDriverBuilder::new().build(right, left).unwrap();
//! engine.inbound_adapter().on_event(Hand::Right, "fist");
//! engine.flush(Duration::from_secs(1)).unwrap();
//!
//! let goal = right_ctl.submitted().pop().unwrap();
//! assert_eq!(goal.positions(), &[1.5, 1.7, 1.8, 1.5, 1.3, 0.0]);
//! ```

pub use hand_driver as driver;
pub use hand_protocol as protocol;
pub use hand_tools as tools;

pub mod prelude;

// 常用类型
pub use hand_driver::{
    ActuatorEndpoint, DispatchEngine, DispatchOptions, DriverError, HandDriverBuilder,
    ReadyWait,
};
pub use hand_protocol::{GestureCatalog, Hand, ProtocolError, TrajectoryCommand};
pub use hand_tools::{ConfigError, DispatchConfig};

/// 默认日志过滤指令
pub const DEFAULT_LOG_DIRECTIVE: &str = "info";

/// 初始化日志
///
/// 安装 `tracing-subscriber` 的 fmt 输出，过滤规则取自 `RUST_LOG`，
/// 未设置时使用 `default_directive`。同时桥接 `log` 记录。
/// 重复调用是安全的，第二次起返回 `false`。
pub fn init_logger(default_directive: &str) -> bool {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return false;
    }

    // 已有 log 记录器时保留原有的
    let _ = tracing_log::LogTracer::init();
    true
}

/// 由配置生成分发参数
pub fn dispatch_options(config: &DispatchConfig) -> DispatchOptions {
    DispatchOptions {
        duration: config.duration(),
        ready_wait: ReadyWait::from_timeout(config.ready_timeout()),
        ready_poll: config.ready_poll(),
        queue_capacity: config.queue_capacity(),
    }
}

/// 由配置生成 Builder（参数与话题名称）
pub fn builder_from_config(config: &DispatchConfig) -> HandDriverBuilder {
    Hand::ALL.into_iter().fold(
        HandDriverBuilder::new().options(dispatch_options(config)),
        |builder, hand| builder.topic(hand, config.topic(hand)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_dispatch_options_from_default_config() {
        let options = dispatch_options(&DispatchConfig::default());
        assert_eq!(options, DispatchOptions::default());
    }

    #[test]
    fn test_dispatch_options_bounded() {
        let config =
            DispatchConfig::from_toml_str("[dispatch]\nready_timeout_ms = 250\nduration_ms = 2000\n")
                .unwrap();
        let options = dispatch_options(&config);
        assert_eq!(options.ready_wait, ReadyWait::Within(Duration::from_millis(250)));
        assert_eq!(options.duration, Duration::from_secs(2));
    }

    #[test]
    fn test_poll_limits_agree() {
        let config = DispatchConfig::from_toml_str(&format!(
            "[dispatch]\nready_poll_ms = {}\n",
            hand_tools::MAX_READY_POLL_MS
        ))
        .unwrap();
        let options = dispatch_options(&config);
        assert_eq!(options.ready_poll, DispatchOptions::MAX_READY_POLL);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_default_directive_parses() {
        assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_DIRECTIVE).is_ok());
    }

    #[test]
    fn test_init_logger_twice() {
        let _ = init_logger("debug");
        assert!(!init_logger("debug"));
    }
}
