//! # Hand Tools - 共享配置
//!
//! **依赖原则**: 只依赖 `hand-protocol`，避免依赖 `hand-driver`
//!
//! ## 包含模块
//!
//! - `config` - 分发配置（TOML，全部字段可选）

pub mod config;

pub use config::{ConfigError, DispatchConfig, DispatchSection, HandNames, MAX_READY_POLL_MS};
