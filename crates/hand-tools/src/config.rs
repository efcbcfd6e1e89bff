//! # 分发配置
//!
//! 所有字段都可省略，缺省值为 1 秒航点、无限等待端点、
//! 标准端点与话题名称。不提供配置文件时直接使用 [`DispatchConfig::default`]。
//!
//! ```toml
//! [dispatch]
//! duration_ms = 1000
//! ready_timeout_ms = 0      # 0 = 无限等待
//! ready_poll_ms = 50
//! queue_capacity = 32       # 0 = 无界
//!
//! [endpoints]
//! right = "r_hand_controller/follow_joint_trajectory"
//! left = "l_hand_controller/follow_joint_trajectory"
//!
//! [topics]
//! right = "/r_hand/r_hand_topic"
//! left = "/l_hand/l_hand_topic"
//! ```

use hand_protocol::Hand;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 分发配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    /// 分发参数
    pub dispatch: DispatchSection,
    /// 每只手的动作端点名称
    pub endpoints: HandNames,
    /// 每只手的手势话题名称
    pub topics: HandNames,
}

/// `ready_poll_ms` 上限（毫秒）
///
/// 分发线程按这个时间片检查停机标志，过大时停机会超过引擎的 join 超时。
pub const MAX_READY_POLL_MS: u64 = 1000;

/// `[dispatch]` 段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchSection {
    /// 航点时长（毫秒）
    pub duration_ms: u64,
    /// 端点就绪等待上限（毫秒），0 表示无限等待
    pub ready_timeout_ms: u64,
    /// 就绪等待/队列轮询的时间片（毫秒）
    pub ready_poll_ms: u64,
    /// 每只手的请求队列容量，0 表示无界
    pub queue_capacity: usize,
}

impl Default for DispatchSection {
    fn default() -> Self {
        Self {
            duration_ms: 1000,
            ready_timeout_ms: 0,
            ready_poll_ms: 50,
            queue_capacity: 32,
        }
    }
}

/// 按手区分的名称对
///
/// 缺省为空，读取时回落到协议层的默认名称。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HandNames {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
}

impl HandNames {
    fn get(&self, hand: Hand) -> Option<&str> {
        match hand {
            Hand::Right => self.right.as_deref(),
            Hand::Left => self.left.as_deref(),
        }
    }
}

impl DispatchConfig {
    /// 从文件加载并校验
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// 从 TOML 字符串解析并校验
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 序列化为 TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 保存到文件
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 校验取值
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dispatch.duration_ms == 0 {
            return Err(ConfigError::Invalid(
                "dispatch.duration_ms must be positive".to_string(),
            ));
        }
        if self.dispatch.ready_poll_ms == 0 {
            return Err(ConfigError::Invalid(
                "dispatch.ready_poll_ms must be positive".to_string(),
            ));
        }
        if self.dispatch.ready_poll_ms > MAX_READY_POLL_MS {
            return Err(ConfigError::Invalid(format!(
                "dispatch.ready_poll_ms must not exceed {}",
                MAX_READY_POLL_MS
            )));
        }
        for hand in Hand::ALL {
            if self.endpoints.get(hand).is_some_and(|n| n.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "endpoints.{} must not be empty",
                    hand_key(hand)
                )));
            }
            if self.topics.get(hand).is_some_and(|n| n.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "topics.{} must not be empty",
                    hand_key(hand)
                )));
            }
        }
        Ok(())
    }

    /// 航点时长
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.dispatch.duration_ms)
    }

    /// 就绪等待上限，`None` 表示无限等待
    pub fn ready_timeout(&self) -> Option<Duration> {
        match self.dispatch.ready_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// 轮询时间片
    pub fn ready_poll(&self) -> Duration {
        Duration::from_millis(self.dispatch.ready_poll_ms)
    }

    /// 队列容量
    pub fn queue_capacity(&self) -> usize {
        self.dispatch.queue_capacity
    }

    /// 某只手的动作端点名称
    pub fn endpoint_name(&self, hand: Hand) -> &str {
        self.endpoints
            .get(hand)
            .unwrap_or_else(|| hand.default_action_name())
    }

    /// 某只手的话题名称
    pub fn topic(&self, hand: Hand) -> &str {
        self.topics.get(hand).unwrap_or_else(|| hand.default_topic())
    }
}

fn hand_key(hand: Hand) -> &'static str {
    match hand {
        Hand::Right => "right",
        Hand::Left => "left",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_baseline() {
        let config = DispatchConfig::default();
        assert_eq!(config.duration(), Duration::from_secs(1));
        assert_eq!(config.ready_timeout(), None);
        assert_eq!(config.queue_capacity(), 32);
        assert_eq!(
            config.endpoint_name(Hand::Right),
            "r_hand_controller/follow_joint_trajectory"
        );
        assert_eq!(config.topic(Hand::Left), "/l_hand/l_hand_topic");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = DispatchConfig::from_toml_str("").unwrap();
        assert_eq!(config, DispatchConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = DispatchConfig::from_toml_str(
            r#"
[dispatch]
ready_timeout_ms = 2500

[topics]
right = "/gestures/right"
"#,
        )
        .unwrap();

        assert_eq!(config.ready_timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(config.duration(), Duration::from_secs(1));
        assert_eq!(config.topic(Hand::Right), "/gestures/right");
        assert_eq!(config.topic(Hand::Left), "/l_hand/l_hand_topic");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = DispatchConfig::from_toml_str("[dispatch]\nduration_ms = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("duration_ms")));

        let err = DispatchConfig::from_toml_str("[dispatch]\nready_poll_ms = 8000\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("ready_poll_ms")));

        let err = DispatchConfig::from_toml_str("[endpoints]\nleft = \"  \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("endpoints.left")));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = DispatchConfig::from_toml_str("[dispatch]\nspeed = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_save_and_load() {
        let mut config = DispatchConfig::default();
        config.dispatch.ready_timeout_ms = 500;
        config.endpoints.left = Some("sim/l_hand".to_string());

        let file = NamedTempFile::new().unwrap();
        config.save(file.path()).unwrap();

        let loaded = DispatchConfig::load(file.path()).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.endpoint_name(Hand::Left), "sim/l_hand");
    }

    #[test]
    fn test_missing_file() {
        let err = DispatchConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
