//! 轨迹命令构建
//!
//! 将关节目标向量与手的固定关节名称按序配对，生成只有一个航点的轨迹命令。
//! 纯函数，无副作用、无 I/O；只填充位置和 `time_from_start`，
//! 不填充速度、加速度、力矩。
//!
//! # 示例
//!
//! ```rust
//! use hand_protocol::{DEFAULT_DURATION, Hand, build_trajectory};
//!
//! let command = build_trajectory(
//!     Hand::Left,
//!     &[-1.3, 0.95, 1.5, -0.97, -1.42],
//!     DEFAULT_DURATION,
//! )
//! .unwrap();
//!
//! assert_eq!(command.joint_names()[0], "l_thumb_joint");
//! assert_eq!(command.waypoint().time_from_start.as_secs(), 1);
//! ```

use crate::{Hand, JointVector, ProtocolError};
use std::time::Duration;

/// 默认航点时长（1 秒）
pub const DEFAULT_DURATION: Duration = Duration::from_secs(1);

/// 轨迹航点
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TrajectoryPoint {
    /// 关节位置（与 `joint_names` 同序）
    pub positions: JointVector,
    /// 相对轨迹起点的到达时间
    pub time_from_start: Duration,
}

/// 单航点轨迹命令
///
/// 每次分发新建，不持久化。关节名称引用静态表，克隆只复制位置向量。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TrajectoryCommand {
    hand: Hand,
    joint_names: &'static [&'static str],
    waypoint: TrajectoryPoint,
}

impl TrajectoryCommand {
    /// 目标手
    pub fn hand(&self) -> Hand {
        self.hand
    }

    /// 关节名称（固定顺序）
    pub fn joint_names(&self) -> &'static [&'static str] {
        self.joint_names
    }

    /// 唯一航点
    pub fn waypoint(&self) -> &TrajectoryPoint {
        &self.waypoint
    }

    /// 航点列表（始终只有一个元素）
    pub fn points(&self) -> &[TrajectoryPoint] {
        std::slice::from_ref(&self.waypoint)
    }

    /// 关节位置
    pub fn positions(&self) -> &[f64] {
        &self.waypoint.positions
    }

    /// 航点时长
    pub fn time_from_start(&self) -> Duration {
        self.waypoint.time_from_start
    }

    /// (关节名, 位置) 迭代器
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.joint_names
            .iter()
            .copied()
            .zip(self.waypoint.positions.iter().copied())
    }
}

/// 构建单航点轨迹命令
///
/// # 前置条件
///
/// `targets` 长度等于 `hand` 的关节数量。手势目录在构造期已经保证这一点，
/// 这里仍然检查，避免绕过目录的调用方发出畸形命令。
///
/// # 错误
///
/// - `ProtocolError::JointCountMismatch`: 向量长度与关节数量不一致
pub fn build_trajectory(
    hand: Hand,
    targets: &[f64],
    duration: Duration,
) -> Result<TrajectoryCommand, ProtocolError> {
    let joint_names = hand.joint_names();
    if targets.len() != joint_names.len() {
        return Err(ProtocolError::JointCountMismatch {
            hand,
            expected: joint_names.len(),
            actual: targets.len(),
        });
    }

    Ok(TrajectoryCommand {
        hand,
        joint_names,
        waypoint: TrajectoryPoint {
            positions: JointVector::from_slice(targets),
            time_from_start: duration,
        },
    })
}
