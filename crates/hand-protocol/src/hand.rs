//! 手部标识与关节构型
//!
//! 两只手结构相似但关节数量不同，统一由 [`Hand`] 参数化，
//! 关节名称、默认动作端点和默认话题都是按手固定的常量。

use crate::ProtocolError;
use std::fmt;
use std::str::FromStr;

/// 右手关节数量
pub const RIGHT_JOINT_COUNT: usize = 6;

/// 左手关节数量
pub const LEFT_JOINT_COUNT: usize = 5;

/// 右手关节名称（顺序固定，与目标向量一一对应）
pub const RIGHT_JOINT_NAMES: [&str; RIGHT_JOINT_COUNT] = [
    "r_thumb_joint",
    "r_index1_joint",
    "r_middle1_joint",
    "r_ring_joint",
    "r_pinky_joint",
    "r_wrist_roll_joint",
];

/// 左手关节名称（没有腕部滚转关节）
pub const LEFT_JOINT_NAMES: [&str; LEFT_JOINT_COUNT] = [
    "l_thumb_joint",
    "l_index1_joint",
    "l_middle1_joint",
    "l_ring_joint",
    "l_pinky_joint",
];

/// 右手轨迹动作端点
pub const RIGHT_ACTION_NAME: &str = "r_hand_controller/follow_joint_trajectory";

/// 左手轨迹动作端点
pub const LEFT_ACTION_NAME: &str = "l_hand_controller/follow_joint_trajectory";

/// 右手手势输入话题
pub const RIGHT_GESTURE_TOPIC: &str = "/r_hand/r_hand_topic";

/// 左手手势输入话题
pub const LEFT_GESTURE_TOPIC: &str = "/l_hand/l_hand_topic";

/// 手部标识
///
/// 选择使用哪个手势目录、哪组关节名称以及哪个动作端点。
/// 文本形式为 `"r"` / `"l"`，解析时也接受 `"right"` / `"left"`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Hand {
    /// 右手（6 关节）
    Right,
    /// 左手（5 关节）
    Left,
}

impl Hand {
    /// 所有手，按 右、左 排列
    pub const ALL: [Hand; 2] = [Hand::Right, Hand::Left];

    /// 关节名称（固定顺序）
    pub fn joint_names(self) -> &'static [&'static str] {
        match self {
            Hand::Right => &RIGHT_JOINT_NAMES,
            Hand::Left => &LEFT_JOINT_NAMES,
        }
    }

    /// 关节数量
    pub fn joint_count(self) -> usize {
        self.joint_names().len()
    }

    /// 短标识（`"r"` / `"l"`）
    pub fn as_str(self) -> &'static str {
        match self {
            Hand::Right => "r",
            Hand::Left => "l",
        }
    }

    /// 默认轨迹动作端点名称
    pub fn default_action_name(self) -> &'static str {
        match self {
            Hand::Right => RIGHT_ACTION_NAME,
            Hand::Left => LEFT_ACTION_NAME,
        }
    }

    /// 默认手势输入话题
    pub fn default_topic(self) -> &'static str {
        match self {
            Hand::Right => RIGHT_GESTURE_TOPIC,
            Hand::Left => LEFT_GESTURE_TOPIC,
        }
    }

    /// 另一只手
    pub fn other(self) -> Hand {
        match self {
            Hand::Right => Hand::Left,
            Hand::Left => Hand::Right,
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Hand {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "r" | "right" | "R" => Ok(Hand::Right),
            "l" | "left" | "L" => Ok(Hand::Left),
            other => Err(ProtocolError::InvalidHand(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_counts() {
        assert_eq!(Hand::Right.joint_count(), 6);
        assert_eq!(Hand::Left.joint_count(), 5);
    }

    #[test]
    fn test_joint_names_are_prefixed() {
        for hand in Hand::ALL {
            let prefix = format!("{}_", hand);
            for name in hand.joint_names() {
                assert!(name.starts_with(&prefix), "{name} should start with {prefix}");
            }
        }
    }

    #[test]
    fn test_parse_hand() {
        assert_eq!("r".parse::<Hand>().unwrap(), Hand::Right);
        assert_eq!("left".parse::<Hand>().unwrap(), Hand::Left);
        assert_eq!(" l ".parse::<Hand>().unwrap(), Hand::Left);
        assert!(matches!(
            "x".parse::<Hand>(),
            Err(ProtocolError::InvalidHand(s)) if s == "x"
        ));
    }

    #[test]
    fn test_display_roundtrip() {
        for hand in Hand::ALL {
            assert_eq!(hand.to_string().parse::<Hand>().unwrap(), hand);
        }
    }

    #[test]
    fn test_default_names() {
        assert_eq!(
            Hand::Right.default_action_name(),
            "r_hand_controller/follow_joint_trajectory"
        );
        assert_eq!(Hand::Left.default_topic(), "/l_hand/l_hand_topic");
        assert_eq!(Hand::Right.other(), Hand::Left);
    }
}
