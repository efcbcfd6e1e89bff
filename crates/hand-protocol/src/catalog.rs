//! 手势目录
//!
//! 不可变的 手势名 → 关节目标向量 映射，每只手一份。
//! 所有校验都发生在构造期：长度不匹配、重复名称、两手词汇不对称都会让构造失败，
//! 运行期只提供只读查询。
//!
//! # 示例
//!
//! ```rust
//! use hand_protocol::{GestureCatalog, Hand};
//!
//! let catalog = GestureCatalog::standard().unwrap();
//! let fist = catalog.lookup(Hand::Right, "fist").unwrap();
//! assert_eq!(fist, &[1.5, 1.7, 1.8, 1.5, 1.3, 0.0]);
//! assert!(catalog.lookup(Hand::Left, "wave").is_none());
//! ```

use crate::{Hand, JointVector, ProtocolError};

/// 右手标准手势表（6 关节）
pub const RIGHT_GESTURES: [(&str, [f64; 6]); 10] = [
    ("open", [-0.3, -0.2, -0.2, 0.0, -0.3, 0.0]),
    ("fist", [1.5, 1.7, 1.8, 1.5, 1.3, 0.0]),
    ("scissors", [1.5, -0.2, -0.2, 1.5, 1.3, 0.0]),
    ("point", [1.5, -0.2, 1.8, 1.5, 1.3, 0.0]),
    ("thumbs_up", [-0.3, 1.7, 1.8, 1.5, 1.3, 0.0]),
    ("grasp", [1.0, 1.2, 1.3, 1.0, 1.0, 0.0]),
    ("pen_grasp", [1.5, 1.2, -0.2, 0.0, -0.3, 0.0]),
    ("hard_rock", [-0.3, -0.2, 1.8, 1.5, -0.3, 0.0]),
    ("funny", [-0.3, 1.7, -0.2, 1.5, 1.3, 0.0]),
    ("three", [1.5, -0.2, -0.2, 0.0, 1.3, 0.0]),
];

/// 左手标准手势表（5 关节）
pub const LEFT_GESTURES: [(&str, [f64; 5]); 10] = [
    ("open", [-2.35, 2.0, -0.07, -2.35, 0.19]),
    ("fist", [-0.78, 0.45, 2.0, -0.47, -1.72]),
    ("scissors", [-0.78, 2.0, -0.07, -0.47, -1.72]),
    ("point", [-0.78, 2.0, 2.0, -0.47, -1.72]),
    ("thumbs_up", [-2.35, 0.45, 2.0, -0.47, -1.72]),
    ("grasp", [-1.3, 0.95, 1.5, -0.97, -1.42]),
    ("pen_grasp", [-0.78, 0.95, -0.07, -2.35, 0.19]),
    ("hard_rock", [-2.35, 2.0, 2.0, -0.47, 0.19]),
    ("funny", [-2.35, 0.45, -0.07, -0.47, -1.72]),
    ("three", [-0.78, 2.0, -0.07, -2.35, -1.72]),
];

/// 单只手的手势目录
///
/// 保持声明顺序，列表输出时与配置顺序一致。
#[derive(Debug, Clone, PartialEq)]
pub struct HandCatalog {
    hand: Hand,
    entries: Vec<(String, JointVector)>,
}

impl HandCatalog {
    /// 创建并校验单手目录
    ///
    /// # 错误
    ///
    /// - `ProtocolError::EmptyCatalog`: 没有任何手势
    /// - `ProtocolError::InvalidGestureVector`: 向量长度不等于该手关节数
    /// - `ProtocolError::NonFiniteTarget`: 向量包含 NaN / 无穷
    /// - `ProtocolError::DuplicateGesture`: 手势名重复
    pub fn new<N, V>(
        hand: Hand,
        entries: impl IntoIterator<Item = (N, V)>,
    ) -> Result<Self, ProtocolError>
    where
        N: Into<String>,
        V: AsRef<[f64]>,
    {
        let expected = hand.joint_count();
        let mut validated: Vec<(String, JointVector)> = Vec::new();

        for (name, targets) in entries {
            let name = name.into();
            let targets = targets.as_ref();

            if targets.len() != expected {
                return Err(ProtocolError::InvalidGestureVector {
                    hand,
                    gesture: name,
                    expected,
                    actual: targets.len(),
                });
            }
            if targets.iter().any(|t| !t.is_finite()) {
                return Err(ProtocolError::NonFiniteTarget { hand, gesture: name });
            }
            if validated.iter().any(|(existing, _)| *existing == name) {
                return Err(ProtocolError::DuplicateGesture { hand, gesture: name });
            }

            validated.push((name, JointVector::from_slice(targets)));
        }

        if validated.is_empty() {
            return Err(ProtocolError::EmptyCatalog(hand));
        }

        Ok(Self {
            hand,
            entries: validated,
        })
    }

    /// 所属的手
    pub fn hand(&self) -> Hand {
        self.hand
    }

    /// 查询手势目标向量
    pub fn lookup(&self, gesture: &str) -> Option<&[f64]> {
        self.entries
            .iter()
            .find(|(name, _)| name == gesture)
            .map(|(_, targets)| targets.as_slice())
    }

    /// 是否包含该手势
    pub fn contains(&self, gesture: &str) -> bool {
        self.lookup(gesture).is_some()
    }

    /// 手势名称（声明顺序）
    pub fn gesture_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// 手势 + 目标向量（声明顺序）
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.entries
            .iter()
            .map(|(name, targets)| (name.as_str(), targets.as_slice()))
    }

    /// 手势数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空（构造成功的目录永远非空）
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 双手手势目录
///
/// 启动时构造一次，之后以 `Arc<GestureCatalog>` 注入各手的分发线程，只读共享，无需加锁。
#[derive(Debug, Clone, PartialEq)]
pub struct GestureCatalog {
    right: HandCatalog,
    left: HandCatalog,
}

impl GestureCatalog {
    /// 组合两只手的目录
    ///
    /// # 错误
    ///
    /// - `ProtocolError::WrongHand`: 参数位置与目录所属的手不一致
    /// - `ProtocolError::AsymmetricCatalog`: 某个手势只在一只手上定义
    pub fn new(right: HandCatalog, left: HandCatalog) -> Result<Self, ProtocolError> {
        if right.hand() != Hand::Right {
            return Err(ProtocolError::WrongHand {
                expected: Hand::Right,
                actual: right.hand(),
            });
        }
        if left.hand() != Hand::Left {
            return Err(ProtocolError::WrongHand {
                expected: Hand::Left,
                actual: left.hand(),
            });
        }

        for (present, missing) in [(&right, &left), (&left, &right)] {
            if let Some(gesture) = present.gesture_names().find(|g| !missing.contains(g)) {
                return Err(ProtocolError::AsymmetricCatalog {
                    gesture: gesture.to_string(),
                    present: present.hand(),
                    missing: missing.hand(),
                });
            }
        }

        Ok(Self { right, left })
    }

    /// 标准双手目录（10 个手势）
    pub fn standard() -> Result<Self, ProtocolError> {
        Self::new(
            HandCatalog::new(Hand::Right, RIGHT_GESTURES)?,
            HandCatalog::new(Hand::Left, LEFT_GESTURES)?,
        )
    }

    /// 取某只手的目录
    pub fn hand(&self, hand: Hand) -> &HandCatalog {
        match hand {
            Hand::Right => &self.right,
            Hand::Left => &self.left,
        }
    }

    /// 查询手势目标向量，未知手势返回 `None`
    pub fn lookup(&self, hand: Hand, gesture: &str) -> Option<&[f64]> {
        self.hand(hand).lookup(gesture)
    }

    /// 某只手的手势名称（声明顺序）
    pub fn gesture_names(&self, hand: Hand) -> impl Iterator<Item = &str> {
        self.hand(hand).gesture_names()
    }
}
