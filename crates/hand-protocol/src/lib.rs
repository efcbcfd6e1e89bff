//! # Hand Protocol
//!
//! 双手手势协议定义（无硬件依赖、无线程）
//!
//! ## 模块
//!
//! - `hand`: 手部标识、关节名称表、默认端点/话题名称
//! - `catalog`: 手势目录（手势名 → 关节目标向量）
//! - `trajectory`: 单航点轨迹命令构建
//!
//! ## 不变量
//!
//! - 右手 6 个关节，左手 5 个关节，这是两只手的物理构型，不是错误。
//! - 两只手的手势目录必须包含完全相同的手势名称集合。
//! - 目录中每个向量的长度必须等于对应手的关节数量（构造期校验）。

pub mod catalog;
pub mod hand;
pub mod trajectory;

// 重新导出常用类型
pub use catalog::{GestureCatalog, HandCatalog};
pub use hand::*;
pub use trajectory::{DEFAULT_DURATION, TrajectoryCommand, TrajectoryPoint, build_trajectory};

use smallvec::SmallVec;
use thiserror::Error;

/// 关节目标向量
///
/// 栈上预留 6 个位置，覆盖两只手中关节最多的一侧（右手 6 关节），
/// 构建轨迹时不需要堆分配。
pub type JointVector = SmallVec<[f64; 6]>;

/// 协议层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Invalid hand identifier: {0:?} (expected \"r\" or \"l\")")]
    InvalidHand(String),

    #[error(
        "Gesture {gesture:?} for {hand}_hand has {actual} joint targets, expected {expected}"
    )]
    InvalidGestureVector {
        hand: Hand,
        gesture: String,
        expected: usize,
        actual: usize,
    },

    #[error("Joint count mismatch for {hand}_hand: expected {expected}, got {actual}")]
    JointCountMismatch {
        hand: Hand,
        expected: usize,
        actual: usize,
    },

    #[error("Duplicate gesture {gesture:?} in {hand}_hand catalog")]
    DuplicateGesture { hand: Hand, gesture: String },

    #[error("Gesture {gesture:?} is defined for {present}_hand but missing for {missing}_hand")]
    AsymmetricCatalog {
        gesture: String,
        present: Hand,
        missing: Hand,
    },

    #[error("Catalog for {expected}_hand was built for {actual}_hand")]
    WrongHand { expected: Hand, actual: Hand },

    #[error("Empty gesture catalog for {0}_hand")]
    EmptyCatalog(Hand),

    #[error("Non-finite joint target in gesture {gesture:?} for {hand}_hand")]
    NonFiniteTarget { hand: Hand, gesture: String },
}
