//! 分发状态定义
//!
//! 每只手一个状态机：`Idle → AwaitingReady → Submitting → Idle`。
//! 没有终态，每条请求重新进入一次；两只手的状态机互相独立。

use std::sync::atomic::{AtomicU8, Ordering};

/// 分发状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DispatchState {
    /// 空闲（默认），等待下一条请求
    #[default]
    Idle = 0,
    /// 轨迹已构建，等待端点就绪
    AwaitingReady = 1,
    /// 正在提交目标
    Submitting = 2,
}

impl DispatchState {
    /// 从 u8 转换，无效值视为 Idle
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::AwaitingReady,
            2 => Self::Submitting,
            _ => Self::Idle,
        }
    }

    /// 转换为 u8
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// 是否空闲
    pub fn is_idle(self) -> bool {
        self == Self::Idle
    }
}

/// 分发状态（原子版本，用于线程间共享）
///
/// 分发线程写入，其他线程只读。
#[derive(Debug, Default)]
pub struct AtomicDispatchState {
    inner: AtomicU8,
}

impl AtomicDispatchState {
    /// 创建新的原子状态
    pub fn new(state: DispatchState) -> Self {
        Self {
            inner: AtomicU8::new(state.as_u8()),
        }
    }

    /// 获取当前状态
    pub fn get(&self) -> DispatchState {
        DispatchState::from_u8(self.inner.load(Ordering::Acquire))
    }

    /// 设置状态
    pub fn set(&self, state: DispatchState) {
        self.inner.store(state.as_u8(), Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_state_conversion() {
        assert_eq!(DispatchState::from_u8(0), DispatchState::Idle);
        assert_eq!(DispatchState::from_u8(1), DispatchState::AwaitingReady);
        assert_eq!(DispatchState::from_u8(2), DispatchState::Submitting);
        assert_eq!(DispatchState::from_u8(255), DispatchState::Idle);
        assert_eq!(DispatchState::Submitting.as_u8(), 2);
    }

    #[test]
    fn test_atomic_dispatch_state() {
        let state = AtomicDispatchState::default();
        assert!(state.get().is_idle());

        state.set(DispatchState::AwaitingReady);
        assert_eq!(state.get(), DispatchState::AwaitingReady);

        state.set(DispatchState::Idle);
        assert!(state.get().is_idle());
    }

    #[test]
    fn test_atomic_dispatch_state_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let state = Arc::new(AtomicDispatchState::new(DispatchState::Idle));
        let writer = {
            let state = Arc::clone(&state);
            thread::spawn(move || {
                for _ in 0..100 {
                    state.set(DispatchState::Submitting);
                    state.set(DispatchState::Idle);
                }
            })
        };

        for _ in 0..100 {
            let _ = state.get();
        }

        writer.join().unwrap();
        assert!(state.get().is_idle());
    }
}
