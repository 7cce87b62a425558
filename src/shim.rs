//! Shim module to abstract over core and loom atomics.
//!
//! The ring header keeps its two cursors in atomics. This module switches
//! them between the `core` implementation (production) and the `loom`
//! implementation (model checking) without touching the ring code.
//!
//! 环形头部的两个游标保存在原子变量中。此模块在 `core` 实现（生产）和
//! `loom` 实现（模型检查）之间切换，无需改动环形缓冲区代码。

#[cfg(not(feature = "loom"))]
pub(crate) mod atomic {
    pub use core::sync::atomic::{AtomicUsize, Ordering};
}

#[cfg(feature = "loom")]
pub(crate) mod atomic {
    pub use loom::sync::atomic::{AtomicUsize, Ordering};
}
