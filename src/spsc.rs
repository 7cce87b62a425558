//! SPSC halves of a region ring
//!
//! 区域环形缓冲区的 SPSC 两端
//!
//! A [`Ring`](crate::Ring) split into a [`Producer`] and a [`Consumer`] keeps
//! the same region and algorithms; each half only reaches the cursor it owns
//! and reads the peer's cursor with Acquire ordering.
//!
//! 拆分为 [`Producer`] 和 [`Consumer`] 的 [`Ring`](crate::Ring) 共享同一内存区域和算法；
//! 每一端只修改自己的游标，并以 Acquire 顺序读取对端游标。

use core::marker::PhantomData;

use bytemuck::Pod;

use crate::error::{Rejected, RingError};
use crate::raw::RingCore;
use crate::shim::atomic::Ordering;

/// Producer half of the ring
///
/// 环形缓冲区的生产者端
///
/// # Type Parameters
/// - `'a`: Lifetime of the borrowed region
/// - `T`: Item type
///
/// # 类型参数
/// - `'a`: 借用区域的生命周期
/// - `T`: 元素类型
pub struct Producer<'a, T: Pod = u8> {
    /// Raw ring view
    ///
    /// 原始环形视图
    core: RingCore<T>,

    /// Cached read index (avoid reading the consumer's atomic repeatedly)
    ///
    /// 缓存的读索引（避免重复读取消费者的原子变量）
    cached_read: usize,

    _region: PhantomData<&'a mut [u8]>,
}

/// Consumer half of the ring
///
/// 环形缓冲区的消费者端
///
/// # Type Parameters
/// - `'a`: Lifetime of the borrowed region
/// - `T`: Item type
///
/// # 类型参数
/// - `'a`: 借用区域的生命周期
/// - `T`: 元素类型
pub struct Consumer<'a, T: Pod = u8> {
    /// Raw ring view
    ///
    /// 原始环形视图
    core: RingCore<T>,

    /// Cached write index (avoid reading the producer's atomic repeatedly)
    ///
    /// 缓存的写索引（避免重复读取生产者的原子变量）
    cached_write: usize,

    _region: PhantomData<&'a mut [u8]>,
}

/// Hand out both halves of one ring
///
/// 分发同一环形缓冲区的两端
pub(crate) fn split<'a, T: Pod>(core: RingCore<T>) -> (Producer<'a, T>, Consumer<'a, T>) {
    let producer = Producer {
        core,
        cached_read: core.read_index(Ordering::Acquire),
        _region: PhantomData,
    };

    let consumer = Consumer {
        core,
        cached_write: core.write_index(Ordering::Acquire),
        _region: PhantomData,
    };

    (producer, consumer)
}

impl<T: Pod> Producer<'_, T> {
    /// Get the capacity of the ring
    ///
    /// 获取环形缓冲区容量
    #[inline]
    pub fn capacity(&self) -> usize {
        self.core.capacity()
    }

    /// Get the number of items currently stored
    ///
    /// 获取当前存储的元素数量
    #[inline]
    pub fn occupied(&self) -> usize {
        let read = self.core.read_index(Ordering::Acquire);
        let write = self.core.write_index(Ordering::Relaxed);
        self.core.occupancy(read, write)
    }

    /// Get the number of items that can still be written
    ///
    /// 获取仍可写入的元素数量
    #[inline]
    pub fn spare(&self) -> usize {
        self.capacity() - self.occupied()
    }

    /// Check if the ring is full
    ///
    /// 检查环形缓冲区是否已满
    #[inline]
    pub fn is_full(&self) -> bool {
        self.spare() == 0
    }

    /// Append items, truncating to the spare room
    ///
    /// 追加元素，超出空闲空间的部分被截断
    ///
    /// Same contract as [`Ring::write`](crate::Ring::write).
    ///
    /// 约定与 [`Ring::write`](crate::Ring::write) 相同。
    #[inline]
    pub fn write(&mut self, data: &[T]) -> Result<usize, RingError> {
        let write = self.core.write_index(Ordering::Relaxed);
        let spare = self.core.capacity() - self.core.occupancy(self.cached_read, write);

        if spare < data.len() {
            // Update cached read index from consumer
            // 从消费者更新缓存的读索引
            self.cached_read = self.core.read_index(Ordering::Acquire);
        }

        // SAFETY: the producer half is unique and not `Clone`.
        unsafe { self.core.write(self.cached_read, data) }
    }
}

impl<T: Pod> Consumer<'_, T> {
    /// Get the capacity of the ring
    ///
    /// 获取环形缓冲区容量
    #[inline]
    pub fn capacity(&self) -> usize {
        self.core.capacity()
    }

    /// Get the number of items currently stored
    ///
    /// 获取当前存储的元素数量
    #[inline]
    pub fn occupied(&self) -> usize {
        let read = self.core.read_index(Ordering::Relaxed);
        let write = self.core.write_index(Ordering::Acquire);
        self.core.occupancy(read, write)
    }

    /// Check if the ring is empty
    ///
    /// 检查环形缓冲区是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.occupied() == 0
    }

    /// Refresh the cached write index when it cannot cover `wanted` items
    ///
    /// 当缓存的写索引不足以覆盖 `wanted` 个元素时刷新它
    #[inline]
    fn write_covering(&mut self, wanted: usize) -> usize {
        let read = self.core.read_index(Ordering::Relaxed);
        if self.core.occupancy(read, self.cached_write) < wanted {
            self.cached_write = self.core.write_index(Ordering::Acquire);
        }
        self.cached_write
    }

    /// Copy items starting `offset` past the oldest into `target`
    ///
    /// 将从最旧元素之后 `offset` 处开始的元素拷贝到 `target`
    ///
    /// Same contract as [`Ring::peek`](crate::Ring::peek).
    ///
    /// 约定与 [`Ring::peek`](crate::Ring::peek) 相同。
    #[inline]
    pub fn peek(&self, offset: usize, target: &mut [T]) -> Result<usize, RingError> {
        let write = self.core.write_index(Ordering::Acquire);
        // SAFETY: the consumer half is unique and not `Clone`.
        unsafe { self.core.peek_into(write, offset, target) }
    }

    /// Hand stored items to a segment consumer without consuming them
    ///
    /// 将已存储元素交给段消费者，但不消费它们
    ///
    /// Same contract as [`Ring::peek_with`](crate::Ring::peek_with).
    ///
    /// 约定与 [`Ring::peek_with`](crate::Ring::peek_with) 相同。
    #[inline]
    pub fn peek_with<F>(&self, offset: usize, len: usize, consumer: F) -> Result<usize, RingError>
    where
        F: FnMut(usize, usize, &[T]) -> Result<usize, Rejected>,
    {
        let write = self.core.write_index(Ordering::Acquire);
        // SAFETY: the consumer half is unique and not `Clone`.
        unsafe { self.core.peek_with(write, offset, len, consumer) }
    }

    /// Copy the oldest items into `target` and consume them
    ///
    /// 将最旧的元素拷贝到 `target` 并消费它们
    #[inline]
    pub fn read(&mut self, target: &mut [T]) -> Result<usize, RingError> {
        let write = self.write_covering(target.len());
        // SAFETY: the consumer half is unique and not `Clone`.
        unsafe { self.core.read_into(write, target) }
    }

    /// Discard up to `len` of the oldest items
    ///
    /// 丢弃最多 `len` 个最旧元素
    #[inline]
    pub fn forward(&mut self, len: usize) -> usize {
        let write = self.write_covering(len);
        // SAFETY: the consumer half is unique and not `Clone`.
        unsafe { self.core.forward(write, len) }
    }

    /// Discard everything currently stored
    ///
    /// 丢弃当前存储的所有数据
    ///
    /// # Returns
    /// Number of items discarded
    ///
    /// # 返回值
    /// 丢弃的元素数量
    pub fn clear(&mut self) -> usize {
        self.cached_write = self.core.write_index(Ordering::Acquire);
        // SAFETY: the consumer half is unique and not `Clone`.
        unsafe { self.core.forward(self.cached_write, usize::MAX) }
    }
}

// Each half touches only its own cursor and the slots that cursor guards
unsafe impl<T: Pod> Send for Producer<'_, T> {}
unsafe impl<T: Pod> Send for Consumer<'_, T> {}
