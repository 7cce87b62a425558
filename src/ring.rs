//! Bounded FIFO ring stored inside a caller-supplied memory region
//!
//! 存储在调用者提供的内存区域中的有界 FIFO 环形缓冲区
//!
//! This module provides the ring that supports:
//! - Byte streams (`Ring<'a, u8>`, aliased [`ByteRing`])
//! - Fixed-stride records of any `bytemuck::Pod` type
//! - Non-destructive peeks, with or without a segment consumer
//! - Splitting into SPSC producer/consumer halves
//!
//! 本模块提供的环形缓冲区支持：
//! - 字节流（`Ring<'a, u8>`，别名 [`ByteRing`]）
//! - 任意 `bytemuck::Pod` 类型的定长记录
//! - 非破坏性窥视，可选使用段消费者回调
//! - 拆分为 SPSC 生产者/消费者两端

use core::marker::PhantomData;
use core::mem::size_of;

use bytemuck::Pod;

use crate::raw::{RingCore, RingState};
use crate::error::{Rejected, RingError};
use crate::layout::{self, META_SIZE};
use crate::shim::atomic::Ordering;
use crate::spsc::{Consumer, Producer};

/// Ring over a byte stream
///
/// 字节流环形缓冲区
pub type ByteRing<'a> = Ring<'a, u8>;

/// Bounded FIFO ring living in a borrowed region
///
/// 位于借用内存区域中的有界 FIFO 环形缓冲区
///
/// # Type Parameters
/// - `'a`: Lifetime of the borrowed region
/// - `T`: Item type; every item occupies one slot of `size_of::<T>()` bytes
///
/// # 类型参数
/// - `'a`: 借用区域的生命周期
/// - `T`: 元素类型；每个元素占用一个 `size_of::<T>()` 字节的槽位
///
/// # Features
///
/// - **No allocation**: header and slots both live in the caller's region
/// - **Silent truncation**: over-long writes and peeks move what fits
/// - **Sentinel slot**: full and empty are told apart without a counter
///
/// # 特性
///
/// - **零分配**: 头部和槽位都位于调用者的区域中
/// - **静默截断**: 过长的写入和窥视只移动能容纳的部分
/// - **哨兵槽位**: 无需计数器即可区分满和空
///
/// ```rust
/// use regionring::{ByteRing, Region, RingError};
///
/// let mut region = Region::<64>::new();
/// let bytes = region.as_mut_slice();
/// let mut ring = ByteRing::init(&mut bytes[..ByteRing::region_size(4)]).unwrap();
///
/// assert_eq!(ring.write(b"hello"), Ok(4));
/// assert_eq!(ring.write(b"!"), Err(RingError::InsufficientSpace));
///
/// let mut out = [0u8; 8];
/// assert_eq!(ring.read(&mut out), Ok(4));
/// assert_eq!(&out[..4], b"hell");
/// ```
pub struct Ring<'a, T: Pod = u8> {
    core: RingCore<T>,
    _region: PhantomData<&'a mut [u8]>,
}

impl<'a, T: Pod> Ring<'a, T> {
    /// Bytes taken from a region before the first usable slot
    ///
    /// 区域中第一个可用槽位之前占用的字节数
    ///
    /// Covers the header fields plus the sentinel slot, so a region of exactly
    /// `HEADER_SIZE` bytes holds nothing and one item more is the minimum.
    ///
    /// 包含头部字段和哨兵槽位，因此恰好 `HEADER_SIZE` 字节的区域无法存储任何元素，
    /// 最少还需要再多一个元素的空间。
    pub const HEADER_SIZE: usize = META_SIZE + size_of::<T>();

    /// Bytes a region needs for `capacity` items
    ///
    /// 容纳 `capacity` 个元素所需的区域字节数
    #[inline]
    pub const fn region_size(capacity: usize) -> usize {
        layout::region_size::<T>(capacity)
    }

    /// Capacity a region of `region_len` bytes yields
    ///
    /// 长度为 `region_len` 字节的区域可提供的容量
    #[inline]
    pub const fn capacity_for(region_len: usize) -> usize {
        layout::capacity_for::<T>(region_len)
    }

    /// Build an empty ring over `region`
    ///
    /// 在 `region` 上建立一个空环形缓冲区
    ///
    /// Any previous content of the region is discarded.
    ///
    /// 区域中原有内容将被丢弃。
    ///
    /// # Errors
    /// - [`RingError::MisalignedRegion`] if the region start is not aligned
    ///   to [`REGION_ALIGN`](crate::REGION_ALIGN)
    /// - [`RingError::RegionTooSmall`] if the region is not larger than
    ///   [`Self::HEADER_SIZE`]
    /// - [`RingError::InvalidArgument`] for zero-sized or over-aligned `T`
    ///
    /// # 错误
    /// - 区域起始地址未对齐时返回 [`RingError::MisalignedRegion`]
    /// - 区域不大于 [`Self::HEADER_SIZE`] 时返回 [`RingError::RegionTooSmall`]
    /// - `T` 为零大小或对齐过严时返回 [`RingError::InvalidArgument`]
    pub fn init(region: &'a mut [u8]) -> Result<Self, RingError> {
        Ok(Self::from_core(RingCore::init(region)?))
    }

    /// Reopen a ring whose header is already in `region`
    ///
    /// 重新打开头部已存在于 `region` 中的环形缓冲区
    ///
    /// Stored items and cursors are kept, which lets a ring survive in
    /// retained memory between owners.
    ///
    /// 保留已存储的元素和游标，使环形缓冲区可以在保留内存中跨越不同持有者存活。
    ///
    /// # Errors
    /// [`RingError::CorruptHeader`] if the stride, slot count or either
    /// cursor does not fit the region, plus every error of [`Self::init`].
    ///
    /// # 错误
    /// 步长、槽位数或任一游标与区域不符时返回 [`RingError::CorruptHeader`]，
    /// 以及 [`Self::init`] 的所有错误。
    #[cfg(not(feature = "loom"))]
    pub fn attach(region: &'a mut [u8]) -> Result<Self, RingError> {
        Ok(Self::from_core(RingCore::attach(region)?))
    }

    #[inline]
    fn from_core(core: RingCore<T>) -> Self {
        Self {
            core,
            _region: PhantomData,
        }
    }

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
        self.core.occupied()
    }

    /// Get the number of items that can still be written
    ///
    /// 获取仍可写入的元素数量
    #[inline]
    pub fn spare(&self) -> usize {
        self.core.spare()
    }

    /// Get the fill state
    ///
    /// 获取填充状态
    #[inline]
    pub fn state(&self) -> RingState {
        self.core.state()
    }

    /// Check if the ring is empty
    ///
    /// 检查环形缓冲区是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.occupied() == 0
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
    /// # Returns
    /// The number of items written, between 1 and `data.len()`
    ///
    /// # Errors
    /// - [`RingError::InvalidArgument`] if `data` is empty
    /// - [`RingError::InsufficientSpace`] if no slot is free
    ///
    /// # 返回值
    /// 写入的元素数量，介于 1 和 `data.len()` 之间
    ///
    /// # 错误
    /// - `data` 为空时返回 [`RingError::InvalidArgument`]
    /// - 没有空闲槽位时返回 [`RingError::InsufficientSpace`]
    pub fn write(&mut self, data: &[T]) -> Result<usize, RingError> {
        let read = self.core.read_index(Ordering::Acquire);
        // SAFETY: `&mut self` makes this the only producer.
        unsafe { self.core.write(read, data) }
    }

    /// Copy items starting `offset` past the oldest into `target`
    ///
    /// 将从最旧元素之后 `offset` 处开始的元素拷贝到 `target`
    ///
    /// Requests `target.len()` items and truncates to what is stored past
    /// `offset`. Nothing is consumed.
    ///
    /// 请求 `target.len()` 个元素，并截断为 `offset` 之后实际存储的数量。不消费任何数据。
    ///
    /// # Errors
    /// - [`RingError::InvalidArgument`] if `target` is empty
    /// - [`RingError::EmptyBuffer`] if nothing is stored
    /// - [`RingError::OffsetOutOfRange`] if `offset >= occupied()`
    ///
    /// # 错误
    /// - `target` 为空时返回 [`RingError::InvalidArgument`]
    /// - 没有存储数据时返回 [`RingError::EmptyBuffer`]
    /// - `offset >= occupied()` 时返回 [`RingError::OffsetOutOfRange`]
    pub fn peek(&self, offset: usize, target: &mut [T]) -> Result<usize, RingError> {
        let write = self.core.write_index(Ordering::Acquire);
        // SAFETY: the ring is not split, so no producer runs concurrently.
        unsafe { self.core.peek_into(write, offset, target) }
    }

    /// Hand up to `len` items starting `offset` past the oldest to `consumer`
    ///
    /// 将从最旧元素之后 `offset` 处开始的最多 `len` 个元素交给 `consumer`
    ///
    /// The consumer is called once per contiguous segment (at most twice) as
    /// `consumer(total, segment_offset, segment)` and returns how many items it
    /// took:
    /// - `Ok(segment.len())` continues with the next segment
    /// - any other `Ok(n)` stops and the peek returns `Ok(0)`, asking the
    ///   caller to retry with more receiving room
    /// - `Err(Rejected)` aborts with [`RingError::UserCallback`]
    ///
    /// 消费者对每个连续段调用一次（最多两次），参数为
    /// `consumer(total, segment_offset, segment)`，返回其接受的元素数量：
    /// - `Ok(segment.len())` 继续处理下一段
    /// - 其他 `Ok(n)` 停止交付，窥视返回 `Ok(0)`，提示调用者用更大的接收空间重试
    /// - `Err(Rejected)` 以 [`RingError::UserCallback`] 中止
    ///
    /// Never moves either cursor, whatever the outcome.
    ///
    /// ```rust
    /// use regionring::{ByteRing, Region};
    ///
    /// let mut region = Region::<64>::new();
    /// let mut ring = ByteRing::init(region.as_mut_slice()).unwrap();
    /// ring.write(b"abcdef").unwrap();
    ///
    /// let mut sum = 0u32;
    /// let delivered = ring.peek_with(2, 3, |_total, _at, segment| {
    ///     sum += segment.iter().map(|&b| b as u32).sum::<u32>();
    ///     Ok(segment.len())
    /// });
    /// assert_eq!(delivered, Ok(3));
    /// assert_eq!(sum, b'c' as u32 + b'd' as u32 + b'e' as u32);
    /// assert_eq!(ring.occupied(), 6);
    /// ```
    pub fn peek_with<F>(&self, offset: usize, len: usize, consumer: F) -> Result<usize, RingError>
    where
        F: FnMut(usize, usize, &[T]) -> Result<usize, Rejected>,
    {
        let write = self.core.write_index(Ordering::Acquire);
        // SAFETY: the ring is not split, so no producer runs concurrently.
        unsafe { self.core.peek_with(write, offset, len, consumer) }
    }

    /// Copy the oldest items into `target` and consume them
    ///
    /// 将最旧的元素拷贝到 `target` 并消费它们
    ///
    /// Consumes exactly the number of items copied; a failed or retried peek
    /// consumes nothing.
    ///
    /// 只消费实际拷贝的元素数量；失败或需要重试的窥视不消费任何数据。
    pub fn read(&mut self, target: &mut [T]) -> Result<usize, RingError> {
        let write = self.core.write_index(Ordering::Acquire);
        // SAFETY: `&mut self` makes this the only consumer.
        unsafe { self.core.read_into(write, target) }
    }

    /// Discard up to `len` of the oldest items without copying
    ///
    /// 丢弃最多 `len` 个最旧元素，不进行拷贝
    ///
    /// # Returns
    /// Items actually discarded; `0` on an empty ring
    ///
    /// # 返回值
    /// 实际丢弃的元素数量；空缓冲区返回 `0`
    pub fn forward(&mut self, len: usize) -> usize {
        let write = self.core.write_index(Ordering::Acquire);
        // SAFETY: `&mut self` makes this the only consumer.
        unsafe { self.core.forward(write, len) }
    }

    /// Discard all content, keeping the slot count recorded at init
    ///
    /// 丢弃所有内容，保留初始化时记录的槽位数
    pub fn reset(&mut self) {
        // SAFETY: `&mut self` rules out any other handle.
        unsafe { self.core.reset() }
    }

    /// Split into a producer half and a consumer half
    ///
    /// 拆分为生产者端和消费者端
    ///
    /// Each half is `Send`, so the two sides may run on different threads or
    /// in an interrupt handler and the main loop.
    ///
    /// 两端都实现了 `Send`，因此可分别运行在不同线程上，或分别运行在中断处理程序和主循环中。
    pub fn split(self) -> (Producer<'a, T>, Consumer<'a, T>) {
        crate::spsc::split(self.core)
    }
}

unsafe impl<T: Pod> Send for Ring<'_, T> {}

impl<T: Pod> core::fmt::Debug for Ring<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Ring")
            .field("capacity", &self.capacity())
            .field("occupied", &self.occupied())
            .field("read", &self.core.read_index(Ordering::Relaxed))
            .field("write", &self.core.write_index(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;
    use crate::layout::Region;

    #[test]
    fn test_basic_write_read() {
        let mut region = Region::<128>::new();
        let mut ring = ByteRing::init(region.as_mut_slice()).unwrap();

        assert_eq!(ring.write(&[1, 2, 3]), Ok(3));
        assert_eq!(ring.occupied(), 3);

        let mut out = [0u8; 3];
        assert_eq!(ring.read(&mut out), Ok(3));
        assert_eq!(out, [1, 2, 3]);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_header_size() {
        assert_eq!(ByteRing::HEADER_SIZE, META_SIZE + 1);
        assert_eq!(Ring::<u32>::HEADER_SIZE, META_SIZE + 4);
        assert_eq!(ByteRing::region_size(10), ByteRing::HEADER_SIZE + 10);
        assert_eq!(Ring::<u32>::region_size(10), Ring::<u32>::HEADER_SIZE + 40);
    }

    #[test]
    fn test_state_transitions() {
        let mut region = Region::<128>::new();
        let bytes = region.as_mut_slice();
        let mut ring = ByteRing::init(&mut bytes[..ByteRing::region_size(3)]).unwrap();

        assert_eq!(ring.state(), RingState::Empty);
        ring.write(&[1]).unwrap();
        assert_eq!(ring.state(), RingState::Partial);
        ring.write(&[2, 3]).unwrap();
        assert_eq!(ring.state(), RingState::Full);
        assert!(ring.is_full());

        let mut one = [0u8; 1];
        ring.peek(0, &mut one).unwrap();
        assert_eq!(ring.state(), RingState::Full);

        ring.forward(2);
        assert_eq!(ring.state(), RingState::Partial);
        ring.read(&mut one).unwrap();
        assert_eq!(one, [3]);
        assert_eq!(ring.state(), RingState::Empty);
    }

    #[test]
    fn test_reset_discards_content() {
        let mut region = Region::<128>::new();
        let mut ring = ByteRing::init(region.as_mut_slice()).unwrap();
        let capacity = ring.capacity();

        ring.write(&[7; 10]).unwrap();
        ring.forward(3);
        ring.reset();

        assert!(ring.is_empty());
        assert_eq!(ring.capacity(), capacity);
        assert_eq!(ring.spare(), capacity);
    }

    #[test]
    fn test_debug_output() {
        use std::format;

        let mut region = Region::<128>::new();
        let bytes = region.as_mut_slice();
        let mut ring = ByteRing::init(&mut bytes[..ByteRing::region_size(4)]).unwrap();
        ring.write(&[1, 2]).unwrap();

        let text = format!("{:?}", ring);
        assert!(text.contains("capacity: 4"));
        assert!(text.contains("occupied: 2"));
    }
}
