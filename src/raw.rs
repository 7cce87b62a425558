//! Raw ring buffer implementation - Shared logic for the whole ring and its SPSC halves
//!
//! 原始环形缓冲区实现 - 完整环形缓冲区与其 SPSC 两端共享的逻辑
//!
//! This module holds everything that touches the region directly:
//! - Header setup and validation over caller memory
//! - Occupancy arithmetic modulo the slot count
//! - Write, peek and forward with wrap-around split into two segments
//!
//! 此模块包含所有直接访问内存区域的逻辑：
//! - 在调用者内存上初始化和校验头部
//! - 基于槽位数取模的占用量计算
//! - 带环绕处理（拆分为两段）的写入、窥视和前移

use core::marker::PhantomData;
use core::mem::size_of;
use core::ptr::{self, NonNull};
use core::slice;

use bytemuck::Pod;

use crate::error::{Rejected, RingError};
use crate::layout::{self, Header, META_SIZE};
use crate::shim::atomic::Ordering;

/// Fill state of a ring
///
/// 环形缓冲区的填充状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RingState {
    /// Nothing stored
    ///
    /// 没有存储任何数据
    Empty,

    /// Some but not all slots used
    ///
    /// 部分槽位已使用
    Partial,

    /// Every usable slot holds an item
    ///
    /// 所有可用槽位都已存储元素
    Full,
}

/// Raw view of a ring living in a caller region
///
/// 位于调用者内存区域中的环形缓冲区原始视图
///
/// Carries no lifetime: the owning [`Ring`](crate::Ring) or SPSC half ties it
/// to the borrowed region.
///
/// 不携带生命周期：由持有它的 [`Ring`](crate::Ring) 或 SPSC 端将其与借用的区域绑定。
pub(crate) struct RingCore<T> {
    /// Header at the region start
    ///
    /// 区域起始处的头部
    header: NonNull<Header>,

    /// First slot of the slot array
    ///
    /// 槽位数组的第一个槽位
    slots: NonNull<T>,

    /// Slot count, sentinel included (never changes after init)
    ///
    /// 槽位总数，包含哨兵（初始化后不再改变）
    slot_count: usize,

    _marker: PhantomData<T>,
}

impl<T> Clone for RingCore<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RingCore<T> {}

impl<T: Pod> RingCore<T> {
    /// Write a fresh, empty header into `region`
    ///
    /// 向 `region` 写入一个新的空头部
    pub(crate) fn init(region: &mut [u8]) -> Result<Self, RingError> {
        layout::check_item::<T>()?;
        let slot_count = layout::check_region::<T>(region)?;
        let base = NonNull::from(region).cast::<u8>();
        let header = base.cast::<Header>();

        // SAFETY: the region is aligned for `Header` and longer than
        // META_SIZE, checked above.
        unsafe {
            header.write(Header::empty(slot_count, size_of::<T>()));
        }

        log::trace!("ring initialised: {} slots of {} bytes", slot_count, size_of::<T>());
        Ok(Self::from_parts(base, slot_count))
    }

    /// Reuse a header already present in `region`
    ///
    /// 复用 `region` 中已存在的头部
    #[cfg(not(feature = "loom"))]
    pub(crate) fn attach(region: &mut [u8]) -> Result<Self, RingError> {
        layout::check_item::<T>()?;
        let available = layout::check_region::<T>(region)?;
        let base = NonNull::from(region).cast::<u8>();

        // SAFETY: aligned and large enough, checked above. Every bit pattern
        // is a valid `usize`, and the atomics share its representation.
        let header = unsafe { base.cast::<Header>().as_ref() };
        let slot_count = header.slots;
        let read = header.read.load(Ordering::Acquire);
        let write = header.write.load(Ordering::Acquire);

        if header.stride != size_of::<T>()
            || slot_count < 2
            || slot_count > available
            || read >= slot_count
            || write >= slot_count
        {
            log::error!(
                "invalid ring header: stride={}, slots={}, read={}, write={}, available={}",
                header.stride,
                slot_count,
                read,
                write,
                available
            );
            return Err(RingError::CorruptHeader);
        }

        Ok(Self::from_parts(base, slot_count))
    }

    fn from_parts(base: NonNull<u8>, slot_count: usize) -> Self {
        Self {
            header: base.cast(),
            // SAFETY: the region is at least META_SIZE + 2 * stride bytes.
            slots: unsafe { base.add(META_SIZE) }.cast(),
            slot_count,
            _marker: PhantomData,
        }
    }
}

impl<T> RingCore<T> {
    #[inline]
    fn header(&self) -> &Header {
        // SAFETY: the header was written or validated at construction and
        // the owning handle keeps the region borrowed.
        unsafe { self.header.as_ref() }
    }

    /// Usable capacity (slot count minus the sentinel)
    ///
    /// 可用容量（槽位数减去哨兵）
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slot_count - 1
    }

    /// Load the read cursor
    ///
    /// 加载读游标
    #[inline]
    pub(crate) fn read_index(&self, order: Ordering) -> usize {
        self.header().read.load(order)
    }

    /// Load the write cursor
    ///
    /// 加载写游标
    #[inline]
    pub(crate) fn write_index(&self, order: Ordering) -> usize {
        self.header().write.load(order)
    }

    /// Items stored for a given pair of cursors
    ///
    /// 给定游标对时存储的元素数量
    #[inline]
    pub(crate) fn occupancy(&self, read: usize, write: usize) -> usize {
        (write + self.slot_count - read - 1) % self.slot_count
    }

    /// Items currently stored
    ///
    /// 当前存储的元素数量
    #[inline]
    pub(crate) fn occupied(&self) -> usize {
        let read = self.read_index(Ordering::Acquire);
        let write = self.write_index(Ordering::Acquire);
        self.occupancy(read, write)
    }

    /// Free slots currently available
    ///
    /// 当前可用的空闲槽位
    #[inline]
    pub(crate) fn spare(&self) -> usize {
        self.capacity() - self.occupied()
    }

    /// Current fill state
    ///
    /// 当前填充状态
    pub(crate) fn state(&self) -> RingState {
        match self.occupied() {
            0 => RingState::Empty,
            n if n == self.capacity() => RingState::Full,
            _ => RingState::Partial,
        }
    }

    /// Pointer to the slot at `index`
    ///
    /// 指向 `index` 处槽位的指针
    ///
    /// # Safety
    /// `index` must be below the slot count.
    #[inline]
    unsafe fn slot_ptr(&self, index: usize) -> *mut T {
        debug_assert!(index < self.slot_count);
        // SAFETY: in bounds by the caller's contract.
        unsafe { self.slots.as_ptr().add(index) }
    }

    /// Discard everything and return to the freshly initialised state
    ///
    /// 丢弃所有数据并回到刚初始化的状态
    ///
    /// # Safety
    /// No other handle may use the ring concurrently.
    pub(crate) unsafe fn reset(&self) {
        let header = self.header();
        header.read.store(0, Ordering::Relaxed);
        header.write.store(1, Ordering::Release);
    }

    /// Advance the read cursor by up to `len` items
    ///
    /// 将读游标前移最多 `len` 个元素
    ///
    /// `write` is a write cursor previously loaded with Acquire ordering.
    /// Returns the number of items actually discarded.
    ///
    /// `write` 是先前以 Acquire 顺序加载的写游标。返回实际丢弃的元素数量。
    ///
    /// # Safety
    /// Only the single consumer may call this.
    pub(crate) unsafe fn forward(&self, write: usize, len: usize) -> usize {
        let read = self.read_index(Ordering::Relaxed);
        let occupied = self.occupancy(read, write);
        if occupied == 0 {
            return 0;
        }

        let count = len.min(occupied);
        if count > 0 {
            self.header()
                .read
                .store((read + count) % self.slot_count, Ordering::Release);
        }
        count
    }
}

/// Batch copy operations for Pod items
///
/// Pod 元素的批量拷贝操作
impl<T: Pod> RingCore<T> {
    /// Append items, truncating to the spare room
    ///
    /// 追加元素，超出空闲空间的部分被截断
    ///
    /// `read` is a read cursor previously loaded with Acquire ordering. The
    /// write cursor is published with Release once both segments are copied.
    ///
    /// `read` 是先前以 Acquire 顺序加载的读游标。两段都拷贝完成后以 Release
    /// 顺序发布写游标。
    ///
    /// # Safety
    /// Only the single producer may call this.
    pub(crate) unsafe fn write(&self, read: usize, data: &[T]) -> Result<usize, RingError> {
        if data.is_empty() {
            log::error!("write: input size parameter error");
            return Err(RingError::InvalidArgument);
        }

        let write = self.write_index(Ordering::Relaxed);
        let spare = self.capacity() - self.occupancy(read, write);
        if spare == 0 {
            log::error!("write: out of space");
            return Err(RingError::InsufficientSpace);
        }

        let mut count = data.len();
        if count > spare {
            log::debug!("write: adjust size {} to smaller spare size {}", count, spare);
            count = spare;
        }

        // First part runs to the end of the slot array, second wraps to 0
        let first = (self.slot_count - write).min(count);
        // SAFETY: `write + first <= slot_count`, and every slot in
        // `[write, write + count)` mod slot_count is free: it lies outside the
        // stored data and never covers the sentinel at `read`.
        unsafe {
            ptr::copy_nonoverlapping(data.as_ptr(), self.slot_ptr(write), first);
            if first < count {
                log::trace!("write: wrap {} items to slot 0", count - first);
                ptr::copy_nonoverlapping(data.as_ptr().add(first), self.slot_ptr(0), count - first);
            }
        }

        self.header()
            .write
            .store((write + count) % self.slot_count, Ordering::Release);
        Ok(count)
    }

    /// Deliver up to `len` stored items starting `offset` past the oldest
    ///
    /// 从最旧元素之后 `offset` 处开始，交付最多 `len` 个已存储元素
    ///
    /// The consumer sees at most two contiguous segments as
    /// `(total, segment_offset, segment)`. `Err(Rejected)` aborts the peek
    /// with [`RingError::UserCallback`]; accepting any count other than the
    /// segment length stops delivery and the peek returns `Ok(0)`.
    ///
    /// 消费者最多看到两个连续段，参数为 `(total, segment_offset, segment)`。
    /// 返回 `Err(Rejected)` 会以 [`RingError::UserCallback`] 中止窥视；
    /// 接受的数量不等于段长度时停止交付，窥视返回 `Ok(0)`。
    ///
    /// Never moves either cursor.
    ///
    /// # Safety
    /// Only the single consumer may call this. `write` is a write cursor
    /// previously loaded with Acquire ordering.
    pub(crate) unsafe fn peek_with<F>(
        &self,
        write: usize,
        offset: usize,
        len: usize,
        mut consumer: F,
    ) -> Result<usize, RingError>
    where
        F: FnMut(usize, usize, &[T]) -> Result<usize, Rejected>,
    {
        if len == 0 {
            log::error!("peek: input size parameter error");
            return Err(RingError::InvalidArgument);
        }

        let read = self.read_index(Ordering::Relaxed);
        let occupied = self.occupancy(read, write);
        if occupied == 0 {
            log::error!("peek: no data available");
            return Err(RingError::EmptyBuffer);
        }
        if offset >= occupied {
            log::error!("peek: offset out of range: offset={}, size={}", offset, occupied);
            return Err(RingError::OffsetOutOfRange);
        }

        // `offset < occupied` here, so the subtraction cannot underflow
        let stored = occupied - offset;
        let total = len.min(stored);
        if total < len {
            log::debug!("peek: adjust size {} to smaller data size {}", len, stored);
        }

        // Stored data begins one slot past the sentinel
        let start = (read + offset + 1) % self.slot_count;
        let first = (self.slot_count - start).min(total);

        // SAFETY: `[start, start + first)` and `[0, total - first)` lie inside
        // the stored data, which the producer does not touch until the read
        // cursor moves past it.
        let head = unsafe { slice::from_raw_parts(self.slot_ptr(start), first) };
        if !Self::deliver(&mut consumer, total, 0, head)? {
            return Ok(0);
        }

        if first < total {
            let tail = unsafe { slice::from_raw_parts(self.slot_ptr(0), total - first) };
            if !Self::deliver(&mut consumer, total, first, tail)? {
                return Ok(0);
            }
        }

        Ok(total)
    }

    /// Hand one segment to the consumer, `Ok(false)` when it wants a retry
    ///
    /// 将一个段交给消费者，需要重试时返回 `Ok(false)`
    #[inline]
    fn deliver<F>(consumer: &mut F, total: usize, at: usize, segment: &[T]) -> Result<bool, RingError>
    where
        F: FnMut(usize, usize, &[T]) -> Result<usize, Rejected>,
    {
        match consumer(total, at, segment) {
            Err(Rejected) => {
                log::error!("peek: user callback return error");
                Err(RingError::UserCallback)
            }
            Ok(accepted) => Ok(accepted == segment.len()),
        }
    }

    /// Copy stored items into `target` without consuming them
    ///
    /// 将已存储元素拷贝到 `target`，但不消费它们
    ///
    /// # Safety
    /// Same contract as [`Self::peek_with`].
    pub(crate) unsafe fn peek_into(&self, write: usize, offset: usize, target: &mut [T]) -> Result<usize, RingError> {
        let room = target.len();
        let copy = |_total: usize, at: usize, segment: &[T]| -> Result<usize, Rejected> {
            let end = at + segment.len();
            if end > room {
                log::warn!("peek: need {} more items of room in target", end - room);
                return Ok(0);
            }
            target[at..end].copy_from_slice(segment);
            Ok(segment.len())
        };
        // SAFETY: forwarded contract.
        unsafe { self.peek_with(write, offset, room, copy) }
    }

    /// Copy out the oldest items and consume exactly what was copied
    ///
    /// 拷贝出最旧的元素，并只消费已拷贝的部分
    ///
    /// # Safety
    /// Same contract as [`Self::peek_with`].
    pub(crate) unsafe fn read_into(&self, write: usize, target: &mut [T]) -> Result<usize, RingError> {
        // SAFETY: forwarded contract.
        let count = unsafe { self.peek_into(write, 0, target)? };
        if count > 0 {
            // SAFETY: forwarded contract.
            unsafe { self.forward(write, count) };
        }
        Ok(count)
    }
}

// Handles built on RingCore enforce the single-producer/single-consumer split
unsafe impl<T: Send> Send for RingCore<T> {}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;
    use crate::layout::{Region, region_size};

    fn core_with_capacity(region: &mut Region<256>, capacity: usize) -> RingCore<u8> {
        RingCore::init(&mut region.as_mut_slice()[..region_size::<u8>(capacity)]).unwrap()
    }

    #[test]
    fn test_core_basic() {
        let mut region = Region::<256>::new();
        let core = core_with_capacity(&mut region, 4);
        assert_eq!(core.capacity(), 4);
        assert_eq!(core.occupied(), 0);
        assert_eq!(core.spare(), 4);
        assert_eq!(core.state(), RingState::Empty);
        assert_eq!(core.read_index(Ordering::Relaxed), 0);
        assert_eq!(core.write_index(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_core_occupancy_arithmetic() {
        let mut region = Region::<256>::new();
        let core = core_with_capacity(&mut region, 4);
        // 5 slots: read == write means full, write == read + 1 means empty
        assert_eq!(core.occupancy(0, 1), 0);
        assert_eq!(core.occupancy(0, 0), 4);
        assert_eq!(core.occupancy(3, 4), 0);
        assert_eq!(core.occupancy(4, 0), 0);
        assert_eq!(core.occupancy(4, 2), 2);
        assert_eq!(core.occupancy(1, 0), 3);
    }

    #[test]
    fn test_core_write_read_no_wrap() {
        let mut region = Region::<256>::new();
        let core = core_with_capacity(&mut region, 8);

        unsafe {
            assert_eq!(core.write(0, &[1, 2, 3, 4]), Ok(4));
            let mut dest = [0u8; 4];
            let write = core.write_index(Ordering::Acquire);
            assert_eq!(core.read_into(write, &mut dest), Ok(4));
            assert_eq!(dest, [1, 2, 3, 4]);
        }
        assert_eq!(core.occupied(), 0);
    }

    #[test]
    fn test_core_write_with_wrap() {
        let mut region = Region::<256>::new();
        let core = core_with_capacity(&mut region, 4);

        unsafe {
            assert_eq!(core.write(0, &[9, 9, 9]), Ok(3));
            let write = core.write_index(Ordering::Acquire);
            assert_eq!(core.forward(write, 3), 3);

            // read = 3, write = 4: the next write spans slot 4, then slots 0 and 1
            let read = core.read_index(Ordering::Acquire);
            assert_eq!(core.write(read, &[1, 2, 3]), Ok(3));
            assert_eq!(core.write_index(Ordering::Relaxed), 2);

            let mut dest = [0u8; 3];
            let write = core.write_index(Ordering::Acquire);
            assert_eq!(core.peek_into(write, 0, &mut dest), Ok(3));
            assert_eq!(dest, [1, 2, 3]);
        }
    }

    #[test]
    fn test_core_peek_segments() {
        let mut region = Region::<256>::new();
        let core = core_with_capacity(&mut region, 4);

        unsafe {
            core.write(0, &[0, 0, 0]).unwrap();
            let write = core.write_index(Ordering::Acquire);
            core.forward(write, 3);
            let read = core.read_index(Ordering::Acquire);
            core.write(read, &[10, 11, 12, 13]).unwrap();

            let mut seen = [(0usize, 0usize, 0usize); 2];
            let mut calls = 0;
            let write = core.write_index(Ordering::Acquire);
            let ret = core.peek_with(write, 0, 4, |total, at, segment| {
                seen[calls] = (total, at, segment.len());
                calls += 1;
                Ok(segment.len())
            });
            assert_eq!(ret, Ok(4));
            assert_eq!(calls, 2);
            assert_eq!(seen, [(4, 0, 1), (4, 1, 3)]);
        }
    }

    #[test]
    fn test_core_reset() {
        let mut region = Region::<256>::new();
        let core = core_with_capacity(&mut region, 4);
        unsafe {
            core.write(0, &[1, 2]).unwrap();
            core.reset();
        }
        assert_eq!(core.state(), RingState::Empty);
        assert_eq!(core.read_index(Ordering::Relaxed), 0);
        assert_eq!(core.write_index(Ordering::Relaxed), 1);
    }
}
