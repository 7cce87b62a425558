//! Region layout - where the header and the slot array sit in caller memory
//!
//! 内存区域布局 - 头部与槽位数组在调用者内存中的位置
//!
//! ```text
//! region start (aligned for Header)
//!     |
//!     v
//!     +-------+-------+-------+--------+--------+--------+-----+-----------+
//!     | read  | write | slots | stride | slot 0 | slot 1 | ... | slot n-1  |
//!     +-------+-------+-------+--------+--------+--------+-----+-----------+
//!     |<--------- META_SIZE --------->|<------ slots * stride ----------->|
//! ```
//!
//! One slot is always the sentinel, so `capacity = slots - 1`.
//!
//! 总有一个槽位作为哨兵，因此 `capacity = slots - 1`。

use core::mem::{align_of, size_of};

use crate::error::RingError;
use crate::shim::atomic::AtomicUsize;

/// Ring bookkeeping stored at the start of the region
///
/// 存储在内存区域起始处的环形缓冲区簿记信息
#[repr(C)]
pub(crate) struct Header {
    /// Slot preceding the oldest stored item (the sentinel)
    ///
    /// 最旧元素之前的槽位（哨兵）
    pub(crate) read: AtomicUsize,

    /// Next slot the producer fills
    ///
    /// 生产者下一个要填充的槽位
    pub(crate) write: AtomicUsize,

    /// Slot count, sentinel included
    ///
    /// 槽位总数（包含哨兵）
    pub(crate) slots: usize,

    /// Item size in bytes
    ///
    /// 元素字节大小
    pub(crate) stride: usize,
}

impl Header {
    /// Header of an empty ring
    ///
    /// 空环形缓冲区的头部
    pub(crate) fn empty(slots: usize, stride: usize) -> Self {
        Self {
            read: AtomicUsize::new(0),
            write: AtomicUsize::new(1),
            slots,
            stride,
        }
    }
}

/// Bytes taken by the header fields, excluding the sentinel slot
///
/// 头部字段占用的字节数（不含哨兵槽位）
pub const META_SIZE: usize = size_of::<Header>();

/// Alignment a region must have
///
/// 内存区域必须满足的对齐要求
pub const REGION_ALIGN: usize = align_of::<Header>();

/// Bytes a region needs to hold `capacity` items of type `T`
///
/// 容纳 `capacity` 个 `T` 类型元素所需的区域字节数
///
/// Saturates at `usize::MAX` when the size is not representable; no region
/// that large exists, so `init` on it cannot succeed.
///
/// 当大小无法表示时饱和为 `usize::MAX`。
#[inline]
pub const fn region_size<T>(capacity: usize) -> usize {
    capacity
        .saturating_add(1)
        .saturating_mul(size_of::<T>())
        .saturating_add(META_SIZE)
}

/// Slot count (sentinel included) a region of `region_len` bytes provides
///
/// 长度为 `region_len` 字节的区域可提供的槽位数（包含哨兵）
#[inline]
pub(crate) const fn slot_count<T>(region_len: usize) -> usize {
    match size_of::<T>() {
        0 => 0,
        stride => region_len.saturating_sub(META_SIZE) / stride,
    }
}

/// Usable capacity a region of `region_len` bytes provides for `T`
///
/// 长度为 `region_len` 字节的区域可为 `T` 提供的可用容量
#[inline]
pub const fn capacity_for<T>(region_len: usize) -> usize {
    slot_count::<T>(region_len).saturating_sub(1)
}

/// Check that `T` can be stored in a region slot
///
/// 检查 `T` 能否存储在区域槽位中
///
/// Slots start at `META_SIZE`, a multiple of `REGION_ALIGN`, so any item no
/// more strictly aligned than the header lands aligned in every slot.
pub(crate) fn check_item<T>() -> Result<(), RingError> {
    if size_of::<T>() == 0 || align_of::<T>() > REGION_ALIGN {
        log::error!(
            "item type of size {} and alignment {} cannot be stored in a region",
            size_of::<T>(),
            align_of::<T>()
        );
        return Err(RingError::InvalidArgument);
    }
    Ok(())
}

/// Check region alignment and that it holds the header and one usable slot
///
/// 检查区域对齐，以及是否能容纳头部和一个可用槽位
pub(crate) fn check_region<T>(region: &[u8]) -> Result<usize, RingError> {
    if (region.as_ptr() as usize) % REGION_ALIGN != 0 {
        log::error!("region at {:p} is not aligned to {} bytes", region.as_ptr(), REGION_ALIGN);
        return Err(RingError::MisalignedRegion);
    }
    let slots = slot_count::<T>(region.len());
    if slots < 2 {
        log::error!(
            "no enough spare memory for both the ring header and data: {} bytes",
            region.len()
        );
        return Err(RingError::RegionTooSmall);
    }
    Ok(slots)
}

/// Header-aligned byte storage for a ring region
///
/// 按环形头部对齐的区域字节存储
///
/// Plain `[u8; N]` arrays carry no alignment, so a ring over one may fail
/// with [`RingError::MisalignedRegion`]. `Region` fixes the alignment and can
/// live on the stack or in a `static`.
///
/// 普通 `[u8; N]` 数组没有对齐保证，在其上建立环形缓冲区可能返回
/// [`RingError::MisalignedRegion`]。`Region` 固定了对齐，可放在栈上或 `static` 中。
///
/// ```rust
/// use regionring::{ByteRing, Region};
///
/// let mut region = Region::<128>::new();
/// let ring = ByteRing::init(region.as_mut_slice()).unwrap();
/// assert_eq!(ring.capacity(), ByteRing::capacity_for(128));
/// ```
#[repr(C)]
pub struct Region<const N: usize> {
    _align: [Header; 0],
    bytes: [u8; N],
}

impl<const N: usize> Region<N> {
    /// Create a zeroed region
    ///
    /// 创建一个清零的区域
    #[inline]
    pub const fn new() -> Self {
        Self {
            _align: [],
            bytes: [0; N],
        }
    }

    /// Borrow the whole region as bytes
    ///
    /// 以字节切片形式借用整个区域
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Region length in bytes
    ///
    /// 区域字节长度
    #[inline]
    pub const fn len(&self) -> usize {
        N
    }

    /// Whether the region has no bytes at all
    ///
    /// 区域是否没有任何字节
    #[inline]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }
}

impl<const N: usize> Default for Region<N> {
    fn default() -> Self {
        Self::new()
    }
}
