//! Error types shared by every ring flavour
//!
//! 所有环形缓冲区共享的错误类型

/// Ring buffer operation error
///
/// 环形缓冲区操作错误
///
/// Every variant leaves the ring untouched: a failed call never moves either
/// cursor and never copies into the region.
///
/// 所有变体都不会改变环形缓冲区：失败的调用既不移动游标，也不写入内存区域。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum RingError {
    /// Empty input slice, zero length, or an item type the ring cannot store
    ///
    /// 空输入切片、零长度，或无法存储的元素类型
    #[error("invalid argument")]
    InvalidArgument,

    /// Write against a ring with no spare slot
    ///
    /// 向没有空闲槽位的缓冲区写入
    #[error("out of space")]
    InsufficientSpace,

    /// Peek or read against a ring holding no data
    ///
    /// 对没有数据的缓冲区进行窥视或读取
    #[error("no data available")]
    EmptyBuffer,

    /// Peek offset at or beyond the current occupancy
    ///
    /// 窥视偏移量大于或等于当前占用量
    #[error("offset out of range")]
    OffsetOutOfRange,

    /// The segment consumer reported an error
    ///
    /// 段消费者回调报告了错误
    #[error("consumer callback failed")]
    UserCallback,

    /// Region cannot hold the header plus one usable slot
    ///
    /// 内存区域无法容纳头部加一个可用槽位
    #[error("region too small for header and one slot")]
    RegionTooSmall,

    /// Region start is not aligned for the ring header
    ///
    /// 内存区域起始地址未按环形头部对齐
    #[error("region is not aligned for the ring header")]
    MisalignedRegion,

    /// An existing header failed validation on attach
    ///
    /// 附加时已有头部校验失败
    #[error("region holds no valid ring header")]
    CorruptHeader,
}

impl RingError {
    /// Signed status code used by the count-or-negative calling convention
    ///
    /// 计数或负值调用约定中使用的有符号状态码
    #[inline]
    pub const fn code(self) -> isize {
        -1
    }
}

/// Returned by a segment consumer that cannot process a segment at all
///
/// 段消费者完全无法处理某个段时返回
///
/// Distinct from accepting fewer items than offered, which asks the caller to
/// retry later with more receiving room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, thiserror::Error)]
#[error("segment rejected by consumer")]
pub struct Rejected;

/// Fold an operation result into the signed-count convention
///
/// 将操作结果折叠为有符号计数约定
///
/// A non-negative value is the count the operation moved; `-1` is a failure.
/// Counts above `isize::MAX` saturate rather than wrap into the failure range.
///
/// ```rust
/// use regionring::{status, RingError};
///
/// assert_eq!(status(Ok(3)), 3);
/// assert_eq!(status(Err(RingError::EmptyBuffer)), -1);
/// ```
#[inline]
pub fn status(result: Result<usize, RingError>) -> isize {
    match result {
        Ok(count) => isize::try_from(count).unwrap_or(isize::MAX),
        Err(err) => err.code(),
    }
}
