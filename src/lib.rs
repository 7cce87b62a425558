//! # Region Ring Buffers
//!
//! 区域环形缓冲区
//!
//! `regionring` is an allocation-free bounded FIFO for resource-constrained
//! targets. The ring lives entirely inside a memory region the caller
//! supplies: a small header followed by the slot array.
//!
//! `regionring` 是面向资源受限目标的零分配有界 FIFO。环形缓冲区完全位于调用者
//! 提供的内存区域中：一个小头部，后面紧跟槽位数组。
//!
//! ## Features
//!
//! 特性
//!
//! - **No allocation** - Works on any `&mut [u8]`, `static` regions included
//! - **Byte and item rings** - `Ring<'a, u8>` for streams, `Ring<'a, T>` for fixed-size records
//! - **Non-destructive peek** - Copy out or hand segments to a callback without consuming
//! - **Separate commit** - `forward` consumes independently of any peek
//! - **SPSC split** - Producer and consumer halves with acquire/release cursors
//!
//! - **零分配** - 适用于任意 `&mut [u8]`，包括 `static` 区域
//! - **字节与元素环形缓冲区** - `Ring<'a, u8>` 用于字节流，`Ring<'a, T>` 用于定长记录
//! - **非破坏性窥视** - 拷贝或将段交给回调，而不消费数据
//! - **独立提交** - `forward` 独立于窥视进行消费
//! - **SPSC 拆分** - 使用 acquire/release 游标的生产者与消费者两端
//!
//! ## Quick Start
//!
//! 快速开始
//!
//! ```rust
//! use regionring::{ByteRing, Region};
//!
//! // A region for a ring of 16 bytes
//! // 容纳 16 字节环形缓冲区的区域
//! let mut region = Region::<64>::new();
//! let bytes = region.as_mut_slice();
//! let mut ring = ByteRing::init(&mut bytes[..ByteRing::region_size(16)]).unwrap();
//!
//! // Producer writes
//! // 生产者写入
//! assert_eq!(ring.write(b"hello world"), Ok(11));
//!
//! // Peek without consuming, then read
//! // 窥视但不消费，然后读取
//! let mut word = [0u8; 5];
//! assert_eq!(ring.peek(6, &mut word), Ok(5));
//! assert_eq!(&word, b"world");
//!
//! assert_eq!(ring.read(&mut word), Ok(5));
//! assert_eq!(&word, b"hello");
//! assert_eq!(ring.occupied(), 6);
//! ```
//!
//! ## Fixed-size Records
//!
//! 定长记录
//!
//! ```rust
//! use regionring::{Region, Ring};
//!
//! #[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
//! #[repr(C)]
//! struct Sample {
//!     channel: u32,
//!     value: u32,
//! }
//!
//! let mut region = Region::<256>::new();
//! let mut ring = Ring::<Sample>::init(region.as_mut_slice()).unwrap();
//!
//! ring.write(&[Sample { channel: 1, value: 10 }, Sample { channel: 2, value: 20 }]).unwrap();
//!
//! let mut out = [Sample { channel: 0, value: 0 }; 1];
//! assert_eq!(ring.read(&mut out), Ok(1));
//! assert_eq!(out[0], Sample { channel: 1, value: 10 });
//! ```
//!
//! ## Multi-threaded Usage
//!
//! 多线程使用
//!
//! ```rust
//! use regionring::{ByteRing, Region};
//! use std::thread;
//!
//! let mut region = Region::<128>::new();
//! let ring = ByteRing::init(region.as_mut_slice()).unwrap();
//! let (mut producer, mut consumer) = ring.split();
//!
//! thread::scope(|s| {
//!     s.spawn(move || {
//!         let data: Vec<u8> = (0..=255).collect();
//!         let mut sent = 0;
//!         while sent < data.len() {
//!             match producer.write(&data[sent..]) {
//!                 Ok(n) => sent += n,
//!                 Err(_) => thread::yield_now(),
//!             }
//!         }
//!     });
//!
//!     s.spawn(move || {
//!         let mut received = Vec::new();
//!         let mut buf = [0u8; 32];
//!         while received.len() < 256 {
//!             match consumer.read(&mut buf) {
//!                 Ok(n) => received.extend_from_slice(&buf[..n]),
//!                 Err(_) => thread::yield_now(),
//!             }
//!         }
//!         assert!(received.iter().enumerate().all(|(i, &b)| b == i as u8));
//!     });
//! });
//! ```
//!
//! ## Notes
//!
//! 注意事项
//!
//! - One slot is reserved as a sentinel: a ring of capacity `n` uses `n + 1` slots
//! - Over-long writes and peeks are truncated, never rejected, while room remains
//! - Regions must be aligned to [`REGION_ALIGN`]; [`Region`] provides that
//! - Only Single Producer Single Consumer (SPSC) use is supported
//!
//! - 一个槽位保留为哨兵：容量为 `n` 的环形缓冲区使用 `n + 1` 个槽位
//! - 只要还有空间，过长的写入和窥视会被截断而不是拒绝
//! - 区域必须按 [`REGION_ALIGN`] 对齐；[`Region`] 提供了这一保证
//! - 仅支持单生产者单消费者（SPSC）场景

#![no_std]

#[cfg(test)]
extern crate std;

mod error;
mod layout;
mod raw;
mod ring;
mod shim;
pub mod spsc;

#[cfg(all(test, not(feature = "loom")))]
mod tests;

pub use error::{Rejected, RingError, status};
pub use layout::{META_SIZE, REGION_ALIGN, Region, capacity_for, region_size};
pub use raw::RingState;
pub use ring::{ByteRing, Ring};
