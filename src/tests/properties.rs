//! Property tests: a ring driven by arbitrary operations behaves like a deque
//!
//! 属性测试：由任意操作驱动的环形缓冲区行为与双端队列一致

use std::collections::VecDeque;
use std::vec::Vec;

use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};

use crate::{ByteRing, Region, RingError};

const MAX_CHUNK: usize = 40;

#[derive(Debug, Clone)]
enum Op {
    Write(Vec<u8>),
    Peek { offset: usize, len: usize },
    Read(usize),
    Forward(usize),
    Reset,
}

impl Arbitrary for Op {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = usize::arbitrary(g) % MAX_CHUNK;
        match usize::arbitrary(g) % 10 {
            0..=3 => Op::Write((0..len).map(|_| u8::arbitrary(g)).collect()),
            4 | 5 => Op::Peek {
                offset: usize::arbitrary(g) % MAX_CHUNK,
                len,
            },
            6 | 7 => Op::Read(len),
            8 => Op::Forward(len),
            _ => Op::Reset,
        }
    }
}

/// Apply `ops` to a ring of `capacity` and to a deque model side by side
fn run_against_model(capacity: usize, ops: &[Op]) -> bool {
    let mut region = Region::<256>::new();
    let bytes = region.as_mut_slice();
    let Ok(mut ring) = ByteRing::init(&mut bytes[..ByteRing::region_size(capacity)]) else {
        return false;
    };
    let mut model = VecDeque::<u8>::new();

    for op in ops {
        let ok = match op {
            Op::Write(data) => {
                let spare = capacity - model.len();
                match ring.write(data) {
                    Ok(n) => {
                        model.extend(&data[..n]);
                        !data.is_empty() && n == data.len().min(spare)
                    }
                    Err(RingError::InvalidArgument) => data.is_empty(),
                    Err(RingError::InsufficientSpace) => !data.is_empty() && spare == 0,
                    Err(_) => false,
                }
            }
            Op::Peek { offset, len } => {
                let mut out = std::vec![0u8; *len];
                match ring.peek(*offset, &mut out) {
                    Ok(n) => {
                        n == (*len).min(model.len().saturating_sub(*offset))
                            && out[..n].iter().eq(model.iter().skip(*offset).take(n))
                    }
                    Err(RingError::InvalidArgument) => *len == 0,
                    Err(RingError::EmptyBuffer) => *len > 0 && model.is_empty(),
                    Err(RingError::OffsetOutOfRange) => {
                        *len > 0 && !model.is_empty() && *offset >= model.len()
                    }
                    Err(_) => false,
                }
            }
            Op::Read(len) => {
                let mut out = std::vec![0u8; *len];
                match ring.read(&mut out) {
                    Ok(n) => {
                        let wanted = (*len).min(model.len());
                        let expected: Vec<u8> = model.drain(..wanted).collect();
                        n == wanted && out[..n] == expected[..]
                    }
                    Err(RingError::InvalidArgument) => *len == 0,
                    Err(RingError::EmptyBuffer) => *len > 0 && model.is_empty(),
                    Err(_) => false,
                }
            }
            Op::Forward(len) => {
                let expected = (*len).min(model.len());
                model.drain(..expected);
                ring.forward(*len) == expected
            }
            Op::Reset => {
                model.clear();
                ring.reset();
                true
            }
        };

        if !ok || ring.occupied() != model.len() || ring.spare() != capacity - model.len() {
            return false;
        }
    }
    true
}

#[test]
fn ring_matches_deque_model_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(capacity: u8, ops: Vec<Op>) -> TestResult {
        let capacity = 1 + usize::from(capacity) % 96;
        TestResult::from_bool(run_against_model(capacity, &ops))
    }

    QuickCheck::new()
        .tests(500)
        .quickcheck(prop as fn(u8, Vec<Op>) -> TestResult);
}

#[test]
fn write_never_exceeds_spare_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(capacity: u8, chunks: Vec<Vec<u8>>) -> TestResult {
        let capacity = 1 + usize::from(capacity) % 96;
        let mut region = Region::<256>::new();
        let bytes = region.as_mut_slice();
        let Ok(mut ring) = ByteRing::init(&mut bytes[..ByteRing::region_size(capacity)]) else {
            return TestResult::failed();
        };

        for chunk in chunks {
            let spare = ring.spare();
            if let Ok(n) = ring.write(&chunk) {
                if n > spare || n > chunk.len() || n == 0 {
                    return TestResult::failed();
                }
            }
            if ring.occupied() > ring.capacity() {
                return TestResult::failed();
            }
        }
        TestResult::passed()
    }

    QuickCheck::new()
        .tests(500)
        .quickcheck(prop as fn(u8, Vec<Vec<u8>>) -> TestResult);
}

#[test]
fn forward_never_exceeds_occupied_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(fill: u8, steps: Vec<u8>) -> TestResult {
        let mut region = Region::<256>::new();
        let bytes = region.as_mut_slice();
        let Ok(mut ring) = ByteRing::init(&mut bytes[..ByteRing::region_size(64)]) else {
            return TestResult::failed();
        };
        let fill = usize::from(fill) % 65;
        if fill > 0 && ring.write(&std::vec![0xAB; fill]) != Ok(fill) {
            return TestResult::failed();
        }

        let mut remaining = fill;
        for step in steps {
            let before = ring.occupied();
            let moved = ring.forward(usize::from(step));
            if moved > before || moved != usize::from(step).min(before) {
                return TestResult::failed();
            }
            remaining -= moved;
            if ring.occupied() != remaining {
                return TestResult::failed();
            }
        }
        TestResult::passed()
    }

    QuickCheck::new()
        .tests(500)
        .quickcheck(prop as fn(u8, Vec<u8>) -> TestResult);
}
