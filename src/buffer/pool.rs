//! Thread-local pool of block buffers.

use std::cell::RefCell;
use std::ops::{Deref, DerefMut};

use crate::error::{DiskIntError, Result};

/// Largest buffer capacity kept in the pool after use (1 MiB).
///
/// Budget-sized buffers above this are freed on drop so an idle thread never
/// pins a large share of the memory budget.
pub const POOL_RETAIN_LIMIT: usize = 1024 * 1024;

/// Maximum number of buffers to keep per thread.
pub const MAX_POOL_SIZE: usize = 4;

/// A reusable byte buffer holding one block.
#[derive(Debug)]
pub struct BlockBuffer {
    data: Vec<u8>,
}

impl BlockBuffer {
    /// Takes an empty buffer able to hold `bytes` bytes without reallocating.
    pub fn with_capacity(bytes: usize) -> Result<Self> {
        let mut data = THREAD_BUFFER_POOL
            .with(|pool| pool.borrow_mut().pop())
            .unwrap_or_default();
        data.clear();
        data.try_reserve_exact(bytes)
            .map_err(|_| DiskIntError::MemoryAllocationFailed { bytes: bytes as u64 })?;
        Ok(Self { data })
    }

    /// Takes a buffer of exactly `bytes` zero bytes.
    pub fn zeroed(bytes: usize) -> Result<Self> {
        let mut buf = Self::with_capacity(bytes)?;
        buf.data.resize(bytes, 0);
        Ok(buf)
    }
}

impl Deref for BlockBuffer {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.data
    }
}

impl DerefMut for BlockBuffer {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.data
    }
}

impl Drop for BlockBuffer {
    fn drop(&mut self) {
        if self.data.capacity() == 0 || self.data.capacity() > POOL_RETAIN_LIMIT {
            return;
        }
        self.data.clear();
        THREAD_BUFFER_POOL.with(|pool| {
            let mut pool = pool.borrow_mut();
            if pool.len() < MAX_POOL_SIZE {
                pool.push(std::mem::take(&mut self.data));
            }
        });
    }
}

thread_local! {
    static THREAD_BUFFER_POOL: RefCell<Vec<Vec<u8>>> = const { RefCell::new(Vec::new()) };
}
