//! Block planning under a memory budget.

use tracing::warn;

use crate::error::{DiskIntError, Result};
use crate::limb::{LIMB_BYTES, limbs_for_bytes};

/// Number of block buffers alive at once: result, operand 1, operand 2.
pub const BUFFERS_PER_OPERATION: u64 = 3;

/// Sizing of one streaming arithmetic call.
///
/// A plan is derived fresh for every call from the current budget and the
/// operand sizes; it is never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPlan {
    block_bytes: u64,
    op1_blocks: u64,
    op2_blocks: u64,
    total_blocks: u64,
}

impl BlockPlan {
    /// Plans blocks for operands of `op1_bytes` and `op2_bytes` under `budget` bytes.
    ///
    /// The budget is a soft hint: if it cannot hold one limb per buffer the
    /// plan falls back to single-limb blocks.
    pub fn new(budget: u64, op1_bytes: u64, op2_bytes: u64) -> Self {
        let mut limbs_per_block = budget / BUFFERS_PER_OPERATION / LIMB_BYTES as u64;
        if limbs_per_block == 0 {
            warn!(budget, "memory budget below one limb per buffer, using single-limb blocks");
            limbs_per_block = 1;
        }

        let mut block_bytes = limbs_per_block * LIMB_BYTES as u64;
        let op1_blocks = op1_bytes.div_ceil(block_bytes);
        let op2_blocks = op2_bytes.div_ceil(block_bytes);
        let total_blocks = op1_blocks.max(op2_blocks);

        // One block covers both operands: size it to them, not to the budget.
        if total_blocks == 1 {
            block_bytes = limbs_for_bytes(op1_bytes.max(op2_bytes)) * LIMB_BYTES as u64;
        }

        Self {
            block_bytes,
            op1_blocks,
            op2_blocks,
            total_blocks,
        }
    }

    /// Returns the block size in bytes.
    pub fn block_bytes(&self) -> u64 {
        self.block_bytes
    }

    /// Returns the block size in bytes as an in-memory buffer length.
    pub fn block_len(&self) -> Result<usize> {
        usize::try_from(self.block_bytes).map_err(|_| DiskIntError::MemoryAllocationFailed {
            bytes: self.block_bytes,
        })
    }

    /// Returns the number of limbs per block.
    pub fn limbs_per_block(&self) -> u64 {
        self.block_bytes / LIMB_BYTES as u64
    }

    /// Returns the number of blocks covering the first operand.
    pub fn op1_blocks(&self) -> u64 {
        self.op1_blocks
    }

    /// Returns the number of blocks covering the second operand.
    pub fn op2_blocks(&self) -> u64 {
        self.op2_blocks
    }

    /// Returns the number of blocks the operation streams.
    pub fn total_blocks(&self) -> u64 {
        self.total_blocks
    }
}
