//! Block streaming for add and subtract.
//!
//! Both operands are read front to back, one block at a time, and the
//! result is appended block by block. Operands shorter than the block
//! stream are zero-extended. The carry (or borrow) is threaded through the
//! blocks as the fold accumulator.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tracing::trace;

use crate::buffer::BlockBuffer;
use crate::error::{DiskIntError, Result};
use crate::limb::{self, Limb};
use crate::plan::BlockPlan;

/// The elementwise operation applied to each pair of blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockOp {
    Add,
    Sub,
}

/// Sequential reader over one operand file that zero-pads past its end.
struct OperandStream {
    file: File,
    remaining: u64,
}

impl OperandStream {
    fn open(path: &Path, len: u64) -> Result<Self> {
        let file = File::open(path).map_err(|e| DiskIntError::from_io(e, path))?;
        Ok(Self {
            file,
            remaining: len,
        })
    }

    /// Fills `buf` with the next block, zero-padding whatever the file lacks.
    fn read_block(&mut self, buf: &mut [u8]) -> Result<()> {
        let n = self.remaining.min(buf.len() as u64) as usize;
        self.file.read_exact(&mut buf[..n])?;
        buf[n..].fill(0);
        self.remaining -= n as u64;
        Ok(())
    }
}

/// Streams `op1 (op) op2` into `out` block by block.
///
/// `op1_len` and `op2_len` are the operand byte sizes the plan was made
/// for. Returns the carry or borrow out of the last block.
pub(crate) fn stream_blocks<W: Write>(
    op: BlockOp,
    (op1, op1_len): (&Path, u64),
    (op2, op2_len): (&Path, u64),
    plan: &BlockPlan,
    out: &mut W,
) -> Result<Limb> {
    if plan.total_blocks() == 0 {
        return Ok(0);
    }

    let block_len = plan.block_len()?;
    let mut a = BlockBuffer::zeroed(block_len)?;
    let mut b = BlockBuffer::zeroed(block_len)?;
    let mut sum = BlockBuffer::with_capacity(block_len)?;

    let mut s1 = OperandStream::open(op1, op1_len)?;
    let mut s2 = OperandStream::open(op2, op2_len)?;

    (0..plan.total_blocks()).try_fold(0, |carry: Limb, block: u64| -> Result<Limb> {
        s1.read_block(&mut a)?;
        s2.read_block(&mut b)?;

        sum.clear();
        let carry = step(op, &mut sum, &a, &b, carry, block)?;
        out.write_all(&sum)?;

        trace!(block, carry, "block streamed");
        Ok(carry)
    })
}

/// Combines one pair of blocks and folds in the incoming carry.
fn step(op: BlockOp, dst: &mut Vec<u8>, a: &[u8], b: &[u8], carry_in: Limb, block: u64) -> Result<Limb> {
    let (c1, c2) = match op {
        BlockOp::Add => {
            let c1 = limb::add_block(dst, a, b);
            (c1, limb::add_carry_in(dst, carry_in))
        }
        BlockOp::Sub => {
            let c1 = limb::sub_block(dst, a, b);
            (c1, limb::sub_borrow_in(dst, carry_in))
        }
    };

    let carry = c1 + c2;
    if carry > 1 {
        return Err(DiskIntError::ArithmeticInvariantBroken { carry, block });
    }
    Ok(carry)
}
