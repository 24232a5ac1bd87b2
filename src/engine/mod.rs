//! Out-of-core arithmetic engine.
//!
//! - [`Engine`] - Adds, subtracts and compares [`DiskInt`]s in bounded memory
//!
//! Every operation plans its blocks from the current memory budget, streams
//! both operands into a fresh temporary file next to the result and
//! canonicalizes it. The temporary replaces the result only once the whole
//! operation succeeded, so a failed call leaves the result untouched and an
//! operand may safely double as the result.
//!
//! # Example
//!
//! ```
//! use diskint::{DiskInt, DiskIntConfig, Engine, MemoryBudget};
//! use num_bigint::BigUint;
//!
//! let config = DiskIntConfig::default().with_memory_budget(MemoryBudget::Fixed(4096));
//! let engine = Engine::new(config.clone())?;
//!
//! let a = DiskInt::load_from(&BigUint::from(u64::MAX), &config)?;
//! let b = DiskInt::load_from(&BigUint::from(1u32), &config)?;
//!
//! let sum = engine.add(&a, &b)?;
//! assert_eq!(sum.to_limbs()?, vec![0, 1]);
//! # Ok::<(), diskint::DiskIntError>(())
//! ```

mod stream;

use std::cmp::Ordering;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::canon::{self, ReverseChunks};
use crate::config::DiskIntConfig;
use crate::disk::DiskInt;
use crate::error::{DiskIntError, Result};
use crate::limb::{Limb, cmp_blocks};
use crate::plan::BlockPlan;

use stream::{BlockOp, stream_blocks};

/// Streaming add/subtract engine over disk integers.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: DiskIntConfig,
}

impl Engine {
    /// Creates an engine, validating `config`.
    pub fn new(config: DiskIntConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration used by this engine.
    pub fn config(&self) -> &DiskIntConfig {
        &self.config
    }

    /// Plans the blocks an operation on `op1` and `op2` would use right now.
    pub fn plan(&self, op1: &DiskInt, op2: &DiskInt) -> Result<BlockPlan> {
        let budget = self.config.memory_budget().resolve();
        Ok(BlockPlan::new(budget, op1.byte_len()?, op2.byte_len()?))
    }

    /// Returns `op1 + op2` as a new disk integer in the configured work dir.
    pub fn add(&self, op1: &DiskInt, op2: &DiskInt) -> Result<DiskInt> {
        self.compute(BlockOp::Add, self.config.work_dir(), op1, op2)
    }

    /// Returns `op1 - op2` as a new disk integer in the configured work dir.
    ///
    /// Fails with [`DiskIntError::Underflow`] if `op1 < op2`.
    pub fn sub(&self, op1: &DiskInt, op2: &DiskInt) -> Result<DiskInt> {
        self.compute(BlockOp::Sub, self.config.work_dir(), op1, op2)
    }

    /// Stores `op1 + op2` in `rop`.
    pub fn add_into(&self, rop: &mut DiskInt, op1: &DiskInt, op2: &DiskInt) -> Result<()> {
        let result = self.compute(BlockOp::Add, rop.dir(), op1, op2)?;
        rop.replace_with(result)
    }

    /// Stores `op1 - op2` in `rop`.
    ///
    /// On [`DiskIntError::Underflow`] `rop` keeps its previous value.
    pub fn sub_into(&self, rop: &mut DiskInt, op1: &DiskInt, op2: &DiskInt) -> Result<()> {
        let result = self.compute(BlockOp::Sub, rop.dir(), op1, op2)?;
        rop.replace_with(result)
    }

    /// Adds `op` to `rop` in place.
    pub fn add_assign(&self, rop: &mut DiskInt, op: &DiskInt) -> Result<()> {
        let result = self.compute(BlockOp::Add, rop.dir(), rop, op)?;
        rop.replace_with(result)
    }

    /// Subtracts `op` from `rop` in place.
    ///
    /// On [`DiskIntError::Underflow`] `rop` keeps its previous value.
    pub fn sub_assign(&self, rop: &mut DiskInt, op: &DiskInt) -> Result<()> {
        let result = self.compute(BlockOp::Sub, rop.dir(), rop, op)?;
        rop.replace_with(result)
    }

    /// Compares the magnitudes of two canonical disk integers.
    ///
    /// Scans both files backward one seek chunk at a time.
    pub fn compare(&self, a: &DiskInt, b: &DiskInt) -> Result<Ordering> {
        let (len_a, len_b) = (a.limb_count()?, b.limb_count()?);
        if len_a != len_b {
            return Ok(len_a.cmp(&len_b));
        }

        let chunk_limbs = self.config.seek_chunk_limbs();
        let mut chunks_a = ReverseChunks::open(a.path(), chunk_limbs)?;
        let mut chunks_b = ReverseChunks::open(b.path(), chunk_limbs)?;

        while let (Some(ca), Some(cb)) = (chunks_a.next_chunk()?, chunks_b.next_chunk()?) {
            let ord = cmp_blocks(ca, cb);
            if ord.is_ne() {
                return Ok(ord);
            }
        }
        Ok(Ordering::Equal)
    }

    /// Streams `op1 (op) op2` into a new canonical disk integer in `dir`.
    fn compute(&self, op: BlockOp, dir: &Path, op1: &DiskInt, op2: &DiskInt) -> Result<DiskInt> {
        let (op1_len, op2_len) = (op1.byte_len()?, op2.byte_len()?);
        let budget = self.config.memory_budget().resolve();
        let plan = BlockPlan::new(budget, op1_len, op2_len);
        debug!(
            ?op,
            budget,
            op1_len,
            op2_len,
            block_bytes = plan.block_bytes(),
            total_blocks = plan.total_blocks(),
            "streaming arithmetic"
        );

        let (result, file) = DiskInt::create_in(dir, &self.config)?;
        let carry = {
            let mut out = BufWriter::new(file);
            let carry = stream_blocks(op, (op1.path(), op1_len), (op2.path(), op2_len), &plan, &mut out)?;
            if op == BlockOp::Add && carry == 1 {
                out.write_all(&Limb::to_le_bytes(1))?;
            }
            out.flush()?;
            carry
        };

        match op {
            // A carry limb was just appended, so the result is already canonical.
            BlockOp::Add if carry == 1 => {}
            BlockOp::Add => {
                canon::canonicalize(result.path(), self.config.seek_chunk_limbs())?;
            }
            BlockOp::Sub if carry != 0 => return Err(DiskIntError::Underflow),
            BlockOp::Sub => {
                canon::canonicalize(result.path(), self.config.seek_chunk_limbs())?;
            }
        }

        Ok(result)
    }
}
