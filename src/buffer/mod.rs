//! Block buffer management.
//!
//! Block buffers come from a thread-local pool so repeated arithmetic calls
//! do not reallocate. Allocation is fallible: a buffer that cannot be
//! reserved surfaces as [`DiskIntError::MemoryAllocationFailed`](crate::DiskIntError)
//! instead of aborting the process.

mod pool;

pub(crate) use pool::BlockBuffer;
