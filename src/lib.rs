//! diskint
//!
//! Out-of-core arbitrary-precision unsigned integer arithmetic for Rust.
//!
//! `diskint` stores each integer as a file of little-endian `u64` limbs and
//! adds or subtracts integers far larger than available memory by streaming
//! the files through memory-bounded blocks. It is designed around:
//!
//! - a per-operation memory budget split across three block buffers
//! - carry propagation across block boundaries
//! - canonical results with no leading zero limbs, found by a bounded-memory
//!   backward scan for huge files
//! - all-or-nothing results: a failed operation never leaves a partial value
//!
//! The crate intentionally:
//! - does NOT track signs (magnitudes only)
//! - does NOT multiply
//! - does NOT support concurrent access to one integer
//!
//! # Example
//!
//! ```
//! use diskint::{DiskInt, DiskIntConfig, Engine, MemoryBudget};
//! use num_bigint::BigUint;
//!
//! fn main() -> Result<(), diskint::DiskIntError> {
//!     let config = DiskIntConfig::default().with_memory_budget(MemoryBudget::Fixed(1 << 16));
//!     let engine = Engine::new(config.clone())?;
//!
//!     let a = DiskInt::load_from(&BigUint::from(7u32).pow(5000), &config)?;
//!     let b = DiskInt::load_from(&BigUint::from(3u32).pow(9000), &config)?;
//!
//!     let sum = engine.add(&a, &b)?;
//!     assert_eq!(sum.store_to()?, a.store_to()? + b.store_to()?);
//!
//!     if engine.compare(&a, &b)?.is_ge() {
//!         let diff = engine.sub(&a, &b)?;
//!         println!("difference has {} limbs", diff.limb_count()?);
//!     }
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod buffer; // internal (thread-local block buffers)
mod canon;
mod config;
mod disk;
mod engine;
mod error;
mod hash;
mod limb;
mod plan;
mod store;

//
// Public surface
//

pub use canon::canonicalize;
pub use config::{DiskIntConfig, MemoryBudget};
pub use disk::DiskInt;
pub use engine::Engine;
pub use error::{DiskIntError, Result};
pub use hash::Digest;
pub use limb::{LIMB_BYTES, Limb};
pub use plan::BlockPlan;

/// Backing store primitives used by the engine.
pub mod fs {
    pub use crate::store::{BACKING_FILE_EXTENSION, create_unique, delete, file_size, truncate_trailing};
}
