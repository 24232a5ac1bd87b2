//! Error types for diskint.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DiskIntError>;

/// Errors that can occur while storing or operating on disk integers.
#[derive(Error, Debug)]
pub enum DiskIntError {
    /// An I/O error occurred while opening, reading, writing or truncating a file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file of a handle does not exist.
    #[error("backing file not found: {}", .path.display())]
    NotFound {
        /// The missing file.
        path: PathBuf,
    },

    /// No unique backing file name could be allocated.
    #[error("could not allocate a unique backing file after {attempts} attempts")]
    AllocationError {
        /// Number of names tried.
        attempts: usize,
    },

    /// A block buffer could not be allocated.
    #[error("failed to allocate a block buffer of {bytes} bytes")]
    MemoryAllocationFailed {
        /// Requested buffer size.
        bytes: u64,
    },

    /// A carry or borrow left the range {0, 1}.
    #[error("arithmetic invariant broken: carry {carry} in block {block}")]
    ArithmeticInvariantBroken {
        /// The offending carry or borrow value.
        carry: u64,
        /// Zero-based block index where it was observed.
        block: u64,
    },

    /// Subtraction would produce a negative result.
    #[error("subtraction underflow: subtrahend is larger than minuend")]
    Underflow,

    /// Invalid configuration parameter.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },
}

impl DiskIntError {
    /// Maps an I/O error on `path` to [`DiskIntError::NotFound`] when the
    /// file is missing, and to [`DiskIntError::Io`] otherwise.
    pub(crate) fn from_io(err: std::io::Error, path: &std::path::Path) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            DiskIntError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            DiskIntError::Io(err)
        }
    }
}
