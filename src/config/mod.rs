//! Configuration for disk integers and the arithmetic engine.
//!
//! - [`DiskIntConfig`] - Backing file location, memory budget and scan sizes
//! - [`MemoryBudget`] - Where the per-operation memory budget comes from

mod memory;

use std::path::{Path, PathBuf};

use crate::error::{DiskIntError, Result};

pub(crate) use memory::available_memory;

/// Default number of limbs read per backward seek while canonicalizing.
pub const DEFAULT_SEEK_CHUNK_LIMBS: usize = 1024;

/// Default number of random names tried before giving up on allocation.
pub const DEFAULT_MAX_NAME_RETRIES: usize = 8;

/// Default length of generated backing file names (without extension).
pub const DEFAULT_NAME_LEN: usize = 20;

/// Budget assumed when the platform cannot report available memory (64 MiB).
pub const FALLBACK_MEMORY_BUDGET: u64 = 64 * 1024 * 1024;

/// Source of the memory budget for one arithmetic operation.
///
/// The budget is advisory. The block planner never fails because of it and
/// always makes forward progress with at least one limb per buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryBudget {
    /// A fixed number of bytes.
    Fixed(u64),

    /// A fraction of what the platform reports as available, queried on
    /// every operation. `1 / divisor` of the available memory is used.
    Available {
        /// Divisor applied to the reported available memory.
        divisor: u64,
    },
}

impl MemoryBudget {
    /// Resolves the budget to a byte count.
    pub fn resolve(&self) -> u64 {
        match *self {
            MemoryBudget::Fixed(bytes) => bytes,
            MemoryBudget::Available { divisor } => {
                let available = available_memory().unwrap_or(FALLBACK_MEMORY_BUDGET);
                available / divisor.max(1)
            }
        }
    }
}

impl Default for MemoryBudget {
    fn default() -> Self {
        MemoryBudget::Available { divisor: 2 }
    }
}

/// Configuration shared by disk integer handles and the [`Engine`](crate::Engine).
///
/// # Example
///
/// ```
/// use diskint::{DiskIntConfig, MemoryBudget};
///
/// let config = DiskIntConfig::default()
///     .with_memory_budget(MemoryBudget::Fixed(1 << 20))
///     .with_seek_chunk_limbs(4096);
///
/// assert_eq!(config.seek_chunk_limbs(), 4096);
/// # Ok::<(), diskint::DiskIntError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskIntConfig {
    work_dir: PathBuf,
    memory_budget: MemoryBudget,
    seek_chunk_limbs: usize,
    max_name_retries: usize,
    name_len: usize,
}

impl DiskIntConfig {
    /// Creates a configuration storing backing files in `work_dir`.
    ///
    /// Returns error if `work_dir` is empty.
    pub fn new(work_dir: impl Into<PathBuf>) -> Result<Self> {
        let config = Self {
            work_dir: work_dir.into(),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the directory new backing files are created in.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Sets the memory budget source.
    pub fn with_memory_budget(mut self, budget: MemoryBudget) -> Self {
        self.memory_budget = budget;
        self
    }

    /// Sets the number of limbs per backward seek during canonicalization.
    ///
    /// Files at most this many limbs long are canonicalized in one read.
    pub fn with_seek_chunk_limbs(mut self, limbs: usize) -> Self {
        self.seek_chunk_limbs = limbs;
        self
    }

    /// Sets how many random names are tried before allocation fails.
    pub fn with_max_name_retries(mut self, retries: usize) -> Self {
        self.max_name_retries = retries;
        self
    }

    /// Sets the length of generated file names.
    pub fn with_name_len(mut self, len: usize) -> Self {
        self.name_len = len;
        self
    }

    /// Returns the backing file directory.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Returns the memory budget source.
    pub fn memory_budget(&self) -> MemoryBudget {
        self.memory_budget
    }

    /// Returns the canonicalization seek chunk in limbs.
    pub fn seek_chunk_limbs(&self) -> usize {
        self.seek_chunk_limbs
    }

    /// Returns the name allocation retry bound.
    pub fn max_name_retries(&self) -> usize {
        self.max_name_retries
    }

    /// Returns the generated name length.
    pub fn name_len(&self) -> usize {
        self.name_len
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<()> {
        if self.work_dir.as_os_str().is_empty() {
            return Err(DiskIntError::InvalidConfig {
                message: "work_dir must not be empty",
            });
        }

        if self.seek_chunk_limbs == 0 {
            return Err(DiskIntError::InvalidConfig {
                message: "seek_chunk_limbs must be non-zero",
            });
        }

        if self.max_name_retries == 0 {
            return Err(DiskIntError::InvalidConfig {
                message: "max_name_retries must be non-zero",
            });
        }

        if self.name_len < 8 {
            return Err(DiskIntError::InvalidConfig {
                message: "name_len must be at least 8",
            });
        }

        if let MemoryBudget::Available { divisor: 0 } = self.memory_budget {
            return Err(DiskIntError::InvalidConfig {
                message: "memory budget divisor must be non-zero",
            });
        }

        Ok(())
    }
}

impl Default for DiskIntConfig {
    fn default() -> Self {
        Self {
            work_dir: std::env::temp_dir(),
            memory_budget: MemoryBudget::default(),
            seek_chunk_limbs: DEFAULT_SEEK_CHUNK_LIMBS,
            max_name_retries: DEFAULT_MAX_NAME_RETRIES,
            name_len: DEFAULT_NAME_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DiskIntConfig::default();
        assert_eq!(config.seek_chunk_limbs(), DEFAULT_SEEK_CHUNK_LIMBS);
        assert_eq!(config.max_name_retries(), DEFAULT_MAX_NAME_RETRIES);
        assert_eq!(config.name_len(), DEFAULT_NAME_LEN);
        assert_eq!(config.work_dir(), std::env::temp_dir());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = DiskIntConfig::default()
            .with_work_dir("/var/tmp")
            .with_memory_budget(MemoryBudget::Fixed(96))
            .with_seek_chunk_limbs(16)
            .with_max_name_retries(3)
            .with_name_len(12);

        assert_eq!(config.work_dir(), Path::new("/var/tmp"));
        assert_eq!(config.memory_budget(), MemoryBudget::Fixed(96));
        assert_eq!(config.seek_chunk_limbs(), 16);
        assert_eq!(config.max_name_retries(), 3);
        assert_eq!(config.name_len(), 12);
    }

    #[test]
    fn test_invalid_config() {
        assert!(DiskIntConfig::new("").is_err());
        assert!(DiskIntConfig::default().with_seek_chunk_limbs(0).validate().is_err());
        assert!(DiskIntConfig::default().with_max_name_retries(0).validate().is_err());
        assert!(DiskIntConfig::default().with_name_len(4).validate().is_err());
        assert!(
            DiskIntConfig::default()
                .with_memory_budget(MemoryBudget::Available { divisor: 0 })
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_fixed_budget_resolves_verbatim() {
        assert_eq!(MemoryBudget::Fixed(12345).resolve(), 12345);
    }

    #[test]
    fn test_available_budget_is_positive() {
        assert!(MemoryBudget::default().resolve() > 0);
    }
}
