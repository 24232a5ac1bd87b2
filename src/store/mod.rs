//! Backing store primitives.
//!
//! Every file operation the arithmetic needs goes through this module:
//! size queries, tail truncation, exclusive creation and deletion. The
//! algorithms above it never touch platform specifics.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::distr::Alphanumeric;
use tracing::{debug, trace};

use crate::config::DiskIntConfig;
use crate::error::{DiskIntError, Result};

/// Extension given to backing files.
pub const BACKING_FILE_EXTENSION: &str = "tmp";

/// Returns the size of `path` in bytes.
pub fn file_size(path: &Path) -> Result<u64> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| DiskIntError::from_io(e, path))
}

/// Removes the last `n_bytes` bytes of `path`.
pub fn truncate_trailing(path: &Path, n_bytes: u64) -> Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|e| DiskIntError::from_io(e, path))?;
    let size = file.metadata()?.len();

    let new_size = size.checked_sub(n_bytes).ok_or_else(|| {
        DiskIntError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("cannot truncate {n_bytes} bytes from a {size} byte file"),
        ))
    })?;

    file.set_len(new_size)?;
    trace!(path = %path.display(), size, new_size, "truncated backing file");
    Ok(())
}

/// Atomically creates a new empty file with a random name in `dir`.
///
/// Name collisions are retried with fresh names up to
/// [`DiskIntConfig::max_name_retries`] times.
pub fn create_unique(dir: &Path, config: &DiskIntConfig) -> Result<(PathBuf, File)> {
    let name_len = config.name_len();
    create_unique_with(dir, config.max_name_retries(), || random_name(name_len))
}

/// Tries up to `attempts` names from `next_name` until one can be created.
fn create_unique_with(
    dir: &Path,
    attempts: usize,
    mut next_name: impl FnMut() -> String,
) -> Result<(PathBuf, File)> {
    for attempt in 0..attempts {
        let path = dir.join(next_name());
        match OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => {
                trace!(path = %path.display(), attempt, "created backing file");
                return Ok((path, file));
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), attempt, "backing file name collision");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(DiskIntError::AllocationError { attempts })
}

/// Deletes the backing file at `path`.
pub fn delete(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|e| DiskIntError::from_io(e, path))
}

/// Replaces `dst` with `src`. Both must be on the same filesystem.
pub(crate) fn replace(src: &Path, dst: &Path) -> Result<()> {
    fs::rename(src, dst)?;
    Ok(())
}

fn random_name(len: usize) -> String {
    let stem: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(len)
        .map(char::from)
        .collect();
    format!("{stem}.{BACKING_FILE_EXTENSION}")
}
