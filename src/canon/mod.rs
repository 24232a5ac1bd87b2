//! Canonicalization of limb files.
//!
//! A canonical limb file has a non-zero most significant limb; the value
//! zero is the empty file. [`canonicalize`] strips trailing all-zero limbs
//! from a file in bounded memory:
//!
//! - files of at most one seek chunk are read in one go and scanned backward
//! - larger files are scanned backward one seek chunk at a time, so at most
//!   one chunk is ever held in memory regardless of file size

mod reverse;

use std::fs::{File, OpenOptions};
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::buffer::BlockBuffer;
use crate::error::{DiskIntError, Result};
use crate::limb::{LIMB_BYTES, last_nonzero_limb, limbs_for_bytes};
use crate::store;

pub(crate) use reverse::ReverseChunks;

/// Truncates the trailing zero limbs of the file at `path`.
///
/// Returns the number of bytes removed.
pub fn canonicalize(path: &Path, seek_chunk_limbs: usize) -> Result<u64> {
    let size = pad_partial_limb(path)?;
    let chunk_bytes = seek_chunk_limbs.max(1).saturating_mul(LIMB_BYTES) as u64;

    let zero_bytes = if size <= chunk_bytes {
        trailing_zero_bytes_small(path, size)?
    } else {
        trailing_zero_bytes_large(path, seek_chunk_limbs)?
    };

    if zero_bytes > 0 {
        store::truncate_trailing(path, zero_bytes)?;
    }
    debug!(
        path = %path.display(),
        size,
        zero_bytes,
        large = size > chunk_bytes,
        "canonicalized"
    );
    Ok(zero_bytes)
}

/// Zero-extends a trailing partial limb to a whole one, returning the new size.
fn pad_partial_limb(path: &Path) -> Result<u64> {
    let size = store::file_size(path)?;
    let aligned = limbs_for_bytes(size) * LIMB_BYTES as u64;
    if aligned != size {
        debug!(path = %path.display(), size, aligned, "padding partial limb");
        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|e| DiskIntError::from_io(e, path))?;
        file.set_len(aligned)?;
    }
    Ok(aligned)
}

fn trailing_zero_bytes_small(path: &Path, size: u64) -> Result<u64> {
    let len = usize::try_from(size)
        .map_err(|_| DiskIntError::MemoryAllocationFailed { bytes: size })?;
    let mut buf = BlockBuffer::zeroed(len)?;
    File::open(path)
        .map_err(|e| DiskIntError::from_io(e, path))?
        .read_exact(&mut buf)?;

    Ok(match last_nonzero_limb(&buf) {
        Some(k) => size - (k as u64 + 1) * LIMB_BYTES as u64,
        None => size,
    })
}

fn trailing_zero_bytes_large(path: &Path, seek_chunk_limbs: usize) -> Result<u64> {
    let mut chunks = ReverseChunks::open(path, seek_chunk_limbs)?;
    let mut zero_bytes = 0u64;

    while let Some(chunk) = chunks.next_chunk()? {
        match last_nonzero_limb(chunk) {
            Some(j) => {
                let chunk_limbs = chunk.len() / LIMB_BYTES;
                zero_bytes += ((chunk_limbs - j - 1) * LIMB_BYTES) as u64;
                return Ok(zero_bytes);
            }
            None => zero_bytes += chunk.len() as u64,
        }
    }

    Ok(zero_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limb::{Limb, decode_limbs, encode_limbs};

    fn write_limbs(path: &Path, limbs: &[Limb]) {
        std::fs::write(path, encode_limbs(limbs)).unwrap();
    }

    fn read_limbs(path: &Path) -> Vec<Limb> {
        decode_limbs(&std::fs::read(path).unwrap())
    }

    #[test]
    fn test_small_path_strips_zeros() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.tmp");
        write_limbs(&path, &[5, 0, 9, 0, 0]);

        let removed = canonicalize(&path, 1024).unwrap();
        assert_eq!(removed, 2 * LIMB_BYTES as u64);
        assert_eq!(read_limbs(&path), vec![5, 0, 9]);
    }

    #[test]
    fn test_small_path_all_zero_becomes_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zero.tmp");
        write_limbs(&path, &[0, 0, 0]);

        canonicalize(&path, 1024).unwrap();
        assert_eq!(store::file_size(&path).unwrap(), 0);
    }

    #[test]
    fn test_already_canonical_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("canon.tmp");
        write_limbs(&path, &[0, 1]);

        assert_eq!(canonicalize(&path, 1).unwrap(), 0);
        assert_eq!(canonicalize(&path, 1024).unwrap(), 0);
        assert_eq!(read_limbs(&path), vec![0, 1]);
    }

    #[test]
    fn test_large_path_spans_several_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("large.tmp");
        let mut limbs: Vec<Limb> = (1..=10).collect();
        limbs.extend(std::iter::repeat_n(0, 11));
        write_limbs(&path, &limbs);

        // 21 limbs in chunks of 4: the first non-zero limb sits 3 chunks back
        let removed = canonicalize(&path, 4).unwrap();
        assert_eq!(removed, 11 * LIMB_BYTES as u64);
        assert_eq!(read_limbs(&path), (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_large_path_all_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("large_zero.tmp");
        write_limbs(&path, &[0; 9]);

        canonicalize(&path, 2).unwrap();
        assert_eq!(store::file_size(&path).unwrap(), 0);
    }

    #[test]
    fn test_large_path_nonzero_in_short_first_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short_head.tmp");
        write_limbs(&path, &[3, 0, 0, 0, 0, 0, 0]);

        canonicalize(&path, 3).unwrap();
        assert_eq!(read_limbs(&path), vec![3]);
    }

    #[test]
    fn test_partial_limb_is_padded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.tmp");
        std::fs::write(&path, [1u8, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0]).unwrap();

        canonicalize(&path, 1024).unwrap();
        assert_eq!(read_limbs(&path), vec![1, 2]);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = canonicalize(&dir.path().join("gone.tmp"), 16).unwrap_err();
        assert!(matches!(err, DiskIntError::NotFound { .. }));
    }
}
