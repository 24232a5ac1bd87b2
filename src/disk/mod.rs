//! Disk integer handles.
//!
//! A [`DiskInt`] exclusively owns one backing file holding an unsigned
//! integer as little-endian `u64` limbs, least significant limb first, with
//! no header. The file is deleted when the handle is cleared or dropped.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use num_bigint::BigUint;
use tracing::{trace, warn};

use crate::config::DiskIntConfig;
use crate::error::{DiskIntError, Result};
use crate::limb::{Limb, decode_limbs, limbs_for_bytes};
use crate::store;

/// An unsigned integer stored in a file.
///
/// # Example
///
/// ```
/// use diskint::{DiskInt, DiskIntConfig};
/// use num_bigint::BigUint;
///
/// let config = DiskIntConfig::default();
/// let value = BigUint::from(3u32).pow(200);
///
/// let disk = DiskInt::load_from(&value, &config)?;
/// assert_eq!(disk.store_to()?, value);
/// disk.clear()?;
/// # Ok::<(), diskint::DiskIntError>(())
/// ```
#[derive(Debug)]
pub struct DiskInt {
    path: PathBuf,
    owned: bool,
}

impl DiskInt {
    /// Allocates a new backing file holding zero in the configured work dir.
    pub fn init(config: &DiskIntConfig) -> Result<Self> {
        config.validate()?;
        let (disk, _) = Self::create_in(config.work_dir(), config)?;
        Ok(disk)
    }

    /// Writes `value` into a new backing file.
    pub fn load_from(value: &BigUint, config: &DiskIntConfig) -> Result<Self> {
        Self::from_limbs(&value.to_u64_digits(), config)
    }

    /// Writes raw limbs, least significant first, into a new backing file.
    ///
    /// Trailing zero limbs are not stored.
    pub fn from_limbs(limbs: &[Limb], config: &DiskIntConfig) -> Result<Self> {
        config.validate()?;
        let len = limbs.iter().rposition(|&l| l != 0).map_or(0, |k| k + 1);

        let (disk, file) = Self::create_in(config.work_dir(), config)?;
        let mut writer = BufWriter::new(file);
        for limb in &limbs[..len] {
            writer.write_all(&limb.to_le_bytes())?;
        }
        writer.flush()?;

        trace!(path = %disk.path.display(), limbs = len, "loaded disk integer");
        Ok(disk)
    }

    /// Reads the backing file back into memory.
    ///
    /// A trailing partial limb is read as if zero-padded.
    pub fn store_to(&self) -> Result<BigUint> {
        let bytes = fs::read(&self.path).map_err(|e| DiskIntError::from_io(e, &self.path))?;
        Ok(BigUint::from_bytes_le(&bytes))
    }

    /// Reads the backing file back as raw limbs, least significant first.
    pub fn to_limbs(&self) -> Result<Vec<Limb>> {
        let bytes = fs::read(&self.path).map_err(|e| DiskIntError::from_io(e, &self.path))?;
        Ok(decode_limbs(&bytes))
    }

    /// Returns the number of limbs, rounding a partial limb up.
    pub fn limb_count(&self) -> Result<u64> {
        Ok(limbs_for_bytes(self.byte_len()?))
    }

    /// Returns the size of the backing file in bytes.
    pub fn byte_len(&self) -> Result<u64> {
        store::file_size(&self.path)
    }

    /// Returns `true` if the stored value is zero.
    pub fn is_zero(&self) -> Result<bool> {
        Ok(self.byte_len()? == 0)
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the backing file, consuming the handle.
    pub fn clear(self) -> Result<()> {
        let path = self.release();
        store::delete(&path)
    }

    /// Computes a BLAKE3 digest of the stored limbs, streaming the file.
    ///
    /// Equal canonical values have equal digests.
    #[cfg(feature = "hash-blake3")]
    pub fn fingerprint(&self) -> Result<crate::hash::Digest> {
        use std::io::Read;

        let mut file = File::open(&self.path).map_err(|e| DiskIntError::from_io(e, &self.path))?;
        let mut hasher = crate::hash::Blake3Hasher::new();
        let mut buf = crate::buffer::BlockBuffer::zeroed(FINGERPRINT_READ_BYTES)?;
        loop {
            let n = file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(hasher.finalize())
    }

    /// Creates a handle over a fresh empty file in `dir`.
    pub(crate) fn create_in(dir: &Path, config: &DiskIntConfig) -> Result<(Self, File)> {
        let (path, file) = store::create_unique(dir, config)?;
        Ok((Self { path, owned: true }, file))
    }

    /// Directory holding the backing file, for creating siblings on the same filesystem.
    pub(crate) fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Moves `other`'s backing file over this handle's file.
    ///
    /// On failure `other` is dropped, deleting its file, and `self` keeps its
    /// previous value.
    pub(crate) fn replace_with(&mut self, other: DiskInt) -> Result<()> {
        store::replace(&other.path, &self.path)?;
        other.release();
        Ok(())
    }

    /// Gives up ownership of the backing file without deleting it.
    fn release(mut self) -> PathBuf {
        self.owned = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for DiskInt {
    fn drop(&mut self) {
        if !self.owned {
            return;
        }
        if let Err(e) = store::delete(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to delete backing file");
        }
    }
}

/// Read size used when streaming a file through the fingerprint hasher.
#[cfg(feature = "hash-blake3")]
const FINGERPRINT_READ_BYTES: usize = 8 * 1024 * crate::limb::LIMB_BYTES;
