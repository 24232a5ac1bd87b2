//! Backward chunked reader over a limb file.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::buffer::BlockBuffer;
use crate::error::{DiskIntError, Result};
use crate::limb::LIMB_BYTES;

/// Reads a limb file from its end towards its start, one chunk at a time.
///
/// Only one chunk is held in memory. Chunks are aligned to the end of the
/// file, so the last chunk returned (the one at offset 0) may be shorter.
pub(crate) struct ReverseChunks {
    file: File,
    end: u64,
    chunk_bytes: u64,
    buffer: BlockBuffer,
}

impl ReverseChunks {
    /// Opens `path` for backward reading in chunks of `chunk_limbs` limbs.
    ///
    /// The file must be limb-aligned.
    pub(crate) fn open(path: &Path, chunk_limbs: usize) -> Result<Self> {
        let file = File::open(path).map_err(|e| DiskIntError::from_io(e, path))?;
        let end = file.metadata()?.len();
        debug_assert_eq!(end % LIMB_BYTES as u64, 0);

        let chunk_len = chunk_limbs.max(1).saturating_mul(LIMB_BYTES);
        let buf_len = usize::try_from(end).map_or(chunk_len, |end| end.min(chunk_len));

        Ok(Self {
            file,
            end,
            chunk_bytes: chunk_len as u64,
            buffer: BlockBuffer::with_capacity(buf_len)?,
        })
    }

    /// Reads the next chunk towards the start of the file.
    ///
    /// Returns `None` once the start of the file has been passed.
    pub(crate) fn next_chunk(&mut self) -> Result<Option<&[u8]>> {
        if self.end == 0 {
            return Ok(None);
        }

        let start = self.end.saturating_sub(self.chunk_bytes);
        // Bounded by chunk_bytes, which came from a usize.
        let len = (self.end - start) as usize;

        self.buffer.resize(len, 0);
        self.file.seek(SeekFrom::Start(start))?;
        self.file.read_exact(&mut self.buffer[..len])?;
        self.end = start;

        Ok(Some(&self.buffer[..len]))
    }
}
