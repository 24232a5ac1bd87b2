//! Content fingerprints of disk integers.
//!
//! - [`Digest`] - 32-byte content hash of a limb file
//! - [`Blake3Hasher`] - streaming BLAKE3 hasher (requires `hash-blake3` feature)

mod digest;

#[cfg(feature = "hash-blake3")]
mod blake3;

pub use digest::Digest;

#[cfg(feature = "hash-blake3")]
pub(crate) use blake3::Blake3Hasher;
