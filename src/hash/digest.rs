//! Digest type.

use std::fmt;

/// A 32-byte content hash of a disk integer's limbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Creates a digest from a byte array.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_display() {
        let mut bytes = [0u8; 32];
        bytes[..4].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        let digest = Digest::new(bytes);

        let hex = digest.to_hex();
        assert!(hex.starts_with("deadbeef"));
        assert_eq!(hex.len(), 64);
        assert!(hex[8..].chars().all(|c| c == '0'));
        assert_eq!(hex, digest.to_string());
    }
}
