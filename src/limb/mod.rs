//! Limb type and elementwise block primitives.
//!
//! Blocks are handled as raw little-endian byte slices, exactly as they sit
//! in a backing file. Every slice passed here must be limb-aligned.

use std::cmp::Ordering;

use bytes::{Buf, BufMut};

/// A fixed-width unsigned machine word, the unit of storage and arithmetic.
pub type Limb = u64;

/// Size of one limb in bytes.
pub const LIMB_BYTES: usize = std::mem::size_of::<Limb>();

/// Number of whole limbs needed to hold `bytes` bytes.
pub(crate) fn limbs_for_bytes(bytes: u64) -> u64 {
    bytes.div_ceil(LIMB_BYTES as u64)
}

/// Adds two equally sized blocks limb by limb, appending the sum to `dst`.
///
/// Returns the carry out of the most significant limb.
pub(crate) fn add_block<B: BufMut>(dst: &mut B, mut a: &[u8], mut b: &[u8]) -> Limb {
    debug_assert_eq!(a.len(), b.len());
    debug_assert_eq!(a.len() % LIMB_BYTES, 0);

    let mut carry: Limb = 0;
    while a.has_remaining() {
        let (sum, o1) = a.get_u64_le().overflowing_add(b.get_u64_le());
        let (sum, o2) = sum.overflowing_add(carry);
        dst.put_u64_le(sum);
        carry = Limb::from(o1 | o2);
    }
    carry
}

/// Subtracts block `b` from block `a` limb by limb, appending the difference
/// to `dst`.
///
/// Returns the borrow out of the most significant limb.
pub(crate) fn sub_block<B: BufMut>(dst: &mut B, mut a: &[u8], mut b: &[u8]) -> Limb {
    debug_assert_eq!(a.len(), b.len());
    debug_assert_eq!(a.len() % LIMB_BYTES, 0);

    let mut borrow: Limb = 0;
    while a.has_remaining() {
        let (diff, o1) = a.get_u64_le().overflowing_sub(b.get_u64_le());
        let (diff, o2) = diff.overflowing_sub(borrow);
        dst.put_u64_le(diff);
        borrow = Limb::from(o1 | o2);
    }
    borrow
}

/// Adds an incoming carry into `block` in place.
///
/// Returns the carry out of the block.
pub(crate) fn add_carry_in(block: &mut [u8], carry: Limb) -> Limb {
    let mut carry = carry;
    for limb in block.chunks_exact_mut(LIMB_BYTES) {
        if carry == 0 {
            break;
        }
        let mut src: &[u8] = limb;
        let (sum, overflow) = src.get_u64_le().overflowing_add(carry);
        limb.copy_from_slice(&sum.to_le_bytes());
        carry = Limb::from(overflow);
    }
    carry
}

/// Subtracts an incoming borrow from `block` in place.
///
/// Returns the borrow out of the block.
pub(crate) fn sub_borrow_in(block: &mut [u8], borrow: Limb) -> Limb {
    let mut borrow = borrow;
    for limb in block.chunks_exact_mut(LIMB_BYTES) {
        if borrow == 0 {
            break;
        }
        let mut src: &[u8] = limb;
        let (diff, overflow) = src.get_u64_le().overflowing_sub(borrow);
        limb.copy_from_slice(&diff.to_le_bytes());
        borrow = Limb::from(overflow);
    }
    borrow
}

/// Index of the most significant non-zero limb in `block`, if any.
pub(crate) fn last_nonzero_limb(block: &[u8]) -> Option<usize> {
    block
        .chunks_exact(LIMB_BYTES)
        .rposition(|limb| limb.iter().any(|&b| b != 0))
}

/// Compares two equally sized blocks as numbers, most significant limb first.
pub(crate) fn cmp_blocks(a: &[u8], b: &[u8]) -> Ordering {
    debug_assert_eq!(a.len(), b.len());
    a.chunks_exact(LIMB_BYTES)
        .rev()
        .zip(b.chunks_exact(LIMB_BYTES).rev())
        .map(|(mut x, mut y)| x.get_u64_le().cmp(&y.get_u64_le()))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Encodes limbs as little-endian bytes.
#[cfg(test)]
pub(crate) fn encode_limbs(limbs: &[Limb]) -> bytes::BytesMut {
    let mut out = bytes::BytesMut::with_capacity(limbs.len() * LIMB_BYTES);
    for &limb in limbs {
        out.put_u64_le(limb);
    }
    out
}

/// Decodes little-endian bytes into limbs, zero-padding a trailing partial limb.
pub(crate) fn decode_limbs(mut bytes: &[u8]) -> Vec<Limb> {
    let mut limbs = Vec::with_capacity(bytes.len().div_ceil(LIMB_BYTES));
    while bytes.remaining() >= LIMB_BYTES {
        limbs.push(bytes.get_u64_le());
    }
    if bytes.has_remaining() {
        let mut tail = [0u8; LIMB_BYTES];
        tail[..bytes.len()].copy_from_slice(bytes);
        limbs.push(Limb::from_le_bytes(tail));
    }
    limbs
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    fn block(limbs: &[Limb]) -> Vec<u8> {
        encode_limbs(limbs).to_vec()
    }

    #[test]
    fn test_add_block_no_carry() {
        let mut dst = BytesMut::new();
        let carry = add_block(&mut dst, &block(&[1, 2]), &block(&[3, 4]));
        assert_eq!(carry, 0);
        assert_eq!(decode_limbs(&dst), vec![4, 6]);
    }

    #[test]
    fn test_add_block_carry_chain() {
        let mut dst = BytesMut::new();
        let carry = add_block(&mut dst, &block(&[Limb::MAX, Limb::MAX]), &block(&[1, 0]));
        assert_eq!(carry, 1);
        assert_eq!(decode_limbs(&dst), vec![0, 0]);
    }

    #[test]
    fn test_sub_block_borrow() {
        let mut dst = BytesMut::new();
        let borrow = sub_block(&mut dst, &block(&[0, 5]), &block(&[1, 0]));
        assert_eq!(borrow, 0);
        assert_eq!(decode_limbs(&dst), vec![Limb::MAX, 4]);

        let mut dst = BytesMut::new();
        let borrow = sub_block(&mut dst, &block(&[0]), &block(&[1]));
        assert_eq!(borrow, 1);
        assert_eq!(decode_limbs(&dst), vec![Limb::MAX]);
    }

    #[test]
    fn test_add_carry_in() {
        let mut b = block(&[Limb::MAX, 7]);
        assert_eq!(add_carry_in(&mut b, 1), 0);
        assert_eq!(decode_limbs(&b), vec![0, 8]);

        let mut b = block(&[Limb::MAX, Limb::MAX]);
        assert_eq!(add_carry_in(&mut b, 1), 1);
        assert_eq!(decode_limbs(&b), vec![0, 0]);

        let mut b = block(&[3]);
        assert_eq!(add_carry_in(&mut b, 0), 0);
        assert_eq!(decode_limbs(&b), vec![3]);
    }

    #[test]
    fn test_sub_borrow_in() {
        let mut b = block(&[0, 1]);
        assert_eq!(sub_borrow_in(&mut b, 1), 0);
        assert_eq!(decode_limbs(&b), vec![Limb::MAX, 0]);

        let mut b = block(&[0, 0]);
        assert_eq!(sub_borrow_in(&mut b, 1), 1);
    }

    #[test]
    fn test_last_nonzero_limb() {
        assert_eq!(last_nonzero_limb(&block(&[1, 0, 0])), Some(0));
        assert_eq!(last_nonzero_limb(&block(&[0, 0, 1 << 63])), Some(2));
        assert_eq!(last_nonzero_limb(&block(&[0, 0])), None);
        assert_eq!(last_nonzero_limb(&[]), None);
    }

    #[test]
    fn test_cmp_blocks() {
        assert_eq!(cmp_blocks(&block(&[9, 1]), &block(&[0, 2])), Ordering::Less);
        assert_eq!(cmp_blocks(&block(&[9, 2]), &block(&[0, 2])), Ordering::Greater);
        assert_eq!(cmp_blocks(&block(&[4, 2]), &block(&[4, 2])), Ordering::Equal);
        assert_eq!(cmp_blocks(&[], &[]), Ordering::Equal);
    }

    #[test]
    fn test_decode_partial_limb() {
        assert_eq!(decode_limbs(&[1, 2, 3]), vec![0x03_02_01]);
        assert_eq!(decode_limbs(&[]), Vec::<Limb>::new());
    }

    #[test]
    fn test_limb_alignment_helpers() {
        assert_eq!(limbs_for_bytes(0), 0);
        assert_eq!(limbs_for_bytes(1), 1);
        assert_eq!(limbs_for_bytes(16), 2);
    }
}
