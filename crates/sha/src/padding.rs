//! Padding shapes.
//!
//! Every pad is a `0x80` marker, zero fill, and the message length in bits
//! written big-endian into the trailing `V::COUNT_BYTES` of a block. The
//! shapes differ only in when the length becomes known: up front for whole
//! messages, fixed at one chunk for the second pass of a double hash, and at
//! finalize time for streamed blocks.

use crate::scalar::{self, Buffer};
use crate::variant::{Bytes, CHUNK_WORDS, MAX_ROUNDS, Variant};
use crate::word::read_words;

const MARKER: u8 = 0x80;

fn write_count<V: Variant>(out: &mut [u8], bits: u128) {
    let bytes = bits.to_be_bytes();
    let at = out.len() - V::COUNT_BYTES;
    out[at..].copy_from_slice(&bytes[bytes.len() - V::COUNT_BYTES..]);
}

fn bits_of(bytes: u128) -> u128 {
    bytes.wrapping_mul(8)
}

/// Pad block following `blocks` whole blocks of message.
pub fn pad_block<V: Variant>(blocks: u64) -> V::Block {
    let mut pad = V::Block::zeroed();
    let out = pad.as_mut();
    out[0] = MARKER;
    write_count::<V>(out, bits_of(u128::from(blocks) * V::BLOCK_BYTES as u128));
    pad
}

/// Second half of the block hashing a one-chunk message.
pub fn pad_half<V: Variant>() -> V::Half {
    let mut pad = V::Half::zeroed();
    let out = pad.as_mut();
    out[0] = MARKER;
    write_count::<V>(out, bits_of(V::CHUNK_BYTES as u128));
    pad
}

/// Expanded schedule of [`pad_block`], shared by every message of `blocks`
/// whole blocks.
pub fn pad_schedule<V: Variant>(blocks: u64) -> Buffer<V::Word> {
    let mut buffer = [V::Word::default(); MAX_ROUNDS];
    scalar::parse::<V>(&pad_block::<V>(blocks), &mut buffer);
    scalar::expand::<V, V::Word>(&mut buffer);
    buffer
}

/// [`pad_half`] as schedule words, ready for slots `8..16`.
pub fn pad_half_words<V: Variant>() -> [V::Word; CHUNK_WORDS] {
    let mut words = [V::Word::default(); CHUNK_WORDS];
    read_words(pad_half::<V>().as_ref(), &mut words);
    words
}

/// Splits a message into its whole-block prefix and the trailing partial
/// block, which may be empty.
pub fn split_message<V: Variant>(bytes: &[u8]) -> (&[u8], &[u8]) {
    bytes.split_at(bytes.len() - bytes.len() % V::BLOCK_BYTES)
}

/// Iterates the whole blocks of `bytes`; any partial tail is ignored.
pub fn blocks<V: Variant>(bytes: &[u8]) -> impl Iterator<Item = V::Block> + '_ {
    bytes.chunks_exact(V::BLOCK_BYTES).map(V::Block::from_slice)
}

/// Number of blocks a message of `len` bytes occupies once padded.
pub fn padded_blocks<V: Variant>(len: usize) -> usize {
    (len + 1 + V::COUNT_BYTES).div_ceil(V::BLOCK_BYTES)
}

/// The one or two final blocks of a message.
#[derive(Clone, Copy, Debug)]
pub struct Tail<V: Variant> {
    blocks: [V::Block; 2],
    len: usize,
}

impl<V: Variant> Tail<V> {
    /// Final blocks in message order.
    pub fn as_slice(&self) -> &[V::Block] {
        &self.blocks[..self.len]
    }
}

/// Pads the partial last block `rest` of a `total`-byte message.
///
/// When fewer than `COUNT_BYTES + 1` bytes remain after `rest`, the length
/// spills into an extra block of zeros.
///
/// # Panics
///
/// Panics when `rest` is not shorter than one block.
pub fn message_tail<V: Variant>(rest: &[u8], total: usize) -> Tail<V> {
    assert!(rest.len() < V::BLOCK_BYTES, "tail must be a partial block");

    let mut buf = [V::Block::zeroed(); 2];
    buf[0].as_mut()[..rest.len()].copy_from_slice(rest);
    buf[0].as_mut()[rest.len()] = MARKER;

    let len = if rest.len() + 1 + V::COUNT_BYTES > V::BLOCK_BYTES {
        2
    } else {
        1
    };
    write_count::<V>(buf[len - 1].as_mut(), bits_of(total as u128));

    Tail { blocks: buf, len }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::{Sha160, Sha256, Sha512};

    #[test]
    fn streaming_pad_encodes_bit_count() {
        let pad = pad_block::<Sha256>(3);
        assert_eq!(pad[0], 0x80);
        assert!(pad[1..56].iter().all(|&b| b == 0));
        assert_eq!(u64::from_be_bytes(pad[56..].try_into().unwrap()), 3 * 512);

        let pad = pad_block::<Sha512>(1);
        assert!(pad[1..112].iter().all(|&b| b == 0));
        assert_eq!(u128::from_be_bytes(pad[112..].try_into().unwrap()), 1024);
    }

    #[test]
    fn half_pad_counts_one_chunk() {
        let pad = pad_half::<Sha256>();
        assert_eq!(pad[0], 0x80);
        assert_eq!(u64::from_be_bytes(pad[24..].try_into().unwrap()), 256);

        let pad = pad_half::<Sha512>();
        assert_eq!(u128::from_be_bytes(pad[48..].try_into().unwrap()), 512);
    }

    #[test]
    fn tail_spills_when_count_does_not_fit() {
        assert_eq!(message_tail::<Sha256>(&[0u8; 55], 55).as_slice().len(), 1);
        assert_eq!(message_tail::<Sha256>(&[0u8; 56], 56).as_slice().len(), 2);
        assert_eq!(message_tail::<Sha160>(&[0u8; 56], 120).as_slice().len(), 2);
        assert_eq!(message_tail::<Sha512>(&[0u8; 111], 111).as_slice().len(), 1);
        assert_eq!(message_tail::<Sha512>(&[0u8; 112], 112).as_slice().len(), 2);
    }

    #[test]
    fn spilled_tail_is_zeros_then_length() {
        let tail = message_tail::<Sha256>(&[0xffu8; 60], 124);
        let blocks = tail.as_slice();
        assert_eq!(blocks[0][60], 0x80);
        assert!(blocks[0][61..].iter().all(|&b| b == 0));
        assert!(blocks[1][..56].iter().all(|&b| b == 0));
        assert_eq!(u64::from_be_bytes(blocks[1][56..].try_into().unwrap()), 124 * 8);
    }

    #[test]
    fn padded_block_counts() {
        assert_eq!(padded_blocks::<Sha256>(0), 1);
        assert_eq!(padded_blocks::<Sha256>(55), 1);
        assert_eq!(padded_blocks::<Sha256>(56), 2);
        assert_eq!(padded_blocks::<Sha256>(64), 2);
        assert_eq!(padded_blocks::<Sha512>(111), 1);
        assert_eq!(padded_blocks::<Sha512>(112), 2);
    }

    #[test]
    fn split_keeps_partial_tail() {
        let bytes = [7u8; 130];
        let (full, rest) = split_message::<Sha256>(&bytes);
        assert_eq!((full.len(), rest.len()), (128, 2));
        assert_eq!(blocks::<Sha256>(full).count(), 2);
    }

    #[test]
    #[should_panic(expected = "tail must be a partial block")]
    fn whole_block_tail_is_rejected() {
        let _ = message_tail::<Sha256>(&[0u8; 64], 64);
    }
}
