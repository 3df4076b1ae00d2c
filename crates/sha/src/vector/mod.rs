//! Lane-parallel engine.
//!
//! Blocks are transposed into [`Lanes`] so that schedule slot `i` holds word
//! `i` of every block, then the generic schedule and round code from
//! [`crate::scalar`] runs once over all lanes. Lane `j` of every output is
//! exactly what the scalar engine produces for block `j` alone.
//!
//! The kernels below are generic over the lane count; `Vectorizer` picks
//! the count at runtime and, on x86_64, runs the kernels inside AVX2
//! trampolines so the lane loops compile to 256-bit instructions.

mod lanes;
#[cfg(target_arch = "x86_64")]
mod x86;

pub use lanes::Lanes;

use crate::caps::Capabilities;
use crate::padding::{self, Tail};
use crate::scalar::{self, Buffer};
use crate::variant::{BLOCK_WORDS, Bytes, CHUNK_WORDS, MAX_ROUNDS, STATE_WORDS, State, Variant};
use crate::word::{Lane, Word, read_words};

/// Lane counts the engine accepts.
pub const SUPPORTED_LANES: [usize; 4] = [2, 4, 8, 16];

/// Widest register the lane kernels are compiled for (the AVX2 trampolines).
/// Wider registers still count as vector support but do not widen the default
/// lane count.
const WIDEST_KERNEL_BITS: u32 = 256;

/// Lane count filling a register of `bits`, capped at [`WIDEST_KERNEL_BITS`].
fn default_lanes<V: Variant>(bits: u32) -> usize {
    (bits.min(WIDEST_KERNEL_BITS) / <V::Word as Word>::BITS) as usize
}

type Wide<V, const L: usize> = Lanes<<V as Variant>::Word, L>;

#[inline(always)]
fn splat<V: Variant, const L: usize>(word: V::Word) -> Wide<V, L> {
    <Wide<V, L> as Lane<V::Word>>::splat(word)
}

#[inline(always)]
fn initial<V: Variant, const L: usize>() -> [Wide<V, L>; STATE_WORDS] {
    V::H.map(splat::<V, L>)
}

#[inline(always)]
fn digests<V: Variant, const L: usize>(state: &[Wide<V, L>; STATE_WORDS]) -> [V::Digest; L] {
    core::array::from_fn(|lane| {
        let words: State<V> = state.map(|w| w.get(lane));
        scalar::normalize::<V>(&words)
    })
}

/// Parses and expands `L` blocks at once.
#[inline(always)]
pub fn schedule<V: Variant, const L: usize>(blocks: &[V::Block; L]) -> Buffer<Wide<V, L>> {
    let _ = Wide::<V, L>::WIDTH;

    let mut words = [[V::Word::default(); BLOCK_WORDS]; L];
    for (lane, block) in words.iter_mut().zip(blocks) {
        read_words(block.as_ref(), lane);
    }

    let mut buffer = [splat::<V, L>(V::Word::default()); MAX_ROUNDS];
    for (i, slot) in buffer[..BLOCK_WORDS].iter_mut().enumerate() {
        *slot = Lanes::from_fn(|lane| words[lane][i]);
    }
    scalar::expand::<V, Wide<V, L>>(&mut buffer);
    buffer
}

/// Single-block hash of each of `L` blocks.
#[inline(always)]
pub fn hash_each<V: Variant, const L: usize>(blocks: &[V::Block; L]) -> [V::Digest; L] {
    let mut state = initial::<V, L>();
    scalar::compress::<V, Wide<V, L>>(&mut state, &schedule::<V, L>(blocks));

    let pad = padding::pad_schedule::<V>(1).map(splat::<V, L>);
    scalar::compress::<V, Wide<V, L>>(&mut state, &pad);
    digests::<V, L>(&state)
}

/// Double hash of each of `L` blocks.
#[inline(always)]
pub fn double_hash_each<V: Variant, const L: usize>(blocks: &[V::Block; L]) -> [V::Digest; L] {
    const { assert!(V::DOUBLE, "double hashing needs a digest of one chunk") };

    let mut first = initial::<V, L>();
    scalar::compress::<V, Wide<V, L>>(&mut first, &schedule::<V, L>(blocks));
    let pad = padding::pad_schedule::<V>(1).map(splat::<V, L>);
    scalar::compress::<V, Wide<V, L>>(&mut first, &pad);

    let mut buffer = [splat::<V, L>(V::Word::default()); MAX_ROUNDS];
    buffer[..CHUNK_WORDS].copy_from_slice(&first[..CHUNK_WORDS]);
    for (slot, word) in buffer[CHUNK_WORDS..BLOCK_WORDS]
        .iter_mut()
        .zip(padding::pad_half_words::<V>())
    {
        *slot = splat::<V, L>(word);
    }
    scalar::expand::<V, Wide<V, L>>(&mut buffer);

    let mut second = initial::<V, L>();
    scalar::compress::<V, Wide<V, L>>(&mut second, &buffer);
    digests::<V, L>(&second)
}

/// Compresses `L` consecutive blocks into one state, scheduling them
/// together.
#[inline(always)]
pub fn compress_sequential<V: Variant, const L: usize>(state: &mut State<V>, blocks: &[V::Block; L]) {
    let buffer = schedule::<V, L>(blocks);
    for lane in 0..L {
        let column = buffer.map(|w| w.get(lane));
        scalar::compress::<V, V::Word>(state, &column);
    }
}

fn block_at<V: Variant>(message: &[u8], tail: &Tail<V>, index: usize) -> V::Block {
    let full = message.len() / V::BLOCK_BYTES;
    if index < full {
        V::Block::from_slice(&message[index * V::BLOCK_BYTES..(index + 1) * V::BLOCK_BYTES])
    } else {
        tail.as_slice()[index - full]
    }
}

/// Hashes `L` messages that pad to the same number of blocks.
///
/// # Panics
///
/// Panics when the padded block counts differ.
#[inline(always)]
pub fn digest_lanes<V: Variant, const L: usize>(messages: &[&[u8]; L]) -> [V::Digest; L] {
    let count = padding::padded_blocks::<V>(messages[0].len());
    assert!(
        messages
            .iter()
            .all(|m| padding::padded_blocks::<V>(m.len()) == count),
        "messages in one lane batch must pad to the same block count"
    );

    let tails: [Tail<V>; L] = core::array::from_fn(|lane| {
        let message = messages[lane];
        let (_, rest) = padding::split_message::<V>(message);
        padding::message_tail::<V>(rest, message.len())
    });

    let mut state = initial::<V, L>();
    for index in 0..count {
        let blocks: [V::Block; L] =
            core::array::from_fn(|lane| block_at::<V>(messages[lane], &tails[lane], index));
        scalar::compress::<V, Wide<V, L>>(&mut state, &schedule::<V, L>(&blocks));
    }
    digests::<V, L>(&state)
}

#[inline(always)]
fn hash_groups<V: Variant, const L: usize>(groups: &[[V::Block; L]], out: &mut Vec<V::Digest>) {
    for group in groups {
        out.extend(hash_each::<V, L>(group));
    }
}

#[inline(always)]
fn double_hash_groups<V: Variant, const L: usize>(groups: &[[V::Block; L]], out: &mut Vec<V::Digest>) {
    for group in groups {
        out.extend(double_hash_each::<V, L>(group));
    }
}

#[inline(always)]
fn compress_groups<V: Variant, const L: usize>(state: &mut State<V>, groups: &[[V::Block; L]]) {
    for group in groups {
        compress_sequential::<V, L>(state, group);
    }
}

#[inline(always)]
fn digest_groups<V: Variant, const L: usize>(groups: &[[&[u8]; L]], out: &mut Vec<V::Digest>) {
    for group in groups {
        out.extend(digest_lanes::<V, L>(group));
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Isa {
    Portable,
    #[cfg(target_arch = "x86_64")]
    Avx2,
}

/// Monomorphizes `$body` for the runtime lane count `$lanes`.
macro_rules! with_lanes {
    ($lanes:expr, |$l:ident| $body:expr) => {
        match $lanes {
            2 => {
                const $l: usize = 2;
                $body
            }
            4 => {
                const $l: usize = 4;
                $body
            }
            8 => {
                const $l: usize = 8;
                $body
            }
            16 => {
                const $l: usize = 16;
                $body
            }
            other => unreachable!("lane count {other} passed validation"),
        }
    };
}

/// Runs a group kernel portably or in its AVX2 trampoline.
macro_rules! run {
    ($isa:expr, $kernel:ident::<$($g:tt),+>($($arg:expr),*)) => {
        match $isa {
            Isa::Portable => $kernel::<$($g),+>($($arg),*),
            #[cfg(target_arch = "x86_64")]
            Isa::Avx2 => x86::$kernel::<$($g),+>($($arg),*),
        }
    };
}

/// Runtime front end for the lane-parallel kernels.
///
/// Each method consumes as many whole groups of [`lanes`](Self::lanes)
/// inputs as it can and reports how many inputs it consumed; the caller
/// finishes the remainder.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Vectorizer {
    lanes: usize,
    isa: Isa,
}

impl Vectorizer {
    /// Vectorizer filling the widest compiled register width in `caps`, or
    /// `lanes` when given.
    ///
    /// Returns `None` when `caps` has no vector support.
    pub(crate) fn new<V: Variant>(caps: &Capabilities, lanes: Option<usize>) -> Option<Self> {
        let bits = caps.vector_bits();
        if bits == 0 {
            return None;
        }

        let lanes = lanes.unwrap_or_else(|| default_lanes::<V>(bits));
        if !SUPPORTED_LANES.contains(&lanes) {
            return None;
        }

        #[cfg(target_arch = "x86_64")]
        let isa = if caps.has_avx2() { Isa::Avx2 } else { Isa::Portable };
        #[cfg(not(target_arch = "x86_64"))]
        let isa = Isa::Portable;

        Some(Self { lanes, isa })
    }

    pub(crate) const fn lanes(self) -> usize {
        self.lanes
    }

    pub(crate) fn hash_each<V: Variant>(self, blocks: &[V::Block], out: &mut Vec<V::Digest>) -> usize {
        with_lanes!(self.lanes, |L| {
            let (groups, _) = blocks.as_chunks::<L>();
            run!(self.isa, hash_groups::<V, L>(groups, out));
            groups.len() * L
        })
    }

    pub(crate) fn double_hash_each<V: Variant>(
        self,
        blocks: &[V::Block],
        out: &mut Vec<V::Digest>,
    ) -> usize {
        with_lanes!(self.lanes, |L| {
            let (groups, _) = blocks.as_chunks::<L>();
            run!(self.isa, double_hash_groups::<V, L>(groups, out));
            groups.len() * L
        })
    }

    pub(crate) fn compress_sequential<V: Variant>(self, state: &mut State<V>, blocks: &[V::Block]) -> usize {
        with_lanes!(self.lanes, |L| {
            let (groups, _) = blocks.as_chunks::<L>();
            run!(self.isa, compress_groups::<V, L>(state, groups));
            groups.len() * L
        })
    }

    pub(crate) fn digest_lanes<V: Variant>(self, messages: &[&[u8]], out: &mut Vec<V::Digest>) -> usize {
        with_lanes!(self.lanes, |L| {
            let (groups, _) = messages.as_chunks::<L>();
            run!(self.isa, digest_groups::<V, L>(groups, out));
            groups.len() * L
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::{Sha160, Sha256, Sha512};

    fn blocks<V: Variant, const L: usize>(seed: u8) -> [V::Block; L] {
        core::array::from_fn(|lane| {
            let mut block = V::Block::zeroed();
            for (i, byte) in block.as_mut().iter_mut().enumerate() {
                *byte = seed.wrapping_add((lane * 31 + i) as u8);
            }
            block
        })
    }

    fn scalar_hash<V: Variant>(block: &V::Block) -> V::Digest {
        let mut state = V::H;
        scalar::compress_block::<V>(&mut state, block);
        scalar::compress_block::<V>(&mut state, &padding::pad_block::<V>(1));
        scalar::normalize::<V>(&state)
    }

    fn check_hash_each<V: Variant, const L: usize>() {
        let input = blocks::<V, L>(7);
        let lanes = hash_each::<V, L>(&input);
        for (block, digest) in input.iter().zip(lanes) {
            assert_eq!(digest, scalar_hash::<V>(block));
        }
    }

    #[test]
    fn hash_each_matches_scalar_for_every_width() {
        check_hash_each::<Sha256, 2>();
        check_hash_each::<Sha256, 4>();
        check_hash_each::<Sha256, 8>();
        check_hash_each::<Sha256, 16>();
        check_hash_each::<Sha512, 2>();
        check_hash_each::<Sha512, 8>();
        check_hash_each::<Sha160, 4>();
        check_hash_each::<Sha160, 16>();
    }

    #[test]
    fn double_hash_each_rehashes_the_digest() {
        let input = blocks::<Sha256, 4>(3);
        for (block, digest) in input.iter().zip(double_hash_each::<Sha256, 4>(&input)) {
            let first = scalar_hash::<Sha256>(block);
            assert_eq!(digest, scalar::hash_message::<Sha256>(&first));
        }
    }

    #[test]
    fn sequential_schedule_matches_block_by_block() {
        let input = blocks::<Sha512, 4>(11);
        let mut expected = Sha512::H;
        scalar::compress_blocks::<Sha512>(&mut expected, &input);

        let mut state = Sha512::H;
        compress_sequential::<Sha512, 4>(&mut state, &input);
        assert_eq!(state, expected);
    }

    #[test]
    fn digest_lanes_handles_spilled_tails() {
        let a = [1u8; 60];
        let b = [2u8; 56];
        let c = [3u8; 100];
        let d = [4u8; 64];
        let messages: [&[u8]; 4] = [&a, &b, &c, &d];
        let digests = digest_lanes::<Sha256, 4>(&messages);
        for (message, digest) in messages.iter().zip(digests) {
            assert_eq!(digest, scalar::hash_message::<Sha256>(message));
        }
    }

    #[test]
    #[should_panic(expected = "same block count")]
    fn digest_lanes_rejects_mixed_lengths() {
        let messages: [&[u8]; 2] = [b"short", &[0u8; 100]];
        let _ = digest_lanes::<Sha256, 2>(&messages);
    }

    #[test]
    fn vectorizer_reports_consumed_inputs() {
        let Some(vectorizer) = Vectorizer::new::<Sha256>(&Capabilities::detect(), Some(4)) else {
            return;
        };
        let input: Vec<[u8; 64]> = (0..10u8).map(|i| [i; 64]).collect();
        let mut out = Vec::new();
        assert_eq!(vectorizer.hash_each::<Sha256>(&input, &mut out), 8);
        assert_eq!(out.len(), 8);
        for (block, digest) in input.iter().zip(&out) {
            assert_eq!(*digest, scalar_hash::<Sha256>(block));
        }
    }

    #[test]
    fn default_lanes_stop_at_the_widest_kernel() {
        assert_eq!(default_lanes::<Sha256>(128), 4);
        assert_eq!(default_lanes::<Sha256>(256), 8);
        assert_eq!(default_lanes::<Sha256>(512), 8);
        assert_eq!(default_lanes::<Sha160>(512), 8);
        assert_eq!(default_lanes::<Sha512>(128), 2);
        assert_eq!(default_lanes::<Sha512>(512), 4);
    }

    #[test]
    fn detected_default_never_exceeds_avx2_width() {
        if let Some(vectorizer) = Vectorizer::new::<Sha256>(&Capabilities::detect(), None) {
            assert!(vectorizer.lanes() <= 8);
        }
        if let Some(vectorizer) = Vectorizer::new::<Sha512>(&Capabilities::detect(), None) {
            assert!(vectorizer.lanes() <= 4);
        }
    }

    #[test]
    fn vectorizer_needs_vector_caps() {
        assert!(Vectorizer::new::<Sha256>(&Capabilities::none(), None).is_none());
    }
}
