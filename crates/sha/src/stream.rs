//! Incremental hashing over whole blocks.
//!
//! The caller owns the running [`State`] and the block count; there is no
//! partial-block buffering. The length field is synthesized at finalize
//! time from the count alone.

use crate::dispatch::Engine;
use crate::padding;
use crate::scalar;
use crate::variant::{State, Variant};

impl<V: Variant> Engine<V> {
    /// Folds `blocks` into `state` in order.
    pub fn accumulate(&self, state: &mut State<V>, blocks: &[V::Block]) {
        self.compress_blocks(state, blocks);
    }

    /// Pads a message of `total_blocks` whole blocks and returns its digest.
    ///
    /// `state` is left holding the final state.
    pub fn finalize(&self, state: &mut State<V>, total_blocks: u64) -> V::Digest {
        self.compress_blocks(state, &[padding::pad_block::<V>(total_blocks)]);
        scalar::normalize::<V>(state)
    }

    /// Hashes the digest held in a finalized `state` once more.
    pub fn finalize_second(&self, state: &State<V>) -> V::Digest {
        self.rehash(&scalar::normalize::<V>(state))
    }

    /// [`finalize`](Self::finalize) followed by a second hash of the digest.
    pub fn finalize_double(&self, state: &mut State<V>, total_blocks: u64) -> V::Digest {
        self.finalize(state, total_blocks);
        self.finalize_second(state)
    }
}

/// Lifecycle of an [`Accumulator`].
///
/// There is no finalized phase: finalizing consumes the accumulator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    /// No blocks consumed yet.
    Fresh,
    /// At least one block consumed.
    Accumulating,
}

/// Running hash that tracks its own block count.
#[derive(Clone, Copy, Debug)]
pub struct Accumulator<V: Variant> {
    engine: Engine<V>,
    state: State<V>,
    blocks: u64,
}

impl<V: Variant> Accumulator<V> {
    /// Fresh accumulator hashing through `engine`.
    pub fn new(engine: Engine<V>) -> Self {
        Self {
            engine,
            state: V::H,
            blocks: 0,
        }
    }

    /// Current phase.
    pub const fn phase(&self) -> Phase {
        if self.blocks == 0 {
            Phase::Fresh
        } else {
            Phase::Accumulating
        }
    }

    /// Whole blocks consumed so far.
    pub const fn blocks(&self) -> u64 {
        self.blocks
    }

    /// Running state.
    pub const fn state(&self) -> &State<V> {
        &self.state
    }

    /// Appends whole blocks.
    pub fn accumulate(&mut self, blocks: &[V::Block]) {
        self.engine.accumulate(&mut self.state, blocks);
        self.blocks += blocks.len() as u64;
    }

    /// Digest of everything accumulated.
    pub fn finalize(mut self) -> V::Digest {
        self.engine.finalize(&mut self.state, self.blocks)
    }

    /// Double hash of everything accumulated.
    pub fn finalize_double(mut self) -> V::Digest {
        self.engine.finalize_double(&mut self.state, self.blocks)
    }
}

impl<V: Variant> Default for Accumulator<V> {
    fn default() -> Self {
        Self::new(Engine::detect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::{Sha160, Sha256, Sha512};

    #[test]
    fn empty_stream_is_empty_message() {
        let engine = Engine::<Sha256>::scalar();
        let mut state = Sha256::H;
        assert_eq!(engine.finalize(&mut state, 0), engine.hash_message(b""));
    }

    #[test]
    fn accumulator_tracks_phase_and_count() {
        let mut acc = Accumulator::<Sha160>::default();
        assert_eq!(acc.phase(), Phase::Fresh);
        acc.accumulate(&[]);
        assert_eq!(acc.phase(), Phase::Fresh);
        acc.accumulate(&[[1u8; 64], [2u8; 64]]);
        assert_eq!(acc.phase(), Phase::Accumulating);
        assert_eq!(acc.blocks(), 2);

        let mut whole = [1u8; 128];
        whole[64..].fill(2);
        assert_eq!(acc.finalize(), Engine::<Sha160>::scalar().hash_message(&whole));
    }

    #[test]
    fn finalize_double_rehashes_digest() {
        let engine = Engine::<Sha512>::detect();
        let block = [0xa5u8; 128];

        let mut state = Sha512::H;
        engine.accumulate(&mut state, &[block]);
        let double = engine.finalize_double(&mut state, 1);

        let single = engine.hash_message(&block);
        assert_eq!(double, engine.hash_message(&single));
    }

    #[test]
    fn finalize_second_uses_finalized_state() {
        let engine = Engine::<Sha256>::detect();
        let mut state = Sha256::H;
        engine.accumulate(&mut state, &[[7u8; 64]]);
        let first = engine.finalize(&mut state, 1);
        assert_eq!(engine.finalize_second(&state), engine.hash_message(&first));
    }

    #[test]
    fn count_field_encodes_counts_past_32_bits() {
        let blocks: u64 = 1 << 30;
        let mut pad = [0u8; 64];
        pad[0] = 0x80;
        pad[56..].copy_from_slice(&(blocks * 512).to_be_bytes());
        assert_eq!(pad[59], 0x80, "bit count 2^39 lands in the fifth count byte");

        let mut expected = Sha256::H;
        scalar::compress_block::<Sha256>(&mut expected, &pad);

        let engine = Engine::<Sha256>::detect();
        let mut state = Sha256::H;
        let digest = engine.finalize(&mut state, blocks);
        assert_eq!(state, expected);
        assert_eq!(digest, scalar::normalize::<Sha256>(&expected));
    }

    #[test]
    fn sha512_count_field_is_sixteen_bytes() {
        let blocks: u64 = u64::MAX;
        let bits = u128::from(blocks) * 1024;
        let mut pad = [0u8; 128];
        pad[0] = 0x80;
        pad[112..].copy_from_slice(&bits.to_be_bytes());
        assert_ne!(pad[119], 0, "count overflows 64 bits");

        let mut expected = Sha512::H;
        scalar::compress_block::<Sha512>(&mut expected, &pad);

        let engine = Engine::<Sha512>::scalar();
        let mut state = Sha512::H;
        assert_eq!(engine.finalize(&mut state, blocks), scalar::normalize::<Sha512>(&expected));
    }
}
