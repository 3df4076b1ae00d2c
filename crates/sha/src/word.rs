//! Word abstraction shared by the scalar and lane-parallel engines.
//!
//! The round and schedule functions are written once against [`Lane`], which
//! both a plain [`Word`] and a [`Lanes`](crate::vector::Lanes) vector
//! implement. Byte/word conversion goes through the bounds-checked codec
//! functions at the bottom of this module; nothing reinterprets buffers.

use core::fmt::Debug;
use core::hash::Hash;
use core::ops::{BitAnd, BitOr, BitXor, Not};

/// Operations the SHA round and schedule functions need from one slot.
///
/// `W` is the scalar word type. A scalar word is its own single-slot lane; a
/// lane vector applies every operation to each slot independently.
pub trait Lane<W>:
    Copy
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + Not<Output = Self>
{
    /// Broadcasts `word` into every slot.
    fn splat(word: W) -> Self;
    /// Wrapping addition.
    fn add(self, rhs: Self) -> Self;
    /// Rotate right by `n` bits.
    fn rotr(self, n: u32) -> Self;
    /// Rotate left by `n` bits.
    fn rotl(self, n: u32) -> Self;
    /// Logical shift right by `n` bits.
    fn shr(self, n: u32) -> Self;
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
}

/// A SHA message/state word: `u32` for SHA-1/SHA-256, `u64` for SHA-512.
pub trait Word:
    Lane<Self> + Default + Eq + Hash + Debug + Send + Sync + 'static + sealed::Sealed
{
    /// Width in bytes.
    const BYTES: usize;
    /// Width in bits.
    const BITS: u32;

    /// Decodes a big-endian word. `bytes` must be exactly [`Self::BYTES`] long.
    fn from_be_slice(bytes: &[u8]) -> Self;

    /// Encodes `self` big-endian into `out`, which must be [`Self::BYTES`] long.
    fn write_be(self, out: &mut [u8]);
}

macro_rules! impl_word {
    ($t:ty) => {
        impl Lane<$t> for $t {
            #[inline(always)]
            fn splat(word: $t) -> Self {
                word
            }

            #[inline(always)]
            fn add(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }

            #[inline(always)]
            fn rotr(self, n: u32) -> Self {
                self.rotate_right(n)
            }

            #[inline(always)]
            fn rotl(self, n: u32) -> Self {
                self.rotate_left(n)
            }

            #[inline(always)]
            fn shr(self, n: u32) -> Self {
                self >> n
            }
        }

        impl Word for $t {
            const BYTES: usize = core::mem::size_of::<$t>();
            const BITS: u32 = <$t>::BITS;

            #[inline(always)]
            fn from_be_slice(bytes: &[u8]) -> Self {
                let mut raw = [0u8; core::mem::size_of::<$t>()];
                raw.copy_from_slice(bytes);
                <$t>::from_be_bytes(raw)
            }

            #[inline(always)]
            fn write_be(self, out: &mut [u8]) {
                out.copy_from_slice(&self.to_be_bytes());
            }
        }
    };
}

impl_word!(u32);
impl_word!(u64);

/// Decodes `bytes` into `words`, big-endian.
///
/// # Panics
///
/// Panics when `bytes.len() != words.len() * W::BYTES`; a mismatch is a
/// caller bug, never something to truncate or pad.
#[inline]
pub fn read_words<W: Word>(bytes: &[u8], words: &mut [W]) {
    assert_eq!(
        bytes.len(),
        words.len() * W::BYTES,
        "word codec length mismatch"
    );
    for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(W::BYTES)) {
        *word = W::from_be_slice(chunk);
    }
}

/// Encodes `words` into `bytes`, big-endian.
///
/// # Panics
///
/// Panics when `bytes.len() != words.len() * W::BYTES`.
#[inline]
pub fn write_words<W: Word>(words: &[W], bytes: &mut [u8]) {
    assert_eq!(
        bytes.len(),
        words.len() * W::BYTES,
        "word codec length mismatch"
    );
    for (word, chunk) in words.iter().zip(bytes.chunks_exact_mut(W::BYTES)) {
        word.write_be(chunk);
    }
}
