//! Fixed-width lane container.

use core::ops::{BitAnd, BitOr, BitXor, Not};

use crate::word::{Lane, Word};

/// `L` independent words processed in lockstep.
///
/// Every [`Lane`] operation is applied slot by slot. The loops are plain
/// array maps; compiled inside a `target_feature` context they lower to the
/// matching vector instructions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct Lanes<W, const L: usize>(
    /// One word per lane.
    pub [W; L],
);

impl<W: Word, const L: usize> Lanes<W, L> {
    /// Lane-count guard, evaluated at monomorphization.
    pub const WIDTH: usize = {
        assert!(L == 2 || L == 4 || L == 8 || L == 16, "lane count must be 2, 4, 8 or 16");
        L
    };

    /// Packs one word per lane.
    #[inline(always)]
    pub fn from_fn(f: impl FnMut(usize) -> W) -> Self {
        Self(core::array::from_fn(f))
    }

    /// Word held by `lane`.
    #[inline(always)]
    pub fn get(self, lane: usize) -> W {
        self.0[lane]
    }

    #[inline(always)]
    fn map(self, f: impl Fn(W) -> W) -> Self {
        let mut out = self.0;
        for slot in &mut out {
            *slot = f(*slot);
        }
        Self(out)
    }

    #[inline(always)]
    fn zip(self, rhs: Self, f: impl Fn(W, W) -> W) -> Self {
        let mut out = self.0;
        for (slot, other) in out.iter_mut().zip(rhs.0) {
            *slot = f(*slot, other);
        }
        Self(out)
    }
}

impl<W: Word, const L: usize> BitAnd for Lanes<W, L> {
    type Output = Self;

    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a & b)
    }
}

impl<W: Word, const L: usize> BitOr for Lanes<W, L> {
    type Output = Self;

    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a | b)
    }
}

impl<W: Word, const L: usize> BitXor for Lanes<W, L> {
    type Output = Self;

    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a ^ b)
    }
}

impl<W: Word, const L: usize> Not for Lanes<W, L> {
    type Output = Self;

    #[inline(always)]
    fn not(self) -> Self {
        self.map(|a| !a)
    }
}

impl<W: Word, const L: usize> Lane<W> for Lanes<W, L> {
    #[inline(always)]
    fn splat(word: W) -> Self {
        Self([word; L])
    }

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a.add(b))
    }

    #[inline(always)]
    fn rotr(self, n: u32) -> Self {
        self.map(|a| a.rotr(n))
    }

    #[inline(always)]
    fn rotl(self, n: u32) -> Self {
        self.map(|a| a.rotl(n))
    }

    #[inline(always)]
    fn shr(self, n: u32) -> Self {
        self.map(|a| a.shr(n))
    }
}
