//! AVX2 trampolines for the lane kernels.
//!
//! Each wrapper re-enters the portable kernel inside an `avx2` target
//! feature context so the lane loops are compiled for 256-bit registers.
//! The wrappers are only reachable through `Isa::Avx2`, which
//! [`Vectorizer::new`](super::Vectorizer) selects when the capability set
//! reports AVX2.

#![allow(unsafe_code)]

use crate::variant::{State, Variant};

macro_rules! trampoline {
    ($name:ident, $inner:ident, ($($arg:ident: $ty:ty),*)) => {
        #[target_feature(enable = "avx2")]
        fn $inner<V: Variant, const L: usize>($($arg: $ty),*) {
            super::$name::<V, L>($($arg),*);
        }

        #[inline]
        pub(super) fn $name<V: Variant, const L: usize>($($arg: $ty),*) {
            // SAFETY: only called for `Isa::Avx2`, which requires the
            // detected capability set to report AVX2.
            unsafe { $inner::<V, L>($($arg),*) }
        }
    };
}

trampoline!(hash_groups, hash_groups_avx2, (groups: &[[V::Block; L]], out: &mut Vec<V::Digest>));
trampoline!(double_hash_groups, double_hash_groups_avx2, (groups: &[[V::Block; L]], out: &mut Vec<V::Digest>));
trampoline!(compress_groups, compress_groups_avx2, (state: &mut State<V>, groups: &[[V::Block; L]]));
trampoline!(digest_groups, digest_groups_avx2, (groups: &[[&[u8]; L]], out: &mut Vec<V::Digest>));
