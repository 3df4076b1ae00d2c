//! SHA-256 with the x86 SHA extensions.
//!
//! `sha256rnds2` keeps the state as two vectors in ABEF/CDGH order; the
//! state is shuffled into that layout on load and back on store. Message
//! words are byte-swapped on load since the instructions expect native
//! little-endian lanes.

#![allow(unsafe_code)]

use core::arch::x86_64::{
    __m128i, _mm_add_epi32, _mm_alignr_epi8, _mm_blend_epi16, _mm_loadu_si128, _mm_set_epi32,
    _mm_set_epi64x, _mm_sha256msg1_epu32, _mm_sha256msg2_epu32, _mm_sha256rnds2_epu32,
    _mm_shuffle_epi8, _mm_shuffle_epi32, _mm_storeu_si128,
};

use crate::variant::{Sha256, Variant};

/// Four rounds over `$w` plus round constants `4 * $i .. 4 * $i + 4`.
macro_rules! rounds4 {
    ($abef:ident, $cdgh:ident, $w:expr, $i:expr) => {{
        let k = &Sha256::K[4 * $i..4 * $i + 4];
        let kv = _mm_set_epi32(k[3] as i32, k[2] as i32, k[1] as i32, k[0] as i32);
        let t1 = _mm_add_epi32($w, kv);
        $cdgh = _mm_sha256rnds2_epu32($cdgh, $abef, t1);
        let t2 = _mm_shuffle_epi32(t1, 0x0E);
        $abef = _mm_sha256rnds2_epu32($abef, $cdgh, t2);
    }};
}

/// Next four schedule words from the previous sixteen.
macro_rules! schedule {
    ($w0:expr, $w1:expr, $w2:expr, $w3:expr) => {{
        let t1 = _mm_sha256msg1_epu32($w0, $w1);
        let t2 = _mm_alignr_epi8($w3, $w2, 4);
        _mm_sha256msg2_epu32(_mm_add_epi32(t1, t2), $w3)
    }};
}

#[target_feature(enable = "sha,sse2,ssse3,sse4.1")]
unsafe fn compress_sha_ni(state: &mut [u32; 8], blocks: &[[u8; 64]]) {
    // SAFETY: every load and store below stays within `state` (two 16-byte
    // halves of a 32-byte array) or a 64-byte block; unaligned intrinsics
    // are used throughout.
    unsafe {
        let mask = _mm_set_epi64x(0x0c0d_0e0f_0809_0a0b, 0x0405_0607_0001_0203);

        let state_ptr = state.as_ptr().cast::<__m128i>();
        let dcba = _mm_loadu_si128(state_ptr);
        let hgfe = _mm_loadu_si128(state_ptr.add(1));

        let cdab = _mm_shuffle_epi32(dcba, 0xB1);
        let efgh = _mm_shuffle_epi32(hgfe, 0x1B);
        let mut abef = _mm_alignr_epi8(cdab, efgh, 8);
        let mut cdgh = _mm_blend_epi16(efgh, cdab, 0xF0);

        for block in blocks {
            let abef_save = abef;
            let cdgh_save = cdgh;

            let data = block.as_ptr().cast::<__m128i>();
            let mut w = [
                _mm_shuffle_epi8(_mm_loadu_si128(data), mask),
                _mm_shuffle_epi8(_mm_loadu_si128(data.add(1)), mask),
                _mm_shuffle_epi8(_mm_loadu_si128(data.add(2)), mask),
                _mm_shuffle_epi8(_mm_loadu_si128(data.add(3)), mask),
            ];

            for i in 0..4 {
                rounds4!(abef, cdgh, w[i], i);
            }
            for i in 4..16 {
                let next = schedule!(w[i % 4], w[(i + 1) % 4], w[(i + 2) % 4], w[(i + 3) % 4]);
                rounds4!(abef, cdgh, next, i);
                w[i % 4] = next;
            }

            abef = _mm_add_epi32(abef, abef_save);
            cdgh = _mm_add_epi32(cdgh, cdgh_save);
        }

        let feba = _mm_shuffle_epi32(abef, 0x1B);
        let dchg = _mm_shuffle_epi32(cdgh, 0xB1);
        let dcba = _mm_blend_epi16(feba, dchg, 0xF0);
        let hgef = _mm_alignr_epi8(dchg, feba, 8);

        let out = state.as_mut_ptr().cast::<__m128i>();
        _mm_storeu_si128(out, dcba);
        _mm_storeu_si128(out.add(1), hgef);
    }
}

/// Compresses `blocks` into `state` with SHA-NI.
pub(super) fn compress_blocks(state: &mut [u32; 8], blocks: &[[u8; 64]]) {
    // SAFETY: this function is only handed out by `sha256_kernel` for a
    // capability set reporting SHA, SSE2, SSSE3 and SSE4.1.
    unsafe { compress_sha_ni(state, blocks) }
}
