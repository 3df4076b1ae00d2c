//! SHA-256 with the ARMv8 SHA2 crypto extension.

#![allow(unsafe_code)]

use core::arch::aarch64::{
    vaddq_u32, vld1q_u8, vld1q_u32, vreinterpretq_u32_u8, vrev32q_u8, vsha256h2q_u32,
    vsha256hq_u32, vsha256su0q_u32, vsha256su1q_u32, vst1q_u32,
};

use crate::variant::{Sha256, Variant};

#[target_feature(enable = "sha2")]
unsafe fn compress_sha2(state: &mut [u32; 8], blocks: &[[u8; 64]]) {
    // SAFETY: loads read 16 bytes from a 64-byte block, a 32-byte state or
    // a four-word window of the round constants; stores write the two state
    // halves.
    unsafe {
        let mut abcd = vld1q_u32(state[0..4].as_ptr());
        let mut efgh = vld1q_u32(state[4..8].as_ptr());

        for block in blocks {
            let abcd_save = abcd;
            let efgh_save = efgh;

            let mut w = [
                vreinterpretq_u32_u8(vrev32q_u8(vld1q_u8(block[0..16].as_ptr()))),
                vreinterpretq_u32_u8(vrev32q_u8(vld1q_u8(block[16..32].as_ptr()))),
                vreinterpretq_u32_u8(vrev32q_u8(vld1q_u8(block[32..48].as_ptr()))),
                vreinterpretq_u32_u8(vrev32q_u8(vld1q_u8(block[48..64].as_ptr()))),
            ];

            for i in 0..16 {
                if i >= 4 {
                    w[i % 4] = vsha256su1q_u32(
                        vsha256su0q_u32(w[i % 4], w[(i + 1) % 4]),
                        w[(i + 2) % 4],
                        w[(i + 3) % 4],
                    );
                }
                let k = vld1q_u32(Sha256::K[4 * i..4 * i + 4].as_ptr());
                let wk = vaddq_u32(w[i % 4], k);
                let abcd_prev = abcd;
                abcd = vsha256hq_u32(abcd_prev, efgh, wk);
                efgh = vsha256h2q_u32(efgh, abcd_prev, wk);
            }

            abcd = vaddq_u32(abcd, abcd_save);
            efgh = vaddq_u32(efgh, efgh_save);
        }

        vst1q_u32(state[0..4].as_mut_ptr(), abcd);
        vst1q_u32(state[4..8].as_mut_ptr(), efgh);
    }
}

/// Compresses `blocks` into `state` with the SHA2 instructions.
pub(super) fn compress_blocks(state: &mut [u32; 8], blocks: &[[u8; 64]]) {
    // SAFETY: only handed out by `sha256_kernel` for a capability set
    // reporting the SHA2 extension.
    unsafe { compress_sha2(state, blocks) }
}
