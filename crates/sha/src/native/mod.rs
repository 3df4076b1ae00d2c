//! Hardware SHA-256 compression.
//!
//! The kernels are private; the only way to obtain one is
//! [`sha256_kernel`], which checks the capability set first. SHA-1 and
//! SHA-512 have no native kernel and always run through the scalar or
//! vector engines.

#[cfg(target_arch = "aarch64")]
mod aarch64;
#[cfg(target_arch = "x86_64")]
mod x86_64;

use crate::caps::Capabilities;
use crate::variant::{NativeCompress, Sha256};

/// Native SHA-256 kernel usable under `caps`.
#[allow(unused_variables)]
pub(crate) fn sha256_kernel(caps: &Capabilities) -> Option<NativeCompress<Sha256>> {
    #[cfg(target_arch = "x86_64")]
    {
        if caps.has_sha_ni() {
            return Some(x86_64::compress_blocks as NativeCompress<Sha256>);
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if caps.has_arm_sha2() {
            return Some(aarch64::compress_blocks as NativeCompress<Sha256>);
        }
    }

    None
}
