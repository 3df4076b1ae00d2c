//! Runtime CPU capability detection.
//!
//! [`Capabilities::detect`] probes the processor once per process and caches
//! the result. The set can only be narrowed afterwards; there is no public
//! way to claim a feature the probe did not report, so native and vector
//! kernels are only reachable on hardware that supports them.

use std::fmt;
use std::sync::OnceLock;

/// Immutable set of CPU features relevant to the engine.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Capabilities {
    sse41: bool,
    avx2: bool,
    avx512: bool,
    neon: bool,
    sha_ni: bool,
    arm_sha2: bool,
}

impl Capabilities {
    /// Empty set: only the scalar engine is usable.
    pub const fn none() -> Self {
        Self {
            sse41: false,
            avx2: false,
            avx512: false,
            neon: false,
            sha_ni: false,
            arm_sha2: false,
        }
    }

    /// Detected capabilities, probed on first call.
    pub fn detect() -> Self {
        static DETECTED: OnceLock<Capabilities> = OnceLock::new();
        *DETECTED.get_or_init(|| {
            let caps = Self::probe();
            logging::trace_caps!("detected cpu capabilities: {}", caps);
            caps
        })
    }

    #[allow(unused_mut)]
    fn probe() -> Self {
        let mut caps = Self::none();

        #[cfg(all(target_arch = "x86_64", feature = "vector"))]
        {
            caps.sse41 = is_x86_feature_detected!("sse4.1");
            caps.avx2 = is_x86_feature_detected!("avx2");
            caps.avx512 = is_x86_feature_detected!("avx512f") && caps.avx2;
        }

        #[cfg(all(target_arch = "x86_64", feature = "native"))]
        {
            caps.sha_ni = is_x86_feature_detected!("sha")
                && is_x86_feature_detected!("sse2")
                && is_x86_feature_detected!("ssse3")
                && is_x86_feature_detected!("sse4.1");
        }

        #[cfg(all(target_arch = "aarch64", feature = "vector"))]
        {
            caps.neon = std::arch::is_aarch64_feature_detected!("neon");
        }

        #[cfg(all(target_arch = "aarch64", feature = "native"))]
        {
            caps.arm_sha2 = std::arch::is_aarch64_feature_detected!("sha2");
        }

        caps
    }

    /// Drops every vector width.
    pub const fn without_vector(self) -> Self {
        Self {
            sse41: false,
            avx2: false,
            avx512: false,
            neon: false,
            ..self
        }
    }

    /// Drops the hardware SHA instructions.
    pub const fn without_native(self) -> Self {
        Self {
            sha_ni: false,
            arm_sha2: false,
            ..self
        }
    }

    /// Intersection of two sets.
    pub const fn restrict(self, other: Self) -> Self {
        Self {
            sse41: self.sse41 && other.sse41,
            avx2: self.avx2 && other.avx2,
            avx512: self.avx512 && other.avx512,
            neon: self.neon && other.neon,
            sha_ni: self.sha_ni && other.sha_ni,
            arm_sha2: self.arm_sha2 && other.arm_sha2,
        }
    }

    /// SSE4.1 (128-bit integer vectors) on x86_64.
    pub const fn has_sse41(&self) -> bool {
        self.sse41
    }

    /// AVX2 (256-bit integer vectors).
    pub const fn has_avx2(&self) -> bool {
        self.avx2
    }

    /// AVX-512F (512-bit integer vectors).
    pub const fn has_avx512(&self) -> bool {
        self.avx512
    }

    /// Advanced SIMD on aarch64.
    pub const fn has_neon(&self) -> bool {
        self.neon
    }

    /// x86 SHA extensions.
    pub const fn has_sha_ni(&self) -> bool {
        self.sha_ni
    }

    /// ARMv8 SHA2 crypto extension.
    pub const fn has_arm_sha2(&self) -> bool {
        self.arm_sha2
    }

    /// Widest usable integer vector register in bits, zero when none.
    pub const fn vector_bits(&self) -> u32 {
        if self.avx512 {
            512
        } else if self.avx2 {
            256
        } else if self.sse41 || self.neon {
            128
        } else {
            0
        }
    }

    /// Whether any hardware SHA instruction set is present.
    pub const fn has_native(&self) -> bool {
        self.sha_ni || self.arm_sha2
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (self.sse41, "sse4.1"),
            (self.avx2, "avx2"),
            (self.avx512, "avx512f"),
            (self.neon, "neon"),
            (self.sha_ni, "sha-ni"),
            (self.arm_sha2, "arm-sha2"),
        ];

        let mut first = true;
        for (_, name) in names.iter().filter(|(present, _)| *present) {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(name)?;
            first = false;
        }

        if first {
            f.write_str("none")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_has_nothing() {
        let caps = Capabilities::none();
        assert_eq!(caps.vector_bits(), 0);
        assert!(!caps.has_native());
        assert_eq!(caps.to_string(), "none");
    }

    #[test]
    fn detection_is_stable() {
        assert_eq!(Capabilities::detect(), Capabilities::detect());
    }

    #[test]
    fn narrowing_never_adds_features() {
        let detected = Capabilities::detect();
        let narrowed = detected.without_vector();
        assert_eq!(narrowed.vector_bits(), 0);
        assert_eq!(narrowed.has_native(), detected.has_native());

        let scalar = detected.without_vector().without_native();
        assert_eq!(scalar, Capabilities::none());

        assert_eq!(detected.restrict(Capabilities::none()), Capabilities::none());
        assert_eq!(detected.restrict(detected), detected);
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn x86_probe_agrees_with_std() {
        let caps = Capabilities::detect();
        if cfg!(feature = "vector") {
            assert_eq!(caps.has_avx2(), is_x86_feature_detected!("avx2"));
            assert_eq!(caps.has_sse41(), is_x86_feature_detected!("sse4.1"));
        } else {
            assert_eq!(caps.vector_bits(), 0);
        }
        if !cfg!(feature = "native") {
            assert!(!caps.has_sha_ni());
        }
    }

    #[test]
    fn display_lists_present_features() {
        let caps = Capabilities::detect();
        let text = caps.to_string();
        assert_eq!(text == "none", caps == Capabilities::none());
    }
}
