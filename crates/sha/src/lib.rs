//! SHA-1, SHA-256 and SHA-512 with interchangeable execution tiers.
//!
//! One generic design serves all three widths: a [`Variant`] describes the
//! constants, and the same schedule and round code runs on a single word
//! ([`scalar`]), on `L` independent blocks at once ([`vector`]), or is
//! replaced by the CPU's SHA instructions (SHA-256 only). Every tier
//! produces identical output.
//!
//! On top of the compression function the crate provides:
//!
//! - single-shot hashing of blocks, half-blocks and arbitrary messages;
//! - double hashing (`hash(hash(x))`);
//! - streaming over whole blocks with an explicit finalize step;
//! - Merkle root reduction over digest lists.
//!
//! # Choosing a tier
//!
//! [`Engine::detect`] picks the best tier for the running CPU. To force one,
//! pass a [`Config`] and a [`Capabilities`] set to [`Engine::new`]:
//!
//! ```
//! use sha::{Capabilities, Config, Engine, Policy, Sha256};
//!
//! let scalar = Engine::<Sha256>::new(Config::new(Policy::Scalar), Capabilities::detect())?;
//! let best = Engine::<Sha256>::detect();
//! assert_eq!(scalar.hash_message(b"abc"), best.hash_message(b"abc"));
//! # Ok::<(), sha::DispatchError>(())
//! ```
//!
//! # Merkle roots
//!
//! ```
//! use sha::{Engine, Sha256};
//!
//! let engine = Engine::<Sha256>::detect();
//! let leaves = vec![engine.hash_message(b"a"), engine.hash_message(b"b")];
//! let root = engine.merkle_root(leaves.clone());
//! assert_eq!(root, engine.double_hash_pair(&leaves[0], &leaves[1]));
//! ```
//!
//! # Features
//!
//! - `vector` (default): detect SIMD widths and enable the lane-parallel tier.
//! - `native` (default): detect SHA instructions and enable the native tier.
//! - `tracing` (default): dispatch and Merkle diagnostics through `tracing`.
//! - `serde`: serialization for [`Config`], [`Policy`], [`Tier`] and
//!   [`Capabilities`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod caps;
pub mod dispatch;
pub mod error;
mod merkle;
mod native;
pub mod padding;
pub mod scalar;
pub mod stream;
pub mod variant;
pub mod vector;
pub mod word;

pub use caps::Capabilities;
pub use dispatch::{Config, Engine, LANES_ENV, POLICY_ENV, Policy, Tier};
pub use error::{ConfigError, DigestLengthError, DispatchError};
pub use stream::{Accumulator, Phase};
pub use variant::{Bytes, Family, Sha160, Sha256, Sha512, State, Variant};
pub use vector::Lanes;

/// SHA-1 engine.
pub type Sha160Engine = Engine<Sha160>;
/// SHA-256 engine.
pub type Sha256Engine = Engine<Sha256>;
/// SHA-512 engine.
pub type Sha512Engine = Engine<Sha512>;

/// Hash of `bytes` on the best tier for this CPU.
pub fn hash<V: Variant>(bytes: &[u8]) -> V::Digest {
    Engine::<V>::detect().hash_message(bytes)
}

/// `hash(hash(bytes))` on the best tier for this CPU.
pub fn double_hash<V: Variant>(bytes: &[u8]) -> V::Digest {
    Engine::<V>::detect().double_hash_message(bytes)
}

/// Merkle root of `digests` on the best tier for this CPU.
///
/// # Panics
///
/// Panics when `digests` is empty.
pub fn merkle_root<V: Variant>(digests: Vec<V::Digest>) -> V::Digest {
    Engine::<V>::detect().merkle_root(digests)
}

/// Copies a digest out of a slice of exactly `V::DIGEST_BYTES` bytes.
pub fn digest_from_slice<V: Variant>(bytes: &[u8]) -> Result<V::Digest, DigestLengthError> {
    if bytes.len() != V::DIGEST_BYTES {
        return Err(DigestLengthError {
            expected: V::DIGEST_BYTES,
            actual: bytes.len(),
        });
    }
    Ok(V::Digest::from_slice(bytes))
}
