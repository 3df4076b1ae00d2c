//! Strategy selection and the public engine.
//!
//! A [`Config`] names which tiers may run; a [`Capabilities`] set says which
//! ones can. [`Engine::new`] combines the two once, and every later call
//! follows the resolved plan without probing anything:
//!
//! - sequential work (one message, streamed blocks) prefers the native
//!   kernel, then lane-parallel scheduling, then scalar;
//! - batch work (many independent blocks, Merkle levels) prefers the lane
//!   kernels and finishes any remainder sequentially.
//!
//! All tiers produce identical output.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use logging::trace_dispatch;

use crate::caps::Capabilities;
use crate::error::{ConfigError, DispatchError};
use crate::padding;
use crate::scalar;
use crate::variant::{Bytes, NativeCompress, State, Variant};
use crate::vector::{SUPPORTED_LANES, Vectorizer};

/// Environment variable holding the dispatch policy.
pub const POLICY_ENV: &str = "SHA_ENGINE_POLICY";
/// Environment variable holding a lane-count override.
pub const LANES_ENV: &str = "SHA_ENGINE_LANES";

/// Which tiers an engine may use.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Policy {
    /// Portable scalar code only.
    Scalar,
    /// Lane-parallel kernels; fails to construct without vector support.
    Vector,
    /// Hardware SHA instructions; fails to construct without them.
    Native,
    /// Best available tier for each kind of work.
    #[default]
    All,
}

impl Policy {
    /// Every policy, in increasing order of permissiveness.
    pub const ALL: [Self; 4] = [Self::Scalar, Self::Vector, Self::Native, Self::All];

    /// Lowercase name, as accepted by [`FromStr`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Vector => "vector",
            Self::Native => "native",
            Self::All => "all",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Policy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|policy| policy.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::UnknownPolicy(s.to_owned()))
    }
}

/// Execution strategy an engine resolved to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Tier {
    /// Portable scalar code.
    Scalar,
    /// Lane-parallel kernels.
    Vector,
    /// Hardware SHA instructions.
    Native,
}

impl Tier {
    /// Lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Vector => "vector",
            Self::Native => "native",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine configuration.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Tiers the engine may use.
    pub policy: Policy,
    /// Lane count for the vector tier; derived from the register width when
    /// unset.
    pub lanes: Option<usize>,
}

impl Config {
    /// Configuration with `policy` and the default lane count.
    pub const fn new(policy: Policy) -> Self {
        Self {
            policy,
            lanes: None,
        }
    }

    /// Overrides the lane count.
    pub fn with_lanes(self, lanes: usize) -> Result<Self, ConfigError> {
        if !SUPPORTED_LANES.contains(&lanes) {
            return Err(ConfigError::InvalidLanes(lanes.to_string()));
        }
        Ok(Self {
            lanes: Some(lanes),
            ..self
        })
    }

    /// Reads [`POLICY_ENV`] and [`LANES_ENV`]; unset variables keep the
    /// defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(
            std::env::var(POLICY_ENV).ok().as_deref(),
            std::env::var(LANES_ENV).ok().as_deref(),
        )
    }

    /// Builds a configuration from optional policy and lane strings.
    pub fn from_vars(policy: Option<&str>, lanes: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = Self::new(policy.map(str::parse::<Policy>).transpose()?.unwrap_or_default());
        if let Some(text) = lanes {
            let lanes = text
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidLanes(text.to_owned()))?;
            config = config.with_lanes(lanes)?;
        }
        Ok(config)
    }
}

/// SHA engine for variant `V` with a resolved execution plan.
///
/// Construction is the only fallible step. The engine is a small `Copy`
/// value and holds no mutable state, so one instance can be shared freely
/// across threads.
#[derive(Clone, Copy, Debug)]
pub struct Engine<V: Variant> {
    tier: Tier,
    vector: Option<Vectorizer>,
    native: Option<NativeCompress<V>>,
    caps: Capabilities,
    _variant: PhantomData<V>,
}

impl<V: Variant> Engine<V> {
    /// Resolves `config` against `caps`.
    ///
    /// Forcing the vector or native tier fails when `caps` (or the variant,
    /// for native) cannot provide it.
    pub fn new(config: Config, caps: Capabilities) -> Result<Self, DispatchError> {
        let unavailable = |tier| DispatchError::TierUnavailable {
            tier,
            variant: V::NAME,
        };

        let engine = match config.policy {
            Policy::Scalar => Self::build(Tier::Scalar, None, None, caps),
            Policy::Vector => {
                let vector =
                    Vectorizer::new::<V>(&caps, config.lanes).ok_or_else(|| unavailable(Tier::Vector))?;
                Self::build(Tier::Vector, Some(vector), None, caps)
            }
            Policy::Native => {
                let native = V::native(&caps).ok_or_else(|| unavailable(Tier::Native))?;
                Self::build(Tier::Native, None, Some(native), caps)
            }
            Policy::All => Self::best(caps, config.lanes),
        };

        trace_dispatch!(
            "{} engine: policy {} resolved to {} tier ({} lanes, caps: {})",
            V::NAME,
            config.policy,
            engine.tier,
            engine.lanes(),
            caps
        );
        Ok(engine)
    }

    /// Best engine for the detected CPU.
    pub fn detect() -> Self {
        Self::best(Capabilities::detect(), None)
    }

    /// Scalar-only engine.
    pub fn scalar() -> Self {
        Self::build(Tier::Scalar, None, None, Capabilities::none())
    }

    fn best(caps: Capabilities, lanes: Option<usize>) -> Self {
        let vector = Vectorizer::new::<V>(&caps, lanes);
        let native = V::native(&caps);
        let tier = if native.is_some() {
            Tier::Native
        } else if vector.is_some() {
            Tier::Vector
        } else {
            Tier::Scalar
        };
        Self::build(tier, vector, native, caps)
    }

    fn build(
        tier: Tier,
        vector: Option<Vectorizer>,
        native: Option<NativeCompress<V>>,
        caps: Capabilities,
    ) -> Self {
        let () = V::VALID;
        Self {
            tier,
            vector,
            native,
            caps,
            _variant: PhantomData,
        }
    }

    /// Primary tier used for sequential work.
    pub const fn tier(&self) -> Tier {
        self.tier
    }

    /// Blocks processed per batch call; 1 without a vector tier.
    pub fn lanes(&self) -> usize {
        self.vector.map_or(1, Vectorizer::lanes)
    }

    pub(crate) const fn vector_engine(&self) -> Option<Vectorizer> {
        self.vector
    }

    /// Capability set the engine was resolved against.
    pub const fn capabilities(&self) -> Capabilities {
        self.caps
    }

    /// Compresses `blocks` into `state` in order, on the engine's tier.
    pub fn compress_blocks(&self, state: &mut State<V>, blocks: &[V::Block]) {
        if let Some(native) = self.native {
            native(state, blocks);
            return;
        }

        let consumed = self
            .vector
            .map_or(0, |vector| vector.compress_sequential::<V>(state, blocks));
        scalar::compress_blocks::<V>(state, &blocks[consumed..]);
    }

    fn digest_of(&self, blocks: &[V::Block]) -> V::Digest {
        let mut state = V::H;
        self.compress_blocks(&mut state, blocks);
        scalar::normalize::<V>(&state)
    }

    /// Hash of a one-block message.
    pub fn hash_block(&self, block: &V::Block) -> V::Digest {
        self.digest_of(&[*block, padding::pad_block::<V>(1)])
    }

    /// Hash of a message made of whole blocks.
    pub fn hash_blocks(&self, blocks: &[V::Block]) -> V::Digest {
        let mut state = V::H;
        self.compress_blocks(&mut state, blocks);
        self.compress_blocks(&mut state, &[padding::pad_block::<V>(blocks.len() as u64)]);
        scalar::normalize::<V>(&state)
    }

    /// Hash of a one-chunk message.
    pub fn hash_half(&self, chunk: &V::Half) -> V::Digest {
        let mut block = V::Block::zeroed();
        let (left, right) = block.as_mut().split_at_mut(V::CHUNK_BYTES);
        left.copy_from_slice(chunk.as_ref());
        right.copy_from_slice(padding::pad_half::<V>().as_ref());
        self.digest_of(&[block])
    }

    /// Hash of the one-block message `left || right`.
    pub fn hash_pair(&self, left: &V::Half, right: &V::Half) -> V::Digest {
        self.hash_block(&join::<V>(left.as_ref(), right.as_ref()))
    }

    /// Hash of an arbitrary-length message.
    pub fn hash_message(&self, bytes: &[u8]) -> V::Digest {
        let (full, rest) = padding::split_message::<V>(bytes);
        let mut state = V::H;

        let mut batch = [V::Block::zeroed(); 16];
        let mut filled = 0;
        for block in padding::blocks::<V>(full) {
            batch[filled] = block;
            filled += 1;
            if filled == batch.len() {
                self.compress_blocks(&mut state, &batch);
                filled = 0;
            }
        }
        self.compress_blocks(&mut state, &batch[..filled]);

        let tail = padding::message_tail::<V>(rest, bytes.len());
        self.compress_blocks(&mut state, tail.as_slice());
        scalar::normalize::<V>(&state)
    }

    /// Rehashes a digest as a one-chunk message.
    pub(crate) fn rehash(&self, digest: &V::Digest) -> V::Digest {
        const { assert!(V::DOUBLE, "double hashing needs a digest of one chunk") };
        self.hash_half(&V::Half::from_slice(digest.as_ref()))
    }

    /// `hash(hash(block))` for a one-block message.
    pub fn double_hash_block(&self, block: &V::Block) -> V::Digest {
        self.rehash(&self.hash_block(block))
    }

    /// `hash(hash(blocks))` for a message made of whole blocks.
    pub fn double_hash_blocks(&self, blocks: &[V::Block]) -> V::Digest {
        self.rehash(&self.hash_blocks(blocks))
    }

    /// `hash(hash(left || right))`, the Merkle node function.
    pub fn double_hash_pair(&self, left: &V::Half, right: &V::Half) -> V::Digest {
        self.rehash(&self.hash_pair(left, right))
    }

    /// `hash(hash(bytes))` for an arbitrary-length message.
    pub fn double_hash_message(&self, bytes: &[u8]) -> V::Digest {
        self.rehash(&self.hash_message(bytes))
    }

    /// One-block hash of each block, in order.
    pub fn hash_each(&self, blocks: &[V::Block]) -> Vec<V::Digest> {
        let mut out = Vec::with_capacity(blocks.len());
        let consumed = self
            .vector
            .map_or(0, |vector| vector.hash_each::<V>(blocks, &mut out));
        out.extend(blocks[consumed..].iter().map(|block| self.hash_block(block)));
        out
    }

    /// Double hash of each block, in order.
    pub fn double_hash_each(&self, blocks: &[V::Block]) -> Vec<V::Digest> {
        let mut out = Vec::with_capacity(blocks.len());
        let consumed = self
            .vector
            .map_or(0, |vector| vector.double_hash_each::<V>(blocks, &mut out));
        out.extend(
            blocks[consumed..]
                .iter()
                .map(|block| self.double_hash_block(block)),
        );
        out
    }

    /// Hash of each message, in order.
    ///
    /// With a vector tier, messages that pad to the same block count are
    /// hashed together in lane groups.
    pub fn digest_batch<M: AsRef<[u8]>>(&self, messages: &[M]) -> Vec<V::Digest> {
        let Some(vector) = self.vector else {
            return messages
                .iter()
                .map(|message| self.hash_message(message.as_ref()))
                .collect();
        };

        let mut buckets: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (index, message) in messages.iter().enumerate() {
            buckets
                .entry(padding::padded_blocks::<V>(message.as_ref().len()))
                .or_default()
                .push(index);
        }

        let mut out = vec![V::Digest::zeroed(); messages.len()];
        let mut lanes = Vec::new();
        for indices in buckets.values() {
            let views: Vec<&[u8]> = indices.iter().map(|&i| messages[i].as_ref()).collect();
            lanes.clear();
            let consumed = vector.digest_lanes::<V>(&views, &mut lanes);

            for (&index, digest) in indices.iter().zip(&lanes) {
                out[index] = *digest;
            }
            for (&index, view) in indices[consumed..].iter().zip(&views[consumed..]) {
                out[index] = self.hash_message(view);
            }
        }
        out
    }
}

impl<V: Variant> Default for Engine<V> {
    fn default() -> Self {
        Self::detect()
    }
}

/// Concatenates two one-chunk values (half-blocks or pairing digests) into
/// one block.
///
/// # Panics
///
/// Panics when either side is not exactly one chunk long.
pub(crate) fn join<V: Variant>(left: &[u8], right: &[u8]) -> V::Block {
    let mut block = V::Block::zeroed();
    let (head, tail) = block.as_mut().split_at_mut(V::CHUNK_BYTES);
    head.copy_from_slice(left);
    tail.copy_from_slice(right);
    block
}
