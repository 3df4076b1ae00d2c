//! Variant descriptors: the constant data describing one SHA family member.
//!
//! Everything downstream is generic over [`Variant`]. The only behavioural
//! switch a descriptor carries is its [`Family`] (which round function and
//! schedule recurrence apply) and its [`native`](Variant::native) hook.

use core::fmt::Debug;
use core::hash::Hash;

use crate::caps::Capabilities;
use crate::word::Word;

/// Number of words in every running state.
pub const STATE_WORDS: usize = 8;
/// Number of words in one block.
pub const BLOCK_WORDS: usize = 16;
/// Number of words in one half-block.
pub const CHUNK_WORDS: usize = BLOCK_WORDS / 2;
/// Capacity of a message schedule buffer (the largest round count).
pub const MAX_ROUNDS: usize = 80;

/// Running hash accumulator for variant `V`.
pub type State<V> = [<V as Variant>::Word; STATE_WORDS];

/// Hardware compression kernel: folds `blocks` into `state` in order.
pub type NativeCompress<V> = fn(&mut State<V>, &[<V as Variant>::Block]);

/// Round function family.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Family {
    /// Five-word rounds with choice/parity/majority per 20-round group.
    Sha1,
    /// Eight-word rounds with choice/majority and the big-sigma functions.
    Sha2,
}

/// Rotation/shift amounts of one sigma function.
///
/// For the small (schedule) sigmas `c` is a logical shift; for the big
/// (round) sigmas all three are rotations.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Sigma {
    /// First rotation.
    pub a: u32,
    /// Second rotation.
    pub b: u32,
    /// Third rotation, or shift for the small sigmas.
    pub c: u32,
}

impl Sigma {
    const fn new(a: u32, b: u32, c: u32) -> Self {
        Self { a, b, c }
    }

    /// Placeholder for families that do not use sigma functions.
    pub const UNUSED: Self = Self::new(0, 0, 0);
}

/// Fixed-size byte array used for blocks, half-blocks and digests.
pub trait Bytes:
    AsRef<[u8]> + AsMut<[u8]> + Copy + Eq + Hash + Debug + Send + Sync + 'static
{
    /// Length in bytes.
    const LEN: usize;

    /// All-zero value.
    fn zeroed() -> Self;

    /// Copies `bytes` into a new value.
    ///
    /// # Panics
    ///
    /// Panics when `bytes.len() != Self::LEN`.
    fn from_slice(bytes: &[u8]) -> Self {
        let mut out = Self::zeroed();
        out.as_mut().copy_from_slice(bytes);
        out
    }
}

impl<const N: usize> Bytes for [u8; N] {
    const LEN: usize = N;

    #[inline(always)]
    fn zeroed() -> Self {
        [0u8; N]
    }
}

/// Compile-time description of one SHA family member.
pub trait Variant: Copy + Debug + Default + Eq + Hash + Send + Sync + 'static {
    /// Message/state word.
    type Word: Word;
    /// One input block.
    type Block: Bytes;
    /// Half of a block.
    type Half: Bytes;
    /// Finalized output.
    type Digest: Bytes;

    /// Display name.
    const NAME: &'static str;
    /// Round function family.
    const FAMILY: Family;
    /// Number of compression rounds.
    const ROUNDS: usize;
    /// Words of the state the round function touches (the rest stay zero).
    const STATE_USED: usize;
    /// Words of the state emitted as the digest.
    const DIGEST_WORDS: usize;
    /// Width of the big-endian bit-count field in the final block.
    const COUNT_BYTES: usize;
    /// Round constants, one per round.
    const K: &'static [Self::Word];
    /// Initial state.
    const H: State<Self>;
    /// Schedule sigma0.
    const SMALL_SIGMA0: Sigma;
    /// Schedule sigma1.
    const SMALL_SIGMA1: Sigma;
    /// Round Sigma0.
    const BIG_SIGMA0: Sigma;
    /// Round Sigma1.
    const BIG_SIGMA1: Sigma;

    /// Word width in bytes.
    const WORD_BYTES: usize = <Self::Word as Word>::BYTES;
    /// Block size in bytes.
    const BLOCK_BYTES: usize = BLOCK_WORDS * Self::WORD_BYTES;
    /// Half-block size in bytes.
    const CHUNK_BYTES: usize = CHUNK_WORDS * Self::WORD_BYTES;
    /// Digest size in bytes.
    const DIGEST_BYTES: usize = Self::DIGEST_WORDS * Self::WORD_BYTES;
    /// Whether a digest fills exactly one half-block, which double hashing
    /// and Merkle pairing require.
    const DOUBLE: bool = Self::DIGEST_BYTES == Self::CHUNK_BYTES;

    /// Descriptor consistency, evaluated wherever the engine is instantiated.
    const VALID: () = {
        assert!(Self::K.len() == Self::ROUNDS, "one round constant per round");
        assert!(Self::ROUNDS <= MAX_ROUNDS && Self::ROUNDS > BLOCK_WORDS);
        assert!(Self::STATE_USED <= STATE_WORDS);
        assert!(Self::DIGEST_WORDS <= Self::STATE_USED);
        assert!(Self::COUNT_BYTES <= 16 && Self::COUNT_BYTES % Self::WORD_BYTES == 0);
        assert!(<Self::Block as Bytes>::LEN == Self::BLOCK_BYTES, "block size");
        assert!(<Self::Half as Bytes>::LEN == Self::CHUNK_BYTES, "half-block size");
        assert!(<Self::Digest as Bytes>::LEN == Self::DIGEST_BYTES, "digest size");
    };

    /// Hardware compression kernel usable under `caps`, if any.
    fn native(caps: &Capabilities) -> Option<NativeCompress<Self>> {
        let _ = caps;
        None
    }
}

/// SHA-1 (160-bit digest).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Sha160;

/// SHA-256.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Sha256;

/// SHA-512.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Sha512;

const K160: [u32; 80] = {
    let groups = [0x5a827999, 0x6ed9eba1, 0x8f1bbcdc, 0xca62c1d6];
    let mut k = [0u32; 80];
    let mut i = 0;
    while i < k.len() {
        k[i] = groups[i / 20];
        i += 1;
    }
    k
};

const K256: [u32; 64] = [
    0x428a2f98, 0x71374491, 0xb5c0fbcf, 0xe9b5dba5, 0x3956c25b, 0x59f111f1, 0x923f82a4, 0xab1c5ed5,
    0xd807aa98, 0x12835b01, 0x243185be, 0x550c7dc3, 0x72be5d74, 0x80deb1fe, 0x9bdc06a7, 0xc19bf174,
    0xe49b69c1, 0xefbe4786, 0x0fc19dc6, 0x240ca1cc, 0x2de92c6f, 0x4a7484aa, 0x5cb0a9dc, 0x76f988da,
    0x983e5152, 0xa831c66d, 0xb00327c8, 0xbf597fc7, 0xc6e00bf3, 0xd5a79147, 0x06ca6351, 0x14292967,
    0x27b70a85, 0x2e1b2138, 0x4d2c6dfc, 0x53380d13, 0x650a7354, 0x766a0abb, 0x81c2c92e, 0x92722c85,
    0xa2bfe8a1, 0xa81a664b, 0xc24b8b70, 0xc76c51a3, 0xd192e819, 0xd6990624, 0xf40e3585, 0x106aa070,
    0x19a4c116, 0x1e376c08, 0x2748774c, 0x34b0bcb5, 0x391c0cb3, 0x4ed8aa4a, 0x5b9cca4f, 0x682e6ff3,
    0x748f82ee, 0x78a5636f, 0x84c87814, 0x8cc70208, 0x90befffa, 0xa4506ceb, 0xbef9a3f7, 0xc67178f2,
];

const K512: [u64; 80] = [
    0x428a2f98d728ae22, 0x7137449123ef65cd, 0xb5c0fbcfec4d3b2f, 0xe9b5dba58189dbbc,
    0x3956c25bf348b538, 0x59f111f1b605d019, 0x923f82a4af194f9b, 0xab1c5ed5da6d8118,
    0xd807aa98a3030242, 0x12835b0145706fbe, 0x243185be4ee4b28c, 0x550c7dc3d5ffb4e2,
    0x72be5d74f27b896f, 0x80deb1fe3b1696b1, 0x9bdc06a725c71235, 0xc19bf174cf692694,
    0xe49b69c19ef14ad2, 0xefbe4786384f25e3, 0x0fc19dc68b8cd5b5, 0x240ca1cc77ac9c65,
    0x2de92c6f592b0275, 0x4a7484aa6ea6e483, 0x5cb0a9dcbd41fbd4, 0x76f988da831153b5,
    0x983e5152ee66dfab, 0xa831c66d2db43210, 0xb00327c898fb213f, 0xbf597fc7beef0ee4,
    0xc6e00bf33da88fc2, 0xd5a79147930aa725, 0x06ca6351e003826f, 0x142929670a0e6e70,
    0x27b70a8546d22ffc, 0x2e1b21385c26c926, 0x4d2c6dfc5ac42aed, 0x53380d139d95b3df,
    0x650a73548baf63de, 0x766a0abb3c77b2a8, 0x81c2c92e47edaee6, 0x92722c851482353b,
    0xa2bfe8a14cf10364, 0xa81a664bbc423001, 0xc24b8b70d0f89791, 0xc76c51a30654be30,
    0xd192e819d6ef5218, 0xd69906245565a910, 0xf40e35855771202a, 0x106aa07032bbd1b8,
    0x19a4c116b8d2d0c8, 0x1e376c085141ab53, 0x2748774cdf8eeb99, 0x34b0bcb5e19b48a8,
    0x391c0cb3c5c95a63, 0x4ed8aa4ae3418acb, 0x5b9cca4f7763e373, 0x682e6ff3d6b2b8a3,
    0x748f82ee5defb2fc, 0x78a5636f43172f60, 0x84c87814a1f0ab72, 0x8cc702081a6439ec,
    0x90befffa23631e28, 0xa4506cebde82bde9, 0xbef9a3f7b2c67915, 0xc67178f2e372532b,
    0xca273eceea26619c, 0xd186b8c721c0c207, 0xeada7dd6cde0eb1e, 0xf57d4f7fee6ed178,
    0x06f067aa72176fba, 0x0a637dc5a2c898a6, 0x113f9804bef90dae, 0x1b710b35131c471b,
    0x28db77f523047d84, 0x32caab7b40c72493, 0x3c9ebe0a15c9bebc, 0x431d67c49c100d4c,
    0x4cc5d4becb3e42b6, 0x597f299cfc657e2a, 0x5fcb6fab3ad6faec, 0x6c44198c4a475817,
];

impl Variant for Sha160 {
    type Word = u32;
    type Block = [u8; 64];
    type Half = [u8; 32];
    type Digest = [u8; 20];

    const NAME: &'static str = "sha160";
    const FAMILY: Family = Family::Sha1;
    const ROUNDS: usize = 80;
    const STATE_USED: usize = 5;
    const DIGEST_WORDS: usize = 5;
    const COUNT_BYTES: usize = 8;
    const K: &'static [u32] = &K160;
    const H: State<Self> = [
        0x67452301, 0xefcdab89, 0x98badcfe, 0x10325476, 0xc3d2e1f0, 0, 0, 0,
    ];
    const SMALL_SIGMA0: Sigma = Sigma::UNUSED;
    const SMALL_SIGMA1: Sigma = Sigma::UNUSED;
    const BIG_SIGMA0: Sigma = Sigma::UNUSED;
    const BIG_SIGMA1: Sigma = Sigma::UNUSED;
}

impl Variant for Sha256 {
    type Word = u32;
    type Block = [u8; 64];
    type Half = [u8; 32];
    type Digest = [u8; 32];

    const NAME: &'static str = "sha256";
    const FAMILY: Family = Family::Sha2;
    const ROUNDS: usize = 64;
    const STATE_USED: usize = 8;
    const DIGEST_WORDS: usize = 8;
    const COUNT_BYTES: usize = 8;
    const K: &'static [u32] = &K256;
    const H: State<Self> = [
        0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
    ];
    const SMALL_SIGMA0: Sigma = Sigma::new(7, 18, 3);
    const SMALL_SIGMA1: Sigma = Sigma::new(17, 19, 10);
    const BIG_SIGMA0: Sigma = Sigma::new(2, 13, 22);
    const BIG_SIGMA1: Sigma = Sigma::new(6, 11, 25);

    fn native(caps: &Capabilities) -> Option<NativeCompress<Self>> {
        crate::native::sha256_kernel(caps)
    }
}

impl Variant for Sha512 {
    type Word = u64;
    type Block = [u8; 128];
    type Half = [u8; 64];
    type Digest = [u8; 64];

    const NAME: &'static str = "sha512";
    const FAMILY: Family = Family::Sha2;
    const ROUNDS: usize = 80;
    const STATE_USED: usize = 8;
    const DIGEST_WORDS: usize = 8;
    const COUNT_BYTES: usize = 16;
    const K: &'static [u64] = &K512;
    const H: State<Self> = [
        0x6a09e667f3bcc908,
        0xbb67ae8584caa73b,
        0x3c6ef372fe94f82b,
        0xa54ff53a5f1d36f1,
        0x510e527fade682d1,
        0x9b05688c2b3e6c1f,
        0x1f83d9abfb41bd6b,
        0x5be0cd19137e2179,
    ];
    const SMALL_SIGMA0: Sigma = Sigma::new(1, 8, 7);
    const SMALL_SIGMA1: Sigma = Sigma::new(19, 61, 6);
    const BIG_SIGMA0: Sigma = Sigma::new(28, 34, 39);
    const BIG_SIGMA1: Sigma = Sigma::new(14, 18, 41);
}
