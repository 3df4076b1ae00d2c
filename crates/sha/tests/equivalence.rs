//! Every tier and lane width must agree with the scalar engine block for
//! block.

use proptest::prelude::*;
use sha::vector;
use sha::{Capabilities, Config, Engine, Policy, Sha160, Sha256, Sha512, Tier, Variant, scalar};

fn scalar_single<V: Variant>(block: &V::Block) -> V::Digest {
    Engine::<V>::scalar().hash_block(block)
}

fn check_lane_kernels<V: Variant, const L: usize>(blocks: &[V::Block]) {
    let (groups, _) = blocks.as_chunks::<L>();
    for group in groups {
        let digests = vector::hash_each::<V, L>(group);
        for (block, digest) in group.iter().zip(digests) {
            assert_eq!(digest, scalar_single::<V>(block), "{} L={L}", V::NAME);
        }

        let mut expected = V::H;
        scalar::compress_blocks::<V>(&mut expected, group);
        let mut state = V::H;
        vector::compress_sequential::<V, L>(&mut state, group);
        assert_eq!(state, expected, "{} sequential L={L}", V::NAME);
    }
}

fn check_double_kernels<V: Variant, const L: usize>(blocks: &[V::Block]) {
    let scalar = Engine::<V>::scalar();
    let (groups, _) = blocks.as_chunks::<L>();
    for group in groups {
        let digests = vector::double_hash_each::<V, L>(group);
        for (block, digest) in group.iter().zip(digests) {
            assert_eq!(digest, scalar.double_hash_block(block), "{} L={L}", V::NAME);
        }
    }
}

fn all_lane_widths<V: Variant>(blocks: &[V::Block]) {
    check_lane_kernels::<V, 2>(blocks);
    check_lane_kernels::<V, 4>(blocks);
    check_lane_kernels::<V, 8>(blocks);
    check_lane_kernels::<V, 16>(blocks);
}

fn forced_engines<V: Variant>() -> Vec<Engine<V>> {
    let caps = Capabilities::detect();
    let mut engines = Vec::new();
    for policy in Policy::ALL {
        if let Ok(engine) = Engine::<V>::new(Config::new(policy), caps) {
            engines.push(engine);
        }
    }
    for lanes in [2, 4, 8, 16] {
        let config = Config::new(Policy::Vector).with_lanes(lanes).expect("valid lanes");
        if let Ok(engine) = Engine::<V>::new(config, caps) {
            engines.push(engine);
        }
    }
    engines
}

fn check_engines<V: Variant>(blocks: &[V::Block]) {
    let scalar = Engine::<V>::scalar();
    let expected_each: Vec<V::Digest> = blocks.iter().map(|b| scalar.hash_block(b)).collect();
    let expected_seq = scalar.hash_blocks(blocks);

    for engine in forced_engines::<V>() {
        assert_eq!(engine.hash_each(blocks), expected_each, "{} {}", V::NAME, engine.tier());
        assert_eq!(engine.hash_blocks(blocks), expected_seq, "{} {}", V::NAME, engine.tier());
    }
}

fn to_blocks<V: Variant>(bytes: &[u8]) -> Vec<V::Block> {
    bytes
        .chunks_exact(V::BLOCK_BYTES)
        .map(<V::Block as sha::Bytes>::from_slice)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn sha256_lanes_match_scalar(bytes in proptest::collection::vec(any::<u8>(), 64 * 16..64 * 40)) {
        let blocks = to_blocks::<Sha256>(&bytes);
        all_lane_widths::<Sha256>(&blocks);
        check_double_kernels::<Sha256, 4>(&blocks);
        check_double_kernels::<Sha256, 8>(&blocks);
        check_engines::<Sha256>(&blocks);
    }

    #[test]
    fn sha512_lanes_match_scalar(bytes in proptest::collection::vec(any::<u8>(), 128 * 16..128 * 24)) {
        let blocks = to_blocks::<Sha512>(&bytes);
        all_lane_widths::<Sha512>(&blocks);
        check_double_kernels::<Sha512, 2>(&blocks);
        check_double_kernels::<Sha512, 16>(&blocks);
        check_engines::<Sha512>(&blocks);
    }

    #[test]
    fn sha160_lanes_match_scalar(bytes in proptest::collection::vec(any::<u8>(), 64 * 16..64 * 24)) {
        let blocks = to_blocks::<Sha160>(&bytes);
        all_lane_widths::<Sha160>(&blocks);
        check_engines::<Sha160>(&blocks);
    }

    #[test]
    fn native_state_matches_scalar(
        state in any::<[u32; 8]>(),
        block in proptest::collection::vec(any::<u8>(), 64)
    ) {
        let block: [u8; 64] = block.try_into().expect("64 bytes");
        let caps = Capabilities::detect();
        if let Ok(native) = Engine::<Sha256>::new(Config::new(Policy::Native), caps) {
            prop_assert_eq!(native.tier(), Tier::Native);
            let mut expected = state;
            scalar::compress_block::<Sha256>(&mut expected, &block);
            let mut actual = state;
            native.compress_blocks(&mut actual, &[block]);
            prop_assert_eq!(actual, expected);
        }
    }
}

#[test]
fn remainders_fall_back_to_scalar() {
    let blocks: Vec<[u8; 64]> = (0..19u8).map(|i| [i.wrapping_mul(37); 64]).collect();
    check_engines::<Sha256>(&blocks);
    for len in 0..blocks.len() {
        check_engines::<Sha256>(&blocks[..len]);
    }
}
