//! Merkle roots computed by every engine against a naive level-by-level
//! reference built from the scalar double hash.

use sha::{Capabilities, Config, Engine, Policy, Sha256, Sha512, Variant};
use sha2::Digest as _;

fn leaves<V: Variant>(count: usize) -> Vec<V::Digest> {
    let engine = Engine::<V>::scalar();
    (0..count)
        .map(|i| engine.hash_message(format!("leaf {i}").as_bytes()))
        .collect()
}

fn reference_root<V: Variant>(mut level: Vec<V::Digest>) -> V::Digest {
    let scalar = Engine::<V>::scalar();
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(*level.last().expect("non-empty level"));
        }
        level = level
            .chunks(2)
            .map(|pair| scalar.double_hash_message(&[pair[0].as_ref(), pair[1].as_ref()].concat()))
            .collect();
    }
    level[0]
}

fn engines<V: Variant>() -> Vec<Engine<V>> {
    let caps = Capabilities::detect();
    let mut engines = vec![Engine::<V>::scalar(), Engine::<V>::detect()];
    for lanes in [2, 4, 8, 16] {
        let config = Config::new(Policy::Vector).with_lanes(lanes).expect("valid lanes");
        if let Ok(engine) = Engine::<V>::new(config, caps) {
            engines.push(engine);
        }
    }
    engines
}

fn check_counts<V: Variant>() {
    for count in (1..40).chain([63, 64, 65, 127, 128, 129, 500]) {
        let digests = leaves::<V>(count);
        let expected = reference_root::<V>(digests.clone());
        for engine in engines::<V>() {
            assert_eq!(
                engine.merkle_root(digests.clone()),
                expected,
                "{} count {count} on {} tier ({} lanes)",
                V::NAME,
                engine.tier(),
                engine.lanes()
            );
        }
    }
}

#[test]
fn sha256_roots_agree_across_engines() {
    check_counts::<Sha256>();
}

#[test]
fn sha512_roots_agree_across_engines() {
    check_counts::<Sha512>();
}

#[test]
fn single_digest_is_returned_unchanged() {
    let leaf = leaves::<Sha512>(1)[0];
    assert_eq!(sha::merkle_root::<Sha512>(vec![leaf]), leaf);
}

#[test]
fn pair_root_is_double_sha256_of_concatenation() {
    let l = leaves::<Sha256>(2);
    let mut joined = Vec::with_capacity(64);
    joined.extend_from_slice(&l[0]);
    joined.extend_from_slice(&l[1]);
    let expected = sha2::Sha256::digest(sha2::Sha256::digest(&joined));

    assert_eq!(sha::merkle_root::<Sha256>(l).as_slice(), expected.as_slice());
}

#[test]
fn three_digests_duplicate_the_third() {
    let engine = Engine::<Sha256>::detect();
    let l = leaves::<Sha256>(3);
    let left = engine.double_hash_pair(&l[0], &l[1]);
    let right = engine.double_hash_pair(&l[2], &l[2]);
    assert_eq!(engine.merkle_root(l), engine.double_hash_pair(&left, &right));
}

#[test]
fn root_depends_on_leaf_order() {
    let engine = Engine::<Sha256>::detect();
    let l = leaves::<Sha256>(4);
    let mut swapped = l.clone();
    swapped.swap(0, 1);
    assert_ne!(engine.merkle_root(l), engine.merkle_root(swapped));
}
