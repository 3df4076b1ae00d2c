//! Merkle root reduction.
//!
//! Each level pairs adjacent digests left to right, duplicating the last
//! digest of an odd level, and replaces each pair with the double hash of
//! `left || right`. A single digest is its own root.

use logging::trace_merkle;

use crate::dispatch::{Engine, join};
use crate::variant::Variant;

impl<V: Variant> Engine<V> {
    /// Reduces `digests` to its Merkle root in place.
    ///
    /// On return `digests` holds exactly the root. Each level writes its
    /// results over the front of the list, so no level allocates a new digest
    /// list.
    ///
    /// # Panics
    ///
    /// Panics when `digests` is empty.
    pub fn merkle_hash(&self, digests: &mut Vec<V::Digest>) {
        const { assert!(V::DOUBLE, "merkle pairing needs a digest of one chunk") };
        assert!(!digests.is_empty(), "merkle root of an empty digest list");

        let mut pairs: Vec<V::Block> = Vec::with_capacity(digests.len().div_ceil(2));
        let mut level: Vec<V::Digest> = Vec::with_capacity(pairs.capacity());
        let mut depth = 0usize;

        while digests.len() > 1 {
            if digests.len() % 2 == 1 {
                let last = digests[digests.len() - 1];
                digests.push(last);
            }

            pairs.clear();
            pairs.extend(
                digests
                    .chunks_exact(2)
                    .map(|pair| join::<V>(pair[0].as_ref(), pair[1].as_ref())),
            );

            level.clear();
            let batched = self
                .vector_engine()
                .map_or(0, |vector| vector.double_hash_each::<V>(&pairs, &mut level));

            digests[..batched].copy_from_slice(&level);
            for (slot, pair) in digests.iter_mut().zip(&pairs).skip(batched) {
                *slot = self.double_hash_block(pair);
            }
            digests.truncate(pairs.len());

            depth += 1;
            trace_merkle!(
                "{} merkle level {}: {} nodes ({} batched)",
                V::NAME,
                depth,
                digests.len(),
                batched
            );
        }
    }

    /// Merkle root of `digests`.
    ///
    /// # Panics
    ///
    /// Panics when `digests` is empty.
    pub fn merkle_root(&self, mut digests: Vec<V::Digest>) -> V::Digest {
        self.merkle_hash(&mut digests);
        digests[0]
    }
}
