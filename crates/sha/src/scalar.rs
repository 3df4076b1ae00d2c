//! Reference compression engine.
//!
//! The schedule and round functions are generic over [`Lane`], so the exact
//! same code runs on a single word here and on a lane vector in
//! [`crate::vector`]. Everything else in the crate is checked against the
//! scalar instantiation.

use crate::padding;
use crate::variant::{BLOCK_WORDS, Bytes, CHUNK_WORDS, Family, MAX_ROUNDS, STATE_WORDS, State, Variant};
use crate::word::{Lane, read_words, write_words};

/// Message schedule, sized for the longest round count.
pub type Buffer<X> = [X; MAX_ROUNDS];

#[inline(always)]
fn choice<V: Variant, X: Lane<V::Word>>(x: X, y: X, z: X) -> X {
    (x & y) ^ (!x & z)
}

#[inline(always)]
fn majority<V: Variant, X: Lane<V::Word>>(x: X, y: X, z: X) -> X {
    (x & y) ^ (x & z) ^ (y & z)
}

#[inline(always)]
fn parity<V: Variant, X: Lane<V::Word>>(x: X, y: X, z: X) -> X {
    x ^ y ^ z
}

#[inline(always)]
fn small_sigma0<V: Variant, X: Lane<V::Word>>(x: X) -> X {
    let s = V::SMALL_SIGMA0;
    x.rotr(s.a) ^ x.rotr(s.b) ^ x.shr(s.c)
}

#[inline(always)]
fn small_sigma1<V: Variant, X: Lane<V::Word>>(x: X) -> X {
    let s = V::SMALL_SIGMA1;
    x.rotr(s.a) ^ x.rotr(s.b) ^ x.shr(s.c)
}

#[inline(always)]
fn big_sigma0<V: Variant, X: Lane<V::Word>>(x: X) -> X {
    let s = V::BIG_SIGMA0;
    x.rotr(s.a) ^ x.rotr(s.b) ^ x.rotr(s.c)
}

#[inline(always)]
fn big_sigma1<V: Variant, X: Lane<V::Word>>(x: X) -> X {
    let s = V::BIG_SIGMA1;
    x.rotr(s.a) ^ x.rotr(s.b) ^ x.rotr(s.c)
}

/// Fills schedule slots `16..V::ROUNDS` from the first sixteen words.
#[inline(always)]
pub fn expand<V: Variant, X: Lane<V::Word>>(buffer: &mut Buffer<X>) {
    match V::FAMILY {
        Family::Sha2 => {
            for i in BLOCK_WORDS..V::ROUNDS {
                buffer[i] = small_sigma1::<V, X>(buffer[i - 2])
                    .add(buffer[i - 7])
                    .add(small_sigma0::<V, X>(buffer[i - 15]))
                    .add(buffer[i - 16]);
            }
        }
        Family::Sha1 => {
            for i in BLOCK_WORDS..V::ROUNDS {
                buffer[i] = (buffer[i - 3] ^ buffer[i - 8] ^ buffer[i - 14] ^ buffer[i - 16]).rotl(1);
            }
        }
    }
}

/// Runs every round over an expanded schedule and feeds the result forward
/// into `state`.
#[inline(always)]
pub fn compress<V: Variant, X: Lane<V::Word>>(state: &mut [X; STATE_WORDS], buffer: &Buffer<X>) {
    match V::FAMILY {
        Family::Sha2 => compress_sha2::<V, X>(state, buffer),
        Family::Sha1 => compress_sha1::<V, X>(state, buffer),
    }
}

#[inline(always)]
fn compress_sha2<V: Variant, X: Lane<V::Word>>(state: &mut [X; STATE_WORDS], buffer: &Buffer<X>) {
    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;

    for (i, &k) in V::K.iter().enumerate() {
        let t1 = h
            .add(big_sigma1::<V, X>(e))
            .add(choice::<V, X>(e, f, g))
            .add(X::splat(k))
            .add(buffer[i]);
        let t2 = big_sigma0::<V, X>(a).add(majority::<V, X>(a, b, c));
        h = g;
        g = f;
        f = e;
        e = d.add(t1);
        d = c;
        c = b;
        b = a;
        a = t1.add(t2);
    }

    for (word, round) in state.iter_mut().zip([a, b, c, d, e, f, g, h]) {
        *word = word.add(round);
    }
}

#[inline(always)]
fn compress_sha1<V: Variant, X: Lane<V::Word>>(state: &mut [X; STATE_WORDS], buffer: &Buffer<X>) {
    let [mut a, mut b, mut c, mut d, mut e, ..] = *state;

    for (i, &k) in V::K.iter().enumerate() {
        let f = match i / 20 {
            0 => choice::<V, X>(b, c, d),
            2 => majority::<V, X>(b, c, d),
            _ => parity::<V, X>(b, c, d),
        };
        let t = a.rotl(5).add(f).add(e).add(X::splat(k)).add(buffer[i]);
        e = d;
        d = c;
        c = b.rotl(30);
        b = a;
        a = t;
    }

    for (word, round) in state.iter_mut().zip([a, b, c, d, e]) {
        *word = word.add(round);
    }
}

/// Loads a block into the first sixteen schedule words.
#[inline]
pub fn parse<V: Variant>(block: &V::Block, buffer: &mut Buffer<V::Word>) {
    read_words(block.as_ref(), &mut buffer[..BLOCK_WORDS]);
}

/// Loads two half-blocks into the first and second halves of the schedule.
#[inline]
pub fn parse_half<V: Variant>(left: &V::Half, right: &V::Half, buffer: &mut Buffer<V::Word>) {
    read_words(left.as_ref(), &mut buffer[..CHUNK_WORDS]);
    read_words(right.as_ref(), &mut buffer[CHUNK_WORDS..BLOCK_WORDS]);
}

/// Serializes the digest words of `state`, big-endian.
#[inline]
pub fn normalize<V: Variant>(state: &State<V>) -> V::Digest {
    let mut digest = V::Digest::zeroed();
    write_words(&state[..V::DIGEST_WORDS], digest.as_mut());
    digest
}

/// Compresses one block into `state`.
pub fn compress_block<V: Variant>(state: &mut State<V>, block: &V::Block) {
    let mut buffer = [V::Word::default(); MAX_ROUNDS];
    parse::<V>(block, &mut buffer);
    expand::<V, V::Word>(&mut buffer);
    compress::<V, V::Word>(state, &buffer);
}

/// Compresses `blocks` into `state` in order.
pub fn compress_blocks<V: Variant>(state: &mut State<V>, blocks: &[V::Block]) {
    for block in blocks {
        compress_block::<V>(state, block);
    }
}

/// Hashes an arbitrary-length message.
pub fn hash_message<V: Variant>(bytes: &[u8]) -> V::Digest {
    let mut state = V::H;
    let (full, tail) = padding::split_message::<V>(bytes);
    for block in padding::blocks::<V>(full) {
        compress_block::<V>(&mut state, &block);
    }
    compress_blocks::<V>(&mut state, padding::message_tail::<V>(tail, bytes.len()).as_slice());
    normalize::<V>(&state)
}
