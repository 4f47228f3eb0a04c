//! MurmurHash3 (x86, 32-bit) over arbitrary byte spans.
//!
//! Every digest the integrity layer stores or compares is produced here.
//! The algorithm and its constants are fixed: a digest computed by a
//! different hash is never comparable with one computed by this module.

use serde::{Deserialize, Serialize};
use std::fmt;

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;
const ROUND_ADD: u32 = 0xe654_6b64;
const FMIX1: u32 = 0x85eb_ca6b;
const FMIX2: u32 = 0xc2b2_ae35;

/// Seed used for every stack digest unless the config overrides it.
pub const DEFAULT_SEED: u32 = 52;

/// A 32-bit digest.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest32(pub u32);

impl Digest32 {
    /// The zero digest (stored before the first computation).
    pub const ZERO: Self = Self(0);

    /// Get the raw value.
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Convert to big-endian hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0.to_be_bytes())
    }
}

impl fmt::Debug for Digest32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest32({:#010x})", self.0)
    }
}

impl fmt::Display for Digest32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl From<u32> for Digest32 {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Hash `data` with `seed`.
pub fn murmur3_32(data: &[u8], seed: u32) -> Digest32 {
    let mut hasher = Murmur3::new(seed);
    hasher.update(data);
    hasher.finish()
}

#[inline]
fn scramble(mut k: u32) -> u32 {
    k = k.wrapping_mul(C1);
    k = k.rotate_left(15);
    k.wrapping_mul(C2)
}

#[inline]
fn fmix(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(FMIX1);
    h ^= h >> 13;
    h = h.wrapping_mul(FMIX2);
    h ^ (h >> 16)
}

/// Streaming form of [`murmur3_32`].
///
/// Feeding the same bytes in any number of `update` calls yields the same
/// digest as one call over the concatenation.
#[derive(Debug, Clone)]
pub struct Murmur3 {
    h: u32,
    tail: [u8; 4],
    tail_len: usize,
    total_len: u64,
}

impl Murmur3 {
    /// Create a hasher with the given seed.
    pub fn new(seed: u32) -> Self {
        Self {
            h: seed,
            tail: [0; 4],
            tail_len: 0,
            total_len: 0,
        }
    }

    #[inline]
    fn mix_block(&mut self, block: [u8; 4]) {
        self.h ^= scramble(u32::from_le_bytes(block));
        self.h = self.h.rotate_left(13);
        self.h = self.h.wrapping_mul(5).wrapping_add(ROUND_ADD);
    }

    /// Absorb more input.
    pub fn update(&mut self, mut data: &[u8]) {
        self.total_len += data.len() as u64;

        if self.tail_len > 0 {
            let take = (4 - self.tail_len).min(data.len());
            self.tail[self.tail_len..self.tail_len + take].copy_from_slice(&data[..take]);
            self.tail_len += take;
            data = &data[take..];
            if self.tail_len < 4 {
                return;
            }
            let block = self.tail;
            self.mix_block(block);
            self.tail_len = 0;
        }

        let mut chunks = data.chunks_exact(4);
        for chunk in &mut chunks {
            self.mix_block([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        let rest = chunks.remainder();
        self.tail[..rest.len()].copy_from_slice(rest);
        self.tail_len = rest.len();
    }

    /// Finish and return the digest.
    pub fn finish(&self) -> Digest32 {
        let mut h = self.h;

        if self.tail_len > 0 {
            let mut k = 0u32;
            for &byte in self.tail[..self.tail_len].iter().rev() {
                k = (k << 8) | u32::from(byte);
            }
            h ^= scramble(k);
        }

        // Only the low 32 bits of the length take part, as in the reference.
        h ^= self.total_len as u32;
        Digest32(fmix(h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(murmur3_32(b"", 0), Digest32(0));
        assert_eq!(murmur3_32(b"", 1), Digest32(0x514e_28b7));
        assert_eq!(murmur3_32(b"", 0xffff_ffff), Digest32(0x81f1_6f39));
    }

    #[test]
    fn test_tail_lengths() {
        let seed = 0x9747_b28c;
        assert_eq!(murmur3_32(b"a", seed), Digest32(0x7fa0_9ea6));
        assert_eq!(murmur3_32(b"aa", seed), Digest32(0x5d21_1726));
        assert_eq!(murmur3_32(b"aaa", seed), Digest32(0x283e_0130));
        assert_eq!(murmur3_32(b"aaaa", seed), Digest32(0x5a97_808a));
    }

    #[test]
    fn test_deterministic() {
        let data = b"the stack is the stack";
        assert_eq!(murmur3_32(data, DEFAULT_SEED), murmur3_32(data, DEFAULT_SEED));
        assert_ne!(murmur3_32(data, DEFAULT_SEED), murmur3_32(data, DEFAULT_SEED + 1));
    }

    #[test]
    fn test_streaming_byte_at_a_time() {
        let data = b"The quick brown fox jumps over the lazy dog";
        let mut hasher = Murmur3::new(0x9747_b28c);
        for byte in data {
            hasher.update(std::slice::from_ref(byte));
        }
        assert_eq!(hasher.finish(), Digest32(0x2fa8_26cd));
    }

    #[test]
    fn test_finish_is_idempotent() {
        let mut hasher = Murmur3::new(7);
        hasher.update(b"abcde");
        assert_eq!(hasher.finish(), hasher.finish());
    }

    #[test]
    fn test_digest_display() {
        assert_eq!(format!("{}", Digest32(0xdead_beef)), "0xdeadbeef");
        assert_eq!(Digest32(0x0102_0304).to_hex(), "01020304");
    }

    proptest! {
        #[test]
        fn test_streaming_matches_one_shot(
            data in prop::collection::vec(any::<u8>(), 0..256),
            split in any::<prop::sample::Index>(),
            seed in any::<u32>(),
        ) {
            let at = split.index(data.len() + 1);
            let mut hasher = Murmur3::new(seed);
            hasher.update(&data[..at]);
            hasher.update(&data[at..]);
            prop_assert_eq!(hasher.finish(), murmur3_32(&data, seed));
        }
    }
}
