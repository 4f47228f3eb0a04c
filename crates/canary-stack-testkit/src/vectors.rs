//! Golden MurmurHash3 (x86, 32-bit) vectors.
//!
//! Any implementation of the digest must reproduce these exactly; stored
//! snapshots and digests are only comparable across builds if it does.

use canary_stack_core::murmur3_32;

/// A golden hash vector.
#[derive(Debug, Clone, Copy)]
pub struct HashVector {
    pub name: &'static str,
    pub seed: u32,
    pub input: &'static [u8],
    pub expected: u32,
}

/// Get all golden vectors.
pub fn all_vectors() -> Vec<HashVector> {
    vec![
        HashVector {
            name: "empty, seed 0",
            seed: 0,
            input: b"",
            expected: 0,
        },
        HashVector {
            name: "empty, seed 1",
            seed: 1,
            input: b"",
            expected: 0x514e_28b7,
        },
        HashVector {
            name: "empty, seed max",
            seed: 0xffff_ffff,
            input: b"",
            expected: 0x81f1_6f39,
        },
        HashVector {
            name: "four zero bytes",
            seed: 0,
            input: b"\0\0\0\0",
            expected: 0x2362_f9de,
        },
        HashVector {
            name: "abc",
            seed: 0,
            input: b"abc",
            expected: 0xb3dd_93fa,
        },
        HashVector {
            name: "one-byte tail",
            seed: 0x9747_b28c,
            input: b"a",
            expected: 0x7fa0_9ea6,
        },
        HashVector {
            name: "two-byte tail",
            seed: 0x9747_b28c,
            input: b"aa",
            expected: 0x5d21_1726,
        },
        HashVector {
            name: "three-byte tail",
            seed: 0x9747_b28c,
            input: b"aaa",
            expected: 0x283e_0130,
        },
        HashVector {
            name: "one block",
            seed: 0x9747_b28c,
            input: b"aaaa",
            expected: 0x5a97_808a,
        },
        HashVector {
            name: "abcd",
            seed: 0x9747_b28c,
            input: b"abcd",
            expected: 0xf047_8627,
        },
        HashVector {
            name: "blocks and tail",
            seed: 0x9747_b28c,
            input: b"Hello, world!",
            expected: 0x2488_4cba,
        },
        HashVector {
            name: "utf-8",
            seed: 0x9747_b28c,
            input: "ππππππππ".as_bytes(),
            expected: 0xd580_63c1,
        },
        HashVector {
            name: "pangram",
            seed: 0x9747_b28c,
            input: b"The quick brown fox jumps over the lazy dog",
            expected: 0x2fa8_26cd,
        },
    ]
}

/// Run every vector. Returns `(name, matches, digest hex)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let digest = murmur3_32(v.input, v.seed);
            (
                v.name.to_string(),
                digest.value() == v.expected,
                digest.to_hex(),
            )
        })
        .collect()
}
