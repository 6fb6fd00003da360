//! Stable 32-bit hashing for filter keys.
//!
//! Goals:
//! - Stateless hash functions: `fn(&[u8]) -> u32`, никакого внутреннего состояния
//!   между ключами (нечего сбрасывать).
//! - Stable, explicit algorithms (not std::DefaultHasher), so bit positions are
//!   invariant across toolchains/platforms and a persisted filter can be reopened.
//! - Each kind has a textual name (config/CLI); в файле фильтра kind не хранится.

use anyhow::{anyhow, Result};
use std::hash::Hasher;
use std::str::FromStr;
use twox_hash::XxHash32;

/// Hash strategy used to derive one bit position per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashKind {
    /// FNV-1 32-bit (multiply, then xor).
    Fnv1_32,
    /// MurmurHash3 x86_32 with seed=0.
    Murmur3_32,
    /// xxHash32 with seed=0.
    Xx32Seed0,
}

impl HashKind {
    /// Short name used by config/CLI (`fnv1`, `murmur3`, `xx32`).
    pub fn name(self) -> &'static str {
        match self {
            HashKind::Fnv1_32 => "fnv1",
            HashKind::Murmur3_32 => "murmur3",
            HashKind::Xx32Seed0 => "xx32",
        }
    }
}

impl FromStr for HashKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fnv1" | "fnv" | "fnv1-32" => Ok(HashKind::Fnv1_32),
            "murmur3" | "murmur" | "murmur3-32" => Ok(HashKind::Murmur3_32),
            "xx32" | "xxhash32" => Ok(HashKind::Xx32Seed0),
            other => Err(anyhow!("unknown hash kind '{}'", other)),
        }
    }
}

/// Default hash list for new filters: FNV-1 + MurmurHash3 (k=2).
pub const HASH_KINDS_DEFAULT: [HashKind; 2] = [HashKind::Fnv1_32, HashKind::Murmur3_32];

/// Parse a comma-separated list of hash names ("fnv1,murmur3").
/// Strict: any unknown name is an error; an empty list is an error.
pub fn parse_hash_list(s: &str) -> Result<Vec<HashKind>> {
    let kinds = s
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(HashKind::from_str)
        .collect::<Result<Vec<_>>>()?;
    if kinds.is_empty() {
        return Err(anyhow!("hash list must not be empty"));
    }
    Ok(kinds)
}

/// Compute 32-bit stable hash of a key for given kind.
pub fn hash32(kind: HashKind, key: &[u8]) -> u32 {
    match kind {
        HashKind::Fnv1_32 => fnv1_32(key),
        HashKind::Murmur3_32 => murmur3_32(key, 0),
        HashKind::Xx32Seed0 => {
            let mut h = XxHash32::with_seed(0);
            h.write(key);
            h.finish() as u32
        }
    }
}

/// Reduce a hash value to a bit position in `[0, m)`.
#[inline]
pub fn bit_position(hash: u32, m: u32) -> u32 {
    debug_assert!(m > 0, "m must be > 0");
    hash % m
}

/// Bit positions of a key: one per hash kind, in configuration order.
#[inline]
pub fn positions<'a>(
    kinds: &'a [HashKind],
    key: &'a [u8],
    m: u32,
) -> impl Iterator<Item = u32> + 'a {
    kinds.iter().map(move |&k| bit_position(hash32(k, key), m))
}

const FNV32_OFFSET: u32 = 0x811C_9DC5;
const FNV32_PRIME: u32 = 0x0100_0193;

fn fnv1_32(key: &[u8]) -> u32 {
    let mut h = FNV32_OFFSET;
    for &b in key {
        h = h.wrapping_mul(FNV32_PRIME);
        h ^= b as u32;
    }
    h
}

fn murmur3_32(key: &[u8], seed: u32) -> u32 {
    const C1: u32 = 0xCC9E_2D51;
    const C2: u32 = 0x1B87_3593;

    let mut h = seed;
    let mut blocks = key.chunks_exact(4);
    for b in &mut blocks {
        let k = u32::from_le_bytes([b[0], b[1], b[2], b[3]]);
        h ^= murmur3_mix_k(k, C1, C2);
        h = h.rotate_left(13).wrapping_mul(5).wrapping_add(0xE654_6B64);
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let mut k = 0u32;
        for (i, &b) in tail.iter().enumerate() {
            k |= (b as u32) << (8 * i);
        }
        h ^= murmur3_mix_k(k, C1, C2);
    }

    h ^= key.len() as u32;
    fmix32(h)
}

#[inline]
fn murmur3_mix_k(k: u32, c1: u32, c2: u32) -> u32 {
    k.wrapping_mul(c1).rotate_left(15).wrapping_mul(c2)
}

#[inline]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85EB_CA6B);
    h ^= h >> 13;
    h = h.wrapping_mul(0xC2B2_AE35);
    h ^= h >> 16;
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv1_known_vectors() {
        assert_eq!(hash32(HashKind::Fnv1_32, b""), 0x811C_9DC5);
        assert_eq!(hash32(HashKind::Fnv1_32, b"a"), 0x050C_5D7E);
        assert_eq!(hash32(HashKind::Fnv1_32, b"foobar"), 0x31F0_B262);
    }

    #[test]
    fn murmur3_known_vectors() {
        assert_eq!(hash32(HashKind::Murmur3_32, b""), 0);
        assert_eq!(hash32(HashKind::Murmur3_32, b"hello"), 0x248B_FA47);
        assert_eq!(
            hash32(
                HashKind::Murmur3_32,
                b"The quick brown fox jumps over the lazy dog"
            ),
            0x2E4F_F723
        );
    }

    #[test]
    fn xx32_empty_vector() {
        assert_eq!(hash32(HashKind::Xx32Seed0, b""), 0x02CC_5D05);
    }

    #[test]
    fn names_parse_back() {
        for k in [HashKind::Fnv1_32, HashKind::Murmur3_32, HashKind::Xx32Seed0] {
            assert_eq!(k.name().parse::<HashKind>().unwrap(), k);
        }
        assert_eq!("FNV".parse::<HashKind>().unwrap(), HashKind::Fnv1_32);
        assert!("sha1".parse::<HashKind>().is_err());
    }

    #[test]
    fn parse_hash_list_strict() {
        let v = parse_hash_list(" fnv1, MURMUR3 ,xx32").unwrap();
        assert_eq!(
            v,
            vec![HashKind::Fnv1_32, HashKind::Murmur3_32, HashKind::Xx32Seed0]
        );
        assert!(parse_hash_list("").is_err());
        assert!(parse_hash_list("fnv1,nope").is_err());
    }

    #[test]
    fn positions_are_reduced_mod_m() {
        let key = b"message1";
        for m in [1u32, 7, 8, 255, 32000] {
            for p in positions(&HASH_KINDS_DEFAULT, key, m) {
                assert!(p < m);
            }
        }
        let at_one: Vec<u32> = positions(&HASH_KINDS_DEFAULT, key, 1).collect();
        assert_eq!(at_one, vec![0, 0]);
    }
}
