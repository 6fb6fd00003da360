//! AtomicBloomFilter — in-memory фильтр для конкурентных writer'ов.
//!
//! BloomFilter/PersistentFilter требуют &mut self на add: два параллельных
//! read-modify-write одного байта могут потерять бит. Здесь байты — AtomicU8,
//! add(&self) ставит биты через fetch_or, поэтому фильтр Sync и бит не теряется.
//! Раскладка битов и хэши те же, что у BloomFilter.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::bits::{byte_len_for, clamp_bits, HeapBits};
use crate::filter::{normalize_hashes, BloomFilter, Filter};
use crate::hash::{positions, HashKind, HASH_KINDS_DEFAULT};
use crate::metrics::{record_add, record_check};

#[derive(Debug)]
pub struct AtomicBloomFilter {
    bytes: Box<[AtomicU8]>,
    m: u32,
    hashes: Vec<HashKind>,
}

impl AtomicBloomFilter {
    pub fn new(m: u32) -> Self {
        Self::with_hashes(m, &HASH_KINDS_DEFAULT)
    }

    pub fn with_hashes(m: u32, hashes: &[HashKind]) -> Self {
        let m = clamp_bits(m);
        let bytes = (0..byte_len_for(m)).map(|_| AtomicU8::new(0)).collect();
        Self {
            bytes,
            m,
            hashes: normalize_hashes(hashes),
        }
    }

    pub fn add(&self, key: &[u8]) {
        for pos in positions(&self.hashes, key, self.m) {
            let mask = 1u8 << (pos % 8);
            self.bytes[(pos / 8) as usize].fetch_or(mask, Ordering::Relaxed);
        }
        record_add();
    }

    pub fn check(&self, key: &[u8]) -> bool {
        let hit = positions(&self.hashes, key, self.m).all(|pos| {
            let mask = 1u8 << (pos % 8);
            self.bytes[(pos / 8) as usize].load(Ordering::Relaxed) & mask != 0
        });
        record_check(hit);
        hit
    }

    #[inline]
    pub fn bit_len(&self) -> u32 {
        self.m
    }

    #[inline]
    pub fn hash_kinds(&self) -> &[HashKind] {
        &self.hashes
    }

    /// Снимок в обычный BloomFilter (конкурентные add во время снимка могут
    /// попасть в него частично).
    pub fn to_filter(&self) -> BloomFilter {
        let snap: Vec<u8> = self
            .bytes
            .iter()
            .map(|b| b.load(Ordering::Acquire))
            .collect();
        Filter::from_store(HeapBits::from_bytes(&snap, self.m), &self.hashes)
    }
}
