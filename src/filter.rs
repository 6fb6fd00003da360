//! Filter<S> — Add/Check поверх любого BitStore.
//!
//! - BloomFilter = Filter<HeapBits> — in-memory вариант.
//! - persist::PersistentFilter держит Filter<MmapBits> (тот же код Add/Check).
//!
//! Ключ присутствует, только если установлены ВСЕ его позиции (hash_i(key) % m).
//! Биты никогда не сбрасываются, поэтому ложных отрицаний нет.

use log::warn;

use crate::bits::{count_ones, BitStore, HeapBits};
use crate::config::BloomConfig;
use crate::hash::{positions, HashKind, HASH_KINDS_DEFAULT};
use crate::metrics::{record_add, record_check};

#[derive(Debug, Clone)]
pub struct Filter<S: BitStore> {
    pub(crate) store: S,
    pub(crate) hashes: Vec<HashKind>,
}

/// In-memory Bloom filter.
pub type BloomFilter = Filter<HeapBits>;

/// Пустой список хэшей → дефолтная пара (fnv1 + murmur3).
pub(crate) fn normalize_hashes(hashes: &[HashKind]) -> Vec<HashKind> {
    if hashes.is_empty() {
        warn!("empty hash list, falling back to default {:?}", HASH_KINDS_DEFAULT);
        HASH_KINDS_DEFAULT.to_vec()
    } else {
        hashes.to_vec()
    }
}

impl Filter<HeapBits> {
    /// Новый фильтр на max(1, m) бит с дефолтной парой хэшей. Никогда не падает.
    pub fn new(m: u32) -> Self {
        Self::with_hashes(m, &HASH_KINDS_DEFAULT)
    }

    /// Новый фильтр с явным списком хэшей (k = hashes.len()).
    pub fn with_hashes(m: u32, hashes: &[HashKind]) -> Self {
        Self::from_store(HeapBits::new(m), hashes)
    }

    pub fn with_config(cfg: &BloomConfig) -> Self {
        Self::with_hashes(cfg.bits, &cfg.hashes)
    }
}

impl<S: BitStore> Filter<S> {
    pub(crate) fn from_store(store: S, hashes: &[HashKind]) -> Self {
        Self {
            store,
            hashes: normalize_hashes(hashes),
        }
    }

    /// Поставить все биты ключа. Идемпотентно.
    pub fn add(&mut self, key: &[u8]) {
        let m = self.store.bit_len();
        for pos in positions(&self.hashes, key, m) {
            self.store.set_bit(pos);
        }
        record_add();
    }

    /// true — "возможно есть", false — "точно нет".
    pub fn check(&self, key: &[u8]) -> bool {
        let m = self.store.bit_len();
        let hit = positions(&self.hashes, key, m).all(|pos| self.store.test_bit(pos));
        record_check(hit);
        hit
    }

    /// Длина массива в битах (m после clamp).
    #[inline]
    pub fn bit_len(&self) -> u32 {
        self.store.bit_len()
    }

    #[inline]
    pub fn byte_len(&self) -> usize {
        crate::bits::byte_len_for(self.store.bit_len())
    }

    #[inline]
    pub fn hash_kinds(&self) -> &[HashKind] {
        &self.hashes
    }

    /// Биты фильтра (ровно byte_len() байт).
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.store.as_bytes()[..self.byte_len()]
    }

    pub fn count_ones(&self) -> u64 {
        count_ones(self.store.as_bytes(), self.store.bit_len())
    }

    /// Доля установленных бит, 0.0..=1.0.
    pub fn fill_ratio(&self) -> f64 {
        self.count_ones() as f64 / self.store.bit_len() as f64
    }

    /// Оценка вероятности ложного срабатывания: fill_ratio ^ k.
    pub fn estimated_fpp(&self) -> f64 {
        self.fill_ratio().powi(self.hashes.len() as i32)
    }
}
