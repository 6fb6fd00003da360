//! persist/ops — операции над PersistentFilter:
//! - add / check (тот же Filter<S>, что и в RAM)
//! - flush / flush_async
//! - инспекция (bit_len/byte_len/count_ones/fill_ratio/...)
//! - Drop: flush, если включён flush_on_drop

use anyhow::{Context, Result};
use log::{debug, error};
use std::path::Path;

use crate::bits::HeapBits;
use crate::filter::{BloomFilter, Filter};
use crate::hash::HashKind;
use crate::metrics::record_persist_flush;

use super::PersistentFilter;

impl PersistentFilter {
    /// Поставить все биты ключа прямо в mmap.
    #[inline]
    pub fn add(&mut self, key: &[u8]) {
        self.filter.add(key);
    }

    #[inline]
    pub fn check(&self, key: &[u8]) -> bool {
        self.filter.check(key)
    }

    /// Синхронный msync: после Ok(()) изменения на диске.
    pub fn flush(&self) -> Result<()> {
        self.filter
            .store
            .mmap
            .flush()
            .with_context(|| format!("bloom flush {}", self.path.display()))?;
        record_persist_flush();
        debug!("bloom: flushed {}", self.path.display());
        Ok(())
    }

    /// Асинхронный msync (запись инициирована, но не дождались).
    pub fn flush_async(&self) -> Result<()> {
        self.filter
            .store
            .mmap
            .flush_async()
            .with_context(|| format!("bloom flush_async {}", self.path.display()))?;
        Ok(())
    }

    /// Копия текущих битов в in-memory фильтр (те же m и хэши).
    pub fn to_memory(&self) -> BloomFilter {
        let m = self.filter.bit_len();
        let bits = HeapBits::from_bytes(self.filter.as_bytes(), m);
        Filter::from_store(bits, self.filter.hash_kinds())
    }

    // -------- Публичные геттеры --------

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn bit_len(&self) -> u32 {
        self.filter.bit_len()
    }

    #[inline]
    pub fn byte_len(&self) -> usize {
        self.filter.byte_len()
    }

    #[inline]
    pub fn hash_kinds(&self) -> &[HashKind] {
        self.filter.hash_kinds()
    }

    /// Биты фильтра (без хвоста файла сверх byte_len).
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.filter.as_bytes()
    }

    pub fn count_ones(&self) -> u64 {
        self.filter.count_ones()
    }

    pub fn fill_ratio(&self) -> f64 {
        self.filter.fill_ratio()
    }

    pub fn estimated_fpp(&self) -> f64 {
        self.filter.estimated_fpp()
    }

    /// Держит ли фильтр writer lock `<path>.lock`.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }

    /// Путь lock-файла, если lock взят.
    pub fn lock_path(&self) -> Option<&Path> {
        self.lock.as_ref().map(|g| g.path())
    }
}

impl Drop for PersistentFilter {
    fn drop(&mut self) {
        if self.flush_on_drop {
            if let Err(e) = self.flush() {
                error!("{:#}", e);
            }
        }
    }
}
