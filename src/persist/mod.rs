//! persist — Bloom filter поверх memory-mapped файла.
//!
//! Разнесение:
//! - open.rs — создание/открытие файла и mmap (open/open_with_config).
//! - ops.rs  — операции (add/check/flush/инспекция) и Drop.
//! - mod.rs  — общие типы: MmapBits (BitStore над MmapMut) и PersistentFilter.
//!
//! Формат файла: ровно ceil(max(1, m) / 8) байт битов, без заголовка и magic.
//! m и список хэшей из файла не восстанавливаются: при каждом reopen их
//! передаёт вызывающий, иначе те же байты читаются с другими позициями.

use memmap2::MmapMut;
use std::path::PathBuf;

use crate::bits::BitStore;
use crate::filter::Filter;
use crate::lock::LockGuard;

/// BitStore над writable mmap всего файла.
#[derive(Debug)]
pub struct MmapBits {
    pub(crate) mmap: MmapMut,
    pub(crate) m: u32,
}

impl BitStore for MmapBits {
    #[inline]
    fn bit_len(&self) -> u32 {
        self.m
    }

    #[inline]
    fn as_bytes(&self) -> &[u8] {
        &self.mmap[..]
    }

    #[inline]
    fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.mmap[..]
    }
}

/// Persistent Bloom filter. Биты живут в файле; изменения видны другим
/// отображениям того же файла, durability — после flush().
#[derive(Debug)]
pub struct PersistentFilter {
    pub(crate) path: PathBuf,
    pub(crate) filter: Filter<MmapBits>,
    pub(crate) flush_on_drop: bool,

    // Снимается последним (после unmap).
    pub(crate) lock: Option<LockGuard>,
}

pub mod open;
pub mod ops;
