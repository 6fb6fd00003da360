//! persist/open — создание/открытие файла фильтра и mmap.
//!
//! Порядок:
//! 1) (опционально) advisory lock `<path>.lock`;
//! 2) если файла нет — create_new + запись ceil(m/8) нулей + sync_all;
//!    при ошибке записи недописанный файл удаляется;
//! 3) open RW и mmap на весь файл.
//! Любая ошибка → Err; хэндлы закрываются на всех путях (RAII).

use anyhow::{anyhow, Context, Result};
use log::{debug, warn};
use memmap2::MmapOptions;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::bits::{byte_len_for, clamp_bits};
use crate::config::BloomConfig;
use crate::consts::ZERO_CHUNK;
use crate::filter::Filter;
use crate::lock::{acquire_exclusive_lock, try_acquire_exclusive_lock};
use crate::metrics::{record_persist_create, record_persist_open};

use super::{MmapBits, PersistentFilter};

impl PersistentFilter {
    /// Открыть (или создать) фильтр на m бит с дефолтной парой хэшей.
    pub fn open<P: AsRef<Path>>(path: P, m: u32) -> Result<Self> {
        Self::open_with_config(path, &BloomConfig::default().with_bits(m))
    }

    /// Открыть (или создать) фильтр по конфигу (bits/hashes/lock/flush_on_drop).
    pub fn open_with_config<P: AsRef<Path>>(path: P, cfg: &BloomConfig) -> Result<Self> {
        Self::open_inner(path.as_ref(), cfg, false)
    }

    /// Создать новый файл (ошибка, если уже существует) и сразу открыть его.
    /// Проверку существования делает create_new, уже под writer lock.
    pub fn create<P: AsRef<Path>>(path: P, cfg: &BloomConfig) -> Result<Self> {
        Self::open_inner(path.as_ref(), cfg, true)
    }

    fn open_inner(path: &Path, cfg: &BloomConfig, strict: bool) -> Result<Self> {
        let m = clamp_bits(cfg.bits);
        let need = byte_len_for(m);

        let lock = if cfg.lock {
            let guard = if cfg.lock_wait {
                acquire_exclusive_lock(path)?
            } else {
                try_acquire_exclusive_lock(path)?
            };
            Some(guard)
        } else {
            None
        };

        if create_zeroed(path, need, strict)? {
            record_persist_create();
            debug!("bloom: created {} ({} B, m={})", path.display(), need, m);
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("open bloom {}", path.display()))?;

        let flen = file
            .metadata()
            .with_context(|| format!("stat bloom {}", path.display()))?
            .len();
        if flen < need as u64 {
            return Err(anyhow!(
                "bloom file {} is {} B, need {} B for m={}",
                path.display(),
                flen,
                need,
                m
            ));
        }
        if flen > need as u64 {
            warn!(
                "bloom file {} is {} B, expected {} B for m={} (tail ignored)",
                path.display(),
                flen,
                need,
                m
            );
        }

        // Файл не должен менять размер, пока жив mmap (без truncate извне).
        let mmap = unsafe {
            MmapOptions::new()
                .len(flen as usize)
                .map_mut(&file)
                .with_context(|| format!("bloom mmap {}", path.display()))?
        };
        drop(file);

        record_persist_open();
        debug!(
            "bloom: mapped {} ({} B, m={}, k={})",
            path.display(),
            flen,
            m,
            cfg.hashes.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            filter: Filter::from_store(MmapBits { mmap, m }, &cfg.hashes),
            flush_on_drop: cfg.flush_on_drop,
            lock,
        })
    }
}

/// Создать файл из `len` нулевых байт. Ok(false), если файл уже есть;
/// При `strict` существующий файл считается ошибкой.
fn create_zeroed(path: &Path, len: usize, strict: bool) -> Result<bool> {
    let mut f = match OpenOptions::new()
        .create_new(true)
        .read(true)
        .write(true)
        .open(path)
    {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            if strict {
                return Err(anyhow!("bloom file already exists at {}", path.display()));
            }
            return Ok(false);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("create bloom {}", path.display()));
        }
    };

    if let Err(e) = write_zeros(&mut f, len) {
        drop(f);
        let _ = fs::remove_file(path);
        return Err(e).with_context(|| format!("zero-fill bloom {}", path.display()));
    }
    Ok(true)
}

fn write_zeros(f: &mut File, len: usize) -> Result<()> {
    let chunk = vec![0u8; ZERO_CHUNK];
    let mut written = 0usize;
    while written < len {
        let to_write = std::cmp::min(chunk.len(), len - written);
        f.write_all(&chunk[..to_write])?;
        written += to_write;
    }
    f.sync_all()?;
    Ok(())
}
