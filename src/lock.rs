//! File-based locking for single-writer safety of a persistent filter.
//!
//! Cross-platform (fs2) advisory lock:
//! - Exclusive: один writer на файл фильтра среди всех процессов, уважающих lock.
//! - Процессы без lock (QB_BLOOM_LOCK=0) его не видят: это advisory, не mandatory.
//!
//! Lock file path: <filter path>.lock
//! Lock is released on Drop.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::consts::LOCK_SUFFIX;

#[derive(Debug)]
pub struct LockGuard {
    file: File,
    path: PathBuf,
}

impl LockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // fs2 unlock errors on drop are ignored deliberately.
        let _ = self.file.unlock();
    }
}

/// `<path>.lock` рядом с файлом фильтра.
pub fn lock_file_path(filter_path: &Path) -> PathBuf {
    let mut s: OsString = filter_path.as_os_str().to_owned();
    s.push(LOCK_SUFFIX);
    PathBuf::from(s)
}

fn open_lock_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(path)
        .with_context(|| format!("open lock file {}", path.display()))
}

/// Acquire an exclusive lock for the filter file. Blocks until acquired.
pub fn acquire_exclusive_lock(filter_path: &Path) -> Result<LockGuard> {
    let path = lock_file_path(filter_path);
    let file = open_lock_file(&path)?;
    file.lock_exclusive()
        .with_context(|| format!("lock_exclusive {}", path.display()))?;
    Ok(LockGuard { file, path })
}

/// Try to acquire an exclusive lock. Returns Err if already locked.
pub fn try_acquire_exclusive_lock(filter_path: &Path) -> Result<LockGuard> {
    let path = lock_file_path(filter_path);
    let file = open_lock_file(&path)?;
    file.try_lock_exclusive()
        .with_context(|| format!("try_lock_exclusive failed: {}", path.display()))?;
    Ok(LockGuard { file, path })
}
