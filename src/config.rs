//! Centralized configuration for QuiverBloom filters.
//!
//! - Single place to collect tunables instead of scattering env lookups.
//! - BloomConfig::from_env() reads QB_BLOOM_* variables; builder-style with_* overrides.
//! - Both BloomFilter::with_config and PersistentFilter::open_with_config consume it.
//!
//! Defaults:
//! - bits = 32768, hashes = fnv1,murmur3 (k=2)
//! - flush_on_drop = true (persistent filter msync'ает mmap при drop)
//! - lock = false (без cross-process writer lock), lock_wait = true

use log::warn;
use std::fmt;

use crate::consts::{
    DEFAULT_BITS, ENV_BITS, ENV_FLUSH_ON_DROP, ENV_HASHES, ENV_LOCK, ENV_LOCK_WAIT,
};
use crate::hash::{HashKind, HASH_KINDS_DEFAULT};

#[derive(Clone, Debug, PartialEq)]
pub struct BloomConfig {
    /// Длина битового массива (m). 0 допустим и поднимается до 1 при создании.
    /// Env: QB_BLOOM_BITS (default 32768)
    pub bits: u32,

    /// Список хэшей (k = len). Пустой список → дефолтная пара.
    /// Env: QB_BLOOM_HASHES = "fnv1,murmur3,xx32"
    pub hashes: Vec<HashKind>,

    /// Persistent: flush (msync) при drop.
    /// Env: QB_BLOOM_FLUSH_ON_DROP (default true)
    pub flush_on_drop: bool,

    /// Persistent: держать эксклюзивный advisory lock `<path>.lock` всё время жизни фильтра.
    /// Env: QB_BLOOM_LOCK (default false)
    pub lock: bool,

    /// Ждать lock (true) или сразу вернуть ошибку, если он занят (false).
    /// Env: QB_BLOOM_LOCK_WAIT (default true)
    pub lock_wait: bool,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            bits: DEFAULT_BITS,
            hashes: HASH_KINDS_DEFAULT.to_vec(),
            flush_on_drop: true,
            lock: false,
            lock_wait: true,
        }
    }
}

fn parse_bool(s: &str) -> bool {
    let s = s.trim().to_ascii_lowercase();
    s == "1" || s == "true" || s == "yes" || s == "on"
}

impl BloomConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as from_env, но источник значений передаётся явно.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup(ENV_BITS) {
            match v.trim().parse::<u32>() {
                Ok(n) => cfg.bits = n,
                Err(_) => warn!("{}: ignoring invalid value '{}'", ENV_BITS, v),
            }
        }

        if let Some(v) = lookup(ENV_HASHES) {
            let mut kinds = Vec::new();
            for part in v.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                match part.parse::<HashKind>() {
                    Ok(k) => kinds.push(k),
                    Err(e) => warn!("{}: {}", ENV_HASHES, e),
                }
            }
            if !kinds.is_empty() {
                cfg.hashes = kinds;
            }
        }

        if let Some(v) = lookup(ENV_FLUSH_ON_DROP) {
            cfg.flush_on_drop = parse_bool(&v);
        }

        if let Some(v) = lookup(ENV_LOCK) {
            cfg.lock = parse_bool(&v);
        }

        if let Some(v) = lookup(ENV_LOCK_WAIT) {
            cfg.lock_wait = parse_bool(&v);
        }

        cfg
    }

    /// Fluent setters (builder-style) to override specific fields.

    pub fn with_bits(mut self, bits: u32) -> Self {
        self.bits = bits;
        self
    }

    pub fn with_hashes(mut self, hashes: &[HashKind]) -> Self {
        self.hashes = hashes.to_vec();
        self
    }

    pub fn with_flush_on_drop(mut self, on: bool) -> Self {
        self.flush_on_drop = on;
        self
    }

    pub fn with_lock(mut self, on: bool) -> Self {
        self.lock = on;
        self
    }

    pub fn with_lock_wait(mut self, wait: bool) -> Self {
        self.lock_wait = wait;
        self
    }
}

impl fmt::Display for BloomConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hashes: Vec<&str> = self.hashes.iter().map(|h| h.name()).collect();
        write!(
            f,
            "BloomConfig {{ bits: {}, hashes: [{}], flush_on_drop: {}, lock: {}, lock_wait: {} }}",
            self.bits,
            hashes.join(","),
            self.flush_on_drop,
            self.lock,
            self.lock_wait,
        )
    }
}
