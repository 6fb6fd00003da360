//! Lightweight global metrics for QuiverBloom.
//!
//! Потокобезопасные атомарные счётчики (process-wide):
//! - add / check (и сколько check ответили "возможно есть")
//! - persistent: create / open / flush

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

// ----- Operations -----
static ADDS_TOTAL: AtomicU64 = AtomicU64::new(0);
static CHECKS_TOTAL: AtomicU64 = AtomicU64::new(0);
static CHECK_HITS: AtomicU64 = AtomicU64::new(0);

// ----- Persistent -----
static PERSIST_CREATES: AtomicU64 = AtomicU64::new(0);
static PERSIST_OPENS: AtomicU64 = AtomicU64::new(0);
static PERSIST_FLUSHES: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    // Operations
    pub adds_total: u64,
    pub checks_total: u64,
    pub check_hits: u64,

    // Persistent
    pub persist_creates: u64,
    pub persist_opens: u64,
    pub persist_flushes: u64,
}

impl MetricsSnapshot {
    /// Доля check, ответивших "возможно есть".
    pub fn check_hit_ratio(&self) -> f64 {
        if self.checks_total == 0 {
            0.0
        } else {
            self.check_hits as f64 / self.checks_total as f64
        }
    }
}

// ----- Recorders (Operations) -----
#[inline]
pub fn record_add() {
    ADDS_TOTAL.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_check(hit: bool) {
    CHECKS_TOTAL.fetch_add(1, Ordering::Relaxed);
    if hit {
        CHECK_HITS.fetch_add(1, Ordering::Relaxed);
    }
}

// ----- Recorders (Persistent) -----
pub fn record_persist_create() {
    PERSIST_CREATES.fetch_add(1, Ordering::Relaxed);
}

pub fn record_persist_open() {
    PERSIST_OPENS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_persist_flush() {
    PERSIST_FLUSHES.fetch_add(1, Ordering::Relaxed);
}

/// Снимок всех счётчиков.
pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        adds_total: ADDS_TOTAL.load(Ordering::Relaxed),
        checks_total: CHECKS_TOTAL.load(Ordering::Relaxed),
        check_hits: CHECK_HITS.load(Ordering::Relaxed),
        persist_creates: PERSIST_CREATES.load(Ordering::Relaxed),
        persist_opens: PERSIST_OPENS.load(Ordering::Relaxed),
        persist_flushes: PERSIST_FLUSHES.load(Ordering::Relaxed),
    }
}

/// Обнулить все счётчики (для бенчей).
pub fn reset() {
    ADDS_TOTAL.store(0, Ordering::Relaxed);
    CHECKS_TOTAL.store(0, Ordering::Relaxed);
    CHECK_HITS.store(0, Ordering::Relaxed);
    PERSIST_CREATES.store(0, Ordering::Relaxed);
    PERSIST_OPENS.store(0, Ordering::Relaxed);
    PERSIST_FLUSHES.store(0, Ordering::Relaxed);
}
