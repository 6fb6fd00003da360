#![allow(non_snake_case)]

// Базовые модули
pub mod consts;
pub mod config;
pub mod metrics;
pub mod lock;

// Хэши и битовый массив
pub mod hash;
pub mod bits;

// Фильтры: RAM (Filter<HeapBits>), mmap (persist), конкурентный (atomic)
pub mod filter;
pub mod persist; // src/persist/{mod,open,ops}.rs
pub mod atomic;

// Удобные реэкспорты
pub use atomic::AtomicBloomFilter;
pub use bits::{byte_len_for, BitStore, HeapBits};
pub use config::BloomConfig;
pub use filter::{BloomFilter, Filter};
pub use hash::{hash32, parse_hash_list, HashKind, HASH_KINDS_DEFAULT};
pub use persist::{MmapBits, PersistentFilter};
