//! Общие константы (размеры фильтра, имена файлов, ENV).

// -------- Размеры --------
/// Минимальная длина битового массива (m < 1 поднимается до 1).
pub const MIN_BITS: u32 = 1;
/// Длина по умолчанию для CLI/конфига (≈4 KiB битов).
pub const DEFAULT_BITS: u32 = 32_768;

// -------- Persistent --------
/// Суффикс файла advisory-lock рядом с файлом фильтра: `<path>.lock`.
pub const LOCK_SUFFIX: &str = ".lock";
/// Размер буфера нулей при создании файла.
pub const ZERO_CHUNK: usize = 8192;

// -------- ENV --------
pub const ENV_BITS: &str = "QB_BLOOM_BITS";
pub const ENV_HASHES: &str = "QB_BLOOM_HASHES";
pub const ENV_FLUSH_ON_DROP: &str = "QB_BLOOM_FLUSH_ON_DROP";
pub const ENV_LOCK: &str = "QB_BLOOM_LOCK";
pub const ENV_LOCK_WAIT: &str = "QB_BLOOM_LOCK_WAIT";
