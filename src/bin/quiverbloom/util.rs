use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::io::Read;
use std::path::{Path, PathBuf};

use QuiverBloom::{parse_hash_list, BloomConfig};

use crate::cli::Common;

/// Конфиг из ENV + переопределения из аргументов CLI.
pub fn config_for(common: &Common) -> Result<BloomConfig> {
    let mut cfg = BloomConfig::from_env();
    if let Some(bits) = common.bits {
        cfg = cfg.with_bits(bits);
    }
    if let Some(ref s) = common.hashes {
        let kinds = parse_hash_list(s).with_context(|| format!("--hashes '{}'", s))?;
        cfg = cfg.with_hashes(&kinds);
    }
    if common.lock {
        cfg = cfg.with_lock(true);
    }
    Ok(cfg)
}

/// check/status не должны молча создавать новый файл.
pub fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(anyhow!("no bloom file at {} (run init first)", path.display()));
    }
    Ok(())
}

/// Ключ из аргумента: `@file` (сырые байты), `hex:...` или литерал UTF-8.
pub fn decode_key_arg(arg: &str) -> Result<Vec<u8>> {
    if let Some(p) = arg.strip_prefix('@') {
        let path = PathBuf::from(p);
        let mut f = OpenOptions::new()
            .read(true)
            .open(&path)
            .with_context(|| format!("open key file {}", path.display()))?;
        let mut buf = Vec::new();
        f.read_to_end(&mut buf)?;
        return Ok(buf);
    }
    if let Some(hx) = arg.strip_prefix("hex:") {
        return decode_hex(hx);
    }
    Ok(arg.as_bytes().to_vec())
}

pub fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();
    if s.len() % 2 != 0 {
        return Err(anyhow!("hex string must have even length"));
    }
    let mut out = Vec::with_capacity(s.len() / 2);
    let bytes = s.as_bytes();
    for i in (0..bytes.len()).step_by(2) {
        let h = (bytes[i] as char)
            .to_digit(16)
            .ok_or_else(|| anyhow!("invalid hex at pos {}", i))?;
        let l = (bytes[i + 1] as char)
            .to_digit(16)
            .ok_or_else(|| anyhow!("invalid hex at pos {}", i + 1))?;
        out.push(((h << 4) | l) as u8);
    }
    Ok(out)
}

pub fn display_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => format!("(binary {} B)", bytes.len()),
    }
}
