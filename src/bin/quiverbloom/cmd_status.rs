use anyhow::{Context, Result};
use serde::Serialize;

use QuiverBloom::PersistentFilter;

use crate::cli::Common;
use crate::util::{config_for, ensure_exists};

#[derive(Debug, Serialize)]
struct StatusReport {
    path: String,
    file_bytes: u64,
    bits: u32,
    bytes: usize,
    hashes: Vec<&'static str>,
    set_bits: u64,
    fill_ratio: f64,
    estimated_fpp: f64,
    lock_file: Option<String>,
}

/// CLI: status — размеры и заполненность фильтра (human или --json).
pub fn exec(common: Common, json: bool) -> Result<()> {
    let cfg = config_for(&common)?;
    ensure_exists(&common.path)?;
    let f = PersistentFilter::open_with_config(&common.path, &cfg)?;
    let file_bytes = std::fs::metadata(f.path())
        .with_context(|| format!("stat {}", f.path().display()))?
        .len();

    let rep = StatusReport {
        path: f.path().display().to_string(),
        file_bytes,
        bits: f.bit_len(),
        bytes: f.byte_len(),
        hashes: f.hash_kinds().iter().map(|h| h.name()).collect(),
        set_bits: f.count_ones(),
        fill_ratio: f.fill_ratio(),
        estimated_fpp: f.estimated_fpp(),
        lock_file: f.lock_path().map(|p| p.display().to_string()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&rep)?);
        return Ok(());
    }

    println!("path          = {}", rep.path);
    println!("file_bytes    = {}", rep.file_bytes);
    println!("bits (m)      = {}", rep.bits);
    println!("bytes         = {}", rep.bytes);
    println!("hashes (k={}) = {}", rep.hashes.len(), rep.hashes.join(","));
    println!("set_bits      = {}", rep.set_bits);
    println!("fill_ratio    = {:.4}", rep.fill_ratio);
    println!("est_fpp       = {:.6}", rep.estimated_fpp);
    if let Some(lp) = &rep.lock_file {
        println!("lock_file     = {}", lp);
    }
    Ok(())
}
