use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use QuiverBloom::metrics::{self, MetricsSnapshot};
use QuiverBloom::{parse_hash_list, BloomConfig, BloomFilter, HashKind, PersistentFilter};

/// Простой детерминированный PRNG (SplitMix64).
/// Достаточен для бенчей; не криптостойкий.
#[derive(Clone)]
struct Rng64 {
    state: u64,
}
impl Rng64 {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

/// Простой прогресс‑репорт на ~10 шагов.
struct Progress<'a> {
    name: &'a str,
    total: usize,
    step: usize,
    next: usize,
    start: Instant,
    enabled: bool,
}
impl<'a> Progress<'a> {
    fn new(name: &'a str, total: usize, enabled: bool) -> Self {
        let step = std::cmp::max(1, total / 10);
        Self {
            name,
            total,
            step,
            next: step,
            start: Instant::now(),
            enabled,
        }
    }
    fn bump(&mut self, cur: usize) {
        if !self.enabled {
            return;
        }
        if cur >= self.next || cur == self.total {
            let pct = (cur as f64 / self.total.max(1) as f64) * 100.0;
            let elapsed = self.start.elapsed().as_secs_f64();
            let tput = if elapsed > 0.0 { cur as f64 / elapsed } else { 0.0 };
            println!(
                "[{:>10}] {:>7} / {:<7} ({:>5.1}%) elapsed={:.2}s, tput={:.0} ops/s",
                self.name, cur, self.total, pct, elapsed, tput
            );
            self.next = cur.saturating_add(self.step);
        }
    }
}

/// QuiverBloom micro-benchmark CLI
///
/// Примеры:
///   quiverbloom_bench --path ./bench.bloom --json
///   quiverbloom_bench --path ./bench.bloom --bits 1048576 --n 200000 --hashes fnv1,murmur3,xx32
#[derive(Parser, Debug)]
#[command(name = "quiverbloom_bench", version, about = "QuiverBloom micro-bench CLI")]
struct Opt {
    /// File for the persistent (mmap) phases; removed before and after the run
    #[arg(long)]
    path: PathBuf,

    /// Filter length in bits
    #[arg(long, default_value_t = 32_768)]
    bits: u32,

    /// Comma-separated hash list (default fnv1,murmur3)
    #[arg(long)]
    hashes: Option<String>,

    /// Keys to add (and probe as hits)
    #[arg(long, default_value_t = 100_000)]
    n: usize,

    /// Probes for never-added keys (observed false-positive rate)
    #[arg(long, default_value_t = 50_000)]
    n_miss: usize,

    /// Key size in bytes
    #[arg(long, default_value_t = 16)]
    key_size: usize,

    /// Random seed
    #[arg(long, default_value_t = 0xA1B2_C3D4_E5F6_7788)]
    seed: u64,

    /// JSON output
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Show progress for each phase
    #[arg(long, default_value_t = false)]
    progress: bool,

    /// Keep the bench file after the run
    #[arg(long, default_value_t = false)]
    keep: bool,
}

#[derive(Debug, Clone, Serialize)]
struct PhaseStats {
    name: String,
    ops: u64,
    elapsed_sec: f64,
    p50_ns: f64,
    p90_ns: f64,
    p99_ns: f64,
    tput_ops: f64,
    /// Для miss-фаз: доля ложных срабатываний.
    #[serde(skip_serializing_if = "Option::is_none")]
    false_positive_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
struct BenchReport {
    bits: u32,
    bytes: usize,
    hashes: Vec<&'static str>,
    n: usize,
    n_miss: usize,
    phases: Vec<PhaseStats>,
    mem_fill_ratio: f64,
    mem_estimated_fpp: f64,
    metrics: MetricsSnapshot,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("bench error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let opt = Opt::parse();

    let hashes = match opt.hashes {
        Some(ref s) => parse_hash_list(s).with_context(|| format!("--hashes '{}'", s))?,
        None => BloomConfig::default().hashes,
    };
    if opt.key_size == 0 {
        return Err(anyhow!("--key-size must be > 0"));
    }

    // Ключи: add/hit-набор и отдельный miss-набор (другой поток PRNG).
    let keys = gen_keys(opt.seed, opt.n, opt.key_size);
    let miss = gen_keys(opt.seed ^ 0xDEAD_BEEF_CAFE_BABE, opt.n_miss, opt.key_size);

    metrics::reset();
    let mut phases = Vec::new();

    // ---------- RAM ----------
    let mut mem = BloomFilter::with_hashes(opt.bits, &hashes);
    phases.push(phase_add(&opt, "mem_add", &keys, |k| mem.add(k)));
    phases.push(phase_check_hits(&opt, "mem_hits", &keys, |k| mem.check(k))?);
    phases.push(phase_check_miss(&opt, "mem_miss", &miss, |k| mem.check(k)));

    // ---------- MMAP ----------
    if opt.path.exists() {
        fs::remove_file(&opt.path)
            .with_context(|| format!("remove old bench file {}", opt.path.display()))?;
    }
    let cfg = BloomConfig::default()
        .with_bits(opt.bits)
        .with_hashes(&hashes)
        .with_flush_on_drop(false);
    {
        let mut pf = PersistentFilter::open_with_config(&opt.path, &cfg)?;
        phases.push(phase_add(&opt, "mmap_add", &keys, |k| pf.add(k)));
        phases.push(phase_check_hits(&opt, "mmap_hits", &keys, |k| pf.check(k))?);
        phases.push(phase_check_miss(&opt, "mmap_miss", &miss, |k| pf.check(k)));

        let t0 = Instant::now();
        pf.flush()?;
        let el = t0.elapsed();
        let mut lat = vec![el];
        phases.push(stats("mmap_flush", 1, el, &mut lat));
    }
    if !opt.keep {
        let _ = fs::remove_file(&opt.path);
    }

    let rep = BenchReport {
        bits: mem.bit_len(),
        bytes: mem.byte_len(),
        hashes: hashes.iter().map(|h: &HashKind| h.name()).collect(),
        n: opt.n,
        n_miss: opt.n_miss,
        phases,
        mem_fill_ratio: mem.fill_ratio(),
        mem_estimated_fpp: mem.estimated_fpp(),
        metrics: metrics::snapshot(),
    };

    if opt.json {
        println!("{}", serde_json::to_string_pretty(&rep)?);
    } else {
        print_report_human(&rep);
    }
    Ok(())
}

fn gen_keys(seed: u64, n: usize, key_size: usize) -> Vec<Vec<u8>> {
    let mut rng = Rng64::new(seed);
    (0..n)
        .map(|_| {
            let mut k = Vec::with_capacity(key_size + 8);
            while k.len() < key_size {
                k.extend_from_slice(&rng.next_u64().to_le_bytes());
            }
            k.truncate(key_size);
            k
        })
        .collect()
}

fn phase_add<F: FnMut(&[u8])>(
    opt: &Opt,
    name: &str,
    keys: &[Vec<u8>],
    mut add: F,
) -> PhaseStats {
    let mut lat = Vec::with_capacity(keys.len());
    let mut prog = Progress::new(name, keys.len(), opt.progress);
    let start = Instant::now();
    for (n, k) in keys.iter().enumerate() {
        let t0 = Instant::now();
        add(k);
        lat.push(t0.elapsed());
        prog.bump(n + 1);
    }
    let st = stats(name, keys.len() as u64, start.elapsed(), &mut lat);
    print_phase_summary(opt, &st);
    st
}

fn phase_check_hits<F: Fn(&[u8]) -> bool>(
    opt: &Opt,
    name: &str,
    keys: &[Vec<u8>],
    check: F,
) -> Result<PhaseStats> {
    // случайный порядок (Fisher–Yates)
    let mut order: Vec<usize> = (0..keys.len()).collect();
    let mut rng = Rng64::new(opt.seed ^ 0x5151_5151_5151_5151);
    for i in (1..order.len()).rev() {
        let j = (rng.next_u64() as usize) % (i + 1);
        order.swap(i, j);
    }

    let mut lat = Vec::with_capacity(keys.len());
    let mut prog = Progress::new(name, keys.len(), opt.progress);
    let start = Instant::now();
    for (n, idx) in order.into_iter().enumerate() {
        let t0 = Instant::now();
        if !check(&keys[idx]) {
            return Err(anyhow!("{}: false negative at idx {}", name, idx));
        }
        lat.push(t0.elapsed());
        prog.bump(n + 1);
    }
    let st = stats(name, keys.len() as u64, start.elapsed(), &mut lat);
    print_phase_summary(opt, &st);
    Ok(st)
}

fn phase_check_miss<F: Fn(&[u8]) -> bool>(
    opt: &Opt,
    name: &str,
    keys: &[Vec<u8>],
    check: F,
) -> PhaseStats {
    let mut lat = Vec::with_capacity(keys.len());
    let mut prog = Progress::new(name, keys.len(), opt.progress);
    let mut positives = 0u64;
    let start = Instant::now();
    for (n, k) in keys.iter().enumerate() {
        let t0 = Instant::now();
        if check(k) {
            positives += 1;
        }
        lat.push(t0.elapsed());
        prog.bump(n + 1);
    }
    let mut st = stats(name, keys.len() as u64, start.elapsed(), &mut lat);
    st.false_positive_rate = Some(if keys.is_empty() {
        0.0
    } else {
        positives as f64 / keys.len() as f64
    });
    print_phase_summary(opt, &st);
    st
}

fn print_phase_summary(opt: &Opt, p: &PhaseStats) {
    if opt.json {
        return;
    }
    println!(
        "    {:>10} done: ops={} elapsed={:.3}s, tput={:.0} ops/s, p50={:.0}ns p90={:.0}ns p99={:.0}ns",
        p.name, p.ops, p.elapsed_sec, p.tput_ops, p.p50_ns, p.p90_ns, p.p99_ns
    );
}

fn stats(name: &str, ops: u64, elapsed: Duration, lat: &mut [Duration]) -> PhaseStats {
    lat.sort_unstable();
    let to_ns = |d: Duration| d.as_secs_f64() * 1e9;
    let p = |q: f64| -> f64 {
        if lat.is_empty() {
            return 0.0;
        }
        let idx = ((lat.len() as f64 - 1.0) * q).round() as usize;
        to_ns(lat[idx])
    };
    let p50 = p(0.50);
    let p90 = p(0.90);
    let p99 = p(0.99);
    let tput = if elapsed.as_secs_f64() > 0.0 {
        ops as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };
    PhaseStats {
        name: name.to_string(),
        ops,
        elapsed_sec: elapsed.as_secs_f64(),
        p50_ns: p50,
        p90_ns: p90,
        p99_ns: p99,
        tput_ops: tput,
        false_positive_rate: None,
    }
}

fn print_report_human(r: &BenchReport) {
    println!("QuiverBloom bench report:");
    println!("  bits (m)     = {}", r.bits);
    println!("  bytes        = {}", r.bytes);
    println!("  hashes (k={}) = {}", r.hashes.len(), r.hashes.join(","));
    println!("  n / n_miss   = {} / {}", r.n, r.n_miss);
    println!("  fill_ratio   = {:.4}", r.mem_fill_ratio);
    println!("  est_fpp      = {:.6}", r.mem_estimated_fpp);
    println!("Phases:");
    for p in &r.phases {
        print!(
            "  {:>12}: ops={} elapsed={:.3}s tput={:.0} ops/s p50={:.0}ns p90={:.0}ns p99={:.0}ns",
            p.name, p.ops, p.elapsed_sec, p.tput_ops, p.p50_ns, p.p90_ns, p.p99_ns
        );
        match p.false_positive_rate {
            Some(fp) => println!(" fp_rate={:.6}", fp),
            None => println!(),
        }
    }
    let m = &r.metrics;
    println!("Metrics snapshot:");
    println!("  adds_total       = {}", m.adds_total);
    println!("  checks_total     = {}", m.checks_total);
    println!("  check_hit_ratio  = {:.4}", m.check_hit_ratio());
    println!("  persist_opens    = {}", m.persist_opens);
    println!("  persist_flushes  = {}", m.persist_flushes);
}
