use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// CLI для persistent Bloom-фильтра (файл + mmap)
#[derive(Parser, Debug)]
#[command(name = "quiverbloom", version, about = "QuiverBloom CLI", arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }
}

/// Параметры, которые нужно передавать одинаково при каждом открытии файла:
/// m и список хэшей в файле не хранятся.
#[derive(Args, Debug, Clone)]
pub struct Common {
    /// Filter file path
    #[arg(long)]
    pub path: PathBuf,
    /// Filter length in bits (default: QB_BLOOM_BITS or 32768)
    #[arg(long)]
    pub bits: Option<u32>,
    /// Comma-separated hash list: fnv1,murmur3,xx32 (default: QB_BLOOM_HASHES or fnv1,murmur3)
    #[arg(long)]
    pub hashes: Option<String>,
    /// Hold an exclusive writer lock (<path>.lock) while the command runs
    #[arg(long, default_value_t = false)]
    pub lock: bool,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Create a new zero-filled filter file (error if it exists)
    Init {
        #[command(flatten)]
        common: Common,
    },
    /// Add keys (literal, or hex:..., or @file for raw bytes)
    Add {
        #[command(flatten)]
        common: Common,
        #[arg(long, required = true, num_args = 1..)]
        key: Vec<String>,
    },
    /// Check a key: MAYBE PRESENT / ABSENT
    Check {
        #[command(flatten)]
        common: Common,
        #[arg(long)]
        key: String,
    },
    /// Sizes, set bits, fill ratio and estimated false-positive probability
    Status {
        #[command(flatten)]
        common: Common,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}
