//! Command-line front-end for the `mhkdf` binary.
//!
//! Derives a key from the given password and hex salt, prints it in hex, and
//! optionally repeats the derivation to report throughput.  Exit codes: 0 on
//! success, 1 on invalid parameters or a hashing failure.

use std::time::Instant;

use anyhow::{anyhow, Context};
use clap::Parser;

use crate::kdf::{auto_multiplies, hash_password_extended};
use crate::params::{
    Params, DEFAULT_BLOCK_SIZE, DEFAULT_LANES, DEFAULT_OVERWRITE_COST, DEFAULT_PARALLELISM,
    DEFAULT_SUB_BLOCK_SIZE,
};
use crate::provider::HashType;

#[derive(Parser, Debug)]
#[command(name = "mhkdf", version, about = "Memory-hard password hashing")]
pub struct Cli {
    /// Output size in bytes.
    #[arg(short = 'H', long, default_value_t = 32)]
    pub hash_size: usize,

    /// Password to hash.
    #[arg(short = 'p', long, default_value = "password")]
    pub password: String,

    /// Salt, hex encoded.
    #[arg(short = 's', long, default_value = "73616c74")]
    pub salt: String,

    /// Memory cost: log2 of the KiB hashed at the top level.
    #[arg(short = 'm', long, default_value_t = 20)]
    pub mem_cost: u8,

    /// Time cost: values above 8 double the per-block work per step.
    #[arg(short = 't', long, default_value_t = 0)]
    pub time_cost: u8,

    /// Sequential multiplies per 32-byte chunk (default: matched to memory).
    #[arg(short = 'M', long)]
    pub multiplies: Option<u8>,

    /// Number of memory-hashing threads.
    #[arg(short = 'P', long, default_value_t = DEFAULT_PARALLELISM)]
    pub parallelism: u8,

    /// Outer block size in bytes.
    #[arg(short = 'b', long, default_value_t = DEFAULT_BLOCK_SIZE)]
    pub block_size: u32,

    /// Inner sub-block size in bytes.
    #[arg(short = 'B', long, default_value_t = DEFAULT_SUB_BLOCK_SIZE)]
    pub sub_block_size: u32,

    /// Levels below the memory cost to compute and discard.
    #[arg(short = 'o', long, default_value_t = DEFAULT_OVERWRITE_COST)]
    pub overwrite_cost: u8,

    /// SIMD lane hint for the multiplication chain.
    #[arg(short = 'l', long, default_value_t = DEFAULT_LANES)]
    pub lanes: u8,

    /// Hash primitive: blake2s, blake2b, sha256 or sha512.
    #[arg(short = 'a', long, default_value = "blake2s")]
    pub algorithm: String,

    /// Keep addressing data-independent in every slice.
    #[arg(short = 'r', long)]
    pub side_channel_resistant: bool,

    /// Repeat the derivation this many times and report timing.
    #[arg(short = 'i', long, default_value_t = 1)]
    pub iterations: u32,
}

pub fn run(cli: &Cli) -> anyhow::Result<()> {
    let hash_type = HashType::find(&cli.algorithm)
        .ok_or_else(|| anyhow!("unknown algorithm {:?}", cli.algorithm))?;
    let salt = hex::decode(&cli.salt).context("salt must be hex encoded")?;

    let params = Params {
        hash_type,
        start_mem_cost: cli.mem_cost,
        stop_mem_cost: cli.mem_cost,
        time_cost: cli.time_cost,
        multiplies: cli.multiplies.unwrap_or_else(|| auto_multiplies(cli.mem_cost)),
        lanes: cli.lanes,
        parallelism: cli.parallelism,
        block_size: cli.block_size,
        sub_block_size: cli.sub_block_size,
        overwrite_cost: cli.overwrite_cost.min(cli.mem_cost),
        side_channel_resistant: cli.side_channel_resistant,
    };

    let iterations = cli.iterations.max(1);
    let mut hash = vec![0u8; cli.hash_size];
    let start = Instant::now();
    for _ in 0..iterations {
        let mut password = cli.password.clone().into_bytes();
        hash_password_extended(
            &mut hash,
            &mut password,
            &salt,
            &mut [],
            &params,
            false,
            false,
        )?;
    }
    let elapsed = start.elapsed();

    println!("{}", hex::encode(&hash));
    if iterations > 1 {
        eprintln!(
            "{} iterations in {:.1} ms ({:.1} ms each)",
            iterations,
            elapsed.as_secs_f64() * 1e3,
            elapsed.as_secs_f64() * 1e3 / iterations as f64
        );
    }
    Ok(())
}
