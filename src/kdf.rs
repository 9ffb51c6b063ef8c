//! Public hashing entry points and the garlic cost ladder.
//!
//! The ladder walks memory-cost levels from 0 up to `stop_mem_cost`, hashing
//! each computed level's memory and folding the result into the running
//! hash.  The simple entry points compute every level, which is what makes a
//! stored hash upgradable: [`update_password`] replays exactly the levels a
//! higher-cost derivation would have appended.  The extended entry point
//! exposes the start level and the overwrite window for callers that want
//! the classic trade-off instead.

use log::debug;
use zeroize::{Zeroize, Zeroizing};

use crate::engine::{hash_memory_level, EngineConfig, Kernel};
use crate::error::{Error, Result};
use crate::params::{
    repetitions, Params, DEFAULT_BLOCK_SIZE, DEFAULT_LANES, DEFAULT_PARALLELISM,
    DEFAULT_SUB_BLOCK_SIZE, MAX_HASH_SIZE, MAX_MEM_COST, MAX_TIME_COST,
};
use crate::prehash::prehash;
use crate::provider::HashType;

/// Hash a password with default settings.
///
/// `hash.len()` selects the output size.  Memory hashed is `2^mem_cost` KiB;
/// every other knob takes its default, with the multiply count picked to
/// match the cache level the memory fits in.  When `clear_password` is set
/// the password buffer is wiped as soon as it has been absorbed.
pub fn hash_password(
    hash: &mut [u8],
    password: &mut [u8],
    salt: &[u8],
    mem_cost: u8,
    clear_password: bool,
) -> Result<()> {
    hash_password_full(
        hash,
        password,
        salt,
        HashType::Blake2s,
        mem_cost,
        0,
        DEFAULT_PARALLELISM,
        clear_password,
    )
}

/// Hash a password, choosing the primitive, time cost and thread count.
#[allow(clippy::too_many_arguments)]
pub fn hash_password_full(
    hash: &mut [u8],
    password: &mut [u8],
    salt: &[u8],
    hash_type: HashType,
    mem_cost: u8,
    time_cost: u8,
    parallelism: u8,
    clear_password: bool,
) -> Result<()> {
    // The absorbed parameters must not depend on the memory cost, or a
    // stored hash could never be re-costed; small levels get their block
    // size and thread count adjusted per level instead.
    let params = Params {
        hash_type,
        start_mem_cost: 0,
        stop_mem_cost: mem_cost,
        time_cost,
        multiplies: auto_multiplies(mem_cost),
        lanes: default_lanes(hash.len()),
        parallelism,
        block_size: DEFAULT_BLOCK_SIZE,
        sub_block_size: DEFAULT_SUB_BLOCK_SIZE,
        overwrite_cost: 0,
        side_channel_resistant: false,
    };
    hash_password_extended(hash, password, salt, &mut [], &params, clear_password, false)
}

/// Hash a password with every parameter exposed.
///
/// `data` is optional application-specific input (a secondary key, an
/// application tag); pass an empty slice when unused.  On success the output
/// buffer holds `hash.len()` bytes of derived key; on any error it is left
/// untouched and secrets are only wiped if absorption already happened.
pub fn hash_password_extended(
    hash: &mut [u8],
    password: &mut [u8],
    salt: &[u8],
    data: &mut [u8],
    params: &Params,
    clear_password: bool,
    clear_data: bool,
) -> Result<()> {
    client_hash_password(hash, password, salt, data, params, clear_password, clear_data)?;
    server_hash_password(params.hash_type, hash)
}

/// Client half of server-relief hashing: everything except the final fold.
///
/// Send the result to the server, which applies [`server_hash_password`] to
/// obtain the value it stores.  A client value must never be stored as-is.
pub fn client_hash_password(
    hash: &mut [u8],
    password: &mut [u8],
    salt: &[u8],
    data: &mut [u8],
    params: &Params,
    clear_password: bool,
    clear_data: bool,
) -> Result<()> {
    params.validate(hash.len())?;
    check_input_len(password)?;
    check_input_len(salt)?;
    check_input_len(data)?;

    let initial = prehash(params, hash.len(), password, salt, data);
    if clear_password {
        password.zeroize();
    }
    if clear_data {
        data.zeroize();
    }
    garlic(params, hash, Some(&initial), false, true)
}

/// Server half of server-relief hashing: the single final fold.
pub fn server_hash_password(hash_type: HashType, hash: &mut [u8]) -> Result<()> {
    if hash.is_empty() || hash.len() % 4 != 0 || hash.len() > MAX_HASH_SIZE {
        return Err(Error::InvalidParameters(
            "hash size must be a multiple of 4 from 4 to 255*32",
        ));
    }
    hash_type.rehash(hash);
    Ok(())
}

/// Raise the memory cost of a stored hash in place, without the password.
///
/// Replays the garlic levels `old_mem_cost + 1 ..= new_mem_cost` on top of
/// the stored value.  With the same parameters otherwise, the result equals
/// a fresh derivation at `new_mem_cost`.  The start and overwrite fields of
/// `params` are ignored; equal costs are a no-op.
pub fn update_password(
    hash: &mut [u8],
    params: &Params,
    old_mem_cost: u8,
    new_mem_cost: u8,
) -> Result<()> {
    if old_mem_cost > new_mem_cost {
        return Err(Error::InvalidParameters(
            "old memory cost must not exceed the new one",
        ));
    }
    let mut p = *params;
    p.start_mem_cost = old_mem_cost;
    p.stop_mem_cost = new_mem_cost;
    p.overwrite_cost = 0;
    p.validate(hash.len())?;
    if old_mem_cost == new_mem_cost {
        return Ok(());
    }
    p.start_mem_cost = old_mem_cost + 1;
    garlic(&p, hash, None, true, true)?;
    server_hash_password(p.hash_type, hash)
}

/// Entry point in the shape of the password-hashing-competition API.
///
/// `t_cost` maps to the time cost and `m_cost` to the memory cost; all other
/// parameters take their defaults.  The password is copied internally so the
/// caller's buffer is never modified; the copy is wiped.
pub fn phs(out: &mut [u8], password: &[u8], salt: &[u8], t_cost: u32, m_cost: u32) -> Result<()> {
    if t_cost > MAX_TIME_COST as u32 {
        return Err(Error::InvalidParameters("time cost must be at most 30"));
    }
    if m_cost > MAX_MEM_COST as u32 {
        return Err(Error::InvalidParameters("memory cost must be at most 30"));
    }
    let mut pwd = Zeroizing::new(password.to_vec());
    hash_password_full(
        out,
        &mut pwd,
        salt,
        HashType::Blake2s,
        m_cost as u8,
        t_cost as u8,
        DEFAULT_PARALLELISM,
        true,
    )
}

/// Multiplies that roughly match the latency of the cache level holding
/// `2^mem_cost` KiB.
pub(crate) fn auto_multiplies(mem_cost: u8) -> u8 {
    if mem_cost <= 4 {
        1
    } else if mem_cost < 10 {
        2
    } else {
        3
    }
}

fn default_lanes(hash_size: usize) -> u8 {
    (DEFAULT_LANES as usize).min((hash_size / 4).clamp(1, 255)) as u8
}

fn check_input_len(buf: &[u8]) -> Result<()> {
    if buf.len() > u32::MAX as usize {
        return Err(Error::InvalidParameters(
            "variable-length inputs are limited to 2^32 - 1 bytes",
        ));
    }
    Ok(())
}

/// Run the garlic ladder over the computed levels.
///
/// `initial` is the pre-hash state for fresh derivations; `None` resumes
/// from the bytes already in `hash` (update mode).  With `server_relief`
/// set, the fold after the top level is omitted.
fn garlic(
    params: &Params,
    hash: &mut [u8],
    initial: Option<&[u32]>,
    update_mode: bool,
    server_relief: bool,
) -> Result<()> {
    let ht = params.hash_type;
    let cfg = EngineConfig {
        multiplies: params.multiplies as u32,
        repetitions: repetitions(params.time_cost),
        resistant_everywhere: params.side_channel_resistant,
        kernel: Kernel::detect(),
    };

    let start = params.start_mem_cost as u32;
    let overwrite = params.overwrite_cost as u32;
    let levels: Vec<u8> = (0..=params.stop_mem_cost)
        .filter(|&l| {
            if update_mode {
                l as u32 >= start
            } else {
                l as u32 + overwrite >= start
            }
        })
        .collect();

    // One allocation serves every level; failures happen before the output
    // buffer is touched.
    let max_words = levels
        .iter()
        .map(|&l| params.geometry(l).words_u64())
        .max()
        .unwrap_or(0);
    if max_words > usize::MAX as u64 {
        return Err(Error::OutOfMemory);
    }
    let max_words = max_words as usize;
    let mut mem: Vec<u32> = Vec::new();
    mem.try_reserve_exact(max_words)
        .map_err(|_| Error::OutOfMemory)?;
    mem.resize(max_words, 0);

    let threads = (params.parallelism as usize).min(num_cpus::get().max(1));
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|_| Error::SpawnFailed)?;

    if let Some(initial) = initial {
        ht.expand(hash, initial);
    }

    for &level in &levels {
        let geo = params.geometry(level);
        debug!(
            "level {level}: {} KiB, {} threads x {} blocks of {} words",
            1u64 << level,
            geo.parallelism,
            geo.blocks_per_thread,
            geo.block_len
        );
        hash_memory_level(ht, hash, &mut mem[..geo.words()], &geo, &cfg, &pool);
        if level < params.stop_mem_cost || !server_relief {
            ht.rehash(hash);
        }
    }
    Ok(())
}
