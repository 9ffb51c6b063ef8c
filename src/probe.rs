//! Timing-driven cost selection for this machine.
//!
//! Picks `(mem_cost, time_cost, multiplies, lanes)` so that one derivation
//! runs close to a wall-clock target without exceeding a memory ceiling.
//! The search times real derivations: memory cost climbs until an eighth of
//! the budget is spent, multiplies are added while they stay under a 5%
//! overhead, then memory (or, once capped, time cost) fills the rest.

use std::time::Instant;

use log::debug;

use crate::error::Result;
use crate::kdf::hash_password_extended;
use crate::params::{Params, DEFAULT_PARALLELISM, MAX_MEM_COST, MAX_MULTIPLIES, MAX_TIME_COST};
use crate::provider::HashType;

/// Parameters selected by [`find_cost_parameters`].
#[derive(Clone, Copy, Debug)]
pub struct CostParameters {
    pub mem_cost: u8,
    pub time_cost: u8,
    pub multiplies: u8,
    pub lanes: u8,
}

/// Find settings whose runtime lands within roughly ±50% of `milliseconds`
/// while memory stays at or below `max_mem_kib`.
pub fn find_cost_parameters(
    hash_type: HashType,
    milliseconds: u32,
    max_mem_kib: u32,
) -> Result<CostParameters> {
    let lanes = detected_lanes();
    let target = milliseconds as u64;

    // Grow memory until an eighth of the budget is spent.
    let mut mem_cost: u8 = 0;
    let mut runtime = time_hash(hash_type, mem_cost, 0, 0, lanes)?;
    while runtime < target / 8
        && mem_cost < MAX_MEM_COST
        && (2u64 << mem_cost) <= max_mem_kib as u64
    {
        mem_cost += 1;
        runtime = time_hash(hash_type, mem_cost, 0, 0, lanes)?;
    }
    let base = runtime.max(1);

    // Add multiplies while they cost less than 5% on top of the memory time.
    let mut multiplies = 0u8;
    while multiplies < MAX_MULTIPLIES {
        let t = time_hash(hash_type, mem_cost, 0, multiplies + 1, lanes)?;
        if t * 100 > base * 105 {
            break;
        }
        multiplies += 1;
        runtime = t;
    }

    // Fill the remaining budget, doubling memory while it fits, then work.
    let mut time_cost = 0u8;
    loop {
        if runtime.max(1) * 2 > target {
            break;
        }
        if mem_cost < MAX_MEM_COST && (2u64 << mem_cost) <= max_mem_kib as u64 {
            mem_cost += 1;
        } else if time_cost < MAX_TIME_COST {
            time_cost = time_cost.max(8) + 1;
        } else {
            break;
        }
        runtime = time_hash(hash_type, mem_cost, time_cost, multiplies, lanes)?;
    }

    debug!(
        "probe settled on mem_cost={mem_cost} time_cost={time_cost} \
         multiplies={multiplies} lanes={lanes} ({runtime} ms measured)"
    );
    Ok(CostParameters {
        mem_cost,
        time_cost,
        multiplies,
        lanes,
    })
}

/// Lane hint matching the widest vector unit present.
fn detected_lanes() -> u8 {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        if is_x86_feature_detected!("avx2") {
            return 8;
        }
        if is_x86_feature_detected!("sse2") {
            return 4;
        }
    }
    1
}

/// Time one derivation at the given settings, in milliseconds.
fn time_hash(
    hash_type: HashType,
    mem_cost: u8,
    time_cost: u8,
    multiplies: u8,
    lanes: u8,
) -> Result<u64> {
    let params = Params {
        hash_type,
        start_mem_cost: mem_cost,
        stop_mem_cost: mem_cost,
        time_cost,
        multiplies,
        lanes,
        parallelism: DEFAULT_PARALLELISM,
        overwrite_cost: 0,
        ..Params::default()
    };
    let mut hash = [0u8; 32];
    let start = Instant::now();
    hash_password_extended(&mut hash, &mut [], b"", &mut [], &params, false, false)?;
    Ok(start.elapsed().as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_respects_the_memory_ceiling() {
        // A 4 MiB cap can never select more than mem_cost 12.
        let cost = find_cost_parameters(HashType::Blake2s, 20, 4096).unwrap();
        assert!(cost.mem_cost <= 12);
        assert!(cost.multiplies <= 8);
        assert!(matches!(cost.lanes, 1 | 4 | 8));
    }
}
