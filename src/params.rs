//! Cost parameters, their validation, and per-level size derivation.

use crate::error::{Error, Result};
use crate::provider::HashType;

/// Temporal partitions per memory level; threads synchronise between slices.
pub const SLICES: u32 = 4;

/// Minimum blocks per thread before block size and parallelism are reduced.
pub const MIN_BLOCKS: u64 = 256;

/// Highest supported memory cost (log2 KiB).
pub const MAX_MEM_COST: u8 = 30;

/// Highest supported time cost.
pub const MAX_TIME_COST: u8 = 30;

/// Highest supported number of sequential multiplies per 32-byte chunk.
pub const MAX_MULTIPLIES: u8 = 8;

/// Largest permitted output, in bytes.
pub const MAX_HASH_SIZE: usize = 255 * 32;

/// Default outer block size in bytes.
pub const DEFAULT_BLOCK_SIZE: u32 = 16384;

/// Default inner sub-block size in bytes.
pub const DEFAULT_SUB_BLOCK_SIZE: u32 = 64;

/// Default number of memory-hashing threads.
pub const DEFAULT_PARALLELISM: u8 = 2;

/// Default SIMD lane hint for the multiplication chain.
pub const DEFAULT_LANES: u8 = 8;

/// Default number of discarded early levels below the start cost.
pub const DEFAULT_OVERWRITE_COST: u8 = 6;

/// Every knob that influences a derivation.
///
/// A `Params` value is immutable for the duration of a hashing call.  All
/// fields that can alter the output are absorbed into the pre-hash, with one
/// deliberate exception: `stop_mem_cost` is left out so a stored hash can
/// later be re-costed to a higher level with [`crate::update_password`].
#[derive(Clone, Copy, Debug)]
pub struct Params {
    /// Which hash primitive backs the derivation.
    pub hash_type: HashType,
    /// First garlic level that contributes to the output.
    pub start_mem_cost: u8,
    /// Final garlic level; memory hashed at the top level is
    /// `2^stop_mem_cost` KiB.
    pub stop_mem_cost: u8,
    /// Extra repetitions knob; see [`repetitions`].
    pub time_cost: u8,
    /// Sequential multiplies per 32-byte chunk (0 to 8).
    pub multiplies: u8,
    /// SIMD lane hint for the multiplication chain.  Absorbed into the
    /// output; vectorised kernels may use it to pick a register arrangement
    /// but results never depend on the arrangement chosen.
    pub lanes: u8,
    /// Independent memory-hashing threads (1 to 255).
    pub parallelism: u8,
    /// Outer block size in bytes; power of two, 32 to 2^20.
    pub block_size: u32,
    /// Inner sub-block size in bytes; power of two, 32 to `block_size`.
    pub sub_block_size: u32,
    /// Number of levels below `start_mem_cost` that are computed and then
    /// discarded to frustrate memory-disclosure attacks.
    pub overwrite_cost: u8,
    /// When set, every slice uses data-independent addressing.
    pub side_channel_resistant: bool,
}

impl Default for Params {
    fn default() -> Params {
        Params {
            hash_type: HashType::Blake2s,
            start_mem_cost: 0,
            stop_mem_cost: 20,
            time_cost: 0,
            multiplies: 3,
            lanes: DEFAULT_LANES,
            parallelism: DEFAULT_PARALLELISM,
            block_size: DEFAULT_BLOCK_SIZE,
            sub_block_size: DEFAULT_SUB_BLOCK_SIZE,
            overwrite_cost: 0,
            side_channel_resistant: false,
        }
    }
}

impl Params {
    /// Check every field against its documented range.
    ///
    /// Runs before any allocation; a failure names the offending field and
    /// leaves all caller buffers untouched.
    pub fn validate(&self, hash_size: usize) -> Result<()> {
        if hash_size == 0 || hash_size % 4 != 0 || hash_size > MAX_HASH_SIZE {
            return Err(Error::InvalidParameters(
                "hash size must be a multiple of 4 from 4 to 255*32",
            ));
        }
        if hash_size > self.block_size as usize {
            return Err(Error::InvalidParameters(
                "hash size must not exceed the block size",
            ));
        }
        if self.lanes == 0 || self.lanes as usize > hash_size / 4 {
            return Err(Error::InvalidParameters(
                "lanes must be from 1 to hash size / 4",
            ));
        }
        if self.start_mem_cost > self.stop_mem_cost {
            return Err(Error::InvalidParameters(
                "start memory cost must not exceed stop memory cost",
            ));
        }
        if self.stop_mem_cost > MAX_MEM_COST {
            return Err(Error::InvalidParameters("memory cost must be at most 30"));
        }
        if self.time_cost > MAX_TIME_COST {
            return Err(Error::InvalidParameters("time cost must be at most 30"));
        }
        if self.multiplies > MAX_MULTIPLIES {
            return Err(Error::InvalidParameters("multiplies must be at most 8"));
        }
        if self.parallelism == 0 {
            return Err(Error::InvalidParameters(
                "parallelism must be from 1 to 255",
            ));
        }
        if !self.block_size.is_power_of_two() || self.block_size < 32 || self.block_size > 1 << 20
        {
            return Err(Error::InvalidParameters(
                "block size must be a power of 2 from 32 to 2^20",
            ));
        }
        if !self.sub_block_size.is_power_of_two()
            || self.sub_block_size < 32
            || self.sub_block_size > self.block_size
        {
            return Err(Error::InvalidParameters(
                "sub-block size must be a power of 2 from 32 to the block size",
            ));
        }
        if self.overwrite_cost > self.start_mem_cost {
            return Err(Error::InvalidParameters(
                "overwrite cost must not exceed the start memory cost",
            ));
        }
        Ok(())
    }

    /// Derive concrete sizes for one garlic level.
    ///
    /// Small levels cannot honour a large block size or parallelism, so the
    /// block length is halved (down to a 64-byte floor) and then the thread
    /// count reduced until the level holds a sane number of blocks per
    /// thread.  The adjustment is a pure function of the parameters, so it
    /// never affects determinism.
    pub(crate) fn geometry(&self, level: u8) -> Geometry {
        // Level memory in 32-bit words: 2^level KiB.
        let mem_words: u64 = 256u64 << level;
        let mut block_len = (self.block_size / 4) as u64;
        let mut sub_block_len = (self.sub_block_size / 4) as u64;
        let mut parallelism = self.parallelism as u64;

        let slices = SLICES as u64;
        let mut blocks_per_thread =
            slices * (mem_words / (slices * parallelism * block_len));
        if blocks_per_thread < MIN_BLOCKS {
            blocks_per_thread = MIN_BLOCKS;
            while parallelism * blocks_per_thread * block_len > mem_words {
                if block_len > 16 {
                    block_len >>= 1;
                } else if parallelism > 1 {
                    parallelism = (mem_words / (blocks_per_thread * block_len)).max(1);
                } else {
                    blocks_per_thread = mem_words / block_len;
                }
            }
        }
        if sub_block_len > block_len {
            sub_block_len = block_len;
        }

        Geometry {
            parallelism: parallelism as u32,
            block_len: block_len as u32,
            sub_block_len: sub_block_len as u32,
            blocks_per_thread,
        }
    }
}

/// Concrete sizes for one memory level, all in 32-bit words.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Geometry {
    pub parallelism: u32,
    pub block_len: u32,
    pub sub_block_len: u32,
    pub blocks_per_thread: u64,
}

impl Geometry {
    /// Total words of memory the level touches.
    pub fn words(&self) -> usize {
        self.words_u64() as usize
    }

    /// Same as [`Geometry::words`], without the pointer-width cast.
    pub fn words_u64(&self) -> u64 {
        self.parallelism as u64 * self.block_len as u64 * self.blocks_per_thread
    }
}

/// Expand the time cost into block-mix repetitions.
///
/// Values up to 8 keep a single pass (the multiplies knob carries the CPU
/// cost there); each step past 8 doubles the work per block.
pub(crate) fn repetitions(time_cost: u8) -> u32 {
    if time_cost <= 8 {
        1
    } else {
        1 << (time_cost - 8)
    }
}
