//! The memory-filling engine: one level of the garlic ladder.
//!
//! A level extracts an 8-word accumulator from the running hash, derives one
//! state per memory thread, then runs four slices over the level's memory.
//! The first two slices use data-independent addressing (safe against
//! cache-timing observers), the last two read at secret-dependent addresses
//! for maximum trade-off resistance.  Threads synchronise at slice
//! boundaries; within a slice each thread owns its region's write window and
//! only reads memory finalised before the previous barrier.  After the last
//! slice, the tail of every region is folded back into the accumulator and
//! expanded over the hash buffer.

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod avx2;
mod memory;
mod mix;
mod schedule;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod sse2;

use log::trace;
use rayon::ThreadPool;
use zeroize::Zeroize;

use crate::params::{Geometry, SLICES};
use crate::provider::{HashType, STATE_WORDS};
use memory::SharedMem;
use schedule::{distance_cubed, sliding_reverse};

pub(crate) use mix::Kernel;

/// Knobs that stay fixed across the levels of one derivation.
#[derive(Clone, Copy)]
pub(crate) struct EngineConfig {
    pub multiplies: u32,
    pub repetitions: u32,
    /// Use the data-independent schedule for all four slices.
    pub resistant_everywhere: bool,
    pub kernel: Kernel,
}

/// Hash one garlic level in place.
///
/// `mem` must hold exactly `geo.words()` words; `hash` carries the running
/// value in and out.
pub(crate) fn hash_memory_level(
    ht: HashType,
    hash: &mut [u8],
    mem: &mut [u32],
    geo: &Geometry,
    cfg: &EngineConfig,
    pool: &ThreadPool,
) {
    debug_assert_eq!(mem.len(), geo.words());

    let mut acc = ht.extract(hash);
    hash.zeroize();

    let mut states: Vec<[u32; STATE_WORDS]> = (0..geo.parallelism)
        .map(|p| {
            let mut s = acc;
            ht.hash_state(&mut s, p);
            s
        })
        .collect();

    {
        let shared = SharedMem::new(mem);
        let blocks = geo.blocks_per_thread;
        for slice in 0..SLICES {
            let completed = slice as u64 * blocks / SLICES as u64;
            let end = (slice as u64 + 1) * blocks / SLICES as u64;
            let resistant = slice < SLICES / 2 || cfg.resistant_everywhere;
            trace!(
                "slice {slice}: blocks {completed}..{end}, {} addressing",
                if resistant { "fixed" } else { "data-dependent" }
            );
            let shared = &shared;
            pool.scope(|scope| {
                for (p, state) in states.iter_mut().enumerate() {
                    scope.spawn(move |_| {
                        let worker = Worker {
                            ht,
                            cfg: *cfg,
                            geo: *geo,
                            shared,
                            p: p as u32,
                        };
                        if resistant {
                            worker.hash_resistant_slice(state, completed, end);
                        } else {
                            worker.hash_unpredictable_slice(state, completed, end);
                        }
                    });
                }
            });
        }
    }

    // Fold the tail of every region into the accumulator.
    let region = geo.block_len as usize * geo.blocks_per_thread as usize;
    for p in 0..geo.parallelism as usize {
        let tail = (p + 1) * region - STATE_WORDS;
        for k in 0..STATE_WORDS {
            acc[k] = acc[k].wrapping_add(mem[tail + k]);
        }
    }
    ht.expand(hash, &acc);

    acc.zeroize();
    states.zeroize();
}

/// Per-thread view of one slice's work.
struct Worker<'a, 'm> {
    ht: HashType,
    cfg: EngineConfig,
    geo: Geometry,
    shared: &'a SharedMem<'m>,
    p: u32,
}

impl Worker<'_, '_> {
    /// Slice with data-independent addressing (sliding bit-reversal).
    fn hash_resistant_slice(&self, state: &mut [u32; STATE_WORDS], completed: u64, end: u64) {
        let bl = self.geo.block_len as u64;
        let blocks = self.geo.blocks_per_thread;
        let par = self.geo.parallelism as u64;
        let start = bl * blocks * self.p as u64;

        let mut first = completed;
        if completed == 0 {
            // Seed the region's first block from the thread state.
            let block = unsafe { self.shared.window_mut(start, self.geo.block_len) };
            for (i, chunk) in block.chunks_exact_mut(STATE_WORDS).enumerate() {
                let mut s = *state;
                self.ht.hash_state(&mut s, i as u32);
                chunk.copy_from_slice(&s);
            }
            first = 1;
        }

        for i in first..end {
            let mut from = bl * sliding_reverse(i);
            if from < completed * bl {
                // Reference landed before the last barrier: borrow a peer
                // region instead of always rereading our own.
                from += bl * blocks * (i % par);
            } else {
                from += start;
            }
            let to = start + i * bl;
            self.mix_block(state, from, to, self.geo.block_len);
        }
    }

    /// Slice with secret-dependent addressing (cube-weighted distance).
    fn hash_unpredictable_slice(&self, state: &mut [u32; STATE_WORDS], completed: u64, end: u64) {
        let bl = self.geo.block_len as u64;
        let blocks = self.geo.blocks_per_thread;
        let par = self.geo.parallelism as u64;
        let start = bl * blocks * self.p as u64;

        for i in completed..end {
            let distance = distance_cubed(i, state[0]);
            let mut from = (i - 1 - distance) * bl;
            if from < completed * bl {
                from += bl * (state[1] as u64 % par) * blocks;
            } else {
                from += start;
            }
            let to = start + i * bl;
            self.mix_block(state, from, to, self.geo.sub_block_len);
        }
    }

    fn mix_block(&self, state: &mut [u32; STATE_WORDS], from: u64, to: u64, sub_block_len: u32) {
        let bl = self.geo.block_len;
        let prev = to - bl as u64;
        // Safety: `to` is inside this worker's region and unread by peers
        // until the next barrier; `from` and `prev` are finalised blocks.
        let (from_w, prev_w, to_w) = unsafe {
            (
                self.shared.window(from, bl),
                self.shared.window(prev, bl),
                self.shared.window_mut(to, bl),
            )
        };
        let v = mix::mix_blocks(
            self.cfg.kernel,
            state,
            from_w,
            prev_w,
            to_w,
            sub_block_len,
            self.cfg.multiplies,
            self.cfg.repetitions,
        );
        self.ht.hash_state(state, v);
    }
}
