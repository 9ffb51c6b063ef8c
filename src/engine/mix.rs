//! The block mixing function and its kernel dispatch.
//!
//! [`mix_scalar`] is the normative definition: it interleaves a
//! latency-bound multiplication chain with a bandwidth-bound add/xor/rotate
//! pass over three blocks (`from`, `prev`, `to`).  The vectorised kernels in
//! [`super::sse2`] and [`super::avx2`] must produce byte-identical results;
//! they are selected once per call by [`Kernel::detect`].

use crate::provider::STATE_WORDS;

/// Which mixing kernel to run.  Detection happens once per derivation, never
/// per block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Kernel {
    Scalar,
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    Sse2,
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    Avx2,
}

impl Kernel {
    /// Pick the fastest kernel the CPU supports.
    pub fn detect() -> Kernel {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            if is_x86_feature_detected!("avx2") {
                return Kernel::Avx2;
            }
            if is_x86_feature_detected!("sse2") {
                return Kernel::Sse2;
            }
        }
        Kernel::Scalar
    }
}

/// Mix `from` and `prev` into `to`, updating `state` in place.
///
/// Returns the final multiplication-chain value, which the caller folds into
/// the state with a cryptographic hash.
#[allow(clippy::too_many_arguments)]
pub(crate) fn mix_blocks(
    kernel: Kernel,
    state: &mut [u32; STATE_WORDS],
    from: &[u32],
    prev: &[u32],
    to: &mut [u32],
    sub_block_len: u32,
    multiplies: u32,
    repetitions: u32,
) -> u32 {
    match kernel {
        Kernel::Scalar => mix_scalar(state, from, prev, to, sub_block_len, multiplies, repetitions),
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        Kernel::Sse2 => unsafe {
            super::sse2::mix(state, from, prev, to, sub_block_len, multiplies, repetitions)
        },
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        Kernel::Avx2 => unsafe {
            super::avx2::mix(state, from, prev, to, sub_block_len, multiplies, repetitions)
        },
    }
}

/// Scalar reference kernel.
///
/// Each repetition walks the block in sub-blocks.  The first word of the
/// `from` window picks which sub-block of `prev` to read, then every group
/// of eight words runs the multiplication chain followed by the memory hash:
/// add a `prev` word, xor a `from` word, rotate left 8.  Only the final
/// repetition writes `to`.
pub(crate) fn mix_scalar(
    state: &mut [u32; STATE_WORDS],
    from: &[u32],
    prev: &[u32],
    to: &mut [u32],
    sub_block_len: u32,
    multiplies: u32,
    repetitions: u32,
) -> u32 {
    let block_len = from.len();
    let sub_block_len = sub_block_len as usize;
    let num_sub_blocks = block_len / sub_block_len;
    let mask = num_sub_blocks - 1;

    // Snapshot odd multipliers so the chain can never collapse to zero.
    let mut odd = [0u32; STATE_WORDS];
    for (o, s) in odd.iter_mut().zip(state.iter()) {
        *o = s | 1;
    }
    let mut v: i64 = 1;

    for r in 0..repetitions {
        let write = r == repetitions - 1;
        let mut fi = 0;
        let mut ti = 0;
        for _ in 0..num_sub_blocks {
            let mut rand_val = from[fi];
            let mut pi = sub_block_len * (rand_val as usize & mask);
            for _ in 0..sub_block_len / 8 {
                for k in 0..multiplies as usize {
                    v = (v as i32 as i64).wrapping_mul(odd[k] as i64);
                    v ^= rand_val as i64;
                    rand_val = rand_val.wrapping_add((v >> 32) as u32);
                }
                for k in 0..STATE_WORDS {
                    state[k] = (state[k].wrapping_add(prev[pi]) ^ from[fi]).rotate_left(8);
                    pi += 1;
                    fi += 1;
                    if write {
                        to[ti] = state[k];
                        ti += 1;
                    }
                }
            }
        }
    }
    v as u32
}
