//! AVX2 mixing kernel: the whole 8-word state in one 256-bit register.

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use crate::provider::STATE_WORDS;

/// Safety: caller must have verified AVX2 support, and slice lengths must
/// satisfy the same contract as the scalar kernel.
#[target_feature(enable = "avx2")]
#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn mix(
    state: &mut [u32; STATE_WORDS],
    from: &[u32],
    prev: &[u32],
    to: &mut [u32],
    sub_block_len: u32,
    multiplies: u32,
    repetitions: u32,
) -> u32 {
    let sub_block_len = sub_block_len as usize;
    let num_sub_blocks = from.len() / sub_block_len;
    let mask = num_sub_blocks - 1;

    let mut odd = [0u32; STATE_WORDS];
    for (o, s) in odd.iter_mut().zip(state.iter()) {
        *o = s | 1;
    }
    let mut v: i64 = 1;

    let mut s = _mm256_loadu_si256(state.as_ptr() as *const __m256i);

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

                s = _mm256_add_epi32(
                    s,
                    _mm256_loadu_si256(prev.as_ptr().add(pi) as *const __m256i),
                );
                s = _mm256_xor_si256(
                    s,
                    _mm256_loadu_si256(from.as_ptr().add(fi) as *const __m256i),
                );
                s = _mm256_or_si256(_mm256_srli_epi32::<24>(s), _mm256_slli_epi32::<8>(s));
                if write {
                    _mm256_storeu_si256(to.as_mut_ptr().add(ti) as *mut __m256i, s);
                    ti += 8;
                }
                pi += 8;
                fi += 8;
            }
        }
    }

    _mm256_storeu_si256(state.as_mut_ptr() as *mut __m256i, s);
    v as u32
}
