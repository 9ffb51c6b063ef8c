//! SSE2 mixing kernel: 128-bit lanes, two registers for the 8-word state.
//!
//! Must stay byte-identical to [`super::mix::mix_scalar`]; the multiplication
//! chain stays scalar because its whole point is serial latency.

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use crate::provider::STATE_WORDS;

/// Safety: caller must have verified SSE2 support, and slice lengths must
/// satisfy the same contract as the scalar kernel.
#[target_feature(enable = "sse2")]
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

    let mut s1 = _mm_loadu_si128(state.as_ptr() as *const __m128i);
    let mut s2 = _mm_loadu_si128(state.as_ptr().add(4) as *const __m128i);

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

                s1 = _mm_add_epi32(s1, _mm_loadu_si128(prev.as_ptr().add(pi) as *const __m128i));
                s1 = _mm_xor_si128(s1, _mm_loadu_si128(from.as_ptr().add(fi) as *const __m128i));
                s1 = _mm_or_si128(_mm_srli_epi32::<24>(s1), _mm_slli_epi32::<8>(s1));
                s2 = _mm_add_epi32(
                    s2,
                    _mm_loadu_si128(prev.as_ptr().add(pi + 4) as *const __m128i),
                );
                s2 = _mm_xor_si128(
                    s2,
                    _mm_loadu_si128(from.as_ptr().add(fi + 4) as *const __m128i),
                );
                s2 = _mm_or_si128(_mm_srli_epi32::<24>(s2), _mm_slli_epi32::<8>(s2));
                if write {
                    _mm_storeu_si128(to.as_mut_ptr().add(ti) as *mut __m128i, s1);
                    _mm_storeu_si128(to.as_mut_ptr().add(ti + 4) as *mut __m128i, s2);
                    ti += 8;
                }
                pi += 8;
                fi += 8;
            }
        }
    }

    _mm_storeu_si128(state.as_mut_ptr() as *mut __m128i, s1);
    _mm_storeu_si128(state.as_mut_ptr().add(4) as *mut __m128i, s2);
    v as u32
}
