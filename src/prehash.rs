//! Input binder: absorb everything that influences the output.
//!
//! Every parameter that can alter execution is hashed here, with explicit
//! big-endian lengths in front of the variable-length fields so that
//! `("ab", "c")` and `("a", "bc")` cannot collide.  `stop_mem_cost` is the
//! one deliberate omission: leaving it out is what lets a stored hash be
//! re-costed to a higher level without the password.

use zeroize::{Zeroize, Zeroizing};

use crate::params::Params;
use crate::provider::{decode_words, Hasher};

/// Produce the initial state for the garlic ladder.
///
/// Caller-owned secrets are wiped by the caller after this returns, never
/// before; on a validation failure upstream this function is never reached
/// and the buffers stay intact for a retry.
pub(crate) fn prehash(
    params: &Params,
    hash_size: usize,
    password: &[u8],
    salt: &[u8],
    data: &[u8],
) -> Zeroizing<Vec<u32>> {
    let ht = params.hash_type;
    let mut h = Hasher::new(ht);

    h.update(&(hash_size as u32).to_be_bytes());
    h.update(&(password.len() as u32).to_be_bytes());
    h.update(password);
    h.update(&(salt.len() as u32).to_be_bytes());
    h.update(salt);
    h.update(&(data.len() as u32).to_be_bytes());
    h.update(data);
    h.update(&[
        params.start_mem_cost,
        params.time_cost,
        params.multiplies,
        params.lanes,
        params.parallelism,
    ]);
    h.update(&params.block_size.to_be_bytes());
    h.update(&params.sub_block_size.to_be_bytes());
    h.update(&[params.overwrite_cost, params.side_channel_resistant as u8]);

    let mut digest = [0u8; 64];
    h.finalize_into(&mut digest[..ht.size()]);
    let mut state = Zeroizing::new(vec![0u32; ht.len()]);
    decode_words(&mut state, &digest[..ht.size()]);
    digest.zeroize();
    state
}
