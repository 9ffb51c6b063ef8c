//! Memory-hard password hashing and key derivation.
//!
//! Derives a pseudorandom key from a password, salt and cost parameters by
//! filling and rereading a caller-sized memory array.  The fill runs in two
//! phases: a cache-timing-safe first half with data-independent addressing,
//! and a second half that reads at secret-dependent, cube-weighted distances
//! for maximum time-memory trade-off resistance.  A sequential
//! multiplication chain runs inside the memory loop so that custom hardware
//! gains are bounded by multiply latency as well as memory bandwidth.
//!
//! Memory cost is a "garlic" ladder: each level doubles the memory hashed,
//! and a stored hash can later be promoted to a higher level with
//! [`update_password`] — no password needed.  Server-relief deployments
//! split the work with [`client_hash_password`] / [`server_hash_password`].
//!
//! ```no_run
//! let mut hash = [0u8; 32];
//! let mut password = *b"correct horse";
//! mhkdf::hash_password(&mut hash, &mut password, b"per-user salt", 20, true)?;
//! # Ok::<(), mhkdf::Error>(())
//! ```

pub mod cli;
mod engine;
mod error;
mod kdf;
mod params;
mod prehash;
mod probe;
mod provider;

pub use error::{Error, Result};
pub use kdf::{
    client_hash_password, hash_password, hash_password_extended, hash_password_full, phs,
    server_hash_password, update_password,
};
pub use params::{
    Params, DEFAULT_BLOCK_SIZE, DEFAULT_LANES, DEFAULT_OVERWRITE_COST, DEFAULT_PARALLELISM,
    DEFAULT_SUB_BLOCK_SIZE, MAX_HASH_SIZE, MAX_MEM_COST, MAX_MULTIPLIES, MAX_TIME_COST, SLICES,
};
pub use probe::{find_cost_parameters, CostParameters};
pub use provider::HashType;
