//! Error type shared by every hashing entry point.

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Failures surfaced to the caller.
///
/// All errors are final: the operation performed no partial work that the
/// caller could resume, and the output buffer is left untouched.  Callers
/// retry with different parameters or give up.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A parameter is outside its documented range.  The offending field is
    /// named in the message; ranges are checked before any allocation.
    #[error("invalid parameters: {0}")]
    InvalidParameters(&'static str),

    /// Allocating the memory array failed.
    #[error("memory allocation failed")]
    OutOfMemory,

    /// The worker thread pool could not be created.
    #[error("thread spawn failed")]
    SpawnFailed,

    /// An underlying hash primitive reported failure.  The built-in pure-Rust
    /// providers cannot produce this; it exists for external providers.
    #[error("hash primitive failed")]
    HashFailed,
}
