//! Pluggable cryptographic hash providers.
//!
//! The key-derivation core never touches a hash primitive directly; it goes
//! through [`HashType`], a sum type over the four supported primitives, and
//! the small set of derived operations built on top of init/update/finalize:
//! [`HashType::extract`], [`HashType::expand`], [`HashType::hash_state`] and
//! [`HashType::rehash`].  Digest size is a runtime property of the variant
//! (32 bytes for Blake2s/SHA-256, 64 bytes for Blake2b/SHA-512).
//!
//! The memory engine works on 256-bit (8 × u32) states for every provider;
//! 64-byte digests are truncated to their left half when decoded back into a
//! state.  All byte/word conversions are big-endian.

use blake2::digest::Digest;
use blake2::{Blake2b512, Blake2s256};
use sha2::{Sha256, Sha512};
use zeroize::Zeroize;

/// Width of the engine state in 32-bit words.
pub(crate) const STATE_WORDS: usize = 8;

/// The hash primitives that can back a derivation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashType {
    Blake2s,
    Blake2b,
    Sha256,
    Sha512,
}

impl HashType {
    /// Every supported variant, in lookup order.
    pub const ALL: [HashType; 4] = [
        HashType::Blake2s,
        HashType::Blake2b,
        HashType::Sha256,
        HashType::Sha512,
    ];

    /// Digest size in bytes.
    pub fn size(self) -> usize {
        match self {
            HashType::Blake2s | HashType::Sha256 => 32,
            HashType::Blake2b | HashType::Sha512 => 64,
        }
    }

    /// Digest size in 32-bit words.
    pub fn len(self) -> usize {
        self.size() / 4
    }

    /// Canonical lower-case name, accepted by [`HashType::find`].
    pub fn name(self) -> &'static str {
        match self {
            HashType::Blake2s => "blake2s",
            HashType::Blake2b => "blake2b",
            HashType::Sha256 => "sha256",
            HashType::Sha512 => "sha512",
        }
    }

    /// Case-insensitive name lookup.
    pub fn find(name: &str) -> Option<HashType> {
        HashType::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    /// One-shot hash of `bytes`, decoded into a fresh 8-word state.
    pub(crate) fn extract(self, bytes: &[u8]) -> [u32; STATE_WORDS] {
        let mut h = Hasher::new(self);
        h.update(bytes);
        let mut digest = [0u8; 64];
        h.finalize_into(&mut digest[..self.size()]);
        let mut state = [0u32; STATE_WORDS];
        decode_words(&mut state, &digest[..32]);
        digest.zeroize();
        state
    }

    /// In-place scramble of an 8-word state, salted with `v`.
    pub(crate) fn hash_state(self, state: &mut [u32; STATE_WORDS], v: u32) {
        let mut buf = [0u8; 32];
        encode_words(&mut buf, state);
        let mut h = Hasher::new(self);
        h.update(&buf);
        h.update(&v.to_be_bytes());
        let mut digest = [0u8; 64];
        h.finalize_into(&mut digest[..self.size()]);
        decode_words(state, &digest[..32]);
        buf.zeroize();
        digest.zeroize();
    }

    /// Expand a word state into `out.len()` bytes.
    ///
    /// The encoded state is the key; each output chunk is a fresh
    /// finalization over the key plus a chunk counter, so requesting a longer
    /// output does not merely extend a shorter one.
    pub(crate) fn expand(self, out: &mut [u8], state: &[u32]) {
        let size = self.size();
        let key_len = state.len() * 4;
        debug_assert!(key_len <= 64);
        let mut key = [0u8; 64];
        encode_words(&mut key[..key_len], state);
        for (i, chunk) in out.chunks_mut(size).enumerate() {
            let mut h = Hasher::new(self);
            h.update(&key[..key_len]);
            h.update(&(i as u32).to_be_bytes());
            let mut digest = [0u8; 64];
            h.finalize_into(&mut digest[..size]);
            chunk.copy_from_slice(&digest[..chunk.len()]);
            digest.zeroize();
        }
        key.zeroize();
    }

    /// Hash a buffer onto itself: extract a state from the current contents,
    /// then expand it back over the buffer.  This is the per-level fold and
    /// the single server-relief step.
    pub(crate) fn rehash(self, buf: &mut [u8]) {
        let mut state = self.extract(buf);
        self.expand(buf, &state);
        state.zeroize();
    }
}

/// Streaming hasher over the selected primitive.
pub(crate) enum Hasher {
    Blake2s(Blake2s256),
    Blake2b(Blake2b512),
    Sha256(Sha256),
    Sha512(Sha512),
}

impl Hasher {
    pub fn new(t: HashType) -> Hasher {
        match t {
            HashType::Blake2s => Hasher::Blake2s(Blake2s256::new()),
            HashType::Blake2b => Hasher::Blake2b(Blake2b512::new()),
            HashType::Sha256 => Hasher::Sha256(Sha256::new()),
            HashType::Sha512 => Hasher::Sha512(Sha512::new()),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        match self {
            Hasher::Blake2s(h) => h.update(data),
            Hasher::Blake2b(h) => h.update(data),
            Hasher::Sha256(h) => h.update(data),
            Hasher::Sha512(h) => h.update(data),
        }
    }

    /// Finalize into `out`, which must be exactly the digest size.
    pub fn finalize_into(self, out: &mut [u8]) {
        match self {
            Hasher::Blake2s(h) => out.copy_from_slice(h.finalize().as_slice()),
            Hasher::Blake2b(h) => out.copy_from_slice(h.finalize().as_slice()),
            Hasher::Sha256(h) => out.copy_from_slice(h.finalize().as_slice()),
            Hasher::Sha512(h) => out.copy_from_slice(h.finalize().as_slice()),
        }
    }
}

/// Big-endian encode words into `bytes`; lengths must match.
pub(crate) fn encode_words(bytes: &mut [u8], words: &[u32]) {
    for (chunk, w) in bytes.chunks_exact_mut(4).zip(words) {
        chunk.copy_from_slice(&w.to_be_bytes());
    }
}

/// Big-endian decode `bytes` into words; lengths must match.
pub(crate) fn decode_words(words: &mut [u32], bytes: &[u8]) {
    for (w, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
        *w = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_lookup_is_case_insensitive() {
        assert_eq!(HashType::find("Blake2S"), Some(HashType::Blake2s));
        assert_eq!(HashType::find("SHA512"), Some(HashType::Sha512));
        assert_eq!(HashType::find("md5"), None);
    }

    #[test]
    fn sizes_match_variants() {
        assert_eq!(HashType::Blake2s.size(), 32);
        assert_eq!(HashType::Blake2b.size(), 64);
        assert_eq!(HashType::Sha256.len(), 8);
        assert_eq!(HashType::Sha512.len(), 16);
    }

    #[test]
    fn word_codec_round_trips() {
        let words = [0x01020304u32, 0xdeadbeef, 0, u32::MAX];
        let mut bytes = [0u8; 16];
        encode_words(&mut bytes, &words);
        assert_eq!(&bytes[..4], &[1, 2, 3, 4]);
        let mut back = [0u32; 4];
        decode_words(&mut back, &bytes);
        assert_eq!(back, words);
    }

    #[test]
    fn expand_chunks_are_domain_separated() {
        let state = [7u32; 8];
        let mut out = [0u8; 64];
        HashType::Blake2s.expand(&mut out, &state);
        // Chunk 0 and chunk 1 come from different counters.
        assert_ne!(&out[..32], &out[32..]);
    }

    #[test]
    fn extract_differs_between_providers() {
        let a = HashType::Blake2s.extract(b"abc");
        let b = HashType::Sha256.extract(b"abc");
        assert_ne!(a, b);
    }

    #[test]
    fn hash_state_depends_on_salt() {
        let mut a = [1u32; 8];
        let mut b = [1u32; 8];
        HashType::Sha512.hash_state(&mut a, 0);
        HashType::Sha512.hash_state(&mut b, 1);
        assert_ne!(a, b);
    }
}
