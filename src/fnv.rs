//! 64-bit [FNV-1a hashing], used to address `FixedHashTable` buckets.
//!
//! Hashing feeds the raw bytes of the key and nothing else: unlike
//! `<str as Hash>::hash`, no length or terminator byte is appended, so
//! `fnv1a_64(key.as_bytes())` and an `Fnv64` fed via `write` agree.
//!
//! [FNV-1a hashing]: http://www.isthe.com/chongo/tech/comp/fnv/#FNV-1a

use core::hash::{BuildHasher, Hasher};

/// A 64-bit FNV-1a hasher.
#[derive(Clone, Copy, Debug)]
pub struct Fnv64(u64);

impl Fnv64 {
    /// The 64-bit [FNV prime].
    ///
    /// [FNV prime]: http://www.isthe.com/chongo/tech/comp/fnv/#FNV-param
    pub const PRIME: u64 = 0x100000001b3;

    /// The 64-bit [FNV offset basis].
    ///
    /// [FNV offset basis]: http://www.isthe.com/chongo/tech/comp/fnv/#FNV-param
    pub const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
}

impl Default for Fnv64 {
    #[inline]
    fn default() -> Fnv64 {
        Fnv64(Self::OFFSET_BASIS)
    }
}

impl Hasher for Fnv64 {
    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }

    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        let Fnv64(mut hash) = *self;

        for &byte in bytes {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(Self::PRIME);
        }

        *self = Fnv64(hash);
    }
}

/// `BuildHasher` producing fresh [`Fnv64`] states. Stateless, so every
/// table built with it addresses keys identically.
#[derive(Clone, Copy, Debug, Default)]
pub struct FnvBuildHasher;

impl BuildHasher for FnvBuildHasher {
    type Hasher = Fnv64;

    #[inline]
    fn build_hasher(&self) -> Fnv64 {
        Fnv64::default()
    }
}

/// One-shot FNV-1a over `bytes`.
#[inline]
#[must_use]
pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut h = Fnv64::default();
    h.write(bytes);
    h.finish()
}
