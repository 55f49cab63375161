//! World Digest
//!
//! SHA-256 over a canonical byte encoding of the simulation. Two worlds
//! with equal digests took the same path; the reconciler and the replay
//! tests compare digests instead of whole states.
//!
//! Every integer is fed little-endian. Field order is fixed by the
//! `hash_into` implementations in `game::state`.

use sha2::{Sha256, Digest};
use super::vec2::FixedVec2;

/// 32-byte world digest.
pub type StateHash = [u8; 32];

const DOMAIN: &[u8] = b"BOSS_ARENA_STATE_V1";

/// A value with a canonical byte encoding.
pub trait Digestible {
    /// Feed the encoding into `hasher`.
    fn digest(&self, hasher: &mut StateHasher);
}

macro_rules! digest_le {
    ($($ty:ty),*) => {$(
        impl Digestible for $ty {
            #[inline]
            fn digest(&self, hasher: &mut StateHasher) {
                hasher.inner.update(self.to_le_bytes());
            }
        }
    )*};
}

digest_le!(u8, u16, u32, u64, i32);

impl Digestible for bool {
    #[inline]
    fn digest(&self, hasher: &mut StateHasher) {
        (*self as u8).digest(hasher);
    }
}

impl Digestible for [u8; 16] {
    #[inline]
    fn digest(&self, hasher: &mut StateHasher) {
        hasher.inner.update(self);
    }
}

impl Digestible for FixedVec2 {
    #[inline]
    fn digest(&self, hasher: &mut StateHasher) {
        self.x.digest(hasher);
        self.y.digest(hasher);
    }
}

/// Running digest. Field order matters.
pub struct StateHasher {
    inner: Sha256,
}

impl StateHasher {
    fn new() -> Self {
        let mut inner = Sha256::new();
        inner.update(DOMAIN);
        Self { inner }
    }

    /// Append one value.
    #[inline]
    pub fn put<T: Digestible>(&mut self, value: T) {
        value.digest(self);
    }

    fn finish(self) -> StateHash {
        self.inner.finalize().into()
    }
}

/// Digest a world. Tick and RNG words lead; `add_state` appends the rest.
pub fn compute_state_hash<F>(tick: u32, rng_state: [u64; 2], add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::new();
    hasher.put(tick);
    hasher.put(rng_state[0]);
    hasher.put(rng_state[1]);
    add_state(&mut hasher);
    hasher.finish()
}
