//! Deterministic Random Number Generator
//!
//! Xorshift128+ seeded through SplitMix64. The generator lives inside
//! `WorldState`, so it is snapshotted and restored together with the rest of
//! the world and a resimulated tick draws exactly the same numbers.

use serde::{Serialize, Deserialize};

/// Deterministic PRNG using Xorshift128+ algorithm.
///
/// # Example
///
/// ```
/// use boss_arena::core::rng::DeterministicRng;
///
/// let mut a = DeterministicRng::new(12345);
/// let mut b = DeterministicRng::new(12345);
/// assert_eq!(a.next_u64(), b.next_u64());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 64-bit seed.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // Ensure state is never all zeros
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Generate a random integer in range [0, max).
    #[inline]
    pub fn next_int(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        (self.next_u64() % max as u64) as u32
    }

    /// Pick an index with probability proportional to its weight.
    ///
    /// Zero weights are never picked. Returns `None` when every weight is
    /// zero. Exactly one draw is consumed whenever a pick is possible.
    pub fn choose_weighted(&mut self, weights: &[u32]) -> Option<usize> {
        let total: u64 = weights.iter().map(|w| *w as u64).sum();
        if total == 0 {
            return None;
        }
        let mut roll = self.next_u64() % total;
        for (index, weight) in weights.iter().enumerate() {
            let weight = *weight as u64;
            if roll < weight {
                return Some(index);
            }
            roll -= weight;
        }
        None
    }

    /// Get current state (for hashing/debugging).
    pub fn state(&self) -> [u64; 2] {
        self.state
    }
}

/// SplitMix64 for seed initialization.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_determinism() {
        let mut rng1 = DeterministicRng::new(12345);
        let mut rng2 = DeterministicRng::new(12345);

        for _ in 0..1000 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn test_clone_continues_identically() {
        let mut rng = DeterministicRng::new(7);
        rng.next_u64();
        let mut restored = rng.clone();
        assert_eq!(rng, restored);
        for _ in 0..100 {
            assert_eq!(rng.next_int(50), restored.next_int(50));
        }
    }

    #[test]
    fn test_next_int_bounds() {
        let mut rng = DeterministicRng::new(1234);
        for _ in 0..1000 {
            assert!(rng.next_int(7) < 7);
        }
        assert_eq!(rng.next_int(0), 0);
    }

    #[test]
    fn test_choose_weighted_skips_zero_weights() {
        let mut rng = DeterministicRng::new(99);
        for _ in 0..500 {
            let pick = rng.choose_weighted(&[0, 3, 0, 1]).unwrap();
            assert!(pick == 1 || pick == 3);
        }
        assert_eq!(rng.choose_weighted(&[0, 0]), None);
        assert_eq!(rng.choose_weighted(&[]), None);
    }

    #[test]
    fn test_choose_weighted_distribution() {
        let mut rng = DeterministicRng::new(4242);
        let mut counts = [0u32; 2];
        for _ in 0..4000 {
            counts[rng.choose_weighted(&[3, 1]).unwrap()] += 1;
        }
        // 3:1 weighting, loose bounds
        assert!(counts[0] > 2600 && counts[0] < 3400, "counts = {:?}", counts);
    }
}
