//! Randomness for scheduling and for random-playing strategies
//!
//! Scheduling prefers OS entropy. When entropy is unavailable, or a seed
//! is configured, a deterministic xorshift generator is used instead.

use rand::rngs::{OsRng, StdRng};
use rand::{Rng, RngCore, SeedableRng};

use crate::moves::Move;

/// Seeded random number generator
///
/// Deterministic: same seed + stream = same sequence
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    /// Create a new RNG from a 32-byte seed and a stream index
    pub fn new(seed: &[u8; 32], stream: u32) -> Self {
        let mut state = 0u64;
        for (i, chunk) in seed.chunks(8).enumerate() {
            let mut bytes = [0u8; 8];
            bytes[..chunk.len()].copy_from_slice(chunk);
            state ^= u64::from_le_bytes(bytes).wrapping_add(i as u64);
        }

        state ^= (stream as u64).wrapping_mul(0x517cc1b727220a95);

        // xorshift never leaves the all-zero state
        if state == 0 {
            state = 0x9e3779b97f4a7c15;
        }

        let mut rng = Self { state };
        for _ in 0..8 {
            rng.next_u64();
        }
        rng
    }

    pub fn from_u64(seed: u64) -> Self {
        Self::new(&seed_bytes(seed), 0)
    }

    /// Generate next u64
    pub fn next_u64(&mut self) -> u64 {
        // xorshift64*
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        self.state.wrapping_mul(0x2545f4914f6cdd1d)
    }

    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Generate a value 0-99 (for percentage checks)
    pub fn next_percent(&mut self) -> u8 {
        (self.next_u32() % 100) as u8
    }

    /// Generate a value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        self.next_u32() % max
    }

    pub fn next_bool(&mut self) -> bool {
        self.next_u64() >> 63 == 1
    }

    /// A uniformly chosen playable move
    pub fn next_move(&mut self) -> Move {
        Move::PLAYABLE[self.next_range(3) as usize]
    }
}

/// Spread a 64-bit seed over the 32-byte seed format
pub fn seed_bytes(seed: u64) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    for (i, chunk) in bytes.chunks_mut(8).enumerate() {
        let word = seed.rotate_left(16 * i as u32) ^ (i as u64).wrapping_mul(0x9e3779b97f4a7c15);
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    bytes
}

/// A seed for when nothing better is available
pub fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x2545f4914f6cdd1d)
}

/// The draws a match shuffle consumes
pub trait ShuffleDraws {
    /// Uniform index in [0, bound)
    fn below(&mut self, bound: usize) -> usize;
    /// Fair coin
    fn coin(&mut self) -> bool;
}

/// Source of randomness for match shuffling
#[derive(Clone, Debug)]
pub enum ShuffleSource {
    /// Seeded from the operating system.
    Entropy(StdRng),
    /// Deterministic fallback.
    Seeded(SeededRng),
}

impl ShuffleSource {
    pub fn from_entropy() -> Result<Self, rand::Error> {
        let mut seed = [0u8; 32];
        OsRng.try_fill_bytes(&mut seed)?;
        Ok(Self::Entropy(StdRng::from_seed(seed)))
    }

    pub fn seeded(seed: u64) -> Self {
        Self::Seeded(SeededRng::from_u64(seed))
    }

    /// Uniform index in [0, bound); 0 when bound is 0
    pub fn below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        match self {
            Self::Entropy(rng) => rng.gen_range(0..bound),
            Self::Seeded(rng) => rng.next_range(bound as u32) as usize,
        }
    }

    /// Fair coin
    pub fn coin(&mut self) -> bool {
        match self {
            Self::Entropy(rng) => rng.gen_bool(0.5),
            Self::Seeded(rng) => rng.next_bool(),
        }
    }

    pub fn is_deterministic(&self) -> bool {
        matches!(self, Self::Seeded(_))
    }
}

impl ShuffleDraws for ShuffleSource {
    fn below(&mut self, bound: usize) -> usize {
        ShuffleSource::below(self, bound)
    }

    fn coin(&mut self) -> bool {
        ShuffleSource::coin(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let seed = [42u8; 32];
        let mut r1 = SeededRng::new(&seed, 0);
        let mut r2 = SeededRng::new(&seed, 0);

        for _ in 0..100 {
            assert_eq!(r1.next_u64(), r2.next_u64());
        }
    }

    #[test]
    fn test_different_streams() {
        let seed = [42u8; 32];
        let mut r1 = SeededRng::new(&seed, 0);
        let mut r2 = SeededRng::new(&seed, 1);

        assert_ne!(r1.next_u64(), r2.next_u64());
    }

    #[test]
    fn test_zero_seed_still_moves() {
        let mut rng = SeededRng::new(&[0u8; 32], 0);
        let vals: Vec<_> = (0..4).map(|_| rng.next_u64()).collect();
        assert!(vals.iter().any(|v| *v != 0));
    }

    #[test]
    fn test_next_range() {
        let mut rng = SeededRng::from_u64(7);
        for max in [1, 3, 10, 1000] {
            for _ in 0..100 {
                assert!(rng.next_range(max) < max);
            }
        }
        assert_eq!(rng.next_range(0), 0);
    }

    #[test]
    fn test_next_move_covers_all_moves() {
        let mut rng = SeededRng::from_u64(11);
        let mut seen = [false; 3];
        for _ in 0..300 {
            let m = rng.next_move();
            assert!(m.is_playable());
            seen[(m.code() - 1) as usize] = true;
        }
        assert_eq!(seen, [true; 3]);
    }

    #[test]
    fn test_seed_bytes_differ() {
        assert_ne!(seed_bytes(1), seed_bytes(2));
        assert_eq!(seed_bytes(99), seed_bytes(99));
    }

    #[test]
    fn test_shuffle_source_bounds() {
        let mut seeded = ShuffleSource::seeded(5);
        assert!(seeded.is_deterministic());
        for bound in [1usize, 2, 17] {
            for _ in 0..50 {
                assert!(seeded.below(bound) < bound);
            }
        }
        assert_eq!(seeded.below(0), 0);

        if let Ok(mut entropy) = ShuffleSource::from_entropy() {
            assert!(!entropy.is_deterministic());
            for _ in 0..50 {
                assert!(entropy.below(4) < 4);
            }
        }
    }

    #[test]
    fn test_coin_produces_both_faces() {
        let mut source = ShuffleSource::seeded(3);
        let heads = (0..200).filter(|_| source.coin()).count();
        assert!(heads > 50 && heads < 150, "{} heads out of 200", heads);
    }
}
