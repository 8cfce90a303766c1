//! Deterministic pseudo-random source.
//!
//! The engine only needs randomness to pick a probing start point when
//! allocating IDs, but that choice is persisted in the world, so every
//! implementation must be a pure function of its seed. Replaying a world from
//! the same seed must allocate the same IDs.

/// Pseudo-random oracle keyed by an explicit seed.
pub trait RngOracle: Send + Sync {
    /// Generate a u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Generate a value in `[min, max]` inclusive.
    fn range(&self, seed: u64, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let span = u64::from(max - min) + 1;
        min + (u64::from(self.next_u32(seed)) % span) as u32
    }
}

/// PCG-XSH-RR generator: 64-bit LCG state, 32-bit permuted output.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::output(Self::step(seed))
    }
}

/// Mixes the world seed with a per-call nonce and a context value into a
/// single seed, so successive allocations draw independent values.
pub fn compute_seed(world_seed: u64, nonce: u64, context: u32) -> u64 {
    let mut hash = world_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(context).wrapping_mul(0x517cc1b727220a95);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}
