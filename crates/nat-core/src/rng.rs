//! Seeded randomness for graph generators, benches and property tests.

use std::hash::Hasher;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use siphasher::sip::SipHasher13;

/// Deterministic RNG handle.
///
/// Two handles built from the same seed yield the same stream on every
/// platform. Independent streams (topology vs. weights, say) are split off
/// with [`RngHandle::substream`], which hashes `(seed, stream)` with
/// zero-keyed SipHash-1-3.
#[derive(Debug, Clone)]
pub struct RngHandle {
    seed: u64,
    rng: StdRng,
}

impl RngHandle {
    /// Creates a handle from a master seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Returns the master seed this handle was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns a fresh handle for the numbered substream of this seed.
    pub fn substream(&self, stream: u64) -> Self {
        Self::from_seed(derive_substream_seed(self.seed, stream))
    }

    /// Draws an edge weight uniformly from `[low, high)`.
    pub fn weight(&mut self, low: f64, high: f64) -> f64 {
        self.rng.gen_range(low..high)
    }

    /// Draws an index uniformly from `0..len`. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// Derives the seed of a numbered substream.
pub fn derive_substream_seed(master_seed: u64, stream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(stream);
    hasher.finish()
}
