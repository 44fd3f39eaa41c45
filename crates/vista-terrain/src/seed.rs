//! Deterministic seed derivation.
//!
//! Every random decision in terrain generation (octave offsets, decoration
//! scatter, prefab choice) is driven by a ChaCha8 stream derived from the world
//! seed, so a given world regenerates identically on any thread.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Combine the world seed with an arbitrary hashable key into a new u64 seed.
pub fn derive_seed(world_seed: u64, key: impl Hash) -> u64 {
    let mut hasher = DefaultHasher::new();
    world_seed.hash(&mut hasher);
    key.hash(&mut hasher);
    hasher.finish()
}

/// Deterministic RNG for the given world seed and key.
pub fn seeded_rng(world_seed: u64, key: impl Hash) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_seed(world_seed, key))
}

/// Deterministic RNG for scattering decorations over the chunk centred at `center`.
///
/// Chunk centres are hashed by their bit patterns, so `-0.0` and `0.0` are
/// distinct keys. Centres produced by the streaming manager are always
/// integer multiples of the chunk size.
pub fn scatter_rng(world_seed: u64, center: Vec2) -> ChaCha8Rng {
    seeded_rng(world_seed, ("scatter", center.x.to_bits(), center.y.to_bits()))
}
