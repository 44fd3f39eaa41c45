//! Per-chunk map assembly: noise, optional island falloff, decoration scatter.

use std::sync::Arc;
use std::time::Instant;

use glam::{Vec2, Vec3};

use crate::decoration::{DecorationSettings, scatter_decorations};
use crate::falloff::FalloffCache;
use crate::height_grid::HeightGrid;
use crate::noise_field::{NoiseSettings, generate_noise_map};
use crate::seed::scatter_rng;
use crate::settings::TerrainSettings;

/// Immutable product of generating one chunk.
#[derive(Clone, Debug)]
pub struct MapResult {
    /// `(N + 2) x (N + 2)` heights in `[0, 1]`, border included.
    pub heights: Arc<HeightGrid>,
    /// Placement points per decoration category, in category order.
    pub placements: Vec<Vec<Vec3>>,
}

impl MapResult {
    /// Total placement points over all categories.
    pub fn placement_count(&self) -> usize {
        self.placements.iter().map(Vec::len).sum()
    }
}

/// Builds [`MapResult`]s for chunks of a fixed size.
///
/// Shared between worker threads behind an `Arc`; the falloff mask is built
/// lazily on first use and read-only afterwards.
#[derive(Debug)]
pub struct HeightGridAssembler {
    noise: NoiseSettings,
    terrain: TerrainSettings,
    decorations: DecorationSettings,
    map_chunk_size: usize,
    falloff: FalloffCache,
}

impl HeightGridAssembler {
    /// Create an assembler for chunks with `map_chunk_size` rendered samples per line.
    pub fn new(
        noise: NoiseSettings,
        terrain: TerrainSettings,
        decorations: DecorationSettings,
        map_chunk_size: usize,
    ) -> Self {
        let grid_size = map_chunk_size + 2;
        Self {
            noise: noise.sanitized(),
            terrain,
            decorations,
            map_chunk_size,
            falloff: FalloffCache::new(grid_size),
        }
    }

    /// Rendered samples per line (`N`).
    pub fn map_chunk_size(&self) -> usize {
        self.map_chunk_size
    }

    /// Samples per line including the border ring (`N + 2`).
    pub fn grid_size(&self) -> usize {
        self.map_chunk_size + 2
    }

    pub fn noise(&self) -> &NoiseSettings {
        &self.noise
    }

    pub fn terrain(&self) -> &TerrainSettings {
        &self.terrain
    }

    pub fn decorations(&self) -> &DecorationSettings {
        &self.decorations
    }

    /// The falloff mask for this chunk size.
    pub fn falloff_mask(&self) -> &HeightGrid {
        self.falloff.get()
    }

    /// Height grid only, without decoration scatter.
    pub fn generate_heights(&self, center: Vec2) -> HeightGrid {
        let size = self.grid_size();
        let mut heights = generate_noise_map(size, size, &self.noise, center);

        if self.terrain.use_falloff {
            let strength = self.terrain.falloff_strength;
            let mask = self.falloff.get();
            for (h, f) in heights.values_mut().iter_mut().zip(mask.values()) {
                *h = (*h - f * strength).clamp(0.0, 1.0);
            }
        }

        heights
    }

    /// Generate the complete map for the chunk centred at `center` (sample units).
    pub fn generate(&self, center: Vec2) -> MapResult {
        let start = Instant::now();
        let heights = self.generate_heights(center);

        let mut rng = scatter_rng(self.noise.seed, center);
        let placements =
            scatter_decorations(&heights, center, &self.terrain, &self.decorations, &mut rng);

        let result = MapResult {
            heights: Arc::new(heights),
            placements,
        };
        tracing::trace!(
            center = ?center,
            placements = result.placement_count(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "assembled chunk map"
        );
        result
    }
}
