//! Decoration scatter: height-banded, density-driven placement points with
//! optional collision-free spacing across all categories.

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::height_grid::HeightGrid;
use crate::settings::TerrainSettings;

/// One category of decorative objects (trees, rocks, ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorationCategory {
    pub name: String,
    /// Opaque prefab handles; the instantiation side picks one per point.
    pub prefabs: Vec<String>,
    /// Probability that an in-band cell becomes a candidate.
    pub density: f32,
    /// Lowest normalised height at which this category spawns.
    pub min_spawn_height: f32,
    /// Highest normalised height at which this category spawns.
    pub max_spawn_height: f32,
    /// Extra factor on the placement height.
    pub spawn_height_multiplier: f32,
}

impl Default for DecorationCategory {
    fn default() -> Self {
        Self {
            name: String::new(),
            prefabs: Vec::new(),
            density: 0.01,
            min_spawn_height: 0.3,
            max_spawn_height: 0.5,
            spawn_height_multiplier: 1.0,
        }
    }
}

impl DecorationCategory {
    /// Returns `true` if `height` lies inside the category's spawn band.
    pub fn in_band(&self, height: f32) -> bool {
        height >= self.min_spawn_height && height <= self.max_spawn_height
    }
}

/// Scatter configuration for all categories.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorationSettings {
    /// Reject candidates closer than `min_spawn_distance` to any accepted point.
    pub collision_free_spawning: bool,
    /// Minimum distance between accepted points, in world units.
    pub min_spawn_distance: f32,
    pub categories: Vec<DecorationCategory>,
}

impl Default for DecorationSettings {
    fn default() -> Self {
        Self {
            collision_free_spawning: true,
            min_spawn_distance: 4.0,
            categories: vec![
                DecorationCategory {
                    name: "trees".to_string(),
                    density: 0.01,
                    min_spawn_height: 0.35,
                    max_spawn_height: 0.55,
                    ..Default::default()
                },
                DecorationCategory {
                    name: "rocks".to_string(),
                    density: 0.005,
                    min_spawn_height: 0.5,
                    max_spawn_height: 0.8,
                    ..Default::default()
                },
            ],
        }
    }
}

/// Accepted placement points across every category, used for spacing checks.
#[derive(Clone, Debug, Default)]
pub struct PlacementSet {
    accepted: Vec<Vec3>,
}

impl PlacementSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `candidate` is at least `min_distance` from every accepted point.
    pub fn is_clear(&self, candidate: Vec3, min_distance: f32) -> bool {
        let min_sq = min_distance * min_distance;
        self.accepted
            .iter()
            .all(|p| p.distance_squared(candidate) >= min_sq)
    }

    /// Accept `candidate` if it is clear of every accepted point.
    pub fn try_accept(&mut self, candidate: Vec3, min_distance: f32) -> bool {
        if self.is_clear(candidate, min_distance) {
            self.accepted.push(candidate);
            true
        } else {
            false
        }
    }

    /// Accept without checking spacing.
    pub fn accept(&mut self, candidate: Vec3) {
        self.accepted.push(candidate);
    }

    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    pub fn points(&self) -> &[Vec3] {
        &self.accepted
    }
}

/// World position of grid sample `(x, y)` of a chunk centred at `center`.
pub fn placement_position(
    grid: &HeightGrid,
    x: usize,
    y: usize,
    center: Vec2,
    terrain: &TerrainSettings,
    height_multiplier: f32,
) -> Vec3 {
    let half = (grid.width() as f32 - 1.0) / 2.0;
    let local_x = x as f32 - half + center.x;
    let local_z = y as f32 - half + center.y;
    let height = terrain.surface_height(grid.get(x, y)) * height_multiplier;
    Vec3::new(local_x, height, local_z) * terrain.uniform_scale
}

/// Scatter placement points over the rendered cells of `grid`.
///
/// Cells are visited row-major and categories in configuration order; that
/// order decides which candidates survive spacing rejection. The random draw
/// for a category is only taken when the cell lies in its height band.
///
/// Returns one point list per category, in category order.
pub fn scatter_decorations(
    grid: &HeightGrid,
    center: Vec2,
    terrain: &TerrainSettings,
    settings: &DecorationSettings,
    rng: &mut impl Rng,
) -> Vec<Vec<Vec3>> {
    let mut placements: Vec<Vec<Vec3>> = vec![Vec::new(); settings.categories.len()];
    if grid.width() < 3 || grid.height() < 3 {
        return placements;
    }

    let interior_w = grid.width() - 2;
    let interior_h = grid.height() - 2;
    let mut accepted = PlacementSet::new();

    for iy in 0..interior_h {
        for ix in 0..interior_w {
            let (x, y) = (ix + 1, iy + 1);
            let height = grid.get(x, y);

            for (category, points) in settings.categories.iter().zip(placements.iter_mut()) {
                if !category.in_band(height) || rng.random::<f32>() > category.density {
                    continue;
                }

                let position = placement_position(
                    grid,
                    x,
                    y,
                    center,
                    terrain,
                    category.spawn_height_multiplier,
                );

                if settings.collision_free_spawning {
                    if accepted.try_accept(position, settings.min_spawn_distance) {
                        points.push(position);
                    }
                } else {
                    accepted.accept(position);
                    points.push(position);
                }
            }
        }
    }

    placements
}
