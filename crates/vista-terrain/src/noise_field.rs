//! Multi-octave fractal noise field used as the raw terrain heightfield.
//!
//! Composites octaves of Perlin noise at increasing frequency and decreasing
//! amplitude, then normalises the sums into `[0, 1]` either per call
//! ([`NormalizeMode::Local`]) or against the analytic amplitude bound
//! ([`NormalizeMode::Global`]).

use glam::{DVec2, Vec2};
use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::height_grid::HeightGrid;

/// Scale used in place of a non-positive configured scale.
pub const MIN_NOISE_SCALE: f32 = 1.0e-4;

/// Octave offsets are drawn from `[-OCTAVE_OFFSET_RANGE, OCTAVE_OFFSET_RANGE)`.
pub const OCTAVE_OFFSET_RANGE: i32 = 100_000;

/// Upper bound on [`NoiseSettings::octaves`] accepted by configuration.
pub const MAX_NOISE_OCTAVES: u32 = 32;

/// Perlin's gradient lattice repeats every 256 units along each axis.
const PERLIN_PERIOD: f64 = 256.0;

/// Fold a sample coordinate into one lattice period. Non-finite input maps to 0.
fn wrap_sample(v: f64) -> f64 {
    if v.is_finite() {
        v.rem_euclid(PERLIN_PERIOD)
    } else {
        0.0
    }
}

/// How raw octave sums are mapped into `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalizeMode {
    /// Remap from the observed min/max of this grid. Full contrast, but
    /// independently generated neighbours do not line up.
    Local,
    /// Remap against the theoretical maximum amplitude. Seam-free across chunks.
    #[default]
    Global,
}

/// Configuration for the fractal noise field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    pub normalize_mode: NormalizeMode,
    /// Horizontal size of the broadest features, in samples.
    pub scale: f32,
    /// Number of octaves to composite.
    pub octaves: u32,
    /// Amplitude multiplier between successive octaves, in `[0, 1]`.
    pub persistence: f32,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f32,
    pub seed: u64,
    /// World-space offset added to every sample position.
    pub offset: Vec2,
    /// Tuning knob for [`NormalizeMode::Global`]: the bias-shifted sum is
    /// divided by `max_possible_height / global_height_divisor`.
    pub global_height_divisor: f32,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            normalize_mode: NormalizeMode::Global,
            scale: 50.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            seed: 0,
            offset: Vec2::ZERO,
            global_height_divisor: 0.75,
        }
    }
}

impl NoiseSettings {
    /// Return a copy with out-of-range values pulled back into range:
    /// negative lacunarity becomes 1 and persistence is clamped into `[0, 1]`.
    pub fn sanitized(&self) -> Self {
        let mut out = self.clone();
        if out.lacunarity < 0.0 {
            out.lacunarity = 1.0;
        }
        out.persistence = out.persistence.clamp(0.0, 1.0);
        out
    }

    /// Sum of all octave amplitudes, `Σ persistence^i`.
    pub fn max_possible_height(&self) -> f64 {
        let mut sum = 0.0;
        let mut amplitude = 1.0;
        for _ in 0..self.octaves {
            sum += amplitude;
            amplitude *= self.persistence as f64;
        }
        sum
    }

    /// The configured scale, or [`MIN_NOISE_SCALE`] if it is not positive.
    pub fn effective_scale(&self) -> f64 {
        if self.scale > 0.0 {
            self.scale as f64
        } else {
            MIN_NOISE_SCALE as f64
        }
    }

    /// Per-octave sample offsets derived from the seed and shifted by `world_offset`.
    pub fn octave_offsets(&self, world_offset: DVec2) -> Vec<DVec2> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        (0..self.octaves)
            .map(|_| {
                let x = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) as f64;
                let y = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) as f64;
                DVec2::new(x + world_offset.x, y + world_offset.y)
            })
            .collect()
    }
}

/// Generate a `width x height` grid of normalised noise centred on `center`.
///
/// Sample `(x, y)` lies at world position `center + offset + (x, y) - (size - 1) / 2`,
/// so two grids whose centres differ by a whole number of samples agree
/// bit-for-bit wherever they overlap (in [`NormalizeMode::Global`]).
pub fn generate_noise_map(
    width: usize,
    height: usize,
    settings: &NoiseSettings,
    center: Vec2,
) -> HeightGrid {
    let mut grid = HeightGrid::new(width, height, 0.0);
    if width == 0 || height == 0 {
        return grid;
    }

    let world_offset = DVec2::new(
        center.x as f64 + settings.offset.x as f64,
        center.y as f64 + settings.offset.y as f64,
    );
    let offsets = settings.octave_offsets(world_offset);
    let scale = settings.effective_scale();
    let persistence = settings.persistence as f64;
    let lacunarity = settings.lacunarity as f64;
    let perlin = Perlin::new(0);

    let half_width = (width as f64 - 1.0) / 2.0;
    let half_height = (height as f64 - 1.0) / 2.0;

    let mut raw = Vec::with_capacity(width * height);
    let mut min_sum = f64::MAX;
    let mut max_sum = f64::MIN;

    for y in 0..height {
        for x in 0..width {
            let mut amplitude = 1.0;
            let mut frequency = 1.0;
            let mut sum = 0.0;

            for offset in &offsets {
                let sample_x = (x as f64 - half_width + offset.x) / scale * frequency;
                let sample_y = (y as f64 - half_height + offset.y) / scale * frequency;
                // Perlin output is nominally [-1, 1] but can overshoot slightly.
                let value = perlin
                    .get([wrap_sample(sample_x), wrap_sample(sample_y)])
                    .clamp(-1.0, 1.0);
                sum += value * amplitude;

                amplitude *= persistence;
                frequency *= lacunarity;
            }

            min_sum = min_sum.min(sum);
            max_sum = max_sum.max(sum);
            raw.push(sum);
        }
    }

    match settings.normalize_mode {
        NormalizeMode::Local => {
            let range = max_sum - min_sum;
            for (out, sum) in grid.values_mut().iter_mut().zip(raw) {
                *out = if range > 0.0 {
                    ((sum - min_sum) / range) as f32
                } else {
                    0.0
                };
            }
        }
        NormalizeMode::Global => {
            let max_possible = settings.max_possible_height();
            let divisor = settings.global_height_divisor as f64;
            for (out, sum) in grid.values_mut().iter_mut().zip(raw) {
                *out = if max_possible > 0.0 && divisor > 0.0 {
                    ((sum + 1.0) / (max_possible / divisor)).clamp(0.0, 1.0) as f32
                } else {
                    0.0
                };
            }
        }
    }

    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_settings(seed: u64) -> NoiseSettings {
        NoiseSettings {
            normalize_mode: NormalizeMode::Global,
            scale: 50.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            seed,
            ..Default::default()
        }
    }

    // Height grid edge for a 240 chunk: 240 + 5 samples.
    const SCENARIO_GRID: usize = 245;

    #[test]
    fn test_wrapped_samples_match_lattice() {
        let perlin = Perlin::new(0);
        for &(x, y) in &[(0.37, 12.5), (-3.25, 200.75), (1000.125, -999.5)] {
            let direct = perlin.get([x, y]);
            let wrapped = perlin.get([wrap_sample(x + 512.0), wrap_sample(y - 256.0)]);
            assert!(
                (direct - wrapped).abs() < 1e-9,
                "sample ({x}, {y}) changed after wrapping: {direct} vs {wrapped}"
            );
        }
        assert_eq!(wrap_sample(f64::INFINITY), 0.0);
        assert_eq!(wrap_sample(f64::NAN), 0.0);
    }

    #[test]
    fn test_many_octaves_stay_in_range() {
        let settings = NoiseSettings {
            octaves: 60,
            ..Default::default()
        };
        let grid = generate_noise_map(17, 17, &settings, Vec2::new(40.0, -12.0));
        for &v in grid.values() {
            assert!((0.0..=1.0).contains(&v), "value {v} outside [0, 1] at 60 octaves");
        }
    }

    #[test]
    fn test_huge_offset_generates_finite_grid() {
        let settings = NoiseSettings {
            octaves: 1,
            offset: Vec2::new(1.0e16, -1.0e16),
            ..Default::default()
        };
        let grid = generate_noise_map(9, 9, &settings, Vec2::ZERO);
        assert!(
            grid.values().iter().all(|v| v.is_finite() && (0.0..=1.0).contains(v)),
            "huge offsets should still yield normalised values"
        );
    }

    #[test]
    fn test_regenerating_yields_identical_grid() {
        let settings = scenario_settings(0);
        let a = generate_noise_map(SCENARIO_GRID, SCENARIO_GRID, &settings, Vec2::ZERO);
        let b = generate_noise_map(SCENARIO_GRID, SCENARIO_GRID, &settings, Vec2::ZERO);
        assert!(
            a.values()
                .iter()
                .zip(b.values())
                .all(|(x, y)| x.to_bits() == y.to_bits()),
            "same parameters must produce bit-identical grids"
        );
    }

    #[test]
    fn test_changing_seed_changes_grid() {
        let a = generate_noise_map(SCENARIO_GRID, SCENARIO_GRID, &scenario_settings(0), Vec2::ZERO);
        let b = generate_noise_map(SCENARIO_GRID, SCENARIO_GRID, &scenario_settings(1), Vec2::ZERO);
        assert!(
            a.values().iter().zip(b.values()).any(|(x, y)| x != y),
            "seed 0 and seed 1 should differ in at least one cell"
        );
    }

    #[test]
    fn test_global_values_within_unit_range() {
        let grid = generate_noise_map(64, 64, &scenario_settings(3), Vec2::new(500.0, -200.0));
        for &v in grid.values() {
            assert!((0.0..=1.0).contains(&v), "global value {v} outside [0, 1]");
        }
    }

    #[test]
    fn test_local_normalization_touches_both_bounds() {
        let settings = NoiseSettings {
            normalize_mode: NormalizeMode::Local,
            ..scenario_settings(5)
        };
        let grid = generate_noise_map(64, 64, &settings, Vec2::ZERO);
        let (lo, hi) = grid.min_max().unwrap();
        assert_eq!(lo, 0.0, "local normalisation must reach 0");
        assert_eq!(hi, 1.0, "local normalisation must reach 1");
    }

    #[test]
    fn test_global_adjacent_chunks_share_border() {
        let settings = scenario_settings(11);
        let size = 53; // chunk size 48
        let world_size = (size - 3) as f32;
        let left = generate_noise_map(size, size, &settings, Vec2::ZERO);
        let right = generate_noise_map(size, size, &settings, Vec2::new(world_size, 0.0));

        // Last rendered column of `left` is the first rendered column of `right`.
        for y in 0..size {
            assert_eq!(
                left.get(size - 2, y).to_bits(),
                right.get(1, y).to_bits(),
                "seam mismatch at row {y}"
            );
        }
    }

    #[test]
    fn test_non_positive_scale_is_clamped() {
        let settings = NoiseSettings {
            scale: 0.0,
            ..scenario_settings(2)
        };
        assert_eq!(settings.effective_scale(), MIN_NOISE_SCALE as f64);
        let grid = generate_noise_map(16, 16, &settings, Vec2::ZERO);
        assert!(grid.values().iter().all(|v| v.is_finite()));

        let negative = NoiseSettings {
            scale: -3.0,
            ..scenario_settings(2)
        };
        assert_eq!(negative.effective_scale(), MIN_NOISE_SCALE as f64);
    }

    #[test]
    fn test_zero_octaves_yields_zero_field() {
        for mode in [NormalizeMode::Local, NormalizeMode::Global] {
            let settings = NoiseSettings {
                octaves: 0,
                normalize_mode: mode,
                ..scenario_settings(9)
            };
            let grid = generate_noise_map(8, 8, &settings, Vec2::ZERO);
            assert!(
                grid.values().iter().all(|&v| v == 0.0),
                "{mode:?}: zero octaves must produce an all-zero field"
            );
        }
    }

    #[test]
    fn test_max_possible_height() {
        let settings = scenario_settings(0);
        assert!((settings.max_possible_height() - 1.875).abs() < 1e-12);
    }

    #[test]
    fn test_octave_offsets_depend_on_seed_only_plus_world_offset() {
        let settings = scenario_settings(21);
        let base = settings.octave_offsets(DVec2::ZERO);
        let shifted = settings.octave_offsets(DVec2::new(10.0, -4.0));
        assert_eq!(base.len(), 4);
        for (a, b) in base.iter().zip(&shifted) {
            assert_eq!(*b - *a, DVec2::new(10.0, -4.0));
            assert!(a.x.abs() <= OCTAVE_OFFSET_RANGE as f64);
        }
    }

    #[test]
    fn test_sanitized_fixes_lacunarity_and_persistence() {
        let settings = NoiseSettings {
            lacunarity: -2.0,
            persistence: 1.7,
            ..Default::default()
        };
        let fixed = settings.sanitized();
        assert_eq!(fixed.lacunarity, 1.0);
        assert_eq!(fixed.persistence, 1.0);
    }
}
