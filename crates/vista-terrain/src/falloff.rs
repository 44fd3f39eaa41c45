//! Island-shaping falloff mask: 0 at the centre, rising to 1 at the edges.

use std::sync::OnceLock;

use crate::height_grid::HeightGrid;

/// Exponent of the shaping curve.
const FALLOFF_STEEPNESS: f32 = 3.0;
/// Shift of the shaping curve; larger values keep more of the interior flat.
const FALLOFF_SHIFT: f32 = 2.2;

/// Generate a `size x size` falloff mask.
///
/// Each axis is mapped to `[-1, 1]`, the larger of the two magnitudes is taken
/// as the distance from the centre, and that distance is passed through
/// [`falloff_curve`]. For odd sizes the centre sample is exactly 0.
pub fn generate_falloff_map(size: usize) -> HeightGrid {
    let mut grid = HeightGrid::new(size, size, 0.0);
    if size < 2 {
        return grid;
    }

    let last = (size - 1) as f32;
    for y in 0..size {
        for x in 0..size {
            let u = x as f32 / last * 2.0 - 1.0;
            let v = y as f32 / last * 2.0 - 1.0;
            let distance = u.abs().max(v.abs());
            grid.set(x, y, falloff_curve(distance));
        }
    }
    grid
}

/// Smooth monotonic shaping curve `t^a / (t^a + (b - b*t)^a)` over `[0, 1]`.
pub fn falloff_curve(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let rise = t.powf(FALLOFF_STEEPNESS);
    let fall = (FALLOFF_SHIFT - FALLOFF_SHIFT * t).powf(FALLOFF_STEEPNESS);
    if rise + fall == 0.0 {
        return 0.0;
    }
    rise / (rise + fall)
}

/// Lazily computed falloff mask for a fixed grid size.
///
/// The mask never changes at runtime, so it is built once on first use and
/// then shared read-only between generation threads.
#[derive(Debug)]
pub struct FalloffCache {
    size: usize,
    mask: OnceLock<HeightGrid>,
}

impl FalloffCache {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            mask: OnceLock::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// The mask, computing it on the first call.
    pub fn get(&self) -> &HeightGrid {
        self.mask.get_or_init(|| {
            tracing::debug!(size = self.size, "building falloff mask");
            generate_falloff_map(self.size)
        })
    }

    /// Returns `true` once the mask has been computed.
    pub fn is_built(&self) -> bool {
        self.mask.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_is_zero() {
        let mask = generate_falloff_map(53);
        assert_eq!(mask.get(26, 26), 0.0);
    }

    #[test]
    fn test_corners_reach_one() {
        let mask = generate_falloff_map(53);
        for (x, y) in [(0, 0), (52, 0), (0, 52), (52, 52)] {
            assert!(
                (mask.get(x, y) - 1.0).abs() < 1e-6,
                "corner ({x}, {y}) = {}",
                mask.get(x, y)
            );
        }
    }

    #[test]
    fn test_values_within_unit_range() {
        let mask = generate_falloff_map(33);
        assert!(mask.values().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_monotonic_along_rays_from_center() {
        let size = 65;
        let c = size / 2;
        let mask = generate_falloff_map(size);
        let rays: [(isize, isize); 8] = [
            (1, 0),
            (-1, 0),
            (0, 1),
            (0, -1),
            (1, 1),
            (-1, 1),
            (1, -1),
            (-1, -1),
        ];
        for (dx, dy) in rays {
            let mut prev = mask.get(c, c);
            for step in 1..=c as isize {
                let x = (c as isize + dx * step) as usize;
                let y = (c as isize + dy * step) as usize;
                let value = mask.get(x, y);
                assert!(
                    value >= prev,
                    "falloff decreased along ray ({dx}, {dy}) at step {step}"
                );
                prev = value;
            }
        }
    }

    #[test]
    fn test_curve_endpoints() {
        assert_eq!(falloff_curve(0.0), 0.0);
        assert_eq!(falloff_curve(1.0), 1.0);
    }

    #[test]
    fn test_degenerate_sizes() {
        assert_eq!(generate_falloff_map(0).values().len(), 0);
        assert_eq!(generate_falloff_map(1).values(), &[0.0]);
    }

    #[test]
    fn test_cache_builds_once() {
        let cache = FalloffCache::new(17);
        assert!(!cache.is_built());
        let first = cache.get() as *const HeightGrid;
        let second = cache.get() as *const HeightGrid;
        assert!(cache.is_built());
        assert_eq!(first, second, "cache must hand out the same mask");
        assert_eq!(cache.get(), &generate_falloff_map(17));
    }
}
