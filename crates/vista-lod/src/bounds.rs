//! Axis-aligned 2D bounds of a terrain chunk.

use glam::Vec2;

/// Square bounds of a chunk in the horizontal plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkBounds {
    pub center: Vec2,
    pub half_size: f32,
}

impl ChunkBounds {
    /// Bounds of a square chunk of edge `size` centred at `center`.
    pub fn new(center: Vec2, size: f32) -> Self {
        Self {
            center,
            half_size: size * 0.5,
        }
    }

    pub fn min(&self) -> Vec2 {
        self.center - Vec2::splat(self.half_size)
    }

    pub fn max(&self) -> Vec2 {
        self.center + Vec2::splat(self.half_size)
    }

    /// Squared distance from `point` to the nearest point of the bounds.
    /// Zero when the point lies inside.
    pub fn sqr_distance(&self, point: Vec2) -> f32 {
        let nearest = point.clamp(self.min(), self.max());
        nearest.distance_squared(point)
    }

    pub fn distance(&self, point: Vec2) -> f32 {
        self.sqr_distance(point).sqrt()
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.sqr_distance(point) == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_inside_has_zero_distance() {
        let bounds = ChunkBounds::new(Vec2::new(10.0, 10.0), 20.0);
        assert_eq!(bounds.sqr_distance(Vec2::new(5.0, 15.0)), 0.0);
        assert!(bounds.contains(Vec2::new(0.0, 0.0)), "edges count as inside");
    }

    #[test]
    fn test_distance_to_edge_and_corner() {
        let bounds = ChunkBounds::new(Vec2::ZERO, 10.0);
        assert_eq!(bounds.sqr_distance(Vec2::new(8.0, 0.0)), 9.0);
        // Corner at (5, 5); point at (8, 9) is (3, 4) away.
        assert_eq!(bounds.distance(Vec2::new(8.0, 9.0)), 5.0);
    }
}
