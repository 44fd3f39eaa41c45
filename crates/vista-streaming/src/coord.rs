//! Integer chunk coordinates on the infinite terrain plane.

use glam::Vec2;

/// Chunk grid coordinate. Chunk `(x, y)` is centred at `(x, y) * chunk_size`
/// in unscaled world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The chunk whose centre is nearest to `position`.
    pub fn containing(position: Vec2, chunk_size: f32) -> Self {
        Self {
            x: (position.x / chunk_size).round() as i32,
            y: (position.y / chunk_size).round() as i32,
        }
    }

    /// Centre of this chunk in unscaled world units.
    pub fn center(self, chunk_size: f32) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32) * chunk_size
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_containing_rounds_to_nearest_centre() {
        assert_eq!(ChunkCoord::containing(Vec2::new(0.0, 0.0), 50.0), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::containing(Vec2::new(24.0, -26.0), 50.0), ChunkCoord::new(0, -1));
        assert_eq!(ChunkCoord::containing(Vec2::new(130.0, 74.0), 50.0), ChunkCoord::new(3, 1));
    }

    #[test]
    fn test_center() {
        assert_eq!(ChunkCoord::new(-2, 3).center(98.0), Vec2::new(-196.0, 294.0));
    }
}
