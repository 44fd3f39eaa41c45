//! Terrain shaping parameters shared by generation and meshing.

use serde::{Deserialize, Serialize};

use crate::height_curve::HeightCurve;

/// Terrain shaping configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSettings {
    /// World units per terrain sample. Chunk placement, decoration positions
    /// and the viewer position are all expressed through this factor.
    pub uniform_scale: f32,
    /// Build faceted meshes (one vertex per triangle corner).
    pub use_flat_shading: bool,
    /// Subtract the island falloff mask from generated heights.
    pub use_falloff: bool,
    /// Weight applied to the falloff mask before subtraction.
    pub falloff_strength: f32,
    /// Mesh height for a curve response of 1.
    pub height_multiplier: f32,
    pub height_curve: HeightCurve,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            uniform_scale: 2.0,
            use_flat_shading: false,
            use_falloff: false,
            falloff_strength: 1.5,
            height_multiplier: 30.0,
            height_curve: HeightCurve::default(),
        }
    }
}

impl TerrainSettings {
    /// Mesh-local height of a normalised sample, before uniform scaling.
    pub fn surface_height(&self, normalized: f32) -> f32 {
        self.height_curve.evaluate(normalized) * self.height_multiplier
    }

    /// Lowest possible world height of the terrain surface.
    pub fn min_height(&self) -> f32 {
        self.uniform_scale * self.surface_height(0.0)
    }

    /// Highest possible world height of the terrain surface.
    pub fn max_height(&self) -> f32 {
        self.uniform_scale * self.surface_height(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::height_curve::{CurveInterpolation, CurveKey};

    #[test]
    fn test_height_range_uses_curve_and_scale() {
        let settings = TerrainSettings {
            uniform_scale: 2.0,
            height_multiplier: 10.0,
            height_curve: HeightCurve::new(
                vec![CurveKey::new(0.0, 0.1), CurveKey::new(1.0, 0.8)],
                CurveInterpolation::Linear,
            ),
            ..Default::default()
        };
        assert!((settings.min_height() - 2.0).abs() < 1e-5);
        assert!((settings.max_height() - 16.0).abs() < 1e-5);
    }
}
