//! Map renderers: greyscale heights, falloff mask and colour bands.

use serde::{Deserialize, Serialize};

use super::image::DebugImage;
use crate::height_grid::HeightGrid;
use crate::settings::TerrainSettings;

/// A colour applied from `start_height` (normalized world height) upwards.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorBand {
    pub color: [u8; 3],
    pub start_height: f32,
}

impl ColorBand {
    pub const fn new(color: [u8; 3], start_height: f32) -> Self {
        Self {
            color,
            start_height,
        }
    }
}

/// Colour bands used to paint the terrain texture.
///
/// Bands are evaluated in order; a sample takes the colour of the last band
/// whose `start_height` it reaches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureSettings {
    pub bands: Vec<ColorBand>,
}

impl Default for TextureSettings {
    fn default() -> Self {
        Self {
            bands: vec![
                ColorBand::new([30, 60, 160], 0.0),
                ColorBand::new([60, 110, 200], 0.3),
                ColorBand::new([210, 200, 140], 0.4),
                ColorBand::new([80, 150, 50], 0.45),
                ColorBand::new([50, 100, 40], 0.55),
                ColorBand::new([110, 90, 70], 0.7),
                ColorBand::new([90, 80, 75], 0.8),
                ColorBand::new([245, 245, 250], 0.9),
            ],
        }
    }
}

impl TextureSettings {
    /// Colour for a normalized height in `[0, 1]`. Black when no band applies.
    pub fn color_at(&self, normalized: f32) -> [u8; 3] {
        self.bands
            .iter()
            .rev()
            .find(|band| normalized >= band.start_height)
            .map_or([0, 0, 0], |band| band.color)
    }
}

/// Fraction of the way `value` lies from `a` to `b`, clamped to `[0, 1]`.
/// Zero when `a == b`.
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if a == b {
        0.0
    } else {
        ((value - a) / (b - a)).clamp(0.0, 1.0)
    }
}

fn grey(value: f32) -> [u8; 4] {
    let v = (value.clamp(0.0, 1.0) * 255.0).round() as u8;
    [v, v, v, 255]
}

/// Greyscale rendering, black at 0 and white at 1.
pub fn render_height_grid(grid: &HeightGrid) -> DebugImage {
    let mut image = DebugImage::new(grid.width() as u32, grid.height() as u32);
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            image.set_pixel(x as u32, y as u32, grey(grid.get(x, y)));
        }
    }
    image
}

/// Greyscale rendering of a falloff mask.
pub fn render_falloff(mask: &HeightGrid) -> DebugImage {
    render_height_grid(mask)
}

/// Paint each sample with its colour band.
///
/// Samples are converted to world heights through the terrain's curve and
/// multiplier, then normalized between the terrain's min and max heights.
pub fn render_color_bands(
    grid: &HeightGrid,
    texture: &TextureSettings,
    terrain: &TerrainSettings,
) -> DebugImage {
    let min = terrain.min_height();
    let max = terrain.max_height();
    let mut image = DebugImage::new(grid.width() as u32, grid.height() as u32);
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let world = terrain.surface_height(grid.get(x, y)) * terrain.uniform_scale;
            let [r, g, b] = texture.color_at(inverse_lerp(min, max, world));
            image.set_pixel(x as u32, y as u32, [r, g, b, 255]);
        }
    }
    image
}
