//! Texture visualization of generated maps.
//!
//! Renders height grids, falloff masks and colour-banded maps into a
//! [`DebugImage`]. The demo binary encodes these to PNG; a renderer would upload
//! them as the terrain texture.

mod image;
mod renderers;

pub use self::image::DebugImage;
pub use renderers::{
    ColorBand, TextureSettings, inverse_lerp, render_color_bands, render_falloff,
    render_height_grid,
};
