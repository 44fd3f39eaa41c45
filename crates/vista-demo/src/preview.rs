//! Offline previews of the origin chunk.

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use glam::Vec2;
use tracing::info;
use vista_config::TerrainConfig;
use vista_mesh::build_terrain_mesh;
use vista_terrain::HeightGridAssembler;
use vista_terrain::debug_viz::{
    DebugImage, render_color_bands, render_falloff, render_height_grid,
};

/// What to render instead of streaming.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreviewMode {
    /// Greyscale height map.
    NoiseMap,
    /// Island falloff mask.
    FalloffMap,
    /// Height map painted with the configured colour bands.
    ColorMap,
    /// Vertex and triangle counts for every detail level.
    Mesh,
}

impl PreviewMode {
    fn file_name(self) -> &'static str {
        match self {
            PreviewMode::NoiseMap => "noise_map.png",
            PreviewMode::FalloffMap => "falloff_map.png",
            PreviewMode::ColorMap => "color_map.png",
            PreviewMode::Mesh => "mesh.txt",
        }
    }
}

/// Render `mode` for the chunk at the origin. Image previews are written to
/// `out_dir`; returns the path written, if any.
pub fn run_preview(
    mode: PreviewMode,
    config: &TerrainConfig,
    out_dir: &Path,
) -> Result<Option<PathBuf>, Box<dyn Error>> {
    let layout = config.layout()?;
    let assembler = HeightGridAssembler::new(
        config.noise.clone(),
        config.terrain.clone(),
        config.decorations.clone(),
        layout.vertices_per_line(),
    );

    let image = match mode {
        PreviewMode::NoiseMap => render_height_grid(&assembler.generate_heights(Vec2::ZERO)),
        PreviewMode::FalloffMap => render_falloff(assembler.falloff_mask()),
        PreviewMode::ColorMap => render_color_bands(
            &assembler.generate_heights(Vec2::ZERO),
            &config.texture,
            &config.terrain,
        ),
        PreviewMode::Mesh => {
            log_mesh_summary(config, &assembler);
            return Ok(None);
        }
    };

    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(mode.file_name());
    save_png(image, &path)?;
    info!(path = %path.display(), ?mode, "preview written");
    Ok(Some(path))
}

fn log_mesh_summary(config: &TerrainConfig, assembler: &HeightGridAssembler) {
    let map = assembler.generate(Vec2::ZERO);
    let preview_lod = config.debug.preview_lod;
    for lod in vista_lod::LevelOfDetail::all() {
        let mesh = build_terrain_mesh(
            &map.heights,
            config.terrain.height_multiplier,
            &config.terrain.height_curve,
            lod,
            config.terrain.use_flat_shading,
        );
        let (min_height, max_height) = mesh.height_range().unwrap_or((0.0, 0.0));
        info!(
            %lod,
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            min_height,
            max_height,
            selected = lod == preview_lod,
            "origin chunk mesh"
        );
    }
    info!(
        placements = map.placement_count(),
        "origin chunk decorations"
    );
}

fn save_png(image: DebugImage, path: &Path) -> Result<(), Box<dyn Error>> {
    let (width, height) = image.dimensions();
    let buffer = image::RgbaImage::from_raw(width, height, image.into_raw())
        .ok_or("pixel buffer does not match image dimensions")?;
    buffer.save(path)?;
    Ok(())
}
