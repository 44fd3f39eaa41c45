//! Procedural terrain maps: layered noise, island falloff, height curves and
//! decoration scatter, assembled per chunk.

mod assembler;
mod decoration;
mod falloff;
mod height_curve;
mod height_grid;
mod noise_field;
mod settings;

pub mod debug_viz;
pub mod seed;

pub use assembler::{HeightGridAssembler, MapResult};
pub use decoration::{
    DecorationCategory, DecorationSettings, PlacementSet, placement_position, scatter_decorations,
};
pub use falloff::{FalloffCache, falloff_curve, generate_falloff_map};
pub use height_curve::{CurveInterpolation, CurveKey, HeightCurve};
pub use height_grid::HeightGrid;
pub use noise_field::{
    MAX_NOISE_OCTAVES, MIN_NOISE_SCALE, NoiseSettings, NormalizeMode, OCTAVE_OFFSET_RANGE,
    generate_noise_map,
};
pub use settings::TerrainSettings;
