//! Terrain meshing: LOD-aware heightfield triangulation with seam-free chunk
//! edges, plus the chunk-size table the meshes are built against.

pub mod builder;
pub mod settings;
pub mod vertex;

pub use builder::build_terrain_mesh;
pub use settings::{
    ChunkLayout, MeshSettings, MeshSettingsError, SUPPORTED_CHUNK_SIZES,
    SUPPORTED_FLAT_SHADED_CHUNK_SIZES,
};
pub use vertex::{TerrainMesh, TerrainVertex};
pub use vista_lod::{LevelOfDetail, NUM_SUPPORTED_LODS};
