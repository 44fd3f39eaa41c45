//! Terrain mesh data ready for GPU upload.

use vista_lod::LevelOfDetail;

/// A single terrain vertex, 32 bytes, tightly packed for vertex buffers.
///
/// Layout:
///   - `[0..12]`  position `[f32; 3]`, chunk-local, unscaled
///   - `[12..24]` normal `[f32; 3]`, unit length
///   - `[24..32]` uv `[f32; 2]`, `0..=1` across the rendered chunk
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

static_assertions::assert_eq_size!(TerrainVertex, [u8; 32]);

/// Mesh output of [`crate::build_terrain_mesh`].
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainMesh {
    pub vertices: Vec<TerrainVertex>,
    /// Triangle list, 3 indices per triangle, counter-clockwise seen from +Y.
    pub indices: Vec<u32>,
    pub lod: LevelOfDetail,
    pub flat_shaded: bool,
}

impl TerrainMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Raw vertex buffer contents.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw index buffer contents.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Lowest and highest vertex height, or `None` for an empty mesh.
    pub fn height_range(&self) -> Option<(f32, f32)> {
        self.vertices.iter().fold(None, |range, v| {
            let y = v.position[1];
            Some(match range {
                None => (y, y),
                Some((lo, hi)) => (lo.min(y), hi.max(y)),
            })
        })
    }
}
