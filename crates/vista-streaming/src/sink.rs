//! Collaborator interface receiving the streaming manager's outputs.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use vista_mesh::TerrainMesh;
use vista_terrain::MapResult;

use crate::coord::ChunkCoord;

/// One decoration to instantiate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecorationSpawn {
    /// Index into the configured decoration categories.
    pub category: usize,
    /// Index into that category's prefab list.
    pub prefab: usize,
    /// World position, uniform scale applied.
    pub position: Vec3,
    /// Rotation about the vertical axis, whole degrees in `[0, 360)`.
    pub yaw_degrees: f32,
}

/// Receives chunk lifecycle events from [`crate::ChunkStreamingManager`].
///
/// Every method is called on the thread driving `tick`. All methods default to
/// no-ops so a collaborator only implements what it consumes (a renderer needs
/// `show_mesh` and `set_visible`, a physics world needs `set_collider`).
pub trait TerrainSink {
    /// A chunk record was created. `origin` is its world centre (scaled);
    /// meshes are chunk-local and must be scaled by the uniform scale.
    fn chunk_created(&mut self, _coord: ChunkCoord, _origin: Vec3) {}

    /// The chunk's height map arrived (first delivery only).
    fn height_map_ready(&mut self, _coord: ChunkCoord, _map: &MapResult) {}

    /// Visibility changed. Chunks start hidden.
    fn set_visible(&mut self, _coord: ChunkCoord, _visible: bool) {}

    /// Display the mesh for detail level `lod_index`.
    fn show_mesh(&mut self, _coord: ChunkCoord, _lod_index: usize, _mesh: &Arc<TerrainMesh>) {}

    /// Use `mesh` for collision. Called at most once per chunk.
    fn set_collider(&mut self, _coord: ChunkCoord, _mesh: &Arc<TerrainMesh>) {}

    /// Instantiate decorations. Called exactly once per chunk, after its
    /// height map arrived.
    fn spawn_decorations(&mut self, _coord: ChunkCoord, _spawns: &[DecorationSpawn]) {}
}

/// Sink that discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl TerrainSink for NullSink {}

pub(crate) fn chunk_origin(center: Vec2, uniform_scale: f32) -> Vec3 {
    Vec3::new(center.x, 0.0, center.y) * uniform_scale
}
