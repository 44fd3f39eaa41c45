//! Per-chunk bookkeeping owned by the consuming thread.

use std::sync::Arc;

use vista_lod::{ChunkBounds, LevelOfDetail};
use vista_mesh::TerrainMesh;
use vista_terrain::MapResult;

/// Lifecycle of one LOD mesh of a chunk.
#[derive(Clone, Debug, Default)]
pub enum SlotState {
    #[default]
    NotRequested,
    Requested,
    Ready(Arc<TerrainMesh>),
}

/// Follow-up work run when a slot becomes ready.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotObserver {
    /// Re-evaluate the chunk's visibility and displayed LOD.
    RefreshChunk,
    /// Re-evaluate the chunk's collision mesh.
    RefreshCollider,
}

/// Cache slot for one detail level of one chunk.
#[derive(Clone, Debug)]
pub struct LodMeshSlot {
    pub lod: LevelOfDetail,
    pub state: SlotState,
    pub observers: Vec<SlotObserver>,
}

impl LodMeshSlot {
    pub fn new(lod: LevelOfDetail, observers: Vec<SlotObserver>) -> Self {
        Self {
            lod,
            state: SlotState::NotRequested,
            observers,
        }
    }

    pub fn is_requested(&self) -> bool {
        !matches!(self.state, SlotState::NotRequested)
    }

    pub fn mesh(&self) -> Option<&Arc<TerrainMesh>> {
        match &self.state {
            SlotState::Ready(mesh) => Some(mesh),
            _ => None,
        }
    }
}

/// State of one resident chunk.
#[derive(Clone, Debug)]
pub struct ChunkRecord {
    /// Bounds in unscaled world units.
    pub bounds: ChunkBounds,
    pub visible: bool,
    /// Index of the detail level currently displayed.
    pub current_lod: Option<usize>,
    /// One slot per configured detail level.
    pub lod_meshes: Vec<LodMeshSlot>,
    /// Height map, once delivered. The first delivery wins.
    pub map: Option<Arc<MapResult>>,
    pub decorations_spawned: bool,
    /// Set once the collision mesh has been handed out; never cleared.
    pub collider_locked: bool,
}

impl ChunkRecord {
    pub(crate) fn new(bounds: ChunkBounds, lod_meshes: Vec<LodMeshSlot>) -> Self {
        Self {
            bounds,
            visible: false,
            current_lod: None,
            lod_meshes,
            map: None,
            decorations_spawned: false,
            collider_locked: false,
        }
    }

    pub fn has_height_map(&self) -> bool {
        self.map.is_some()
    }

    /// The mesh currently displayed, if any.
    pub fn current_mesh(&self) -> Option<&Arc<TerrainMesh>> {
        self.current_lod
            .and_then(|index| self.lod_meshes.get(index))
            .and_then(LodMeshSlot::mesh)
    }
}
