//! Viewer-driven chunk streaming.
//!
//! Per tick, on the consuming thread:
//!
//! 1. Drain both completion queues and apply the results (the only place
//!    worker output touches chunk state).
//! 2. If the viewer moved at all, re-check collision meshes of visible chunks.
//! 3. If the viewer moved past the refresh threshold since the last refresh
//!    (or on the first tick), refresh the visible set: update previously
//!    visible chunks, then every chunk within the view radius, creating
//!    records and height requests for new ones.

use std::sync::Arc;

use glam::Vec2;
use rand::Rng;
use rustc_hash::{FxHashMap, FxHashSet};
use vista_config::{ConfigError, StreamingSettings, TerrainConfig};
use vista_lod::{ChunkBounds, LodSelector};
use vista_terrain::seed::seeded_rng;
use vista_terrain::{HeightGridAssembler, MapResult};

use crate::coord::ChunkCoord;
use crate::executor::{JobExecutor, executor_for};
use crate::job::{
    CompletionQueues, CompletionSender, HeightCompletion, Job, MeshCompletion, MeshJobSettings,
};
use crate::record::{ChunkRecord, LodMeshSlot, SlotObserver, SlotState};
use crate::sink::{DecorationSpawn, TerrainSink, chunk_origin};
use crate::stats::StreamingStats;

/// Read-only inputs shared by every chunk update.
struct StreamingContext {
    assembler: Arc<HeightGridAssembler>,
    mesh_settings: Arc<MeshJobSettings>,
    selector: LodSelector,
    streaming: StreamingSettings,
    /// Chunk edge length in unscaled world units.
    chunk_size: f32,
    uniform_scale: f32,
    seed: u64,
}

struct JobDispatcher {
    executor: Box<dyn JobExecutor>,
    completions: CompletionSender,
}

impl JobDispatcher {
    fn dispatch(&self, job: Job) {
        tracing::trace!(key = ?job.key(), executor = self.executor.name(), "dispatching job");
        self.executor.dispatch(job, &self.completions);
    }
}

/// Everything a chunk update touches except the chunk map itself, so a record
/// borrowed out of the map can be updated alongside it.
struct ChunkUpdate<'a> {
    ctx: &'a StreamingContext,
    jobs: &'a JobDispatcher,
    stats: &'a mut StreamingStats,
    visible: &'a mut Vec<ChunkCoord>,
    sink: &'a mut dyn TerrainSink,
    viewer: Vec2,
}

impl ChunkUpdate<'_> {
    fn create_chunk(&mut self, coord: ChunkCoord) -> ChunkRecord {
        let center = coord.center(self.ctx.chunk_size);
        let collider_index = self.ctx.selector.collider_lod_index();
        let slots = self
            .ctx
            .selector
            .detail_levels()
            .iter()
            .enumerate()
            .map(|(index, level)| {
                let mut observers = vec![SlotObserver::RefreshChunk];
                if index == collider_index {
                    observers.push(SlotObserver::RefreshCollider);
                }
                LodMeshSlot::new(level.lod, observers)
            })
            .collect();
        let record = ChunkRecord::new(ChunkBounds::new(center, self.ctx.chunk_size), slots);

        self.sink
            .chunk_created(coord, chunk_origin(center, self.ctx.uniform_scale));
        self.stats.height_jobs_dispatched += 1;
        self.jobs.dispatch(Job::Height {
            coord,
            center,
            assembler: Arc::clone(&self.ctx.assembler),
        });
        tracing::debug!(%coord, "chunk created, height map requested");
        record
    }

    /// Visibility, displayed LOD and one-time decoration spawning.
    fn update_chunk(&mut self, coord: ChunkCoord, record: &mut ChunkRecord) {
        let Some(map) = record.map.clone() else {
            return;
        };

        let distance = record.bounds.distance(self.viewer);
        let was_visible = record.visible;
        let visible = self.ctx.selector.is_visible(distance);

        if visible {
            let lod_index = self.ctx.selector.select(distance);
            if record.current_lod != Some(lod_index) {
                let slot = &record.lod_meshes[lod_index];
                let ready = slot.mesh().cloned();
                let requested = slot.is_requested();
                if let Some(mesh) = ready {
                    record.current_lod = Some(lod_index);
                    self.sink.show_mesh(coord, lod_index, &mesh);
                    tracing::debug!(%coord, lod_index, "chunk mesh swapped");
                } else if !requested {
                    self.request_mesh(coord, record, lod_index, &map);
                }
            }
        }

        if was_visible != visible {
            record.visible = visible;
            if visible {
                self.visible.push(coord);
            } else if let Some(position) = self.visible.iter().position(|c| *c == coord) {
                self.visible.remove(position);
            }
            self.sink.set_visible(coord, visible);
            tracing::debug!(%coord, visible, "chunk visibility changed");
        }

        if !record.decorations_spawned {
            record.decorations_spawned = true;
            self.spawn_decorations(coord, &map);
        }
    }

    /// Request the collider LOD when close enough, and lock it in once the
    /// viewer is within the generation distance. Never undone.
    fn update_collision_mesh(&mut self, coord: ChunkCoord, record: &mut ChunkRecord) {
        if record.collider_locked {
            return;
        }
        let Some(map) = record.map.clone() else {
            return;
        };

        let sqr_distance = record.bounds.sqr_distance(self.viewer);
        let collider_index = self.ctx.selector.collider_lod_index();
        let collider_level = self.ctx.selector.detail_level(collider_index);

        if sqr_distance < collider_level.sqr_visible_distance()
            && !record.lod_meshes[collider_index].is_requested()
        {
            self.request_mesh(coord, record, collider_index, &map);
        }

        if sqr_distance >= self.ctx.streaming.sqr_collider_generation_distance() {
            return;
        }
        if let Some(mesh) = record.lod_meshes[collider_index].mesh().cloned() {
            record.collider_locked = true;
            self.stats.colliders_set += 1;
            self.sink.set_collider(coord, &mesh);
            tracing::debug!(%coord, collider_index, "collision mesh locked in");
        }
    }

    fn request_mesh(
        &mut self,
        coord: ChunkCoord,
        record: &mut ChunkRecord,
        lod_index: usize,
        map: &Arc<MapResult>,
    ) {
        let slot = &mut record.lod_meshes[lod_index];
        slot.state = SlotState::Requested;
        self.stats.mesh_jobs_dispatched += 1;
        self.jobs.dispatch(Job::Mesh {
            coord,
            lod_index,
            lod: slot.lod,
            map: Arc::clone(map),
            settings: Arc::clone(&self.ctx.mesh_settings),
        });
    }

    /// Run the slot's observers after it became ready.
    fn mesh_ready(&mut self, coord: ChunkCoord, record: &mut ChunkRecord, lod_index: usize) {
        let observers = record.lod_meshes[lod_index].observers.clone();
        for observer in observers {
            match observer {
                SlotObserver::RefreshChunk => self.update_chunk(coord, record),
                SlotObserver::RefreshCollider => self.update_collision_mesh(coord, record),
            }
        }
    }

    /// Turn placement points into spawns. Prefab and yaw come from a stream
    /// seeded by the world seed and chunk coordinate.
    fn spawn_decorations(&mut self, coord: ChunkCoord, map: &MapResult) {
        let categories = &self.ctx.assembler.decorations().categories;
        let mut rng = seeded_rng(self.ctx.seed, ("decorations", coord.x, coord.y));
        let mut spawns = Vec::new();

        for (index, (category, points)) in categories.iter().zip(&map.placements).enumerate() {
            if category.prefabs.is_empty() {
                continue;
            }
            for &position in points {
                spawns.push(DecorationSpawn {
                    category: index,
                    prefab: rng.random_range(0..category.prefabs.len()),
                    position,
                    yaw_degrees: rng.random_range(0..360u32) as f32,
                });
            }
        }

        self.stats.decorations_spawned += spawns.len() as u64;
        tracing::debug!(%coord, spawns = spawns.len(), "decorations spawned");
        self.sink.spawn_decorations(coord, &spawns);
    }
}

/// Owns the chunk registry and viewer state for an endless terrain.
///
/// Nothing here is shared: jobs receive `Arc` snapshots of their inputs and
/// report back through [`CompletionQueues`], which `tick` drains.
pub struct ChunkStreamingManager {
    ctx: StreamingContext,
    jobs: JobDispatcher,
    queues: CompletionQueues,
    chunks: FxHashMap<ChunkCoord, ChunkRecord>,
    visible: Vec<ChunkCoord>,
    viewer: Vec2,
    /// Viewer position at the last visible-set refresh; `None` before the first tick.
    last_refresh_viewer: Option<Vec2>,
    stats: StreamingStats,
}

impl ChunkStreamingManager {
    /// Validate `config` and create a manager using its configured executor.
    pub fn new(config: &TerrainConfig) -> Result<Self, ConfigError> {
        // Validate before an executor (and its threads) exists.
        config.validate()?;
        Self::with_executor(config, executor_for(config.streaming.executor))
    }

    /// Create a manager that runs jobs on `executor`.
    pub fn with_executor(
        config: &TerrainConfig,
        executor: Box<dyn JobExecutor>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let layout = config.layout()?;
        let selector = LodSelector::new(config.lod.clone())?;
        let assembler = Arc::new(HeightGridAssembler::new(
            config.noise.clone(),
            config.terrain.clone(),
            config.decorations.clone(),
            layout.vertices_per_line(),
        ));
        let queues = CompletionQueues::new();

        tracing::info!(
            chunk_size = layout.chunk_size,
            detail_levels = selector.detail_levels().len(),
            max_view_distance = selector.max_view_distance(),
            executor = executor.name(),
            "terrain streaming initialised"
        );

        Ok(Self {
            ctx: StreamingContext {
                assembler,
                mesh_settings: Arc::new(MeshJobSettings::from(&config.terrain)),
                selector,
                streaming: config.streaming.clone(),
                chunk_size: layout.world_size(),
                uniform_scale: config.terrain.uniform_scale,
                seed: config.noise.seed,
            },
            jobs: JobDispatcher {
                executor,
                completions: queues.sender().clone(),
            },
            queues,
            chunks: FxHashMap::default(),
            visible: Vec::new(),
            viewer: Vec2::ZERO,
            last_refresh_viewer: None,
            stats: StreamingStats::default(),
        })
    }

    /// Advance one tick with the viewer at `viewer_world` (scaled world units,
    /// horizontal plane).
    pub fn tick(&mut self, viewer_world: Vec2, sink: &mut impl TerrainSink) {
        self.drain_completions(sink);

        self.viewer = viewer_world / self.ctx.uniform_scale;

        if self.last_refresh_viewer != Some(self.viewer) {
            self.update_collision_meshes(sink);
        }

        let refresh = match self.last_refresh_viewer {
            None => true,
            Some(old) => {
                old.distance_squared(self.viewer) > self.ctx.streaming.sqr_viewer_move_threshold()
            }
        };
        if refresh {
            self.last_refresh_viewer = Some(self.viewer);
            self.update_visible_chunks(sink);
        }
    }

    fn split<'a>(
        &'a mut self,
        sink: &'a mut dyn TerrainSink,
    ) -> (ChunkUpdate<'a>, &'a mut FxHashMap<ChunkCoord, ChunkRecord>) {
        let update = ChunkUpdate {
            ctx: &self.ctx,
            jobs: &self.jobs,
            stats: &mut self.stats,
            visible: &mut self.visible,
            sink,
            viewer: self.viewer,
        };
        (update, &mut self.chunks)
    }

    fn drain_completions(&mut self, sink: &mut dyn TerrainSink) {
        let heights = self.queues.drain_heights();
        let meshes = self.queues.drain_meshes();
        let (mut update, chunks) = self.split(sink);

        for HeightCompletion { coord, map } in heights {
            let Some(record) = chunks.get_mut(&coord) else {
                update.stats.stale_completions += 1;
                tracing::warn!(%coord, "height map for unknown chunk discarded");
                continue;
            };
            if record.map.is_some() {
                update.stats.duplicate_height_deliveries += 1;
                tracing::warn!(%coord, "duplicate height map delivery; keeping the first");
            } else {
                record.map = Some(Arc::clone(&map));
                update.stats.heights_applied += 1;
                update.sink.height_map_ready(coord, &map);
            }
            update.update_chunk(coord, record);
        }

        for MeshCompletion {
            coord,
            lod_index,
            mesh,
        } in meshes
        {
            let slot = chunks
                .get_mut(&coord)
                .filter(|record| lod_index < record.lod_meshes.len());
            let Some(record) = slot else {
                update.stats.stale_completions += 1;
                tracing::warn!(%coord, lod_index, "mesh for unknown chunk or slot discarded");
                continue;
            };
            let slot = &mut record.lod_meshes[lod_index];
            if matches!(slot.state, SlotState::Ready(_)) {
                update.stats.stale_completions += 1;
                tracing::warn!(%coord, lod_index, "mesh delivered to a ready slot discarded");
                continue;
            }
            slot.state = SlotState::Ready(mesh);
            update.stats.meshes_applied += 1;
            update.mesh_ready(coord, record, lod_index);
        }
    }

    fn update_collision_meshes(&mut self, sink: &mut dyn TerrainSink) {
        let visible = self.visible.clone();
        let (mut update, chunks) = self.split(sink);
        for coord in visible {
            if let Some(record) = chunks.get_mut(&coord) {
                update.update_collision_mesh(coord, record);
            }
        }
    }

    fn update_visible_chunks(&mut self, sink: &mut dyn TerrainSink) {
        let previously_visible = self.visible.clone();
        let (mut update, chunks) = self.split(sink);
        let mut updated = FxHashSet::default();

        for &coord in previously_visible.iter().rev() {
            updated.insert(coord);
            if let Some(record) = chunks.get_mut(&coord) {
                update.update_chunk(coord, record);
            }
        }

        let chunk_size = update.ctx.chunk_size;
        let current = ChunkCoord::containing(update.viewer, chunk_size);
        let radius = (update.ctx.selector.max_view_distance() / chunk_size).round() as i32;

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let coord = current.offset(dx, dy);
                if updated.contains(&coord) {
                    continue;
                }
                if let Some(record) = chunks.get_mut(&coord) {
                    update.update_chunk(coord, record);
                } else {
                    let record = update.create_chunk(coord);
                    chunks.insert(coord, record);
                }
            }
        }
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&ChunkRecord> {
        self.chunks.get(&coord)
    }

    /// Currently visible chunks, in the order they became visible.
    pub fn visible_chunks(&self) -> &[ChunkCoord] {
        &self.visible
    }

    pub fn resident_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Viewer position in unscaled world units as of the last tick.
    pub fn viewer(&self) -> Vec2 {
        self.viewer
    }

    /// Chunk edge length in unscaled world units.
    pub fn chunk_size(&self) -> f32 {
        self.ctx.chunk_size
    }

    pub fn lod_selector(&self) -> &LodSelector {
        &self.ctx.selector
    }

    pub fn assembler(&self) -> &HeightGridAssembler {
        &self.ctx.assembler
    }

    /// The queues jobs report to. Results sent here are applied on the next tick.
    pub fn completion_queues(&self) -> &CompletionQueues {
        &self.queues
    }

    pub fn stats(&self) -> StreamingStats {
        StreamingStats {
            resident_chunks: self.chunks.len(),
            visible_chunks: self.visible.len(),
            ..self.stats
        }
    }
}

impl std::fmt::Debug for ChunkStreamingManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkStreamingManager")
            .field("executor", &self.jobs.executor.name())
            .field("viewer", &self.viewer)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
