//! Background jobs and the queues their results come back through.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, unbounded};
use glam::Vec2;
use vista_lod::LevelOfDetail;
use vista_mesh::{TerrainMesh, build_terrain_mesh};
use vista_terrain::{HeightCurve, HeightGridAssembler, MapResult, TerrainSettings};

use crate::coord::ChunkCoord;

/// A finished height map for `coord`.
#[derive(Clone, Debug)]
pub struct HeightCompletion {
    pub coord: ChunkCoord,
    pub map: Arc<MapResult>,
}

/// A finished mesh for detail level `lod_index` of `coord`.
#[derive(Clone, Debug)]
pub struct MeshCompletion {
    pub coord: ChunkCoord,
    pub lod_index: usize,
    pub mesh: Arc<TerrainMesh>,
}

/// Meshing inputs shared by every mesh job.
#[derive(Clone, Debug)]
pub struct MeshJobSettings {
    pub height_multiplier: f32,
    pub height_curve: HeightCurve,
    pub flat_shading: bool,
}

impl From<&TerrainSettings> for MeshJobSettings {
    fn from(terrain: &TerrainSettings) -> Self {
        Self {
            height_multiplier: terrain.height_multiplier,
            height_curve: terrain.height_curve.clone(),
            flat_shading: terrain.use_flat_shading,
        }
    }
}

/// Identifies what a job produces, for bookkeeping and diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JobKey {
    Height(ChunkCoord),
    Mesh(ChunkCoord, usize),
}

/// A job that panicked instead of producing its result.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("terrain job {key:?} panicked: {message}")]
pub struct JobFault {
    pub key: JobKey,
    pub message: String,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// A self-contained unit of work that can run on any thread.
///
/// Jobs own or share (via `Arc`) everything they read, so no world state is
/// locked while they run.
#[derive(Clone, Debug)]
pub enum Job {
    Height {
        coord: ChunkCoord,
        /// Chunk centre in unscaled world units.
        center: Vec2,
        assembler: Arc<HeightGridAssembler>,
    },
    Mesh {
        coord: ChunkCoord,
        lod_index: usize,
        lod: LevelOfDetail,
        map: Arc<MapResult>,
        settings: Arc<MeshJobSettings>,
    },
}

impl Job {
    pub fn key(&self) -> JobKey {
        match self {
            Job::Height { coord, .. } => JobKey::Height(*coord),
            Job::Mesh {
                coord, lod_index, ..
            } => JobKey::Mesh(*coord, *lod_index),
        }
    }

    /// Thread name used by executors that spawn per job.
    pub fn thread_name(&self) -> &'static str {
        match self {
            Job::Height { .. } => "vista-height-job",
            Job::Mesh { .. } => "vista-mesh-job",
        }
    }

    /// Like [`Job::run`], but a panic inside the job is caught and returned
    /// as a [`JobFault`]. Nothing is enqueued for a faulted job.
    pub fn run_catching(self, completions: &CompletionSender) -> Result<(), JobFault> {
        let key = self.key();
        catch_unwind(AssertUnwindSafe(|| self.run(completions))).map_err(|payload| JobFault {
            key,
            message: panic_message(payload.as_ref()),
        })
    }

    /// Run on a background thread. A faulted job would leave its chunk waiting
    /// forever, so the fault is logged and the process aborted.
    pub fn run_or_abort(self, completions: &CompletionSender) {
        if let Err(fault) = self.run_catching(completions) {
            tracing::error!(
                key = ?fault.key,
                message = %fault.message,
                "terrain job failed; aborting"
            );
            std::process::abort();
        }
    }

    /// Run the job to completion and enqueue its result.
    pub fn run(self, completions: &CompletionSender) {
        let start = Instant::now();
        match self {
            Job::Height {
                coord,
                center,
                assembler,
            } => {
                let map = Arc::new(assembler.generate(center));
                tracing::trace!(
                    %coord,
                    elapsed_us = start.elapsed().as_micros() as u64,
                    "height job finished"
                );
                completions.send_height(HeightCompletion { coord, map });
            }
            Job::Mesh {
                coord,
                lod_index,
                lod,
                map,
                settings,
            } => {
                let mesh = build_terrain_mesh(
                    &map.heights,
                    settings.height_multiplier,
                    &settings.height_curve,
                    lod,
                    settings.flat_shading,
                );
                tracing::trace!(
                    %coord,
                    %lod,
                    triangles = mesh.triangle_count(),
                    elapsed_us = start.elapsed().as_micros() as u64,
                    "mesh job finished"
                );
                completions.send_mesh(MeshCompletion {
                    coord,
                    lod_index,
                    mesh: Arc::new(mesh),
                });
            }
        }
    }
}

/// Producer half of [`CompletionQueues`], cloned into every job runner.
#[derive(Clone, Debug)]
pub struct CompletionSender {
    heights: Sender<HeightCompletion>,
    meshes: Sender<MeshCompletion>,
}

impl CompletionSender {
    /// Enqueue a height map. Dropped silently once the consumer is gone.
    pub fn send_height(&self, completion: HeightCompletion) {
        let _ = self.heights.send(completion);
    }

    /// Enqueue a mesh. Dropped silently once the consumer is gone.
    pub fn send_mesh(&self, completion: MeshCompletion) {
        let _ = self.meshes.send(completion);
    }
}

/// The two FIFO queues results travel through: one for height maps, one for
/// meshes. Ordering holds within each queue, not across them.
#[derive(Debug)]
pub struct CompletionQueues {
    sender: CompletionSender,
    heights: Receiver<HeightCompletion>,
    meshes: Receiver<MeshCompletion>,
}

impl CompletionQueues {
    pub fn new() -> Self {
        let (height_tx, height_rx) = unbounded();
        let (mesh_tx, mesh_rx) = unbounded();
        Self {
            sender: CompletionSender {
                heights: height_tx,
                meshes: mesh_tx,
            },
            heights: height_rx,
            meshes: mesh_rx,
        }
    }

    pub fn sender(&self) -> &CompletionSender {
        &self.sender
    }

    /// Take every height map queued so far.
    ///
    /// Results enqueued while the caller processes the batch wait for the
    /// next drain.
    pub fn drain_heights(&self) -> Vec<HeightCompletion> {
        self.heights.try_iter().collect()
    }

    /// Take every mesh queued so far.
    pub fn drain_meshes(&self) -> Vec<MeshCompletion> {
        self.meshes.try_iter().collect()
    }

    pub fn pending_heights(&self) -> usize {
        self.heights.len()
    }

    pub fn pending_meshes(&self) -> usize {
        self.meshes.len()
    }
}

impl Default for CompletionQueues {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vista_terrain::{DecorationSettings, HeightGrid, NoiseSettings};

    fn assembler() -> Arc<HeightGridAssembler> {
        Arc::new(HeightGridAssembler::new(
            NoiseSettings::default(),
            TerrainSettings::default(),
            DecorationSettings::default(),
            51,
        ))
    }

    #[test]
    fn test_height_job_enqueues_result() {
        let queues = CompletionQueues::new();
        let job = Job::Height {
            coord: ChunkCoord::new(1, -1),
            center: Vec2::new(50.0, -50.0),
            assembler: assembler(),
        };
        assert_eq!(job.key(), JobKey::Height(ChunkCoord::new(1, -1)));
        job.run(queues.sender());

        let heights = queues.drain_heights();
        assert_eq!(heights.len(), 1);
        assert_eq!(heights[0].coord, ChunkCoord::new(1, -1));
        assert_eq!(heights[0].map.heights.width(), 53);
        assert!(queues.drain_meshes().is_empty());
    }

    #[test]
    fn test_mesh_job_builds_requested_lod() {
        let queues = CompletionQueues::new();
        let map = Arc::new(assembler().generate(Vec2::ZERO));
        let lod = LevelOfDetail::new(2).unwrap();
        let job = Job::Mesh {
            coord: ChunkCoord::new(0, 0),
            lod_index: 1,
            lod,
            map,
            settings: Arc::new(MeshJobSettings::from(&TerrainSettings::default())),
        };
        assert_eq!(job.thread_name(), "vista-mesh-job");
        job.run(queues.sender());

        let meshes = queues.drain_meshes();
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].lod_index, 1);
        assert_eq!(meshes[0].mesh.lod, lod);
        assert!(!meshes[0].mesh.is_empty());
    }

    #[test]
    fn test_run_catching_reports_mesh_fault() {
        let queues = CompletionQueues::new();
        // 8 - 5 = 3 is not a multiple of the level 1 stride.
        let map = Arc::new(MapResult {
            heights: Arc::new(HeightGrid::new(8, 8, 0.5)),
            placements: Vec::new(),
        });
        let job = Job::Mesh {
            coord: ChunkCoord::new(2, 3),
            lod_index: 0,
            lod: LevelOfDetail::new(1).unwrap(),
            map,
            settings: Arc::new(MeshJobSettings::from(&TerrainSettings::default())),
        };

        let fault = job
            .run_catching(queues.sender())
            .expect_err("mesh build over a non-dividing grid should fault");
        assert_eq!(fault.key, JobKey::Mesh(ChunkCoord::new(2, 3), 0));
        assert!(
            fault.message.contains("does not divide"),
            "fault should carry the panic message, got {:?}",
            fault.message
        );
        assert_eq!(queues.pending_meshes(), 0, "a faulted job must not enqueue a result");
    }

    #[test]
    fn test_run_catching_passes_through_success() {
        let queues = CompletionQueues::new();
        let job = Job::Height {
            coord: ChunkCoord::new(0, 0),
            center: Vec2::ZERO,
            assembler: assembler(),
        };
        assert_eq!(job.run_catching(queues.sender()), Ok(()));
        assert_eq!(queues.pending_heights(), 1);
    }

    #[test]
    fn test_queues_are_fifo_per_kind() {
        let queues = CompletionQueues::new();
        let map = Arc::new(assembler().generate(Vec2::ZERO));
        for x in 0..4 {
            queues.sender().send_height(HeightCompletion {
                coord: ChunkCoord::new(x, 0),
                map: Arc::clone(&map),
            });
        }
        assert_eq!(queues.pending_heights(), 4);
        let order: Vec<i32> = queues.drain_heights().iter().map(|c| c.coord.x).collect();
        assert_eq!(order, vec![0, 1, 2, 3]);
        assert_eq!(queues.pending_heights(), 0);
    }
}
