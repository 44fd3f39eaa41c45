//! Endless terrain streaming.
//!
//! [`ChunkStreamingManager`] keeps the set of chunks around a moving viewer
//! resident: it requests height maps and LOD meshes from background jobs,
//! swaps meshes as the viewer's distance changes, locks in collision meshes and
//! forwards decoration spawns, all from a single consuming thread.

mod coord;
mod executor;
mod job;
mod manager;
mod record;
mod sink;
mod stats;

pub use coord::ChunkCoord;
pub use executor::{InlineExecutor, JobExecutor, ThreadPerJob, WorkerPool, executor_for};
pub use job::{
    CompletionQueues, CompletionSender, HeightCompletion, Job, JobFault, JobKey, MeshCompletion,
    MeshJobSettings,
};
pub use manager::ChunkStreamingManager;
pub use record::{ChunkRecord, LodMeshSlot, SlotObserver, SlotState};
pub use sink::{DecorationSpawn, NullSink, TerrainSink};
pub use stats::StreamingStats;
