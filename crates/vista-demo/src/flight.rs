//! Scripted viewer flight over the streaming terrain.

use std::error::Error;
use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::{Vec2, Vec3};
use tracing::{info, warn};
use vista_config::{ConfigChange, ConfigWatcher, TerrainConfig};
use vista_mesh::TerrainMesh;
use vista_streaming::{ChunkCoord, ChunkStreamingManager, DecorationSpawn, TerrainSink};

const STATS_INTERVAL: u32 = 60;
const RELOAD_INTERVAL: u32 = 120;
const TICK_INTERVAL: Duration = Duration::from_millis(2);
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Copy, Debug)]
pub struct FlightPlan {
    pub ticks: u32,
    /// World units per tick.
    pub speed: f32,
}

/// Tallies what the streaming manager hands out.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FlightSummary {
    pub chunks_created: usize,
    pub meshes_shown: usize,
    pub colliders_set: usize,
    pub decorations_spawned: usize,
    pub visibility_changes: usize,
    pub regenerations: usize,
}

impl TerrainSink for FlightSummary {
    fn chunk_created(&mut self, _coord: ChunkCoord, _origin: Vec3) {
        self.chunks_created += 1;
    }

    fn set_visible(&mut self, _coord: ChunkCoord, _visible: bool) {
        self.visibility_changes += 1;
    }

    fn show_mesh(&mut self, _coord: ChunkCoord, _lod_index: usize, _mesh: &Arc<TerrainMesh>) {
        self.meshes_shown += 1;
    }

    fn set_collider(&mut self, _coord: ChunkCoord, _mesh: &Arc<TerrainMesh>) {
        self.colliders_set += 1;
    }

    fn spawn_decorations(&mut self, _coord: ChunkCoord, spawns: &[DecorationSpawn]) {
        self.decorations_spawned += spawns.len();
    }
}

impl std::fmt::Display for FlightSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "chunks={} meshes_shown={} colliders={} decorations={} visibility_changes={} regenerations={}",
            self.chunks_created,
            self.meshes_shown,
            self.colliders_set,
            self.decorations_spawned,
            self.visibility_changes,
            self.regenerations,
        )
    }
}

/// Viewer position after `tick` ticks: eastward with a gentle weave.
pub fn viewer_position(tick: u32, speed: f32) -> Vec2 {
    let distance = tick as f32 * speed;
    Vec2::new(distance, (distance * 0.005).sin() * 150.0)
}

/// Changes that invalidate chunks already streamed in.
fn needs_restream(change: ConfigChange) -> bool {
    change.needs_regeneration()
        || change.contains(ConfigChange::LOD)
        || change.contains(ConfigChange::STREAMING)
}

/// Fly `plan` over terrain built from `config`, polling `watcher` for edits.
/// `reconfigure` turns a reloaded file config into the config to stream with.
pub fn fly<F>(
    config: TerrainConfig,
    mut watcher: ConfigWatcher,
    plan: &FlightPlan,
    mut reconfigure: F,
) -> Result<FlightSummary, Box<dyn Error>>
where
    F: FnMut(&TerrainConfig) -> Result<TerrainConfig, Box<dyn Error>>,
{
    let mut manager = ChunkStreamingManager::new(&config)?;
    let mut summary = FlightSummary::default();
    let mut viewer = Vec2::ZERO;

    for tick in 0..plan.ticks {
        viewer = viewer_position(tick, plan.speed);
        manager.tick(viewer, &mut summary);

        if tick % STATS_INTERVAL == 0 {
            info!(tick, viewer = ?viewer, stats = %manager.stats(), "streaming");
        }

        if tick % RELOAD_INTERVAL == RELOAD_INTERVAL - 1 {
            match watcher.poll() {
                Ok(Some(change)) if needs_restream(change) => {
                    match reconfigure(watcher.current())
                        .and_then(|config| Ok(ChunkStreamingManager::new(&config)?))
                    {
                        Ok(rebuilt) => {
                            manager = rebuilt;
                            summary.regenerations += 1;
                            info!(change = change.0, "config changed, terrain regenerated");
                        }
                        Err(e) => warn!(%e, "reloaded config rejected, keeping current terrain"),
                    }
                }
                Ok(Some(change)) => {
                    info!(change = change.0, "config changed, no regeneration needed");
                }
                Ok(None) => {}
                Err(e) => warn!(%e, "config reload failed, keeping current config"),
            }
        }

        std::thread::sleep(TICK_INTERVAL);
    }

    // Let in-flight jobs land so the final statistics are complete.
    let deadline = Instant::now() + DRAIN_TIMEOUT;
    while manager.stats().jobs_in_flight() > 0 && Instant::now() < deadline {
        manager.tick(viewer, &mut summary);
        std::thread::sleep(TICK_INTERVAL);
    }

    info!(stats = %manager.stats(), "final streaming statistics");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use vista_config::ExecutorKind;

    use super::*;

    fn inline_config() -> TerrainConfig {
        let mut config = TerrainConfig::default();
        config.mesh.chunk_size_index = 0;
        config.streaming.executor = ExecutorKind::Inline;
        config
    }

    #[test]
    fn test_viewer_starts_at_origin_and_moves_east() {
        assert_eq!(viewer_position(0, 4.0), Vec2::ZERO);
        let later = viewer_position(100, 4.0);
        assert_eq!(later.x, 400.0);
        assert!(later.y.abs() <= 150.0, "weave stays within 150 units");
    }

    #[test]
    fn test_restream_on_lod_or_generation_changes() {
        assert!(needs_restream(ConfigChange::NOISE));
        assert!(needs_restream(ConfigChange::LOD));
        assert!(needs_restream(ConfigChange::STREAMING));
        assert!(!needs_restream(ConfigChange::TEXTURE));
        assert!(!needs_restream(ConfigChange::DEBUG));
    }

    #[test]
    fn test_short_flight_streams_terrain() {
        let dir = tempfile::tempdir().unwrap();
        let config = inline_config();
        config.save(dir.path()).unwrap();
        let watcher = ConfigWatcher::new(dir.path(), config.clone());
        let plan = FlightPlan {
            ticks: 20,
            speed: 4.0,
        };

        let summary = fly(config, watcher, &plan, |c| Ok(c.clone())).unwrap();
        assert!(summary.chunks_created > 0);
        assert!(summary.meshes_shown > 0, "visible chunks should receive meshes");
        assert!(summary.colliders_set >= 1, "the starting chunk gets a collider");
        assert_eq!(summary.regenerations, 0);
    }
}
