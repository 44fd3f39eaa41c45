//! Counters describing streaming activity.

/// Snapshot of streaming counters, returned by
/// [`crate::ChunkStreamingManager::stats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamingStats {
    pub height_jobs_dispatched: u64,
    pub mesh_jobs_dispatched: u64,
    pub heights_applied: u64,
    pub meshes_applied: u64,
    /// Completions for chunks or slots that no longer accept them.
    pub stale_completions: u64,
    /// Height maps delivered for a chunk that already had one.
    pub duplicate_height_deliveries: u64,
    pub colliders_set: u64,
    pub decorations_spawned: u64,
    pub resident_chunks: usize,
    pub visible_chunks: usize,
}

impl StreamingStats {
    /// Jobs dispatched but not yet applied or discarded.
    pub fn jobs_in_flight(&self) -> u64 {
        let dispatched = self.height_jobs_dispatched + self.mesh_jobs_dispatched;
        let finished = self.heights_applied
            + self.meshes_applied
            + self.stale_completions
            + self.duplicate_height_deliveries;
        dispatched.saturating_sub(finished)
    }
}

impl std::fmt::Display for StreamingStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "resident={} visible={} height_jobs={} mesh_jobs={} in_flight={} colliders={} decorations={} stale={}",
            self.resident_chunks,
            self.visible_chunks,
            self.height_jobs_dispatched,
            self.mesh_jobs_dispatched,
            self.jobs_in_flight(),
            self.colliders_set,
            self.decorations_spawned,
            self.stale_completions,
        )
    }
}
