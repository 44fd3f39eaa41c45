//! Strategies for running jobs off (or on) the consuming thread.
//!
//! Every executor preserves the same contract: a dispatched job always runs to
//! completion and enqueues exactly one result. A job that panics on a
//! background thread is logged and aborts the process; the inline executor
//! lets the panic unwind into the caller.

use std::thread::JoinHandle;

use crossbeam_channel::{Sender, unbounded};
use vista_config::ExecutorKind;

use crate::job::{CompletionSender, Job};

/// Runs [`Job`]s and routes their results to `completions`.
pub trait JobExecutor: Send {
    fn dispatch(&self, job: Job, completions: &CompletionSender);

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// One short-lived, named OS thread per job. Unbounded fan-out.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadPerJob;

impl JobExecutor for ThreadPerJob {
    fn dispatch(&self, job: Job, completions: &CompletionSender) {
        let completions = completions.clone();
        std::thread::Builder::new()
            .name(job.thread_name().into())
            .spawn(move || job.run_or_abort(&completions))
            .expect("Failed to spawn terrain job thread");
    }

    fn name(&self) -> &'static str {
        "thread-per-job"
    }
}

/// Runs each job on the dispatching thread before `dispatch` returns. The
/// result still goes through the completion queue and is applied on the next
/// drain, so the manager's control flow is identical to the threaded
/// executors.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineExecutor;

impl JobExecutor for InlineExecutor {
    fn dispatch(&self, job: Job, completions: &CompletionSender) {
        job.run(completions);
    }

    fn name(&self) -> &'static str {
        "inline"
    }
}

/// A fixed set of worker threads pulling jobs from a shared FIFO queue.
///
/// Dropping the pool closes the queue and joins the workers after they finish
/// the jobs already queued.
pub struct WorkerPool {
    job_sender: Option<Sender<(Job, CompletionSender)>>,
    worker_handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `worker_count` workers (at least one).
    pub fn new(worker_count: usize) -> Self {
        let (job_tx, job_rx) = unbounded::<(Job, CompletionSender)>();

        let worker_handles = (0..worker_count.max(1))
            .map(|_| {
                let rx = job_rx.clone();
                std::thread::Builder::new()
                    .name("vista-terrain-worker".into())
                    .spawn(move || {
                        while let Ok((job, completions)) = rx.recv() {
                            job.run_or_abort(&completions);
                        }
                    })
                    .expect("Failed to spawn terrain worker thread")
            })
            .collect();

        Self {
            job_sender: Some(job_tx),
            worker_handles,
        }
    }

    /// Worker count leaving headroom for the consuming thread and renderer.
    pub fn default_worker_count() -> usize {
        let cpus = num_cpus::get().max(2);
        (cpus - 2).max(1)
    }

    /// Create a pool sized with [`Self::default_worker_count`].
    pub fn with_defaults() -> Self {
        Self::new(Self::default_worker_count())
    }

    pub fn worker_count(&self) -> usize {
        self.worker_handles.len()
    }

    /// Close the job queue and join all workers.
    pub fn shutdown(&mut self) {
        self.job_sender.take();
        for handle in self.worker_handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl JobExecutor for WorkerPool {
    fn dispatch(&self, job: Job, completions: &CompletionSender) {
        let Some(sender) = &self.job_sender else {
            tracing::error!("terrain worker pool is shut down; job dropped");
            return;
        };
        if sender.send((job, completions.clone())).is_err() {
            tracing::error!("terrain worker pool has no live workers; job dropped");
        }
    }

    fn name(&self) -> &'static str {
        "worker-pool"
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.worker_handles.len())
            .field("open", &self.job_sender.is_some())
            .finish()
    }
}

/// Build the executor selected in the streaming settings.
pub fn executor_for(kind: ExecutorKind) -> Box<dyn JobExecutor> {
    match kind {
        ExecutorKind::ThreadPerJob => Box::new(ThreadPerJob),
        ExecutorKind::Pool { workers } => Box::new(WorkerPool::new(workers)),
        ExecutorKind::Inline => Box::new(InlineExecutor),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use glam::Vec2;
    use vista_terrain::{DecorationSettings, HeightGridAssembler, NoiseSettings, TerrainSettings};

    use super::*;
    use crate::coord::ChunkCoord;
    use crate::job::CompletionQueues;

    fn height_jobs(count: i32) -> Vec<Job> {
        let assembler = Arc::new(HeightGridAssembler::new(
            NoiseSettings::default(),
            TerrainSettings::default(),
            DecorationSettings::default(),
            51,
        ));
        (0..count)
            .map(|x| Job::Height {
                coord: ChunkCoord::new(x, 0),
                center: Vec2::new(x as f32 * 50.0, 0.0),
                assembler: Arc::clone(&assembler),
            })
            .collect()
    }

    fn collect_heights(queues: &CompletionQueues, expected: usize) -> Vec<ChunkCoord> {
        let mut received = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(30);
        while received.len() < expected && Instant::now() < deadline {
            received.extend(queues.drain_heights().into_iter().map(|c| c.coord));
            if received.len() < expected {
                std::thread::sleep(Duration::from_millis(5));
            }
        }
        received.sort();
        received
    }

    fn expected_coords(count: i32) -> Vec<ChunkCoord> {
        (0..count).map(|x| ChunkCoord::new(x, 0)).collect()
    }

    #[test]
    fn test_inline_executor_completes_before_returning() {
        let queues = CompletionQueues::new();
        for job in height_jobs(3) {
            InlineExecutor.dispatch(job, queues.sender());
        }
        assert_eq!(queues.pending_heights(), 3);
    }

    #[test]
    fn test_thread_per_job_delivers_every_result() {
        let queues = CompletionQueues::new();
        for job in height_jobs(6) {
            ThreadPerJob.dispatch(job, queues.sender());
        }
        assert_eq!(
            collect_heights(&queues, 6),
            expected_coords(6),
            "every dispatched job must complete"
        );
    }

    #[test]
    fn test_worker_pool_delivers_every_result() {
        let queues = CompletionQueues::new();
        let pool = WorkerPool::new(3);
        assert_eq!(pool.worker_count(), 3);
        for job in height_jobs(8) {
            pool.dispatch(job, queues.sender());
        }
        assert_eq!(collect_heights(&queues, 8), expected_coords(8));
    }

    #[test]
    fn test_single_worker_pool_preserves_dispatch_order() {
        let queues = CompletionQueues::new();
        let pool = WorkerPool::new(1);
        for job in height_jobs(5) {
            pool.dispatch(job, queues.sender());
        }
        let mut order = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(30);
        while order.len() < 5 && Instant::now() < deadline {
            order.extend(queues.drain_heights().into_iter().map(|c| c.coord.x));
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(order, vec![0, 1, 2, 3, 4], "one worker completes in FIFO order");
    }

    #[test]
    fn test_pool_shutdown_finishes_queued_jobs() {
        let queues = CompletionQueues::new();
        let mut pool = WorkerPool::new(2);
        for job in height_jobs(4) {
            pool.dispatch(job, queues.sender());
        }
        pool.shutdown();
        assert_eq!(pool.worker_count(), 0);
        assert_eq!(queues.pending_heights(), 4, "queued jobs run before workers exit");
    }

    #[test]
    fn test_executor_for_kind() {
        assert_eq!(executor_for(ExecutorKind::Inline).name(), "inline");
        assert_eq!(executor_for(ExecutorKind::ThreadPerJob).name(), "thread-per-job");
        assert_eq!(executor_for(ExecutorKind::Pool { workers: 2 }).name(), "worker-pool");
    }
}
