//! Sort coordinator - orchestrates the parallel leaf sort
//!
//! The coordinator is responsible for:
//! - Setting up the job queue and workers
//! - Feeding one job per leaf directory, blocking while the queue is full
//! - Sending one shutdown sentinel per worker once every leaf is queued
//! - Joining the workers and collecting final statistics

use crate::config::SortConfig;
use crate::error::{Result, WorkerError};
use crate::progress::ProgressReporter;
use crate::walker::leaves::leaves;
use crate::walker::queue::{JobQueue, JobSender, LeafJob};
use crate::walker::worker::{aggregate_stats, Worker, WorkerStats};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Result of a completed sort
#[derive(Debug, Clone, Default)]
pub struct SortSummary {
    /// Leaf directories queued
    pub leaves_queued: u64,

    /// Directories that could not be read during discovery
    pub discovery_errors: u64,

    /// Totals across all workers
    pub stats: WorkerStats,

    /// Workers that died instead of exiting on their sentinel
    pub lost_workers: u64,

    /// Number of workers used
    pub workers: usize,

    /// Time taken for the sort
    pub duration: Duration,
}

impl SortSummary {
    /// Everything that went wrong, summed
    pub fn error_count(&self) -> u64 {
        self.discovery_errors + self.stats.failed_leaves + self.stats.files_failed + self.lost_workers
    }
}

/// Coordinates the parallel sort
pub struct SortCoordinator {
    /// Configuration
    config: Arc<SortConfig>,

    /// Spinner updated as leaves are queued
    progress: Option<ProgressReporter>,
}

impl SortCoordinator {
    /// Create a new sort coordinator
    pub fn new(config: SortConfig) -> Self {
        Self {
            config: Arc::new(config),
            progress: None,
        }
    }

    /// Report queued leaves on a spinner
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Run the sort to completion
    pub fn run(self) -> Result<SortSummary> {
        let start_time = Instant::now();

        info!(
            source = %self.config.source.display(),
            destination = %self.config.destination.display(),
            workers = self.config.worker_count,
            queue = self.config.queue_size,
            "Starting sort"
        );

        let (sender, receiver) = JobQueue::new(self.config.queue_size).split();

        // Spawn workers
        let options = Arc::new(self.config.sort_options());
        let mut workers = Vec::with_capacity(self.config.worker_count);
        for id in 0..self.config.worker_count {
            match Worker::spawn(id, Arc::clone(&options), receiver.clone()) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    sender.shutdown(workers.len());
                    drop(sender);
                    join_workers(workers);
                    return Err(e.into());
                }
            }
        }
        drop(receiver);
        debug!(count = workers.len(), "Workers spawned");

        // Feed the pool
        let fed = self.enqueue_leaves(&sender);

        // Sentinels queue behind every real job
        let sentinels = sender.shutdown(workers.len());
        if sentinels < workers.len() {
            warn!(sent = sentinels, workers = workers.len(), "Not every worker received a sentinel");
        }
        drop(sender);

        let worker_count = workers.len();
        let (stats, lost_workers) = join_workers(workers);
        let (leaves_queued, discovery_errors) = fed?;

        let duration = start_time.elapsed();

        if let Some(progress) = &self.progress {
            progress.finish(&format!("Sorted {} leaf directories", leaves_queued));
        }

        info!(
            leaves = leaves_queued,
            files = stats.files_copied,
            undated = stats.undated,
            failed_leaves = stats.failed_leaves,
            duration_secs = duration.as_secs_f64(),
            "Sort completed"
        );

        Ok(SortSummary {
            leaves_queued,
            discovery_errors,
            stats,
            lost_workers,
            workers: worker_count,
            duration,
        })
    }

    /// Queue one job per leaf; returns (queued, discovery errors)
    fn enqueue_leaves(&self, sender: &JobSender) -> Result<(u64, u64)> {
        let mut queued = 0u64;
        let mut errors = 0u64;

        for leaf in leaves(&self.config.source) {
            let leaf = match leaf {
                Ok(leaf) => leaf,
                Err(e) => {
                    warn!(error = %e, "Could not read directory");
                    errors += 1;
                    continue;
                }
            };

            let job = LeafJob::new(&self.config.source, leaf, &self.config.destination);
            if let Err(e) = sender.submit(job) {
                // Every worker is gone; nobody will drain the queue
                warn!(error = %e, queued = queued, "Stopping leaf discovery");
                return Err(WorkerError::QueueClosed.into());
            }
            queued += 1;

            if let Some(progress) = &self.progress {
                progress.update(queued, sender.len());
            }
        }

        Ok((queued, errors))
    }
}

/// Join all workers; returns summed stats and the number that died
fn join_workers(workers: Vec<Worker>) -> (WorkerStats, u64) {
    let mut collected = Vec::with_capacity(workers.len());
    let mut lost = 0;

    for worker in workers {
        match worker.join() {
            Ok(stats) => collected.push(stats),
            Err(e) => {
                warn!(error = %e, "Worker failed to join cleanly");
                lost += 1;
            }
        }
    }

    (aggregate_stats(&collected), lost)
}
