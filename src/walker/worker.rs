//! Worker thread logic for parallel leaf sorting
//!
//! Each worker:
//! - Pulls items from the job queue, blocking while it is empty
//! - Sorts and copies one leaf directory per job, start to finish
//! - Logs a failed leaf and moves on to the next job
//! - Exits when it takes a shutdown sentinel
//!
//! Statistics stay local to the thread and are handed back through
//! [`Worker::join`].

use crate::config::SortOptions;
use crate::error::{LeafOutcome, SorterError, WorkerError};
use crate::sorter::{process_leaf, LeafReport};
use crate::walker::queue::{JobReceiver, LeafJob, WorkItem};
use std::ops::AddAssign;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, warn};

/// Statistics collected by a worker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Leaves processed
    pub leaves: u64,

    /// Leaves that could not be processed
    pub failed_leaves: u64,

    /// Files copied
    pub files_copied: u64,

    /// Files whose copy failed
    pub files_failed: u64,

    /// Files without a timestamp
    pub undated: u64,

    /// Bytes copied
    pub bytes: u64,
}

impl WorkerStats {
    fn record_leaf(&mut self, report: &LeafReport) {
        self.leaves += 1;
        self.files_copied += report.copied as u64;
        self.files_failed += report.failed as u64;
        self.undated += report.undated as u64;
        self.bytes += report.bytes;
    }

    fn record_failure(&mut self) {
        self.failed_leaves += 1;
    }
}

impl AddAssign for WorkerStats {
    fn add_assign(&mut self, other: Self) {
        self.leaves += other.leaves;
        self.failed_leaves += other.failed_leaves;
        self.files_copied += other.files_copied;
        self.files_failed += other.files_failed;
        self.undated += other.undated;
        self.bytes += other.bytes;
    }
}

/// A worker thread that processes leaf jobs
pub struct Worker {
    /// Worker ID
    id: usize,

    /// Thread handle
    handle: Option<JoinHandle<WorkerStats>>,
}

impl Worker {
    /// Spawn a new worker thread
    pub fn spawn(
        id: usize,
        options: Arc<SortOptions>,
        queue_rx: JobReceiver,
    ) -> Result<Self, WorkerError> {
        Self::spawn_with(id, queue_rx, move |job| process_leaf(job, &options))
    }

    /// Spawn a worker that handles each job with `process`
    pub fn spawn_with<F>(id: usize, queue_rx: JobReceiver, process: F) -> Result<Self, WorkerError>
    where
        F: Fn(&LeafJob) -> Result<LeafReport, SorterError> + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name(format!("relabel-{}", id))
            .spawn(move || worker_loop(id, queue_rx, process))
            .map_err(|e| WorkerError::SpawnFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Wait for the worker to finish and collect its statistics
    pub fn join(mut self) -> Result<WorkerStats, WorkerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|payload| WorkerError::Panicked {
                id: self.id,
                message: panic_message(payload.as_ref()),
            }),
            None => Ok(WorkerStats::default()),
        }
    }
}

/// Main worker loop
fn worker_loop<F>(id: usize, queue_rx: JobReceiver, process: F) -> WorkerStats
where
    F: Fn(&LeafJob) -> Result<LeafReport, SorterError>,
{
    debug!(worker = id, "Worker starting");

    let mut stats = WorkerStats::default();

    loop {
        let job = match queue_rx.recv() {
            WorkItem::Leaf(job) => job,
            WorkItem::Shutdown => break,
        };

        let outcome = run_job(id, &job, &process, &mut stats);

        match &outcome {
            LeafOutcome::Sorted {
                path,
                files,
                undated,
                failed,
            } => {
                debug!(
                    worker = id,
                    leaf = %path.display(),
                    files = files,
                    undated = undated,
                    "Leaf sorted"
                );
                if *failed > 0 {
                    warn!(worker = id, leaf = %path.display(), failed = failed, "Some copies failed");
                }
            }
            LeafOutcome::Failed { path, error } => {
                warn!(worker = id, leaf = %path.display(), error = %error, "Leaf failed");
            }
        }
    }

    debug!(
        worker = id,
        leaves = stats.leaves,
        files = stats.files_copied,
        "Worker shutting down"
    );

    stats
}

/// Process one job, turning errors and panics into a failed outcome
fn run_job<F>(id: usize, job: &LeafJob, process: &F, stats: &mut WorkerStats) -> LeafOutcome
where
    F: Fn(&LeafJob) -> Result<LeafReport, SorterError>,
{
    let path = job.leaf().to_path_buf();

    match panic::catch_unwind(AssertUnwindSafe(|| process(job))) {
        Ok(Ok(report)) => {
            stats.record_leaf(&report);
            LeafOutcome::Sorted {
                path,
                files: report.files,
                undated: report.undated,
                failed: report.failed,
            }
        }
        Ok(Err(error)) => {
            stats.record_failure();
            LeafOutcome::Failed { path, error }
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(worker = id, leaf = %path.display(), panic = %message, "Leaf processing panicked");
            stats.record_failure();
            LeafOutcome::Failed {
                path,
                error: SorterError::Worker(WorkerError::Panicked { id, message }),
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Worker thread panicked".into()
    }
}

/// Aggregate statistics from joined workers
pub fn aggregate_stats(stats: &[WorkerStats]) -> WorkerStats {
    stats.iter().fold(WorkerStats::default(), |mut total, s| {
        total += *s;
        total
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walker::queue::JobQueue;
    use std::path::PathBuf;

    fn report(copied: usize) -> LeafReport {
        LeafReport {
            files: copied,
            copied,
            bytes: copied as u64 * 10,
            ..Default::default()
        }
    }

    #[test]
    fn test_worker_stats() {
        let mut stats = WorkerStats::default();
        stats.record_leaf(&LeafReport {
            files: 3,
            dated: 2,
            undated: 1,
            copied: 2,
            failed: 1,
            bytes: 1024,
            ..Default::default()
        });
        stats.record_failure();

        assert_eq!(stats.leaves, 1);
        assert_eq!(stats.failed_leaves, 1);
        assert_eq!(stats.files_copied, 2);
        assert_eq!(stats.files_failed, 1);
        assert_eq!(stats.undated, 1);
        assert_eq!(stats.bytes, 1024);

        let total = aggregate_stats(&[stats, stats]);
        assert_eq!(total.leaves, 2);
        assert_eq!(total.bytes, 2048);
    }

    #[test]
    fn test_worker_exits_on_sentinel() {
        let (sender, receiver) = JobQueue::new(4).split();
        let worker = Worker::spawn_with(0, receiver, |_| Ok(report(2))).unwrap();

        sender.submit(LeafJob::new("/r", "/r/a", "/o")).unwrap();
        sender.submit(LeafJob::new("/r", "/r/b", "/o")).unwrap();
        sender.shutdown(1);

        let stats = worker.join().unwrap();
        assert_eq!(stats.leaves, 2);
        assert_eq!(stats.files_copied, 4);
    }

    #[test]
    fn test_failed_leaf_does_not_stop_worker() {
        let (sender, receiver) = JobQueue::new(4).split();
        let worker = Worker::spawn_with(1, receiver, |job| {
            if job.leaf == PathBuf::from("/r/bad") {
                Err(SorterError::LeafOutsideRoot {
                    root: job.root.clone(),
                    leaf: job.leaf.clone(),
                })
            } else {
                Ok(report(1))
            }
        })
        .unwrap();

        sender.submit(LeafJob::new("/r", "/r/bad", "/o")).unwrap();
        sender.submit(LeafJob::new("/r", "/r/good", "/o")).unwrap();
        sender.shutdown(1);

        let stats = worker.join().unwrap();
        assert_eq!(stats.leaves, 1);
        assert_eq!(stats.failed_leaves, 1);
    }

    #[test]
    fn test_panicking_leaf_does_not_kill_worker() {
        let (sender, receiver) = JobQueue::new(4).split();
        let worker = Worker::spawn_with(2, receiver, |job| {
            if job.leaf == PathBuf::from("/r/boom") {
                panic!("corrupt leaf");
            }
            Ok(report(1))
        })
        .unwrap();

        sender.submit(LeafJob::new("/r", "/r/boom", "/o")).unwrap();
        sender.submit(LeafJob::new("/r", "/r/fine", "/o")).unwrap();
        sender.shutdown(1);

        let stats = worker.join().unwrap();
        assert_eq!(stats.leaves, 1);
        assert_eq!(stats.failed_leaves, 1);
    }

    #[test]
    fn test_run_job_outcomes() {
        let mut stats = WorkerStats::default();
        let job = LeafJob::new("/r", "/r/a", "/o");

        let sorted = run_job(0, &job, &|_: &LeafJob| Ok(report(2)), &mut stats);
        assert!(matches!(sorted, LeafOutcome::Sorted { files: 2, failed: 0, .. }));

        let failed = run_job(
            0,
            &job,
            &|_: &LeafJob| -> Result<LeafReport, SorterError> { panic!("bad leaf") },
            &mut stats,
        );
        match failed {
            LeafOutcome::Failed { path, error } => {
                assert_eq!(path, PathBuf::from("/r/a"));
                assert!(error.to_string().contains("bad leaf"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        assert_eq!(stats.leaves, 1);
        assert_eq!(stats.failed_leaves, 1);
    }

    #[test]
    fn test_worker_exits_when_queue_disconnects() {
        let (sender, receiver) = JobQueue::new(1).split();
        let worker = Worker::spawn_with(3, receiver, |_| Ok(report(1))).unwrap();
        assert_eq!(worker.id(), 3);

        drop(sender);
        assert_eq!(worker.join().unwrap(), WorkerStats::default());
    }
}
