//! Bounded job queue between the coordinator and the workers
//!
//! The coordinator is the only producer. It blocks when the queue is full,
//! which keeps leaf discovery from racing ahead of the pool. Workers block
//! on an empty queue until a job or a [`WorkItem::Shutdown`] sentinel
//! arrives.

use crate::error::WorkerError;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::path::{Path, PathBuf};

/// One leaf directory to sort
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafJob {
    /// Source root the leaf was discovered under
    pub root: PathBuf,

    /// Leaf directory to process
    pub leaf: PathBuf,

    /// Destination root
    pub output_root: PathBuf,
}

impl LeafJob {
    /// Create a new leaf job
    pub fn new(
        root: impl Into<PathBuf>,
        leaf: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            root: root.into(),
            leaf: leaf.into(),
            output_root: output_root.into(),
        }
    }

    /// Leaf path, for logging
    pub fn leaf(&self) -> &Path {
        &self.leaf
    }
}

/// An item on the job queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItem {
    /// Process this leaf
    Leaf(LeafJob),

    /// Sentinel: the worker that takes this exits
    Shutdown,
}

/// Bounded FIFO of work items
pub struct JobQueue {
    /// Sender for adding items
    sender: Sender<WorkItem>,

    /// Receiver for taking items
    receiver: Receiver<WorkItem>,

    /// Queue capacity
    capacity: usize,
}

impl JobQueue {
    /// Create a new job queue with the specified capacity
    ///
    /// A capacity of zero is raised to one; a rendezvous channel would make
    /// every submit wait for an idle worker.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = bounded(capacity);

        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Split into the producer handle and a receiver to clone per worker
    ///
    /// Consumes the queue so the only live sender is the one returned.
    /// Once it is dropped, workers blocked on an empty queue wake up.
    pub fn split(self) -> (JobSender, JobReceiver) {
        (
            JobSender {
                sender: self.sender,
            },
            JobReceiver {
                receiver: self.receiver,
            },
        )
    }

    /// Get queue capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Producer side of the queue
pub struct JobSender {
    sender: Sender<WorkItem>,
}

impl JobSender {
    /// Enqueue a leaf job, blocking while the queue is full
    ///
    /// Fails if every receiver is gone.
    pub fn submit(&self, job: LeafJob) -> Result<(), WorkerError> {
        self.sender
            .send(WorkItem::Leaf(job))
            .map_err(|_| WorkerError::QueueClosed)
    }

    /// Try to enqueue without blocking
    ///
    /// Returns `Ok(true)` if sent, `Ok(false)` if the queue is full,
    /// `Err` if the queue is disconnected.
    pub fn try_submit(&self, job: LeafJob) -> Result<bool, WorkerError> {
        match self.sender.try_send(WorkItem::Leaf(job)) {
            Ok(()) => Ok(true),
            Err(TrySendError::Full(_)) => Ok(false),
            Err(TrySendError::Disconnected(_)) => Err(WorkerError::QueueClosed),
        }
    }

    /// Enqueue one shutdown sentinel per worker, after all real jobs
    ///
    /// Returns the number of sentinels enqueued.
    pub fn shutdown(&self, workers: usize) -> usize {
        let mut sent = 0;
        for _ in 0..workers {
            if self.sender.send(WorkItem::Shutdown).is_err() {
                break;
            }
            sent += 1;
        }
        sent
    }

    /// Get current queue length
    pub fn len(&self) -> usize {
        self.sender.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }
}

/// Consumer side of the queue (clone for each worker)
#[derive(Clone)]
pub struct JobReceiver {
    receiver: Receiver<WorkItem>,
}

impl JobReceiver {
    /// Take the next item, blocking while the queue is empty
    ///
    /// A disconnected, drained queue is reported as `Shutdown` so a worker
    /// can never wait forever on a producer that has gone away.
    pub fn recv(&self) -> WorkItem {
        self.receiver.recv().unwrap_or(WorkItem::Shutdown)
    }

    /// Try to take an item without blocking
    pub fn try_recv(&self) -> Option<WorkItem> {
        self.receiver.try_recv().ok()
    }
}
