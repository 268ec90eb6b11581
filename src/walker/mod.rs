//! Parallel leaf-directory sorter
//!
//! The coordinator discovers leaf directories and feeds them through a
//! bounded queue to a fixed pool of workers. Each worker sorts and copies
//! one whole leaf at a time.
//!
//! # Architecture
//!
//! ```text
//!                     ┌─────────────────────────┐
//!                     │     SortCoordinator     │
//!                     │  - leaf discovery       │
//!                     │  - blocking submit      │
//!                     │  - 1 sentinel / worker  │
//!                     └───────────┬─────────────┘
//!                                 │
//!                     ┌───────────▼─────────────┐
//!                     │  JobQueue (bounded, N)  │
//!                     └───────────┬─────────────┘
//!       ┌─────────────────────────┼─────────────────────────┐
//!       │                         │                         │
//! ┌─────▼─────┐             ┌─────▼─────┐             ┌─────▼─────┐
//! │  Worker 1 │             │  Worker 2 │             │  Worker N │
//! │ EXIF read │             │ EXIF read │             │ EXIF read │
//! │ sort/copy │             │ sort/copy │             │ sort/copy │
//! └───────────┘             └───────────┘             └───────────┘
//! ```

pub mod coordinator;
pub mod leaves;
pub mod queue;
pub mod worker;

pub use coordinator::{SortCoordinator, SortSummary};
pub use leaves::{leaves, LeafDirs};
pub use queue::{JobQueue, JobReceiver, JobSender, LeafJob, WorkItem};
pub use worker::{Worker, WorkerStats};
