//! relabel - sort photos into capture-date order
//!
//! Walks a directory tree, finds every leaf directory (one without
//! subdirectories) and copies its files into a mirrored destination tree,
//! renamed to their position when ordered by EXIF capture time.
//!
//! # Features
//!
//! - **Deterministic naming**: within a leaf, dated files are ordered by
//!   timestamp (ties keep listing order) and undated files follow with an
//!   `N` marker. Numbers are zero-padded to the leaf's file count.
//!
//! - **Parallel leaves**: a fixed pool of worker threads, one per CPU by
//!   default, each handling a whole leaf at a time.
//!
//! - **Bounded memory**: leaf discovery is lazy and the job queue is bounded,
//!   so a huge tree never gets materialised up front.
//!
//! - **Best effort**: unreadable metadata makes a file undated, a failed copy
//!   or leaf is logged and counted, and the rest of the run carries on.
//!
//! # Example
//!
//! ```bash
//! # Copy ~/Pictures/Trip into ./Sorted
//! relabel ~/Pictures/Trip
//!
//! # Explicit destination, four workers
//! relabel ~/Pictures/Trip /mnt/backup/Trip -w 4
//! ```
//!
//! Given `A/{p1.jpg (2020-01-02), p2.jpg (no EXIF), p3.jpg (2020-01-01)}`
//! the destination receives `A/1.jpg` (p3), `A/2.jpg` (p1) and `A/3N.jpg` (p2).

pub mod config;
pub mod error;
pub mod metadata;
pub mod progress;
pub mod sorter;
pub mod walker;

pub use config::{CliArgs, SortConfig, SortOptions};
pub use error::{Result, SorterError};
pub use metadata::extract_timestamp;
pub use sorter::{plan_leaf, process_leaf, LeafReport, PhotoEntry};
pub use walker::{leaves, SortCoordinator, SortSummary};
