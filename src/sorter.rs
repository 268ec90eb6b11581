//! Per-leaf sorting and copying
//!
//! For one leaf directory:
//! - list its files (not recursive), minus skipped extensions
//! - read each file's capture timestamp
//! - order dated files by timestamp (stable), then undated files in listing order
//! - copy each to `<output_root>/<leaf relative to root>/<seq>[N].<ext>`
//!
//! The sequence number is zero-padded to the digit count of the leaf's file
//! total, so names sort lexically in the same order.

use crate::config::SortOptions;
use crate::error::{Result, SorterError};
use crate::metadata::extract_timestamp;
use crate::walker::queue::LeafJob;
use chrono::NaiveDateTime;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Marker appended to the sequence number of files without a timestamp
pub const UNDATED_MARKER: char = 'N';

/// A file and its capture time, if known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoEntry {
    /// Source file
    pub path: PathBuf,

    /// Capture timestamp
    pub taken: Option<NaiveDateTime>,
}

impl PhotoEntry {
    /// Create a new entry
    pub fn new(path: impl Into<PathBuf>, taken: Option<NaiveDateTime>) -> Self {
        Self {
            path: path.into(),
            taken,
        }
    }

    /// Whether a timestamp was found
    pub fn is_dated(&self) -> bool {
        self.taken.is_some()
    }
}

/// A copy decided by [`plan_leaf`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCopy {
    /// Source file
    pub source: PathBuf,

    /// File name inside the destination directory
    pub file_name: OsString,

    /// 1-based position in the leaf
    pub sequence: usize,

    /// Whether the source had a timestamp
    pub dated: bool,
}

/// What happened to one leaf
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeafReport {
    /// Leaf directory
    pub leaf: PathBuf,

    /// Destination directory
    pub destination: PathBuf,

    /// Eligible files found
    pub files: usize,

    /// Files with a timestamp
    pub dated: usize,

    /// Files without a timestamp
    pub undated: usize,

    /// Files copied
    pub copied: usize,

    /// Files whose copy failed
    pub failed: usize,

    /// Bytes copied
    pub bytes: u64,
}

/// Number of digits used for sequence numbers in a leaf of `total` files
pub fn sequence_width(total: usize) -> usize {
    total.to_string().len()
}

/// Destination name for the file at `sequence`
pub fn destination_name(source: &Path, sequence: usize, width: usize, dated: bool) -> OsString {
    let mut name = OsString::from(format!("{:0width$}", sequence, width = width));
    if !dated {
        name.push(UNDATED_MARKER.to_string());
    }
    // `foo.` has an empty extension and gets no suffix
    if let Some(ext) = source.extension().filter(|ext| !ext.is_empty()) {
        name.push(".");
        name.push(ext);
    }
    name
}

/// Order entries and assign their destination names
///
/// Dated entries come first, ascending by timestamp with ties kept in input
/// order; undated entries follow in input order.
pub fn plan_leaf(entries: Vec<PhotoEntry>) -> Vec<PlannedCopy> {
    let total = entries.len();
    let width = sequence_width(total);

    let (mut dated, undated): (Vec<_>, Vec<_>) =
        entries.into_iter().partition(PhotoEntry::is_dated);

    // sort_by_key is stable
    dated.sort_by_key(|entry| entry.taken);

    dated
        .into_iter()
        .chain(undated)
        .enumerate()
        .map(|(idx, entry)| {
            let sequence = idx + 1;
            let is_dated = entry.is_dated();
            PlannedCopy {
                file_name: destination_name(&entry.path, sequence, width, is_dated),
                source: entry.path,
                sequence,
                dated: is_dated,
            }
        })
        .collect()
}

/// Files directly inside `leaf` that are not skipped, in listing order
pub fn list_leaf_files(leaf: &Path, options: &SortOptions) -> Result<Vec<PathBuf>> {
    let list_err = |source| SorterError::ListLeaf {
        path: leaf.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(leaf).map_err(list_err)? {
        let path = entry.map_err(list_err)?.path();

        if !path.is_file() {
            continue;
        }

        if options.is_skipped(&path) {
            debug!(path = %path.display(), "Skipping excluded file");
            continue;
        }

        files.push(path);
    }

    Ok(files)
}

/// Where a leaf's files end up
pub fn destination_dir(job: &LeafJob) -> Result<PathBuf> {
    let relative = job
        .leaf
        .strip_prefix(&job.root)
        .map_err(|_| SorterError::LeafOutsideRoot {
            root: job.root.clone(),
            leaf: job.leaf.clone(),
        })?;

    Ok(job.output_root.join(relative))
}

/// Sort and copy one leaf directory, reading timestamps from EXIF
pub fn process_leaf(job: &LeafJob, options: &SortOptions) -> Result<LeafReport> {
    process_leaf_with(job, options, extract_timestamp)
}

/// Sort and copy one leaf directory with a custom timestamp reader
pub fn process_leaf_with<F>(job: &LeafJob, options: &SortOptions, read_timestamp: F) -> Result<LeafReport>
where
    F: Fn(&Path) -> Option<NaiveDateTime>,
{
    let destination = destination_dir(job)?;

    if !options.dry_run {
        fs::create_dir_all(&destination).map_err(|source| SorterError::CreateDestination {
            path: destination.clone(),
            source,
        })?;
    }

    let entries: Vec<PhotoEntry> = list_leaf_files(&job.leaf, options)?
        .into_iter()
        .map(|path| {
            let taken = read_timestamp(&path);
            PhotoEntry { path, taken }
        })
        .collect();

    let plan = plan_leaf(entries);

    let mut report = LeafReport {
        leaf: job.leaf.clone(),
        destination: destination.clone(),
        files: plan.len(),
        ..Default::default()
    };

    for copy in &plan {
        if copy.dated {
            report.dated += 1;
        } else {
            report.undated += 1;
        }

        let target = destination.join(&copy.file_name);

        if options.dry_run {
            info!(
                from = %copy.source.display(),
                to = %target.display(),
                "Would copy"
            );
            continue;
        }

        // fs::copy truncates an existing target
        match fs::copy(&copy.source, &target) {
            Ok(bytes) => {
                report.copied += 1;
                report.bytes += bytes;
            }
            Err(source) => {
                report.failed += 1;
                let err = SorterError::Copy {
                    from: copy.source.clone(),
                    to: target,
                    source,
                };
                warn!("{}", err);
            }
        }
    }

    Ok(report)
}
