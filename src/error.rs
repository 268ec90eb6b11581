//! Error types for relabel
//!
//! This module defines the error hierarchy that covers:
//! - Configuration and CLI errors
//! - Worker thread errors
//! - Per-leaf filesystem errors
//! - Metadata diagnostics (never propagated past the metadata reader)
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Errors carry the path they concern
//! - Preserve error chains for debugging

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for relabel
#[derive(Error, Debug)]
pub enum SorterError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// Leaf directory does not live under the source root
    #[error("Leaf '{leaf}' is not inside source root '{root}'")]
    LeafOutsideRoot { root: PathBuf, leaf: PathBuf },

    /// Destination directory could not be created
    #[error("Failed to create destination '{path}': {source}")]
    CreateDestination {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Leaf directory could not be listed
    #[error("Failed to list directory '{path}': {source}")]
    ListLeaf {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A single file copy failed
    #[error("Failed to copy '{from}' to '{to}': {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Invalid queue size
    #[error("Invalid queue size {size}: must be at least {min}")]
    InvalidQueueSize { size: usize, min: usize },

    /// Invalid skip extension
    #[error("Invalid skip extension '{extension}': {reason}")]
    InvalidSkipExtension { extension: String, reason: String },
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker thread could not be started
    #[error("Failed to spawn worker {id}: {reason}")]
    SpawnFailed { id: usize, reason: String },

    /// Worker panicked outside of a job
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Job queue closed while jobs were still being submitted
    #[error("Job queue closed unexpectedly")]
    QueueClosed,
}

/// Reasons a file yielded no capture timestamp
///
/// These only ever become log lines; the metadata reader degrades every one
/// of them to "undated".
#[derive(Error, Debug)]
pub enum MetadataError {
    /// File could not be opened or is not a readable image container
    #[error("Could not examine file '{path}': {reason}")]
    Unreadable { path: PathBuf, reason: String },

    /// Container has no EXIF block
    #[error("No EXIF data in file '{path}'")]
    NoExif { path: PathBuf },

    /// EXIF block has none of the date-time fields
    #[error("No date-time in EXIF data in file '{path}'")]
    NoTimestamp { path: PathBuf },

    /// Date-time field did not match the EXIF format
    #[error("Could not parse date-time '{value}' in file '{path}'")]
    BadTimestamp { path: PathBuf, value: String },
}

/// Result type alias for SorterError
pub type Result<T> = std::result::Result<T, SorterError>;

/// Represents the outcome of processing a single leaf directory
#[derive(Debug)]
pub enum LeafOutcome {
    /// Leaf processed; individual copies may still have failed
    Sorted {
        path: PathBuf,
        files: usize,
        undated: usize,
        failed: usize,
    },

    /// Leaf could not be processed at all
    Failed { path: PathBuf, error: SorterError },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let cfg_err = ConfigError::InvalidQueueSize { size: 0, min: 1 };
        let err: SorterError = cfg_err.into();
        assert!(matches!(err, SorterError::Config(_)));

        let err: SorterError = WorkerError::QueueClosed.into();
        assert!(matches!(err, SorterError::Worker(_)));
    }

    #[test]
    fn test_metadata_error_names_path() {
        let err = MetadataError::BadTimestamp {
            path: PathBuf::from("/photos/a.jpg"),
            value: "2020-01-01".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/photos/a.jpg"));
        assert!(msg.contains("2020-01-01"));
    }
}
