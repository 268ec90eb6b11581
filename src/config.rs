//! Configuration types for relabel
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation
//! - The per-leaf options handed to every worker

use crate::error::ConfigError;
use clap::Parser;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Maximum reasonable worker count
const MAX_WORKERS: usize = 512;

/// Minimum queue size
const MIN_QUEUE_SIZE: usize = 1;

/// Default destination directory
pub const DEFAULT_DESTINATION: &str = "./Sorted";

/// Extensions skipped unless overridden (database/index sidecars)
pub const DEFAULT_SKIP_EXTENSIONS: &[&str] = &["db"];

/// Copy photos into capture-date ordered, sequentially numbered files
#[derive(Parser, Debug, Clone)]
#[command(
    name = "relabel",
    version,
    about = "Small utility for sorting photos by their EXIF date-time",
    long_about = "Walks SOURCE, finds every directory without subdirectories, and copies its files \
                  into the same relative directory under DESTINATION.\n\n\
                  Files are renamed to their position when ordered by EXIF capture time. Files \
                  without a usable date-time follow the dated ones and carry an 'N' marker.",
    after_help = "EXAMPLES:\n    \
        relabel ~/Pictures/Trip\n    \
        relabel ~/Pictures/Trip /mnt/backup/Trip -w 4\n    \
        relabel ./import --skip-ext db --skip-ext xmp --dry-run"
)]
pub struct CliArgs {
    /// Directory to copy files from
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Directory to copy files to
    #[arg(value_name = "DESTINATION", default_value = DEFAULT_DESTINATION)]
    pub destination: PathBuf,

    /// Number of worker threads
    #[arg(
        short = 'w',
        long,
        default_value_t = default_workers(),
        value_name = "NUM"
    )]
    pub workers: usize,

    /// Job queue capacity (defaults to the worker count)
    #[arg(long, value_name = "NUM")]
    pub queue_size: Option<usize>,

    /// Skip files with this extension (can be repeated)
    #[arg(
        long = "skip-ext",
        value_name = "EXT",
        action = clap::ArgAction::Append,
        default_value = "db"
    )]
    pub skip_extensions: Vec<String>,

    /// Show what would be copied without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Quiet mode - suppress header, progress and summary
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

fn default_workers() -> usize {
    // Sorting is dominated by file reads, one worker per core is enough
    num_cpus::get()
}

/// Options every worker applies to each leaf
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortOptions {
    /// Extensions (without the leading dot) whose files are not copied
    pub skip_extensions: BTreeSet<String>,

    /// Plan copies and log them, but touch nothing
    pub dry_run: bool,
}

impl SortOptions {
    /// Options with the default skip list
    pub fn with_defaults() -> Self {
        Self {
            skip_extensions: DEFAULT_SKIP_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            dry_run: false,
        }
    }

    /// Check whether a file should be left out of the leaf
    pub fn is_skipped(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.skip_extensions.contains(ext))
            .unwrap_or(false)
    }
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct SortConfig {
    /// Source root
    pub source: PathBuf,

    /// Destination root
    pub destination: PathBuf,

    /// Number of worker threads
    pub worker_count: usize,

    /// Job queue capacity
    pub queue_size: usize,

    /// Extensions to skip, normalised without leading dot
    pub skip_extensions: BTreeSet<String>,

    /// Dry run
    pub dry_run: bool,

    /// Show header, spinner and summary
    pub show_progress: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl SortConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        // Validate worker count
        if args.workers == 0 || args.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: args.workers,
                max: MAX_WORKERS,
            });
        }

        // Queue capacity tracks the pool size unless set explicitly
        let queue_size = args.queue_size.unwrap_or(args.workers);
        if queue_size < MIN_QUEUE_SIZE {
            return Err(ConfigError::InvalidQueueSize {
                size: queue_size,
                min: MIN_QUEUE_SIZE,
            });
        }

        let skip_extensions = args
            .skip_extensions
            .iter()
            .map(|ext| normalize_extension(ext))
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(Self {
            source: args.source,
            destination: args.destination,
            worker_count: args.workers,
            queue_size,
            skip_extensions,
            dry_run: args.dry_run,
            show_progress: !args.quiet,
            verbose: args.verbose,
        })
    }

    /// Build a config for library use with default pool sizing
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        let worker_count = default_workers().max(1);
        Self {
            source: source.into(),
            destination: destination.into(),
            worker_count,
            queue_size: worker_count,
            skip_extensions: SortOptions::with_defaults().skip_extensions,
            dry_run: false,
            show_progress: false,
            verbose: false,
        }
    }

    /// Whether the source root exists and is a directory
    pub fn source_is_dir(&self) -> bool {
        self.source.is_dir()
    }

    /// Options handed to each worker
    pub fn sort_options(&self) -> SortOptions {
        SortOptions {
            skip_extensions: self.skip_extensions.clone(),
            dry_run: self.dry_run,
        }
    }
}

/// Strip a leading dot and reject values that can never match an extension
fn normalize_extension(raw: &str) -> Result<String, ConfigError> {
    let ext = raw.trim().trim_start_matches('.');

    if ext.is_empty() {
        return Err(ConfigError::InvalidSkipExtension {
            extension: raw.to_string(),
            reason: "extension is empty".into(),
        });
    }

    if ext.contains(['/', '\\', '.']) {
        return Err(ConfigError::InvalidSkipExtension {
            extension: raw.to_string(),
            reason: "must be a single extension such as 'db'".into(),
        });
    }

    Ok(ext.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("relabel").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_defaults() {
        let args = parse(&["photos"]);
        assert_eq!(args.source, PathBuf::from("photos"));
        assert_eq!(args.destination, PathBuf::from(DEFAULT_DESTINATION));
        assert_eq!(args.skip_extensions, vec!["db".to_string()]);
        assert!(args.queue_size.is_none());
        assert!(!args.dry_run);
    }

    #[test]
    fn test_cli_source_required() {
        assert!(CliArgs::try_parse_from(["relabel"]).is_err());
    }

    #[test]
    fn test_queue_size_follows_workers() {
        let config = SortConfig::from_args(parse(&["photos", "out", "-w", "3"])).unwrap();
        assert_eq!(config.worker_count, 3);
        assert_eq!(config.queue_size, 3);
        assert_eq!(config.destination, PathBuf::from("out"));

        let config =
            SortConfig::from_args(parse(&["photos", "-w", "3", "--queue-size", "10"])).unwrap();
        assert_eq!(config.queue_size, 10);
    }

    #[test]
    fn test_invalid_worker_count() {
        let err = SortConfig::from_args(parse(&["photos", "-w", "0"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWorkerCount { count: 0, .. }));

        let err = SortConfig::from_args(parse(&["photos", "-w", "10000"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWorkerCount { .. }));
    }

    #[test]
    fn test_invalid_queue_size() {
        let err = SortConfig::from_args(parse(&["photos", "--queue-size", "0"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidQueueSize { size: 0, .. }));
    }

    #[test]
    fn test_skip_extensions_normalized() {
        let config =
            SortConfig::from_args(parse(&["photos", "--skip-ext", ".XMP", "--skip-ext", "db"]))
                .unwrap();
        assert!(config.skip_extensions.contains("XMP"));
        assert!(config.skip_extensions.contains("db"));

        let err = SortConfig::from_args(parse(&["photos", "--skip-ext", "."])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSkipExtension { .. }));

        let err = SortConfig::from_args(parse(&["photos", "--skip-ext", "tar.gz"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSkipExtension { .. }));
    }

    #[test]
    fn test_is_skipped() {
        let options = SortOptions::with_defaults();
        assert!(options.is_skipped(Path::new("/a/Thumbs.db")));
        assert!(!options.is_skipped(Path::new("/a/photo.jpg")));
        assert!(!options.is_skipped(Path::new("/a/README")));
        assert!(!options.is_skipped(Path::new("/a/db")));
    }
}
