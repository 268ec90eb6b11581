//! Capture timestamp extraction
//!
//! Reads the EXIF date-time of an image so files can be ordered by when they
//! were taken. Lookups go through the [`MetadataSource`] capability so the
//! field precedence can be exercised without real image files.
//!
//! Precedence: fields are read in [`TimestampField::PRIORITY`] order and the
//! last one present wins, i.e. `DateTimeOriginal` beats `DateTime`, which
//! beats `DateTimeDigitized`.

pub mod reader;

pub use reader::{extract_timestamp, read_timestamp};

use crate::error::MetadataError;
use chrono::NaiveDateTime;
use std::fmt;
use std::path::Path;

/// Textual layout of EXIF date-time values
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// EXIF fields that may carry a capture timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimestampField {
    /// `DateTimeDigitized` (0x9004)
    Digitized,
    /// `DateTime` (0x0132), last modification of the image
    Modified,
    /// `DateTimeOriginal` (0x9003)
    Original,
}

impl TimestampField {
    /// Lookup order; a later field overwrites an earlier one
    pub const PRIORITY: [TimestampField; 3] = [
        TimestampField::Digitized,
        TimestampField::Modified,
        TimestampField::Original,
    ];

    /// EXIF tag name
    pub fn name(self) -> &'static str {
        match self {
            TimestampField::Digitized => "DateTimeDigitized",
            TimestampField::Modified => "DateTime",
            TimestampField::Original => "DateTimeOriginal",
        }
    }
}

impl fmt::Display for TimestampField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Anything that can answer "what is the raw text of field X"
pub trait MetadataSource {
    /// Raw textual value of `field`, or `None` if the field is absent
    fn field(&self, field: TimestampField) -> Option<String>;
}

/// Pick the timestamp field by precedence and parse it
pub fn timestamp_from<S>(source: &S, path: &Path) -> Result<NaiveDateTime, MetadataError>
where
    S: MetadataSource + ?Sized,
{
    let mut raw = None;
    for field in TimestampField::PRIORITY {
        if let Some(value) = source.field(field) {
            raw = Some(value);
        }
    }

    let raw = raw.ok_or_else(|| MetadataError::NoTimestamp {
        path: path.to_path_buf(),
    })?;

    parse_exif_datetime(&raw).ok_or_else(|| MetadataError::BadTimestamp {
        path: path.to_path_buf(),
        value: raw,
    })
}

/// Parse `YYYY:MM:DD HH:MM:SS`
pub fn parse_exif_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, EXIF_DATETIME_FORMAT).ok()
}
