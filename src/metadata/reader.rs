//! EXIF reading via kamadak-exif
//!
//! Opens a file, parses its image container and exposes the primary IFD's
//! date-time fields through [`MetadataSource`].

use super::{timestamp_from, MetadataSource, TimestampField};
use crate::error::MetadataError;
use chrono::NaiveDateTime;
use exif::{Exif, In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{trace, warn};

impl MetadataSource for Exif {
    fn field(&self, field: TimestampField) -> Option<String> {
        let tag = match field {
            TimestampField::Digitized => Tag::DateTimeDigitized,
            TimestampField::Modified => Tag::DateTime,
            TimestampField::Original => Tag::DateTimeOriginal,
        };

        let field = self.get_field(tag, In::PRIMARY)?;
        match &field.value {
            Value::Ascii(parts) => {
                let first = parts.first().map(|v| v.as_slice()).unwrap_or_default();
                Some(
                    String::from_utf8_lossy(first)
                        .trim_end_matches('\0')
                        .to_string(),
                )
            }
            // Wrong type; hand back the rendered value so parsing reports it
            other => Some(format!("{:?}", other)),
        }
    }
}

/// Parse the EXIF block of a file
fn open_exif(path: &Path) -> Result<Exif, MetadataError> {
    let file = File::open(path).map_err(|e| MetadataError::Unreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let mut reader = BufReader::new(file);

    match Reader::new().read_from_container(&mut reader) {
        Ok(exif) => Ok(exif),
        Err(exif::Error::NotFound(_)) => Err(MetadataError::NoExif {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(MetadataError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

/// Read the capture timestamp of a file, reporting why it is missing
pub fn read_timestamp(path: &Path) -> Result<NaiveDateTime, MetadataError> {
    let exif = open_exif(path)?;
    timestamp_from(&exif, path)
}

/// Read the capture timestamp of a file
///
/// Never fails: every problem is logged and the file counts as undated.
pub fn extract_timestamp(path: &Path) -> Option<NaiveDateTime> {
    match read_timestamp(path) {
        Ok(ts) => {
            trace!(path = %path.display(), taken = %ts, "Timestamp read");
            Some(ts)
        }
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}
