//! Segment file naming.
//!
//! Every segment is stored as two files whose names are the segment id
//! formatted as a zero-padded decimal of [`SEGMENT_ID_WIDTH`] digits:
//!
//! ```text
//! 0000000000000000042.dat         log file (raw payloads)
//! 0000000000000000042.index.dat   index file (12-byte records)
//! ```
//!
//! The fixed width makes lexicographic file-name order identical to
//! numeric segment order, which is what discovery relies on.

use super::error::LogError;

/// The largest segment id that fits the fixed-width naming scheme.
pub const MAX_SEGMENT_ID: u64 = i64::MAX as u64;

/// Number of decimal digits in [`MAX_SEGMENT_ID`].
pub const SEGMENT_ID_WIDTH: usize = 19;

/// Suffix of log files.
pub const LOG_SUFFIX: &str = ".dat";

/// Suffix of index files.
pub const INDEX_SUFFIX: &str = ".index.dat";

/// File name of the log file for `segment`.
///
/// # Examples
///
/// ```
/// use seglog_rs::repository::naming::log_name;
/// assert_eq!(log_name(42), "0000000000000000042.dat");
/// ```
#[must_use]
pub fn log_name(segment: u64) -> String {
    format!("{segment:0width$}{LOG_SUFFIX}", width = SEGMENT_ID_WIDTH)
}

/// File name of the index file for `segment`.
#[must_use]
pub fn index_name(segment: u64) -> String {
    format!("{segment:0width$}{INDEX_SUFFIX}", width = SEGMENT_ID_WIDTH)
}

/// Parse the segment id out of a log or index file name.
///
/// The id is the prefix up to the first `.`.
///
/// # Errors
///
/// Returns [`LogError::MalformedSegmentName`] if the prefix is empty, is not
/// a plain decimal number, or exceeds [`MAX_SEGMENT_ID`].
pub fn segment(file_name: &str) -> Result<u64, LogError> {
    let malformed = || LogError::MalformedSegmentName {
        name: file_name.to_string(),
    };

    let prefix = match file_name.find('.') {
        Some(dot) => &file_name[..dot],
        None => file_name,
    };

    // `u64::from_str` accepts a leading '+', which no segment name carries.
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }

    match prefix.parse::<u64>() {
        Ok(id) if id <= MAX_SEGMENT_ID => Ok(id),
        _ => Err(malformed()),
    }
}

/// Check that `segment` can be named without breaking the sort order.
pub(crate) fn check_segment_id(segment: u64) -> Result<(), LogError> {
    if segment > MAX_SEGMENT_ID {
        return Err(LogError::SegmentIdOutOfRange {
            segment,
            max: MAX_SEGMENT_ID,
        });
    }
    Ok(())
}
