//! Error types for the log repository.
//!
//! [`LogError`] covers every failure mode of the segmented log: file system
//! errors, invalid segment transitions, out-of-range ordinals, corrupt
//! index/log pairs and unparsable file names.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur within the log repository.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LogError {
    /// An I/O error occurred while opening, reading, writing or syncing a
    /// segment file. Never retried internally.
    #[error("log I/O error at {}: {source}", .path.display())]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A switch was requested to a segment older than the latest segment
    /// found on disk.
    #[error("cannot switch to segment {requested}: latest segment on disk is {latest}")]
    InvalidSegmentTransition {
        /// The segment that was requested.
        requested: u64,
        /// The latest segment discovered in the base directory.
        latest: u64,
    },

    /// An ordinal or range bound lies outside the records of a segment.
    #[error(
        "records [{from}, {to}] out of range for segment {segment} holding {count} records"
    )]
    OutOfRange {
        /// The segment being read.
        segment: u64,
        /// First requested ordinal.
        from: u64,
        /// Last requested ordinal (inclusive).
        to: u64,
        /// Number of records currently in the segment.
        count: u64,
    },

    /// An index record points outside the bounds of the log file.
    #[error(
        "corrupt segment {segment}: record {ordinal} spans [{offset}, {offset}+{length}) \
         but the log file holds {log_len} bytes"
    )]
    CorruptSegment {
        /// The segment holding the bad record.
        segment: u64,
        /// Ordinal of the bad record.
        ordinal: u64,
        /// Log offset stored in the record.
        offset: u64,
        /// Entry length stored in the record.
        length: u32,
        /// Actual length of the log file.
        log_len: u64,
    },

    /// A file in the base directory does not follow the segment naming
    /// scheme.
    #[error("malformed segment file name: {name}")]
    MalformedSegmentName {
        /// The offending file name.
        name: String,
    },

    /// The segment id cannot be represented with the fixed-width naming
    /// scheme.
    #[error("segment id {segment} exceeds the maximum of {max}")]
    SegmentIdOutOfRange {
        /// The rejected segment id.
        segment: u64,
        /// The largest supported segment id.
        max: u64,
    },

    /// A write operation was attempted before any segment was switched to.
    #[error("no current segment: call switch_to_segment first")]
    NoCurrentSegment,

    /// A payload is too large to be described by an index record.
    #[error("entry of {entry_bytes} bytes exceeds the maximum entry size of {max} bytes")]
    EntryTooLarge {
        /// Size of the rejected payload.
        entry_bytes: usize,
        /// The largest supported payload.
        max: u64,
    },

    /// A configuration document could not be parsed or produced.
    #[error("invalid repository configuration: {message}")]
    Config {
        /// The underlying serde error message.
        message: String,
    },
}

impl LogError {
    /// Wrap an I/O error together with the path it occurred on.
    #[cold]
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LogError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if this error is [`LogError::OutOfRange`].
    #[must_use]
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, LogError::OutOfRange { .. })
    }
}
