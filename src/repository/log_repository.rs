//! The segmented log repository.
//!
//! [`LogRepository`] stores ordered, opaque entries in segments. Each
//! segment is a pair of files in the base directory:
//!
//! - a **log file** holding the raw payloads back to back, and
//! - an **index file** holding one 12-byte [`IndexRecord`] per entry.
//!
//! Entries are addressed by `(segment, ordinal)` where the ordinal is the
//! 0-based position inside the segment.
//!
//! # Append Protocol
//!
//! 1. Build the record `(next_log_offset, payload.len())`.
//! 2. Write the payload at `next_log_offset` in the log file.
//! 3. Write the record at `next_index_offset` in the index file.
//! 4. Advance both cursors and the entry count.
//!
//! With [`FlushMode::SyncEveryAppend`] the log file is synced between
//! steps 2 and 3 and the index file after step 3, so an index record is
//! never durable before its payload.
//!
//! # Thread Safety
//!
//! Mutating operations (`switch_to_segment`, `append`, `truncate`,
//! `close`) take `&mut self`: there is exactly one writer. Reads take
//! `&self` and use positional I/O only, so a repository shared behind a
//! reference (or an `RwLock`) can serve concurrent readers.

use super::config::{FlushMode, RepositoryConfig};
use super::error::LogError;
use super::index::{IndexRecord, RECORD_SIZE};
use super::naming::{self, check_segment_id, index_name};
use super::reader::{LogReader, ReadControl};
use super::segment::{ActiveSegment, OpenMode, SegmentFiles};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info, trace};

/// The first segment id handed out by a fresh log.
pub const FIRST_SEGMENT: u64 = 0;

/// Number of index records fetched per positional read during range reads.
const RANGE_BATCH_RECORDS: u64 = 256;

/// A segmented, append-only write-ahead log over one base directory.
///
/// # Example
///
/// ```rust,no_run
/// use seglog_rs::{FIRST_SEGMENT, LogRepository};
///
/// # fn example() -> Result<(), seglog_rs::LogError> {
/// let mut repo = LogRepository::open("/tmp/wal")?;
/// let segment = repo.latest_segment()?.unwrap_or(FIRST_SEGMENT);
/// repo.switch_to_segment(segment)?;
///
/// let ordinal = repo.append(b"hello")?;
/// assert_eq!(repo.read(segment, ordinal)?, b"hello");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct LogRepository {
    config: RepositoryConfig,
    active: Option<ActiveSegment>,
}

impl LogRepository {
    /// Open a repository over `base_dir` with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Io`] if the directory cannot be created.
    pub fn open<P: AsRef<Path>>(base_dir: P) -> Result<Self, LogError> {
        Self::with_config(RepositoryConfig::new(base_dir))
    }

    /// Open a repository with an explicit configuration.
    ///
    /// The base directory is created if it does not exist. No segment is
    /// current until [`switch_to_segment`](Self::switch_to_segment) is
    /// called.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Io`] if the directory cannot be created.
    pub fn with_config(config: RepositoryConfig) -> Result<Self, LogError> {
        fs::create_dir_all(&config.base_dir).map_err(|e| LogError::io(&config.base_dir, e))?;
        info!(
            base_dir = %config.base_dir.display(),
            flush_mode = %config.flush_mode,
            "log repository opened"
        );
        Ok(Self {
            config,
            active: None,
        })
    }

    /// The directory holding the segment files.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.config.base_dir
    }

    /// The durability policy applied to appends.
    #[must_use]
    pub fn flush_mode(&self) -> FlushMode {
        self.config.flush_mode
    }

    /// The segment appends currently go to, if any.
    #[must_use]
    pub fn current_segment(&self) -> Option<u64> {
        self.active.as_ref().map(|a| a.files.segment())
    }

    /// The ordinal the next append will receive, if a segment is current.
    #[must_use]
    pub fn next_ordinal(&self) -> Option<u64> {
        self.active.as_ref().map(|a| a.count)
    }

    /// The id of the newest segment on disk, or `None` for an empty
    /// directory.
    ///
    /// Picks the lexicographically greatest regular file name, which the
    /// fixed-width naming scheme makes the numerically greatest segment.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Io`] if the directory cannot be listed and
    /// [`LogError::MalformedSegmentName`] if the greatest name is not a
    /// segment file.
    pub fn latest_segment(&self) -> Result<Option<u64>, LogError> {
        let latest = self.file_names()?.into_iter().max();
        latest.map(|name| naming::segment(&name)).transpose()
    }

    /// Every segment id with at least one file on disk, ascending.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Io`] if the directory cannot be listed and
    /// [`LogError::MalformedSegmentName`] for any file outside the naming
    /// scheme.
    pub fn segments(&self) -> Result<Vec<u64>, LogError> {
        let mut segments = self
            .file_names()?
            .iter()
            .map(|name| naming::segment(name))
            .collect::<Result<Vec<_>, _>>()?;
        segments.sort_unstable();
        segments.dedup();
        Ok(segments)
    }

    /// Names of all regular files in the base directory.
    fn file_names(&self) -> Result<Vec<String>, LogError> {
        let dir = &self.config.base_dir;
        let entries = fs::read_dir(dir).map_err(|e| LogError::io(dir, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| LogError::io(dir, e))?;
            let file_type = entry.file_type().map_err(|e| LogError::io(entry.path(), e))?;
            if !file_type.is_file() {
                continue;
            }
            let name = entry
                .file_name()
                .into_string()
                .map_err(|raw| LogError::MalformedSegmentName {
                    name: raw.to_string_lossy().into_owned(),
                })?;
            names.push(name);
        }
        Ok(names)
    }

    /// Make `segment` the current segment, creating its files if needed.
    ///
    /// The previous segment is sealed (synced when running
    /// [`FlushMode::Buffered`]) and its handles closed. Cursors and the
    /// entry count of the new segment are always derived from the actual
    /// file lengths, never from cached state, so switching to the segment
    /// that is already current is the way to resynchronize after a failed
    /// append.
    ///
    /// # Errors
    ///
    /// - [`LogError::InvalidSegmentTransition`] if `segment` is older than
    ///   the latest segment on disk.
    /// - [`LogError::SegmentIdOutOfRange`] if `segment` cannot be named.
    /// - [`LogError::Io`] if sealing the old segment or opening the new one
    ///   fails. The previous segment stays current in that case.
    pub fn switch_to_segment(&mut self, segment: u64) -> Result<(), LogError> {
        check_segment_id(segment)?;
        if let Some(latest) = self.latest_segment()?
            && segment < latest
        {
            return Err(LogError::InvalidSegmentTransition {
                requested: segment,
                latest,
            });
        }

        if let Some(previous) = &self.active
            && !self.config.flush_mode.syncs_every_append()
        {
            previous.files.sync_all()?;
        }

        let files = SegmentFiles::open(&self.config.base_dir, segment, OpenMode::Create)?;
        let active = ActiveSegment::from_files(files)?;
        let previous = self.current_segment();
        info!(
            segment,
            ?previous,
            records = active.count,
            log_bytes = active.next_log_offset,
            "switched to segment"
        );
        self.active = Some(active);
        Ok(())
    }

    /// Append `payload` to the current segment and return its ordinal.
    ///
    /// # Errors
    ///
    /// - [`LogError::NoCurrentSegment`] if no segment was switched to.
    /// - [`LogError::EntryTooLarge`] if the payload exceeds `u32::MAX`
    ///   bytes.
    /// - [`LogError::Io`] if a write or sync fails. The files may then
    ///   hold a payload without its record; treat the append as failed and
    ///   switch to the segment again before the next append.
    pub fn append(&mut self, payload: &[u8]) -> Result<u64, LogError> {
        let sync = self.config.flush_mode.syncs_every_append();
        let active = self.active.as_mut().ok_or(LogError::NoCurrentSegment)?;

        let length = u32::try_from(payload.len()).map_err(|_| LogError::EntryTooLarge {
            entry_bytes: payload.len(),
            max: u64::from(u32::MAX),
        })?;
        let record = IndexRecord::new(active.next_log_offset, length);

        active.files.write_payload(payload, record.offset)?;
        if sync {
            active.files.sync_log()?;
        }
        active
            .files
            .write_record(record, active.next_index_offset)?;
        if sync {
            active.files.sync_index()?;
        }

        let ordinal = active.count;
        active.next_log_offset += u64::from(length);
        active.next_index_offset += RECORD_SIZE;
        active.count += 1;

        #[cfg(feature = "metrics")]
        {
            metrics::counter!("seglog_appends_total").increment(1);
            metrics::counter!("seglog_appended_bytes_total").increment(u64::from(length));
        }

        trace!(
            segment = active.files.segment(),
            ordinal,
            offset = record.offset,
            length,
            "entry appended"
        );
        Ok(ordinal)
    }

    /// Force both files of the current segment to stable storage.
    ///
    /// This is the checkpoint primitive for [`FlushMode::Buffered`]; with
    /// [`FlushMode::SyncEveryAppend`] it is redundant but harmless.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::NoCurrentSegment`] if no segment is current and
    /// [`LogError::Io`] if a sync fails.
    pub fn sync(&self) -> Result<(), LogError> {
        let active = self.active.as_ref().ok_or(LogError::NoCurrentSegment)?;
        active.files.sync_all()
    }

    /// Seal and release the current segment.
    ///
    /// Does nothing when no segment is current.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Io`] if the final sync fails; the handles are
    /// released regardless.
    pub fn close(&mut self) -> Result<(), LogError> {
        if let Some(active) = self.active.take() {
            if !self.config.flush_mode.syncs_every_append() {
                active.files.sync_all()?;
            }
            info!(
                segment = active.files.segment(),
                records = active.count,
                "segment closed"
            );
        }
        Ok(())
    }

    /// Read the entry at `ordinal` in `segment`.
    ///
    /// # Errors
    ///
    /// - [`LogError::OutOfRange`] if the segment has no such entry.
    /// - [`LogError::CorruptSegment`] if the record points past the end of
    ///   the log file.
    /// - [`LogError::Io`] if a non-current segment's files cannot be
    ///   opened or read.
    pub fn read(&self, segment: u64, ordinal: u64) -> Result<Vec<u8>, LogError> {
        let mut buf = Vec::new();
        self.read_into(segment, ordinal, &mut buf)?;
        Ok(buf)
    }

    /// Read the entry at `ordinal` in `segment` into `buf`, replacing its
    /// contents. Lets hot loops reuse one allocation.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read).
    pub fn read_into(&self, segment: u64, ordinal: u64, buf: &mut Vec<u8>) -> Result<(), LogError> {
        self.with_files(segment, |files, count| {
            let record = files.read_record(ordinal, count)?;
            let log_len = files.log_len()?;
            files.read_entry(ordinal, record, log_len, buf)
        })
    }

    /// Stream entries `from..=to` of `segment` into `reader`.
    ///
    /// With `to == None` the range runs to the last entry of the segment.
    /// Entries are delivered one at a time in increasing ordinal order; the
    /// reader may return [`ReadControl::Stop`] to end the traversal early.
    /// Returns the number of entries delivered.
    ///
    /// # Errors
    ///
    /// - [`LogError::OutOfRange`] if `from > to` or either bound lies
    ///   outside `[0, count)`.
    /// - [`LogError::CorruptSegment`] / [`LogError::Io`] as for
    ///   [`read`](Self::read). Entries delivered before the failure stay
    ///   delivered.
    pub fn read_range<R>(
        &self,
        segment: u64,
        from: u64,
        to: Option<u64>,
        reader: &mut R,
    ) -> Result<u64, LogError>
    where
        R: LogReader + ?Sized,
    {
        self.with_files(segment, |files, count| {
            let to = to.unwrap_or_else(|| count.saturating_sub(1));
            if from > to || to >= count {
                return Err(LogError::OutOfRange {
                    segment,
                    from,
                    to,
                    count,
                });
            }

            let log_len = files.log_len()?;
            let mut scratch = Vec::new();
            let mut records = Vec::new();
            let mut payload = Vec::new();
            let mut delivered = 0u64;
            let mut batch_start = from;

            while batch_start <= to {
                let batch_len = (to - batch_start + 1).min(RANGE_BATCH_RECORDS);
                files.read_records(batch_start, batch_len, count, &mut scratch, &mut records)?;

                for (ordinal, record) in (batch_start..).zip(records.iter().copied()) {
                    files.read_entry(ordinal, record, log_len, &mut payload)?;
                    delivered += 1;
                    if reader.handle(ordinal, &payload) == ReadControl::Stop {
                        debug!(segment, ordinal, delivered, "range read stopped by reader");
                        return Ok(delivered);
                    }
                }
                batch_start += batch_len;
            }
            Ok(delivered)
        })
    }

    /// Stream every entry of `segment` from `from` to the end into
    /// `reader`.
    ///
    /// # Errors
    ///
    /// Same as [`read_range`](Self::read_range).
    pub fn read_from<R>(&self, segment: u64, from: u64, reader: &mut R) -> Result<u64, LogError>
    where
        R: LogReader + ?Sized,
    {
        self.read_range(segment, from, None, reader)
    }

    /// Number of entries in `segment`.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Io`] if a non-current segment's index file
    /// cannot be opened.
    pub fn total_records(&self, segment: u64) -> Result<u64, LogError> {
        self.with_files(segment, |_, count| Ok(count))
    }

    /// Run `f` against the files of `segment` and its record count.
    ///
    /// Uses the current segment's handles when possible; otherwise opens
    /// read-only handles that are dropped before returning.
    fn with_files<T, F>(&self, segment: u64, f: F) -> Result<T, LogError>
    where
        F: FnOnce(&SegmentFiles, u64) -> Result<T, LogError>,
    {
        if let Some(active) = self
            .active
            .as_ref()
            .filter(|a| a.files.segment() == segment)
        {
            return f(&active.files, active.count);
        }

        check_segment_id(segment)?;
        let files = SegmentFiles::open(&self.config.base_dir, segment, OpenMode::Read)?;
        let count = files.record_count()?;
        debug!(segment, count, "opened transient segment handles");
        f(&files, count)
    }

    /// Remove every entry of `segment` at or after `from_ordinal`.
    ///
    /// Meant for a consensus follower discarding a divergent tail. Entries
    /// before `from_ordinal` are untouched. Doing nothing is not an error:
    /// a segment without an index file, or a `from_ordinal` at or past the
    /// end, is left as it is. When `segment` is current, its cursors are
    /// re-derived from the shrunk files before this returns.
    ///
    /// # Errors
    ///
    /// - [`LogError::Io`] if the files cannot be opened, resized or synced.
    /// - [`LogError::SegmentIdOutOfRange`] if `segment` cannot be named.
    pub fn truncate(&mut self, segment: u64, from_ordinal: u64) -> Result<(), LogError> {
        check_segment_id(segment)?;

        let truncated = match self.active.as_mut() {
            Some(active) if active.files.segment() == segment => {
                // Cursors must follow the files even when the resize failed
                // half way.
                let truncated = active.files.truncate_from(from_ordinal);
                let realigned = active.realign();
                let truncated = truncated?;
                realigned?;
                truncated
            }
            _ => {
                let index_path = self.config.base_dir.join(index_name(segment));
                match fs::metadata(&index_path) {
                    Ok(_) => {}
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {
                        debug!(segment, "no index file; nothing to truncate");
                        return Ok(());
                    }
                    Err(e) => return Err(LogError::io(index_path, e)),
                }
                let files = SegmentFiles::open(&self.config.base_dir, segment, OpenMode::Write)?;
                files.truncate_from(from_ordinal)?
            }
        };

        if truncated {
            #[cfg(feature = "metrics")]
            metrics::counter!("seglog_truncations_total").increment(1);
            info!(segment, from_ordinal, "segment truncated");
        } else {
            debug!(segment, from_ordinal, "truncate past end; nothing removed");
        }
        Ok(())
    }
}
