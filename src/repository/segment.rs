//! Segment handles.
//!
//! A [`SegmentFiles`] owns the open log and index files of one segment.
//! Every access goes through explicit positional reads and writes, so a
//! handle can be shared by concurrent readers without any hidden file
//! cursor. [`ActiveSegment`] adds the write cursors of the segment the
//! repository is currently appending to.

use super::error::LogError;
use super::index::{IndexRecord, RECORD_SIZE, record_count, record_position};
use super::naming::{index_name, log_name};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The open log and index files of one segment.
#[derive(Debug)]
pub(crate) struct SegmentFiles {
    segment: u64,
    log: File,
    index: File,
    log_path: PathBuf,
    index_path: PathBuf,
}

/// How [`SegmentFiles::open`] should open the files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OpenMode {
    /// Read-only; both files must exist.
    Read,
    /// Read-write; both files must exist.
    Write,
    /// Read-write; missing files are created.
    Create,
}

impl SegmentFiles {
    /// Open the two files of `segment` inside `dir`.
    pub(crate) fn open(dir: &Path, segment: u64, mode: OpenMode) -> Result<Self, LogError> {
        let log_path = dir.join(log_name(segment));
        let index_path = dir.join(index_name(segment));
        // Log first: an index file is never created without its log.
        let log = open_file(&log_path, mode)?;
        let index = open_file(&index_path, mode)?;
        Ok(Self {
            segment,
            log,
            index,
            log_path,
            index_path,
        })
    }

    /// Open `segment` with a read-only log handle and a writable index, so
    /// any resize of the log fails after the index has been changed.
    #[cfg(test)]
    pub(crate) fn open_with_read_only_log(dir: &Path, segment: u64) -> Result<Self, LogError> {
        let log_path = dir.join(log_name(segment));
        let index_path = dir.join(index_name(segment));
        let log = open_file(&log_path, OpenMode::Read)?;
        let index = open_file(&index_path, OpenMode::Write)?;
        Ok(Self {
            segment,
            log,
            index,
            log_path,
            index_path,
        })
    }

    #[inline]
    pub(crate) fn segment(&self) -> u64 {
        self.segment
    }

    pub(crate) fn log_len(&self) -> Result<u64, LogError> {
        file_len(&self.log, &self.log_path)
    }

    pub(crate) fn index_len(&self) -> Result<u64, LogError> {
        file_len(&self.index, &self.index_path)
    }

    /// Number of complete records in the index file.
    pub(crate) fn record_count(&self) -> Result<u64, LogError> {
        Ok(record_count(self.index_len()?))
    }

    /// Read the index record for `ordinal`, given the current `count`.
    pub(crate) fn read_record(&self, ordinal: u64, count: u64) -> Result<IndexRecord, LogError> {
        let out_of_range = || LogError::OutOfRange {
            segment: self.segment,
            from: ordinal,
            to: ordinal,
            count,
        };
        if ordinal >= count {
            return Err(out_of_range());
        }
        let position = record_position(ordinal).ok_or_else(out_of_range)?;

        let mut buf = [0u8; RECORD_SIZE as usize];
        match read_exact_at(&self.index, &mut buf, position) {
            Ok(()) => Ok(IndexRecord::decode(&buf)),
            // The index shrank underneath us.
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(out_of_range()),
            Err(e) => Err(LogError::io(&self.index_path, e)),
        }
    }

    /// Read `len` consecutive index records starting at `from` into `out`,
    /// replacing its contents. The caller has already bounds-checked the
    /// range against the record count.
    pub(crate) fn read_records(
        &self,
        from: u64,
        len: u64,
        count: u64,
        scratch: &mut Vec<u8>,
        out: &mut Vec<IndexRecord>,
    ) -> Result<(), LogError> {
        out.clear();
        let out_of_range = || LogError::OutOfRange {
            segment: self.segment,
            from,
            to: from.saturating_add(len).saturating_sub(1),
            count,
        };
        let position = record_position(from).ok_or_else(out_of_range)?;
        let bytes = record_position(len).ok_or_else(out_of_range)? as usize;

        scratch.clear();
        scratch.resize(bytes, 0);
        match read_exact_at(&self.index, scratch, position) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Err(out_of_range()),
            Err(e) => return Err(LogError::io(&self.index_path, e)),
        }

        out.extend(scratch.chunks_exact(RECORD_SIZE as usize).map(|chunk| {
            let mut raw = [0u8; RECORD_SIZE as usize];
            raw.copy_from_slice(chunk);
            IndexRecord::decode(&raw)
        }));
        Ok(())
    }

    /// Read the payload described by `record` into `buf`, replacing its
    /// contents. `log_len` is the log length observed by the caller; a
    /// record reaching past it is reported as corrupt before anything is
    /// allocated.
    pub(crate) fn read_entry(
        &self,
        ordinal: u64,
        record: IndexRecord,
        log_len: u64,
        buf: &mut Vec<u8>,
    ) -> Result<(), LogError> {
        buf.clear();
        let corrupt = |log_len: u64| LogError::CorruptSegment {
            segment: self.segment,
            ordinal,
            offset: record.offset,
            length: record.length,
            log_len,
        };
        match record.end() {
            Some(end) if end <= log_len => {}
            _ => return Err(corrupt(log_len)),
        }

        buf.resize(record.length as usize, 0);
        match read_exact_at(&self.log, buf, record.offset) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                buf.clear();
                Err(corrupt(self.log_len()?))
            }
            Err(e) => Err(LogError::io(&self.log_path, e)),
        }
    }

    pub(crate) fn write_payload(&self, payload: &[u8], offset: u64) -> Result<(), LogError> {
        write_all_at(&self.log, payload, offset).map_err(|e| LogError::io(&self.log_path, e))
    }

    pub(crate) fn write_record(&self, record: IndexRecord, position: u64) -> Result<(), LogError> {
        write_all_at(&self.index, &record.encode(), position)
            .map_err(|e| LogError::io(&self.index_path, e))
    }

    pub(crate) fn sync_log(&self) -> Result<(), LogError> {
        self.log
            .sync_data()
            .map_err(|e| LogError::io(&self.log_path, e))
    }

    pub(crate) fn sync_index(&self) -> Result<(), LogError> {
        self.index
            .sync_data()
            .map_err(|e| LogError::io(&self.index_path, e))
    }

    /// Sync the log before the index so no durable record outlives its
    /// payload.
    pub(crate) fn sync_all(&self) -> Result<(), LogError> {
        self.sync_log()?;
        self.sync_index()
    }

    /// Drop every entry at or after `from_ordinal`.
    ///
    /// Returns `false` when nothing had to be removed.
    pub(crate) fn truncate_from(&self, from_ordinal: u64) -> Result<bool, LogError> {
        let count = self.record_count()?;
        if from_ordinal >= count {
            return Ok(false);
        }
        let record = self.read_record(from_ordinal, count)?;
        let index_len = from_ordinal * RECORD_SIZE;
        let log_len = self.log_len()?;
        if record.offset > log_len {
            warn!(
                segment = self.segment,
                ordinal = from_ordinal,
                offset = record.offset,
                log_len,
                "truncation point lies past the end of the log; log left at its length"
            );
        }

        // Index first: a record must never point past the end of the log.
        self.index
            .set_len(index_len)
            .map_err(|e| LogError::io(&self.index_path, e))?;
        self.sync_index()?;
        // Never grow the log.
        self.log
            .set_len(record.offset.min(log_len))
            .map_err(|e| LogError::io(&self.log_path, e))?;
        self.sync_log()?;
        Ok(true)
    }
}

/// The segment the repository appends to, with its cached write cursors.
#[derive(Debug)]
pub(crate) struct ActiveSegment {
    pub(crate) files: SegmentFiles,
    pub(crate) next_log_offset: u64,
    pub(crate) next_index_offset: u64,
    pub(crate) count: u64,
}

impl ActiveSegment {
    /// Wrap `files`, deriving every cursor from the actual file lengths.
    pub(crate) fn from_files(files: SegmentFiles) -> Result<Self, LogError> {
        let mut active = Self {
            files,
            next_log_offset: 0,
            next_index_offset: 0,
            count: 0,
        };
        active.realign()?;
        Ok(active)
    }

    /// Re-derive the cursors from the file lengths.
    ///
    /// A torn trailing index record (from a crash mid-write) is not
    /// counted; the index cursor is aligned down so the next append
    /// overwrites it.
    pub(crate) fn realign(&mut self) -> Result<(), LogError> {
        let log_len = self.files.log_len()?;
        let index_len = self.files.index_len()?;
        let count = record_count(index_len);
        let aligned = count * RECORD_SIZE;

        if aligned != index_len {
            warn!(
                segment = self.files.segment(),
                index_len,
                torn_bytes = index_len - aligned,
                "index file ends with a partial record; ignoring it"
            );
        }

        self.next_log_offset = log_len;
        self.next_index_offset = aligned;
        self.count = count;
        debug!(
            segment = self.files.segment(),
            next_log_offset = log_len,
            next_index_offset = aligned,
            count,
            "segment cursors realigned"
        );
        Ok(())
    }
}

fn open_file(path: &Path, mode: OpenMode) -> Result<File, LogError> {
    let mut options = OpenOptions::new();
    options.read(true);
    match mode {
        OpenMode::Read => {}
        OpenMode::Write => {
            options.write(true);
        }
        OpenMode::Create => {
            options.write(true).create(true).truncate(false);
        }
    }
    options.open(path).map_err(|e| LogError::io(path, e))
}

fn file_len(file: &File, path: &Path) -> Result<u64, LogError> {
    file.metadata()
        .map(|m| m.len())
        .map_err(|e| LogError::io(path, e))
}

#[cfg(unix)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

#[cfg(unix)]
fn write_all_at(file: &File, buf: &[u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.write_all_at(buf, offset)
}

#[cfg(windows)]
fn read_exact_at(file: &File, mut buf: &mut [u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_read(buf, offset) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "failed to fill whole buffer",
                ));
            }
            Ok(n) => {
                buf = &mut buf[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

#[cfg(windows)]
fn write_all_at(file: &File, mut buf: &[u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_write(buf, offset) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "failed to write whole buffer",
                ));
            }
            Ok(n) => {
                buf = &buf[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
