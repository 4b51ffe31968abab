//! # Segmented Write-Ahead Log Repository
//!
//! A small, durable, append-only log storage engine. Entries are opaque
//! byte strings stored in numbered segments; each segment is a log file of
//! raw payloads paired with an index file of fixed-size locators, which
//! gives O(1) lookup of any entry by its ordinal.
//!
//! ## Key Features
//!
//! - **Positional Lookup**: Every entry is addressed by `(segment, ordinal)`
//!   and located with a single 12-byte index read.
//!
//! - **Configurable Durability**: `FlushMode::SyncEveryAppend` (default)
//!   forces the payload and then its index record to disk before `append`
//!   returns; `FlushMode::Buffered` leaves flushing to the caller.
//!
//! - **Streaming Range Reads**: Range reads hand entries to a caller-supplied
//!   [`LogReader`] one at a time, so segments larger than memory can be
//!   replayed. The reader can stop the traversal early.
//!
//! - **Tail Truncation**: `truncate` discards every entry from a given
//!   ordinal onwards, which is what a consensus follower needs when its log
//!   diverges from a new leader's.
//!
//! - **Crash Consistency**: Write cursors are always derived from the actual
//!   file lengths when a segment is opened, so a half-finished append never
//!   corrupts entries written afterwards.
//!
//! - **Lock-Free Readers**: All file access uses explicit offsets; there is no
//!   shared file cursor. Any number of threads can read through a shared
//!   reference while a single owner appends.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use seglog_rs::prelude::*;
//!
//! # fn example() -> Result<(), LogError> {
//! let config = RepositoryConfig::new("/var/lib/node/wal")
//!     .with_flush_mode(FlushMode::SyncEveryAppend);
//! let mut repo = LogRepository::with_config(config)?;
//!
//! let segment = repo.latest_segment()?.unwrap_or(FIRST_SEGMENT);
//! repo.switch_to_segment(segment)?;
//!
//! repo.append(b"a")?;
//! repo.append(b"bb")?;
//! repo.append(b"ccc")?;
//!
//! repo.read_range(segment, 0, None, &mut |ordinal: u64, entry: &[u8]| {
//!     println!("{ordinal}: {} bytes", entry.len());
//!     ReadControl::Continue
//! })?;
//!
//! // A new leader disagrees from ordinal 1 onwards.
//! repo.truncate(segment, 1)?;
//! assert_eq!(repo.total_records(segment)?, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## On-Disk Format
//!
//! | File | Name | Content |
//! |------|------|---------|
//! | Log | `{segment:019}.dat` | payloads back to back, no framing |
//! | Index | `{segment:019}.index.dat` | `[u64 offset][u32 length]` big-endian per entry |
//!
//! The 19-digit zero padding makes lexicographic file order equal numeric
//! segment order, so discovery only has to find the greatest file name.
//!
//! ## Scope
//!
//! Segment ids are assigned by the caller, typically a consensus layer that
//! rolls to a new segment on its own size or time policy. The repository
//! never deletes, compacts, checksums or encrypts segments.

pub mod prelude;
pub mod repository;

pub use repository::{
    CollectingReader, FIRST_SEGMENT, FlushMode, IndexRecord, LogError, LogReader, LogRepository,
    RECORD_SIZE, ReadControl, RepositoryConfig,
};
