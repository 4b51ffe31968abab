//! Segmented write-ahead log storage.
//!
//! This module provides the on-disk format and the [`LogRepository`]
//! façade that appends, reads and truncates entries.
//!
//! # Types
//!
//! - [`LogRepository`] — segment discovery, switch, append, reads, truncate
//! - [`RepositoryConfig`] / [`FlushMode`] — base directory and durability
//! - [`IndexRecord`] — the 12-byte locator stored per entry
//! - [`LogReader`] / [`ReadControl`] — sinks for streaming range reads
//! - [`LogError`] — error type for every operation
//!
//! # Directory Layout
//!
//! ```text
//! base_dir/
//!   0000000000000000000.dat         payloads of segment 0
//!   0000000000000000000.index.dat   index records of segment 0
//!   0000000000000000001.dat
//!   0000000000000000001.index.dat
//! ```

pub mod config;
pub mod error;
pub mod index;
pub mod log_repository;
pub mod naming;
pub mod reader;
mod segment;

pub use config::{FlushMode, RepositoryConfig};
pub use error::LogError;
pub use index::{IndexRecord, RECORD_SIZE};
pub use log_repository::{FIRST_SEGMENT, LogRepository};
pub use reader::{CollectingReader, LogReader, ReadControl};
