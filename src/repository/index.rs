//! Index record codec.
//!
//! # On-Disk Record Format (big-endian)
//!
//! ```text
//! [8 bytes: log offset][4 bytes: entry length]
//! ```
//!
//! The index file is a dense array of these records with no header, no
//! footer and no checksum. Record `i` lives at byte `i * RECORD_SIZE`.

/// Size of one encoded index record in bytes.
pub const RECORD_SIZE: u64 = 8 + 4;

/// Locates one entry inside a segment's log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexRecord {
    /// Byte offset of the entry in the log file.
    pub offset: u64,
    /// Length of the entry in bytes.
    pub length: u32,
}

impl IndexRecord {
    /// Create a record for an entry of `length` bytes at `offset`.
    #[must_use]
    #[inline]
    pub fn new(offset: u64, length: u32) -> Self {
        Self { offset, length }
    }

    /// Byte offset one past the end of the entry.
    ///
    /// Returns `None` if the record describes a range beyond `u64::MAX`,
    /// which only a corrupt index can produce.
    #[must_use]
    #[inline]
    pub fn end(&self) -> Option<u64> {
        self.offset.checked_add(u64::from(self.length))
    }

    /// Encode into the fixed on-disk representation.
    #[must_use]
    pub fn encode(&self) -> [u8; RECORD_SIZE as usize] {
        let mut buf = [0u8; RECORD_SIZE as usize];
        buf[..8].copy_from_slice(&self.offset.to_be_bytes());
        buf[8..].copy_from_slice(&self.length.to_be_bytes());
        buf
    }

    /// Decode from the fixed on-disk representation.
    #[must_use]
    pub fn decode(buf: &[u8; RECORD_SIZE as usize]) -> Self {
        let mut offset = [0u8; 8];
        let mut length = [0u8; 4];
        offset.copy_from_slice(&buf[..8]);
        length.copy_from_slice(&buf[8..]);
        Self {
            offset: u64::from_be_bytes(offset),
            length: u32::from_be_bytes(length),
        }
    }
}

/// Byte position of the record for `ordinal` in the index file.
#[inline]
pub(crate) fn record_position(ordinal: u64) -> Option<u64> {
    ordinal.checked_mul(RECORD_SIZE)
}

/// Number of complete records in an index file of `index_len` bytes.
#[inline]
pub(crate) fn record_count(index_len: u64) -> u64 {
    index_len / RECORD_SIZE
}
