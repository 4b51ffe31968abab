//! Range read callbacks.
//!
//! [`LogReader`] is the sink handed to
//! [`LogRepository::read_range`](crate::LogRepository::read_range). The
//! repository calls it once per entry, in strictly increasing ordinal
//! order, with a borrowed view of the entry bytes. The view is only valid
//! for the duration of the call; copy it out if it must outlive it.
//!
//! Any `FnMut(u64, &[u8]) -> ReadControl` closure is a `LogReader`.

/// Returned by a [`LogReader`] to continue or stop a range read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReadControl {
    /// Deliver the next entry.
    #[default]
    Continue,
    /// Stop the traversal after this entry.
    Stop,
}

/// A sink for entries produced by a range read.
pub trait LogReader {
    /// Handle the entry at `ordinal`.
    fn handle(&mut self, ordinal: u64, entry: &[u8]) -> ReadControl;
}

impl<F> LogReader for F
where
    F: FnMut(u64, &[u8]) -> ReadControl,
{
    #[inline]
    fn handle(&mut self, ordinal: u64, entry: &[u8]) -> ReadControl {
        self(ordinal, entry)
    }
}

/// A [`LogReader`] that copies every entry it sees, optionally stopping
/// after `limit` entries.
#[derive(Debug, Clone, Default)]
pub struct CollectingReader {
    entries: Vec<(u64, Vec<u8>)>,
    limit: Option<usize>,
}

impl CollectingReader {
    /// Collect every delivered entry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect at most `limit` entries, then stop the traversal.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: Some(limit),
        }
    }

    /// The collected `(ordinal, bytes)` pairs.
    #[must_use]
    pub fn entries(&self) -> &[(u64, Vec<u8>)] {
        &self.entries
    }

    /// Consume the reader, returning the collected payloads.
    #[must_use]
    pub fn into_payloads(self) -> Vec<Vec<u8>> {
        self.entries.into_iter().map(|(_, bytes)| bytes).collect()
    }
}

impl LogReader for CollectingReader {
    fn handle(&mut self, ordinal: u64, entry: &[u8]) -> ReadControl {
        self.entries.push((ordinal, entry.to_vec()));
        match self.limit {
            Some(limit) if self.entries.len() >= limit => ReadControl::Stop,
            _ => ReadControl::Continue,
        }
    }
}
