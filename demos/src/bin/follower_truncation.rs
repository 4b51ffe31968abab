//! A follower discards its uncommitted tail when a new leader's log
//! disagrees, then appends the leader's entries in its place.

use seglog_rs::prelude::*;
use std::error::Error;
use tracing::{info, warn};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt().init();

    let dir = tempfile::tempdir()?;
    let mut follower = LogRepository::open(dir.path())?;
    follower.switch_to_segment(FIRST_SEGMENT)?;

    // Entries 0..=2 are committed; 3 and 4 came from a deposed leader.
    for entry in ["term1:set x", "term1:set y", "term1:del x", "term2:set z", "term2:set w"] {
        follower.append(entry.as_bytes())?;
    }
    info!("Follower holds {} entries", follower.total_records(FIRST_SEGMENT)?);

    let leader = ["term1:set x", "term1:set y", "term1:del x", "term3:inc y"];
    let conflict = (0..leader.len() as u64).find(|&ordinal| {
        follower
            .read(FIRST_SEGMENT, ordinal)
            .map(|entry| entry != leader[ordinal as usize].as_bytes())
            .unwrap_or(true)
    });

    if let Some(from) = conflict {
        warn!("Conflict at ordinal {from}; truncating the tail");
        follower.truncate(FIRST_SEGMENT, from)?;
        for entry in &leader[from as usize..] {
            follower.append(entry.as_bytes())?;
        }
    }

    let mut reader = CollectingReader::new();
    follower.read_from(FIRST_SEGMENT, 0, &mut reader)?;
    for (ordinal, entry) in reader.entries() {
        info!("  {ordinal}: {}", String::from_utf8_lossy(entry));
    }

    match follower.read(FIRST_SEGMENT, leader.len() as u64) {
        Err(err) if err.is_out_of_range() => info!("No entries beyond the leader's log"),
        other => warn!("Unexpected read past the end: {other:?}"),
    }

    follower.close()?;
    Ok(())
}
