//! Append entries across two segments, then read them back by ordinal,
//! by range, and after reopening the repository.

use seglog_rs::prelude::*;
use std::error::Error;
use tracing::info;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let dir = tempfile::tempdir()?;
    let document = serde_json::json!({
        "base_dir": dir.path(),
        "flush_mode": "buffered",
    });
    let config = RepositoryConfig::from_json(&document.to_string())?;
    assert_eq!(config.flush_mode, FlushMode::Buffered);
    info!("Repository config: {}", config.to_json()?);

    let mut repo = LogRepository::with_config(config.clone())?;
    let segment = repo.latest_segment()?.unwrap_or(FIRST_SEGMENT);
    repo.switch_to_segment(segment)?;

    for word in ["alpha", "beta", "gamma", "delta"] {
        let ordinal = repo.append(word.as_bytes())?;
        info!("Appended {word:?} at ({segment}, {ordinal})");
    }
    repo.sync()?;

    // Roll to the next segment; the previous one stays readable.
    repo.switch_to_segment(segment + 1)?;
    repo.append(b"epsilon")?;

    let entry = repo.read(segment, 2)?;
    info!("read({segment}, 2) = {}", String::from_utf8_lossy(&entry));

    let delivered = repo.read_range(segment, 1, Some(3), &mut |ordinal: u64, entry: &[u8]| {
        info!("  range entry {ordinal}: {}", String::from_utf8_lossy(entry));
        ReadControl::Continue
    })?;
    info!("Range read delivered {delivered} entries");

    repo.close()?;

    let reopened = LogRepository::with_config(config)?;
    info!("Segments on disk: {:?}", reopened.segments()?);
    for id in reopened.segments()? {
        let mut reader = CollectingReader::new();
        reopened.read_from(id, 0, &mut reader)?;
        let words: Vec<String> = reader
            .into_payloads()
            .into_iter()
            .map(|p| String::from_utf8_lossy(&p).into_owned())
            .collect();
        info!("Segment {id}: {} entries {words:?}", reopened.total_records(id)?);
    }

    Ok(())
}
