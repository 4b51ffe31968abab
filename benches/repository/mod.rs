pub mod read;

use seglog_rs::{FlushMode, LogRepository, RepositoryConfig};

/// Open a repository in a fresh temp dir, switched to segment 0.
pub fn fresh_repository(flush_mode: FlushMode) -> (tempfile::TempDir, LogRepository) {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = RepositoryConfig::new(dir.path()).with_flush_mode(flush_mode);
    let mut repo = LogRepository::with_config(config).expect("open repository");
    repo.switch_to_segment(0).expect("switch");
    (dir, repo)
}
