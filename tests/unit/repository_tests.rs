#[cfg(test)]
mod tests_repository {
    use seglog_rs::{
        CollectingReader, FIRST_SEGMENT, FlushMode, LogError, LogRepository, ReadControl,
        RepositoryConfig,
    };

    fn repo_in(dir: &tempfile::TempDir) -> LogRepository {
        LogRepository::open(dir.path()).expect("open repository")
    }

    #[test]
    fn append_then_read_every_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut repo = repo_in(&dir);
        repo.switch_to_segment(FIRST_SEGMENT).expect("switch");

        let payloads: Vec<Vec<u8>> = (0..64u32)
            .map(|i| vec![i as u8; (i as usize * 7) % 50])
            .collect();
        for (expected, payload) in payloads.iter().enumerate() {
            let ordinal = repo.append(payload).expect("append");
            assert_eq!(ordinal, expected as u64);
        }

        assert_eq!(repo.total_records(0).expect("count"), payloads.len() as u64);
        for (ordinal, payload) in payloads.iter().enumerate() {
            assert_eq!(&repo.read(0, ordinal as u64).expect("read"), payload);
        }
    }

    #[test]
    fn scenario_append_read_range_truncate() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut repo = repo_in(&dir);
        repo.switch_to_segment(0).expect("switch");
        repo.append(b"a").expect("append");
        repo.append(b"bb").expect("append");
        repo.append(b"ccc").expect("append");

        assert_eq!(repo.total_records(0).expect("count"), 3);
        assert_eq!(repo.read(0, 1).expect("read"), b"bb");

        let mut order = Vec::new();
        repo.read_range(0, 0, Some(2), &mut |ordinal: u64, entry: &[u8]| {
            order.push((ordinal, String::from_utf8_lossy(entry).into_owned()));
            ReadControl::Continue
        })
        .expect("range read");
        assert_eq!(
            order,
            vec![
                (0, "a".to_string()),
                (1, "bb".to_string()),
                (2, "ccc".to_string())
            ]
        );

        repo.truncate(0, 1).expect("truncate");
        assert_eq!(repo.total_records(0).expect("count"), 1);
        assert_eq!(repo.read(0, 0).expect("read"), b"a");
        let err = repo.read(0, 1).expect_err("ordinal 1 was truncated");
        assert!(err.is_out_of_range());
    }

    #[test]
    fn reopen_resumes_ordinals() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let mut repo = repo_in(&dir);
            repo.switch_to_segment(2).expect("switch");
            for i in 0..5u8 {
                repo.append(&[i]).expect("append");
            }
            repo.close().expect("close");
        }

        let mut repo = repo_in(&dir);
        let latest = repo.latest_segment().expect("discover").expect("a segment");
        assert_eq!(latest, 2);
        repo.switch_to_segment(latest).expect("switch");
        assert_eq!(repo.next_ordinal(), Some(5));
        assert_eq!(repo.append(&[5]).expect("append"), 5);

        let mut reader = CollectingReader::new();
        repo.read_from(2, 0, &mut reader).expect("read");
        assert_eq!(
            reader.into_payloads(),
            (0..6u8).map(|i| vec![i]).collect::<Vec<_>>()
        );
    }

    #[test]
    fn backward_switch_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut repo = repo_in(&dir);
        repo.switch_to_segment(5).expect("switch");
        repo.append(b"x").expect("append");

        let err = repo.switch_to_segment(4).expect_err("older segment");
        assert!(matches!(
            err,
            LogError::InvalidSegmentTransition {
                requested: 4,
                latest: 5
            }
        ));
        // The current segment is unchanged and still writable.
        assert_eq!(repo.current_segment(), Some(5));
        assert_eq!(repo.append(b"y").expect("append"), 1);
    }

    #[test]
    fn older_segments_stay_readable_after_roll() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = RepositoryConfig::new(dir.path()).with_flush_mode(FlushMode::Buffered);
        let mut repo = LogRepository::with_config(config).expect("open");

        for segment in 0..3u64 {
            repo.switch_to_segment(segment).expect("switch");
            for i in 0..=segment {
                repo.append(format!("{segment}:{i}").as_bytes())
                    .expect("append");
            }
        }

        for segment in 0..3u64 {
            assert_eq!(repo.total_records(segment).expect("count"), segment + 1);
            assert_eq!(
                repo.read(segment, segment).expect("read"),
                format!("{segment}:{segment}").as_bytes()
            );
        }
    }

    #[test]
    fn truncate_old_segment_leaves_current_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut repo = repo_in(&dir);
        repo.switch_to_segment(0).expect("switch");
        for i in 0..10u8 {
            repo.append(&[i; 4]).expect("append");
        }
        repo.switch_to_segment(1).expect("switch");
        repo.append(b"current").expect("append");

        repo.truncate(0, 4).expect("truncate");
        assert_eq!(repo.total_records(0).expect("count"), 4);
        assert_eq!(repo.read(0, 3).expect("read"), vec![3u8; 4]);
        assert_eq!(repo.total_records(1).expect("count"), 1);
        assert_eq!(repo.append(b"next").expect("append"), 1);
    }
}
