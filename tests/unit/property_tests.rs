#[cfg(test)]
mod tests_properties {
    use proptest::collection::vec;
    use proptest::prelude::*;
    use seglog_rs::{CollectingReader, FlushMode, LogRepository, RepositoryConfig};

    fn fresh(dir: &tempfile::TempDir) -> LogRepository {
        let config = RepositoryConfig::new(dir.path()).with_flush_mode(FlushMode::Buffered);
        let mut repo = LogRepository::with_config(config).expect("open repository");
        repo.switch_to_segment(0).expect("switch");
        repo
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn appended_entries_read_back(payloads in vec(vec(any::<u8>(), 0..256), 0..40)) {
            let dir = tempfile::tempdir().expect("tempdir");
            let mut repo = fresh(&dir);
            for (i, payload) in payloads.iter().enumerate() {
                prop_assert_eq!(repo.append(payload).expect("append"), i as u64);
            }

            prop_assert_eq!(repo.total_records(0).expect("count"), payloads.len() as u64);
            for (i, payload) in payloads.iter().enumerate() {
                prop_assert_eq!(&repo.read(0, i as u64).expect("read"), payload);
            }
            if !payloads.is_empty() {
                let mut reader = CollectingReader::new();
                repo.read_from(0, 0, &mut reader).expect("range read");
                prop_assert_eq!(reader.into_payloads(), payloads);
            }
        }

        #[test]
        fn truncate_keeps_prefix(
            payloads in vec(vec(any::<u8>(), 1..64), 1..30),
            cut in any::<prop::sample::Index>(),
        ) {
            let dir = tempfile::tempdir().expect("tempdir");
            let mut repo = fresh(&dir);
            for payload in &payloads {
                repo.append(payload).expect("append");
            }
            let k = cut.index(payloads.len() + 1) as u64;

            repo.truncate(0, k).expect("truncate");
            prop_assert_eq!(repo.total_records(0).expect("count"), k);
            for i in 0..k {
                prop_assert_eq!(&repo.read(0, i).expect("read"), &payloads[i as usize]);
            }
            for i in k..payloads.len() as u64 {
                prop_assert!(repo.read(0, i).expect_err("truncated").is_out_of_range());
            }

            // The next append lands right after the kept prefix.
            prop_assert_eq!(repo.append(b"tail").expect("append"), k);
            prop_assert_eq!(repo.read(0, k).expect("read"), b"tail".to_vec());
        }
    }
}
