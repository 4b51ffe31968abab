#[cfg(test)]
mod tests_metrics {
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};
    use seglog_rs::LogRepository;
    use std::collections::HashMap;

    #[test]
    fn append_and_truncate_update_counters() {
        let dir = tempfile::tempdir().expect("tempdir");
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            let mut repo = LogRepository::open(dir.path()).expect("open repository");
            repo.switch_to_segment(0).expect("switch");
            repo.append(b"abc").expect("append");
            repo.append(b"defgh").expect("append");
            repo.truncate(0, 1).expect("truncate");
            // Nothing left past ordinal 1.
            repo.truncate(0, 5).expect("truncate");
        });

        let counters: HashMap<String, u64> = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .filter_map(|(key, _, _, value)| match value {
                DebugValue::Counter(v) => Some((key.key().name().to_string(), v)),
                _ => None,
            })
            .collect();

        assert_eq!(counters.get("seglog_appends_total"), Some(&2));
        assert_eq!(counters.get("seglog_appended_bytes_total"), Some(&8));
        assert_eq!(counters.get("seglog_truncations_total"), Some(&1));
    }
}
