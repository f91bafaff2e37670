//! Integration test for the aggregation tiers under concurrent load

#[cfg(test)]
mod integration_tests {
    use crate::core::StoreConfig;
    use crate::metrics::{Point, Tags, TimeWindowIndex};
    use chrono::{TimeZone, Utc};
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_racing_writers_across_all_tiers() {
        let store = Arc::new(TimeWindowIndex::new(StoreConfig::default()));
        let threads = 8;
        let per_thread = 2_000;
        let barrier = Arc::new(Barrier::new(threads));
        let base = 1_700_000_000;

        // Every thread hits the same 4 seconds x 3 metrics x 5 keys, so first-touch
        // creation races at every tier
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for i in 0..per_thread {
                        let time = Utc.timestamp_opt(base + (i % 4) as i64, 0).unwrap();
                        let metric = ["req", "err", "lat"][i % 3];
                        let tags = Tags::from([("shard", (i % 5).to_string())]);
                        store.store(metric, Point::at(tags, 1, time));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let all = store.load_all();
        assert_eq!(all.len(), 4);

        let mut total = 0;
        for metrics in all.values() {
            assert_eq!(metrics.len(), 3);
            for points in metrics.values() {
                assert_eq!(points.len(), 5);
                total += points.iter().map(|p| p.value()).sum::<i64>();
            }
        }
        assert_eq!(total, (threads * per_thread) as i64);

        let stats = store.stats();
        assert_eq!(stats.buckets_created, 4);
        assert_eq!(stats.points_inserted, 4 * 3 * 5);
        assert_eq!(
            stats.points_inserted + stats.points_merged,
            (threads * per_thread) as u64
        );
    }

    #[test]
    fn test_readers_run_alongside_writers() {
        let store = Arc::new(TimeWindowIndex::with_limits(3, 1_000, 100));
        let base = 1_700_000_000;

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..3_000 {
                    let time = Utc.timestamp_opt(base + (i / 500) as i64, 0).unwrap();
                    store.store("req", Point::at(Tags::new(), 1, time));
                }
            })
        };

        let reader = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..200 {
                    let all = store.load_all();
                    assert!(all.len() <= 3);
                    for metrics in all.values() {
                        for points in metrics.values() {
                            assert!(points.len() <= 1);
                        }
                    }
                }
            })
        };

        writer.join().unwrap();
        reader.join().unwrap();

        // Six seconds written, three survive, each holding 500 merged observations
        let range = store.load_all_time_range("req");
        assert_eq!(range.len(), 3);
        for points in range.values() {
            assert_eq!(points[0].value(), 500);
        }
    }
}
